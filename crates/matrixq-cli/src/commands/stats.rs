//! The `matrixq stats` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use matrixq_core::statistics::{compute_attempt_stats, random_guess_score};

pub async fn execute(
    question_path: PathBuf,
    responses_path: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = super::config(config_path)?;
    let question = super::load_question_file(&question_path, &config).await?;

    let guess = random_guess_score(&question)
        .map(|score| format!("{score:.3}"))
        .unwrap_or_else(|| "n/a".to_string());
    println!("Question: {}", question.name);
    println!("Random guess score: {guess}");

    let Some(responses_path) = responses_path else {
        return Ok(());
    };
    let batch = super::load_responses(&responses_path, &question)?;
    let stats = compute_attempt_stats(&question, &batch.responses);

    println!(
        "Attempts: {} ({} right, {} partial, {} wrong)",
        stats.attempts, stats.right, stats.partial, stats.wrong
    );
    println!("Mean fraction: {:.3}", stats.mean_fraction);

    let mut table = Table::new();
    table.set_header(vec!["Row", "Fully correct"]);
    for row in &stats.per_row {
        table.add_row(vec![
            Cell::new(&row.row),
            Cell::new(format!("{:.1}%", row.correct_rate * 100.0)),
        ]);
    }
    println!("{table}");

    Ok(())
}
