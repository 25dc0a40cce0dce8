//! The `matrixq grade` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use matrixq_core::feedback::combined_feedback;
use matrixq_core::grading::Grader;
use matrixq_core::report::GradingReport;

pub async fn execute(
    question_path: PathBuf,
    responses_path: PathBuf,
    output: Option<PathBuf>,
    format: String,
    show_feedback: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = super::config(config_path)?;
    let question = super::load_question_file(&question_path, &config).await?;
    let batch = super::load_responses(&responses_path, &question)?;

    let report = GradingReport::build(&question, &batch.labels, &batch.responses);
    tracing::info!(
        "graded {} response(s) to '{}'",
        report.attempts.len(),
        question.name
    );

    match format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        _ => {
            let grader = question.grader();
            let mut table = Table::new();
            let mut header = vec!["Attempt", "Outcome", "Fraction", "Parts", "Summary"];
            if show_feedback {
                header.push("Feedback");
            }
            table.set_header(header);

            for (attempt, response) in report.attempts.iter().zip(&batch.responses) {
                let mut row = vec![
                    Cell::new(&attempt.label),
                    Cell::new(attempt.outcome),
                    Cell::new(format!("{:.3}", attempt.fraction)),
                    Cell::new(format!("{}/{}", attempt.parts_right, attempt.parts_total)),
                    Cell::new(&attempt.summary),
                ];
                if show_feedback {
                    let text = match grader.validation_error(response) {
                        Some(message) => message,
                        None => combined_feedback(&question, response),
                    };
                    row.push(Cell::new(text));
                }
                table.add_row(row);
            }

            println!("{table}");
            println!(
                "Mean fraction: {:.3} ({} right, {} partial, {} wrong)",
                report.stats.mean_fraction,
                report.stats.right,
                report.stats.partial,
                report.stats.wrong
            );
        }
    }

    if let Some(dir) = output {
        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H%M%S");
        let path = dir.join(format!("grades-{timestamp}.json"));
        report.save_json(&path)?;
        eprintln!("Report saved to: {}", path.display());
    }

    Ok(())
}
