//! The `matrixq compare` command.

use std::path::PathBuf;

use anyhow::Result;

use matrixq_core::report::GradingReport;

pub fn execute(
    baseline_path: PathBuf,
    current_path: PathBuf,
    threshold: f64,
    fail_on_change: bool,
    format: String,
) -> Result<()> {
    let baseline = GradingReport::load_json(&baseline_path)?;
    let current = GradingReport::load_json(&current_path)?;

    let report = current.compare(&baseline, threshold);

    match format.as_str() {
        "markdown" | "md" => {
            println!("{}", report.to_markdown());
        }
        "json" => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        _ => {
            println!(
                "Comparison: {} lowered, {} raised, {} unchanged",
                report.lowered.len(),
                report.raised.len(),
                report.unchanged
            );

            for (title, changes) in [("Lowered", &report.lowered), ("Raised", &report.raised)] {
                if changes.is_empty() {
                    continue;
                }
                println!("\n{title}:");
                for c in changes {
                    println!(
                        "  {} {:.1}% -> {:.1}% ({:+.1}%)",
                        c.label,
                        c.baseline_fraction * 100.0,
                        c.current_fraction * 100.0,
                        c.delta * 100.0
                    );
                }
            }

            if report.new_attempts > 0 {
                println!("\n{} new attempt(s)", report.new_attempts);
            }
            if report.removed_attempts > 0 {
                println!("{} removed attempt(s)", report.removed_attempts);
            }
        }
    }

    if fail_on_change && report.has_changes() {
        std::process::exit(1);
    }

    Ok(())
}
