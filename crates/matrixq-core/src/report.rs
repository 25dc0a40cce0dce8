//! Grading report types with JSON persistence and regrade comparison.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::codec::Response;
use crate::grading::Grader;
use crate::model::{GradeMethod, InputType, MatrixQuestion, Outcome};
use crate::statistics::{compute_attempt_stats, AttemptStats};

/// Grades for a batch of responses to one question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradingReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    pub question: QuestionSummary,
    /// One entry per graded response, in input order.
    pub attempts: Vec<AttemptResult>,
    pub stats: AttemptStats,
}

/// The grading-relevant shape of a question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionSummary {
    pub name: String,
    pub input_type: InputType,
    pub grade_method: GradeMethod,
    pub rows: usize,
    pub columns: usize,
}

/// One graded response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptResult {
    /// Caller-supplied label; defaults to the 1-based position.
    pub label: String,
    pub fraction: f64,
    pub outcome: Outcome,
    /// Human-readable summary of what was selected.
    pub summary: String,
    pub parts_right: usize,
    pub parts_total: usize,
    /// The raw response fields, so a report can be regraded later.
    pub response: Response,
}

impl GradingReport {
    /// Grade `responses` against `question`. Labels pair with responses by
    /// position; missing labels fall back to `#1`, `#2`, ...
    pub fn build(question: &MatrixQuestion, labels: &[String], responses: &[Response]) -> Self {
        let grader = question.grader();
        let attempts = responses
            .iter()
            .enumerate()
            .map(|(i, response)| {
                let grade = grader.grade(response);
                let (parts_right, parts_total) = grader.num_parts_right(response);
                AttemptResult {
                    label: labels
                        .get(i)
                        .cloned()
                        .unwrap_or_else(|| format!("#{}", i + 1)),
                    fraction: grade.fraction,
                    outcome: grade.outcome,
                    summary: grader.summarise(response),
                    parts_right,
                    parts_total,
                    response: response.clone(),
                }
            })
            .collect();

        GradingReport {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            question: QuestionSummary {
                name: question.name.clone(),
                input_type: question.options.input_type,
                grade_method: question.options.grade_method,
                rows: question.rows.len(),
                columns: question.columns.len(),
            },
            attempts,
            stats: compute_attempt_stats(question, responses),
        }
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: GradingReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Compare this report against a baseline, attempt by attempt (matched
    /// on label). Fraction moves larger than `threshold` are reported.
    pub fn compare(&self, baseline: &GradingReport, threshold: f64) -> RegradeReport {
        let fractions = |report: &GradingReport| -> HashMap<String, f64> {
            report
                .attempts
                .iter()
                .map(|a| (a.label.clone(), a.fraction))
                .collect()
        };

        let baseline_fractions = fractions(baseline);
        let current_fractions = fractions(self);

        let mut lowered = Vec::new();
        let mut raised = Vec::new();
        let mut unchanged = 0usize;
        let mut new_attempts = 0usize;

        for attempt in &self.attempts {
            let Some(&before) = baseline_fractions.get(&attempt.label) else {
                new_attempts += 1;
                continue;
            };
            let change = RegradeChange {
                label: attempt.label.clone(),
                baseline_fraction: before,
                current_fraction: attempt.fraction,
                delta: attempt.fraction - before,
            };
            if change.delta < -threshold {
                lowered.push(change);
            } else if change.delta > threshold {
                raised.push(change);
            } else {
                unchanged += 1;
            }
        }

        let removed_attempts = baseline_fractions
            .keys()
            .filter(|k| !current_fractions.contains_key(*k))
            .count();

        RegradeReport {
            lowered,
            raised,
            unchanged,
            new_attempts,
            removed_attempts,
        }
    }
}

/// Result of comparing two grading reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegradeReport {
    /// Attempts whose fraction went down.
    pub lowered: Vec<RegradeChange>,
    /// Attempts whose fraction went up.
    pub raised: Vec<RegradeChange>,
    /// Attempts with no significant change.
    pub unchanged: usize,
    /// Attempts in current but not baseline.
    pub new_attempts: usize,
    /// Attempts in baseline but not current.
    pub removed_attempts: usize,
}

/// One attempt whose fraction moved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegradeChange {
    pub label: String,
    pub baseline_fraction: f64,
    pub current_fraction: f64,
    pub delta: f64,
}

impl RegradeReport {
    /// Format the comparison as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!(
            "**Summary:** {} lowered, {} raised, {} unchanged\n\n",
            self.lowered.len(),
            self.raised.len(),
            self.unchanged
        ));

        let mut section = |title: &str, changes: &[RegradeChange]| {
            if changes.is_empty() {
                return;
            }
            md.push_str(&format!("### {title}\n\n"));
            md.push_str("| Attempt | Baseline | Current | Delta |\n");
            md.push_str("|---------|----------|---------|-------|\n");
            for c in changes {
                md.push_str(&format!(
                    "| {} | {:.1}% | {:.1}% | {:+.1}% |\n",
                    c.label,
                    c.baseline_fraction * 100.0,
                    c.current_fraction * 100.0,
                    c.delta * 100.0
                ));
            }
            md.push('\n');
        };
        section("Lowered", &self.lowered);
        section("Raised", &self.raised);

        md
    }

    /// Returns true if any attempt's fraction moved.
    pub fn has_changes(&self) -> bool {
        !self.lowered.is_empty() || !self.raised.is_empty()
    }
}
