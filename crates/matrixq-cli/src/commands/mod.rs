//! Subcommand implementations and the loading steps they share.

pub mod compare;
pub mod fields;
pub mod grade;
pub mod init;
pub mod stats;
pub mod validate;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use matrixq_core::codec::{encode_simulated, NamedSelection, Response};
use matrixq_core::config::{load_config_from, MatrixConfig};
use matrixq_core::model::MatrixQuestion;
use matrixq_core::parser;
use matrixq_core::store::{load_question, MemoryStore, QuestionStore};

/// Parse, normalize and load one question file through the in-memory store.
pub async fn load_question_file(path: &Path, config: &MatrixConfig) -> Result<MatrixQuestion> {
    let draft = parser::parse_question(path, config)?
        .normalized()
        .with_context(|| format!("{} is not a valid question", path.display()))?;

    let store = MemoryStore::new();
    let id = store.save_question(&draft).await?;
    let question = load_question(&store, id)
        .await
        .with_context(|| format!("failed to load question from {}", path.display()))?;
    Ok(question)
}

/// Config from `--config`, or the default search path.
pub fn config(path: Option<PathBuf>) -> Result<MatrixConfig> {
    load_config_from(path.as_deref())
}

/// One entry of a responses file. Give either raw `fields` or named
/// `answers`.
#[derive(Debug, Deserialize)]
struct ResponseEntry {
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    fields: Option<Response>,
    #[serde(default)]
    answers: Option<NamedSelection>,
}

/// Labelled responses ready for grading.
#[derive(Debug, Default)]
pub struct ResponseBatch {
    pub labels: Vec<String>,
    pub responses: Vec<Response>,
}

/// Read a JSON array of response entries and encode named answers against
/// `question`.
pub fn load_responses(path: &Path, question: &MatrixQuestion) -> Result<ResponseBatch> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read responses: {}", path.display()))?;
    let entries: Vec<ResponseEntry> = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse responses JSON: {}", path.display()))?;

    let mut batch = ResponseBatch::default();
    for (i, entry) in entries.into_iter().enumerate() {
        let label = entry.label.unwrap_or_else(|| format!("#{}", i + 1));
        let response = match (entry.fields, entry.answers) {
            (Some(fields), None) => fields,
            (None, Some(answers)) => encode_simulated(question, &answers)
                .with_context(|| format!("response {label}"))?,
            (Some(_), Some(_)) => bail!("response {label} has both fields and answers"),
            (None, None) => Response::new(),
        };
        batch.labels.push(label);
        batch.responses.push(response);
    }

    tracing::debug!("loaded {} responses from {}", batch.responses.len(), path.display());
    Ok(batch)
}
