//! TOML import/export of matrix question definitions.
//!
//! Import produces a [`QuestionDraft`]; it does not validate, so the caller
//! can run [`crate::validation::QuestionForm::validate`] and show every
//! problem at once. Rows name their correct columns either by display name
//! (`correct = ["Paris"]`) or with the exported id map
//! (`correct_answers = '{"11":"1"}'`).

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::MatrixConfig;
use crate::model::{
    ColumnDraft, ColumnId, CombinedFeedback, FeedbackFormat, GradeMethod, InputType,
    MatrixOptions, MatrixQuestion, QuestionDraft, QuestionId, RowDraft,
};
use crate::store::{decode_correct_answers, encode_correct_answers};

/// Intermediate TOML structure for question files.
#[derive(Debug, Serialize, Deserialize)]
struct TomlQuestionFile {
    question: TomlQuestionHeader,
    #[serde(default)]
    columns: Vec<TomlColumn>,
    #[serde(default)]
    rows: Vec<TomlRow>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TomlQuestionHeader {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<i64>,
    name: String,
    #[serde(default)]
    question_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    input_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    grade_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    shuffle_answers: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    show_num_correct: Option<bool>,
    #[serde(default)]
    feedback: CombinedFeedback,
}

#[derive(Debug, Serialize, Deserialize)]
struct TomlColumn {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<i64>,
    name: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct TomlRow {
    name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    correct: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    correct_answers: Option<String>,
    #[serde(default)]
    feedback: String,
    #[serde(default)]
    feedback_format: FeedbackFormat,
}

/// Assigns column numbers in file order and remembers how to find them.
#[derive(Debug, Default)]
struct ColumnIndex {
    next_number: u32,
    by_id: BTreeMap<ColumnId, u32>,
    by_name: BTreeMap<String, u32>,
}

impl ColumnIndex {
    fn push(&mut self, column: &TomlColumn) -> ColumnDraft {
        self.next_number += 1;
        let number = self.next_number;
        if let Some(id) = column.id {
            self.by_id.insert(ColumnId(id), number);
        }
        self.by_name.entry(column.name.clone()).or_insert(number);
        ColumnDraft {
            number,
            name: column.name.clone(),
        }
    }

    fn resolve(&self, row: &TomlRow) -> Result<BTreeSet<u32>> {
        let mut numbers = BTreeSet::new();
        for name in &row.correct {
            match self.by_name.get(name) {
                Some(number) => numbers.insert(*number),
                None => bail!("row '{}' marks unknown column '{name}' as correct", row.name),
            };
        }
        if let Some(raw) = &row.correct_answers {
            let ids = decode_correct_answers(raw)
                .with_context(|| format!("row '{}' has malformed correct_answers", row.name))?;
            for id in ids {
                match self.by_id.get(&id) {
                    Some(number) => numbers.insert(*number),
                    None => bail!("row '{}' marks unknown column id {id} as correct", row.name),
                };
            }
        }
        Ok(numbers)
    }
}

fn parse_option<T>(value: Option<String>, default: T) -> Result<T>
where
    T: std::str::FromStr<Err = String>,
{
    value
        .map(|v| v.parse::<T>().map_err(|e| anyhow::anyhow!(e)))
        .transpose()
        .map(|v| v.unwrap_or(default))
}

/// Parse a single TOML file into a [`QuestionDraft`].
pub fn parse_question(path: &Path, defaults: &MatrixConfig) -> Result<QuestionDraft> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read question file: {}", path.display()))?;

    parse_question_str(&content, path, defaults)
}

/// Parse a TOML string into a [`QuestionDraft`] (useful for testing).
pub fn parse_question_str(
    content: &str,
    source_path: &Path,
    defaults: &MatrixConfig,
) -> Result<QuestionDraft> {
    let parsed: TomlQuestionFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let header = parsed.question;
    let options = MatrixOptions {
        input_type: parse_option(header.input_type, defaults.input_type)?,
        grade_method: parse_option(header.grade_method, defaults.grade_method)?,
        shuffle_answers: header.shuffle_answers.unwrap_or(defaults.shuffle_answers),
        show_num_correct: header.show_num_correct.unwrap_or(defaults.show_num_correct),
        feedback: header.feedback,
    };

    let mut index = ColumnIndex::default();
    let columns: Vec<ColumnDraft> = parsed.columns.iter().map(|c| index.push(c)).collect();

    let rows = parsed
        .rows
        .into_iter()
        .zip(1u32..)
        .map(|(row, number)| -> Result<RowDraft> {
            Ok(RowDraft {
                number,
                correct: index.resolve(&row)?,
                name: row.name,
                feedback: row.feedback,
                feedback_format: row.feedback_format,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(QuestionDraft {
        id: header.id.map(QuestionId),
        name: header.name,
        question_text: header.question_text,
        options,
        columns,
        rows,
    })
}

/// Recursively load all `.toml` question files from a directory.
///
/// Files that fail to parse are skipped with a warning.
pub fn load_question_directory(dir: &Path, defaults: &MatrixConfig) -> Result<Vec<QuestionDraft>> {
    let mut drafts = Vec::new();

    if !dir.is_dir() {
        bail!("not a directory: {}", dir.display());
    }

    let mut entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.path());

    for entry in entries {
        let path = entry.path();

        if path.is_dir() {
            drafts.extend(load_question_directory(&path, defaults)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_question(&path, defaults) {
                Ok(draft) => drafts.push(draft),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(drafts)
}

/// Export a loaded question to TOML. Correct answers are written as the
/// column-id map so that a re-import maps them onto the new columns.
pub fn export_question(question: &MatrixQuestion) -> Result<String> {
    let options = &question.options;
    let file = TomlQuestionFile {
        question: TomlQuestionHeader {
            id: Some(question.id.0),
            name: question.name.clone(),
            question_text: question.question_text.clone(),
            input_type: Some(options.input_type.to_string()),
            grade_method: (options.input_type == InputType::Multiple
                || options.grade_method != GradeMethod::default())
            .then(|| options.grade_method.to_string()),
            shuffle_answers: Some(options.shuffle_answers),
            show_num_correct: Some(options.show_num_correct),
            feedback: options.feedback.clone(),
        },
        columns: question
            .columns
            .iter()
            .map(|c| TomlColumn {
                id: Some(c.id.0),
                name: c.name.clone(),
            })
            .collect(),
        rows: question
            .rows
            .iter()
            .map(|r| TomlRow {
                name: r.name.clone(),
                correct: Vec::new(),
                correct_answers: Some(encode_correct_answers(&r.correct_answers)),
                feedback: r.feedback.clone(),
                feedback_format: r.feedback_format,
            })
            .collect(),
    };

    toml::to_string_pretty(&file).context("failed to serialize question")
}
