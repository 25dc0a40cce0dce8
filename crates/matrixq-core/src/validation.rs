//! Authoring form model and validation.
//!
//! The form arrives as raw arrays, exactly as the editing UI posts them.
//! Blank trailing entries are unused slots and are dropped; blanks followed
//! by a filled entry are an error. Problems come back as a field → message
//! map for the form layer to re-display.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::{ColumnDraft, FeedbackFormat, InputType, MatrixOptions, QuestionDraft, RowDraft};

/// Minimum number of filled columns and rows.
pub const MIN_COLUMNS: usize = 2;
pub const MIN_ROWS: usize = 2;

/// Raw authoring form contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionForm {
    pub name: String,
    #[serde(default)]
    pub question_text: String,
    pub options: MatrixOptions,
    /// `columnname[]`
    pub column_names: Vec<String>,
    /// `rowname[]`
    pub row_names: Vec<String>,
    /// Row feedback, parallel to `row_names`; missing entries are empty.
    #[serde(default)]
    pub row_feedback: Vec<String>,
    /// Row feedback formats, parallel to `row_names`; missing entries are
    /// HTML.
    #[serde(default)]
    pub row_feedback_format: Vec<FeedbackFormat>,
    /// Correct answers per row as 0-based positions into `column_names`.
    #[serde(default)]
    pub row_answers: Vec<BTreeSet<usize>>,
}

/// Field → message map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Keeps the first message reported for a field.
    fn add(&mut self, field: String, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.iter().map(|(k, v)| format!("{k}: {v}")).collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Whether a name contains something that looks like an HTML tag.
fn has_markup(name: &str) -> bool {
    let mut rest = name;
    while let Some(start) = rest.find('<') {
        let after = &rest[start + 1..];
        let opens_tag = after
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '/' || c == '!');
        if opens_tag && after.contains('>') {
            return true;
        }
        rest = after;
    }
    false
}

/// Number of entries before the trailing run of blanks.
fn used_len(names: &[String]) -> usize {
    names
        .iter()
        .rposition(|n| !n.trim().is_empty())
        .map_or(0, |i| i + 1)
}

/// Checks shared by the column and row name lists.
fn check_names(
    errors: &mut ValidationErrors,
    names: &[String],
    field: &str,
    label: &str,
    min: usize,
) {
    let used = used_len(names);
    let mut seen = HashSet::new();

    for (i, name) in names[..used].iter().enumerate() {
        let key = format!("{field}[{i}]");
        let trimmed = name.trim();
        if trimmed.is_empty() {
            errors.add(
                key,
                format!("Blank {label} names are only allowed at the end of the list"),
            );
        } else if has_markup(trimmed) {
            errors.add(key, format!("HTML markup is not allowed in {label} names"));
        } else if !seen.insert(trimmed) {
            errors.add(key, format!("Duplicate {label} name '{trimmed}'"));
        }
    }

    if used < min {
        errors.add(
            field.to_string(),
            format!("You must provide at least {min} {label}s"),
        );
    }
}

impl QuestionForm {
    /// Validate the form. An empty result means [`QuestionForm::into_draft`]
    /// will succeed.
    pub fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::default();

        check_names(&mut errors, &self.column_names, "columnname", "column", MIN_COLUMNS);
        check_names(&mut errors, &self.row_names, "rowname", "row", MIN_ROWS);

        let columns = used_len(&self.column_names);
        let column_filled = |i: usize| i < columns && !self.column_names[i].trim().is_empty();

        for r in 0..used_len(&self.row_names) {
            if self.row_names[r].trim().is_empty() {
                continue;
            }
            let key = format!("rowanswers[{r}]");
            let answers = self.row_answers.get(r).cloned().unwrap_or_default();

            if answers.is_empty() {
                errors.add(key, "Select at least one correct answer for this row");
            } else if answers.iter().any(|&c| !column_filled(c)) {
                errors.add(key, "A correct answer points at an empty or missing column");
            } else if self.options.input_type == InputType::Single && answers.len() > 1 {
                errors.add(
                    key,
                    "Only one correct answer is allowed per row in single-choice mode",
                );
            }
        }

        errors
    }

    /// Validate and turn the form into a draft with contiguous numbers.
    pub fn into_draft(self) -> Result<QuestionDraft, ValidationErrors> {
        let errors = self.validate();
        if !errors.is_empty() {
            return Err(errors);
        }

        let columns = self.column_names[..used_len(&self.column_names)]
            .iter()
            .zip(1u32..)
            .map(|(name, number)| ColumnDraft {
                number,
                name: name.trim().to_string(),
            })
            .collect();

        let mut feedback = self.row_feedback.into_iter();
        let mut formats = self.row_feedback_format.into_iter();
        let mut answers = self.row_answers.into_iter();
        let used_rows = used_len(&self.row_names);
        let rows = self
            .row_names
            .into_iter()
            .take(used_rows)
            .zip(1u32..)
            .map(|(name, number)| RowDraft {
                number,
                name: name.trim().to_string(),
                correct: answers
                    .next()
                    .unwrap_or_default()
                    .into_iter()
                    .map(|c| c as u32 + 1)
                    .collect(),
                feedback: feedback.next().unwrap_or_default(),
                feedback_format: formats.next().unwrap_or_default(),
            })
            .collect();

        Ok(QuestionDraft {
            id: None,
            name: self.name,
            question_text: self.question_text,
            options: self.options,
            columns,
            rows,
        })
    }
}

impl From<&QuestionDraft> for QuestionForm {
    /// Re-open a draft for editing. Correct answers that name no column map
    /// past the end of `column_names` so validation flags them.
    fn from(draft: &QuestionDraft) -> Self {
        let mut columns = draft.columns.clone();
        columns.sort_by_key(|c| c.number);
        let mut rows = draft.rows.clone();
        rows.sort_by_key(|r| r.number);

        let position = |number: &u32| {
            columns
                .iter()
                .position(|c| c.number == *number)
                .unwrap_or(columns.len())
        };

        QuestionForm {
            name: draft.name.clone(),
            question_text: draft.question_text.clone(),
            options: draft.options.clone(),
            column_names: columns.iter().map(|c| c.name.clone()).collect(),
            row_names: rows.iter().map(|r| r.name.clone()).collect(),
            row_feedback: rows.iter().map(|r| r.feedback.clone()).collect(),
            row_feedback_format: rows.iter().map(|r| r.feedback_format).collect(),
            row_answers: rows
                .iter()
                .map(|r| r.correct.iter().map(position).collect())
                .collect(),
        }
    }
}

impl QuestionDraft {
    /// Run the draft through the authoring form: validate it and drop unused
    /// trailing slots. The id is kept.
    pub fn normalized(&self) -> Result<QuestionDraft, ValidationErrors> {
        let mut draft = QuestionForm::from(self).into_draft()?;
        draft.id = self.id;
        Ok(draft)
    }
}
