//! Response codec.
//!
//! Binds UI input names to grid coordinates. Field names use the 0-based row
//! index (position in number order) and, in multiple-choice mode, the 1-based
//! column number:
//!
//! - single-choice: `rowanswers{r}` = chosen column number
//! - multiple-choice: `rowanswers{r}_{c}` = `"1"` when selected
//!
//! Every other module builds and reads field names through [`field_name`]
//! and [`parse_field_name`].

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::CodecError;
use crate::model::{Column, MatrixQuestion};

/// Prefix shared by every response field.
pub const FIELD_PREFIX: &str = "rowanswers";

/// Value a multiple-choice field carries when the cell is selected.
pub const SELECTED: &str = "1";

/// Grid coordinates a field name refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldKey {
    /// 0-based row index.
    pub row_index: usize,
    /// Column number for multiple-choice fields.
    pub column_number: Option<u32>,
}

/// Build the field name for a row, or for a (row, column) cell.
pub fn field_name(row_index: usize, column_number: Option<u32>) -> String {
    match column_number {
        Some(c) => format!("{FIELD_PREFIX}{row_index}_{c}"),
        None => format!("{FIELD_PREFIX}{row_index}"),
    }
}

/// Inverse of [`field_name`]. Returns `None` for foreign or malformed names.
pub fn parse_field_name(name: &str) -> Option<FieldKey> {
    let rest = name.strip_prefix(FIELD_PREFIX)?;
    let (row, column) = match rest.split_once('_') {
        Some((row, column)) => (row, Some(column)),
        None => (rest, None),
    };
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(row) || !column.map_or(true, all_digits) {
        return None;
    }
    Some(FieldKey {
        row_index: row.parse().ok()?,
        column_number: column.map(str::parse::<u32>).transpose().ok()?,
    })
}

/// Whether a multiple-choice field value means "selected".
pub fn is_selected_value(value: &str) -> bool {
    value.trim() == SELECTED
}

/// Raw value kind of an expected field, for host-side pre-validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Integer-like raw text (a column number).
    Integer,
    /// `"0"` / `"1"` flag.
    Boolean,
}

/// A learner submission: field name → raw string value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Response(BTreeMap<String, String>);

impl Response {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.0.insert(field.into(), value.into());
    }

    /// True when no field carries a non-blank value.
    pub fn is_empty(&self) -> bool {
        self.0.values().all(|v| v.trim().is_empty())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Response {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Every field a response to this question may carry.
pub fn expected_fields(question: &MatrixQuestion) -> BTreeMap<String, FieldKind> {
    let mut fields = BTreeMap::new();
    for r in 0..question.rows.len() {
        if question.is_multiple() {
            for column in &question.columns {
                fields.insert(field_name(r, Some(column.number)), FieldKind::Boolean);
            }
        } else {
            fields.insert(field_name(r, None), FieldKind::Integer);
        }
    }
    fields
}

/// The column a single-choice row selects, if the value names a real column.
pub fn selected_column<'q>(
    question: &'q MatrixQuestion,
    response: &Response,
    row_index: usize,
) -> Option<&'q Column> {
    let value = response.get(&field_name(row_index, None))?;
    let number = value.trim().parse::<u32>().ok()?;
    question.column_by_number(number)
}

/// Column numbers a multiple-choice row selects, in number order.
pub fn selected_numbers(
    question: &MatrixQuestion,
    response: &Response,
    row_index: usize,
) -> BTreeSet<u32> {
    question
        .columns
        .iter()
        .filter(|c| {
            response
                .get(&field_name(row_index, Some(c.number)))
                .is_some_and(is_selected_value)
        })
        .map(|c| c.number)
        .collect()
}

/// Decoded selection for one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowSelection {
    Single(Option<u32>),
    Multiple(BTreeSet<u32>),
}

impl RowSelection {
    pub fn is_empty(&self) -> bool {
        match self {
            RowSelection::Single(choice) => choice.is_none(),
            RowSelection::Multiple(choices) => choices.is_empty(),
        }
    }
}

/// Turn a flat response into one selection per row, in row order.
///
/// Fields that are absent, unparsable, or point at missing columns are read
/// as "no selection".
pub fn decode(question: &MatrixQuestion, response: &Response) -> Vec<RowSelection> {
    (0..question.rows.len())
        .map(|r| {
            if question.is_multiple() {
                RowSelection::Multiple(selected_numbers(question, response, r))
            } else {
                RowSelection::Single(selected_column(question, response, r).map(|c| c.number))
            }
        })
        .collect()
}

/// A row's answer given by column display name(s).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NamedAnswer {
    One(String),
    Many(Vec<String>),
}

/// Row display name → answer. Used by test harnesses and the CLI.
pub type NamedSelection = BTreeMap<String, NamedAnswer>;

/// Encode a human-oriented selection into the exact response fields.
///
/// Every row and column name must resolve; nothing is dropped silently.
pub fn encode_simulated(
    question: &MatrixQuestion,
    selection: &NamedSelection,
) -> Result<Response, CodecError> {
    let mut response = Response::new();
    for (row_name, answer) in selection {
        let (r, _) = question
            .row_by_name(row_name)
            .ok_or_else(|| CodecError::UnknownRow(row_name.clone()))?;

        let names: Vec<&str> = match answer {
            NamedAnswer::One(name) => vec![name.as_str()],
            NamedAnswer::Many(names) => names.iter().map(String::as_str).collect(),
        };
        let columns = names
            .iter()
            .map(|name| {
                question
                    .column_by_name(name)
                    .ok_or_else(|| CodecError::UnknownColumn {
                        row: row_name.clone(),
                        column: (*name).to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        if question.is_multiple() {
            for column in columns {
                response.insert(field_name(r, Some(column.number)), SELECTED);
            }
        } else {
            match columns.as_slice() {
                [column] => response.insert(field_name(r, None), column.number.to_string()),
                _ => {
                    return Err(CodecError::NotSingle {
                        row: row_name.clone(),
                        count: columns.len(),
                    })
                }
            }
        }
    }
    Ok(response)
}

/// Map decoded selections back to display names. Rows without a selection
/// are left out.
pub fn name_selection(question: &MatrixQuestion, selections: &[RowSelection]) -> NamedSelection {
    let column_name = |number: &u32| {
        question
            .column_by_number(*number)
            .map(|c| c.name.clone())
    };

    question
        .rows
        .iter()
        .zip(selections)
        .filter(|(_, selection)| !selection.is_empty())
        .filter_map(|(row, selection)| {
            let answer = match selection {
                RowSelection::Single(choice) => {
                    NamedAnswer::One(choice.as_ref().and_then(column_name)?)
                }
                RowSelection::Multiple(choices) => {
                    NamedAnswer::Many(choices.iter().filter_map(column_name).collect())
                }
            };
            Some((row.name.clone(), answer))
        })
        .collect()
}
