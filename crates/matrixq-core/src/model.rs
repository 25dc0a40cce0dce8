//! Core data model types for matrixq.
//!
//! A matrix question is a grid: rows are sub-questions, columns are the
//! choices shared by every row. These types are what the grading engine,
//! the codec and the collaborator layers pass around.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse().map($name)
            }
        }
    };
}

id_type!(
    /// Identifier of a question (one version of it).
    QuestionId
);
id_type!(
    /// Identifier of a persisted column record.
    ColumnId
);
id_type!(
    /// Identifier of a persisted row record.
    RowId
);

/// How many columns a learner may pick per row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    /// Radio buttons: exactly one column per row.
    #[default]
    Single,
    /// Checkboxes: any subset of columns per row.
    Multiple,
}

impl fmt::Display for InputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputType::Single => write!(f, "single"),
            InputType::Multiple => write!(f, "multiple"),
        }
    }
}

impl FromStr for InputType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "single" | "radio" => Ok(InputType::Single),
            "multiple" | "multi" | "checkbox" => Ok(InputType::Multiple),
            other => Err(format!("unknown input type: {other}")),
        }
    }
}

/// Credit policy for multiple-choice questions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GradeMethod {
    /// Credit per correctly selected cell.
    #[default]
    #[serde(rename = "partial")]
    Partial,
    /// Credit per row, only when the row's selection matches exactly.
    #[serde(rename = "allnone")]
    AllNone,
}

impl fmt::Display for GradeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GradeMethod::Partial => write!(f, "partial"),
            GradeMethod::AllNone => write!(f, "allnone"),
        }
    }
}

impl FromStr for GradeMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "partial" => Ok(GradeMethod::Partial),
            "allnone" | "all-or-none" | "all_or_none" => Ok(GradeMethod::AllNone),
            other => Err(format!("unknown grade method: {other}")),
        }
    }
}

/// Markup kind of a row's feedback text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackFormat {
    Plain,
    #[default]
    Html,
}

impl fmt::Display for FeedbackFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedbackFormat::Plain => write!(f, "plain"),
            FeedbackFormat::Html => write!(f, "html"),
        }
    }
}

/// Overall classification of a graded response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Right,
    Partial,
    Wrong,
}

impl Outcome {
    /// Tolerance used when deciding whether a fraction is exactly 0 or 1.
    pub const TOLERANCE: f64 = 0.000_001;

    /// Classify a fraction in `[0, 1]`.
    pub fn from_fraction(fraction: f64) -> Self {
        if fraction >= 1.0 - Self::TOLERANCE {
            Outcome::Right
        } else if fraction <= Self::TOLERANCE {
            Outcome::Wrong
        } else {
            Outcome::Partial
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Right => write!(f, "right"),
            Outcome::Partial => write!(f, "partial"),
            Outcome::Wrong => write!(f, "wrong"),
        }
    }
}

/// One selectable choice, shared by every row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub id: ColumnId,
    pub question_id: QuestionId,
    /// 1-based position; also the value used in response fields.
    pub number: u32,
    pub name: String,
}

/// One sub-question of the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    pub id: RowId,
    pub question_id: QuestionId,
    /// 1-based position; defines display order and field indexing.
    pub number: u32,
    pub name: String,
    /// Columns marked correct for this row.
    #[serde(default)]
    pub correct_answers: BTreeSet<ColumnId>,
    #[serde(default)]
    pub feedback: String,
    #[serde(default)]
    pub feedback_format: FeedbackFormat,
}

/// Feedback texts shown for the three overall outcomes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombinedFeedback {
    #[serde(default)]
    pub correct: String,
    #[serde(default)]
    pub partially_correct: String,
    #[serde(default)]
    pub incorrect: String,
}

/// Per-question grading and display options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixOptions {
    pub input_type: InputType,
    /// Only consulted when `input_type` is `Multiple`.
    pub grade_method: GradeMethod,
    pub shuffle_answers: bool,
    pub show_num_correct: bool,
    #[serde(default)]
    pub feedback: CombinedFeedback,
}

/// A fully loaded matrix question. Read-only for the lifetime of an attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixQuestion {
    pub id: QuestionId,
    pub name: String,
    #[serde(default)]
    pub question_text: String,
    pub options: MatrixOptions,
    /// Rows in number order.
    pub rows: Vec<Row>,
    /// Columns in number order.
    pub columns: Vec<Column>,
}

impl MatrixQuestion {
    /// Build a question, putting rows and columns into number order.
    pub fn new(
        id: QuestionId,
        name: impl Into<String>,
        options: MatrixOptions,
        mut rows: Vec<Row>,
        mut columns: Vec<Column>,
    ) -> Self {
        rows.sort_by_key(|r| r.number);
        columns.sort_by_key(|c| c.number);
        Self {
            id,
            name: name.into(),
            question_text: String::new(),
            options,
            rows,
            columns,
        }
    }

    pub fn with_question_text(mut self, text: impl Into<String>) -> Self {
        self.question_text = text.into();
        self
    }

    pub fn is_multiple(&self) -> bool {
        self.options.input_type == InputType::Multiple
    }

    pub fn column(&self, id: ColumnId) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == id)
    }

    pub fn column_by_number(&self, number: u32) -> Option<&Column> {
        self.columns.iter().find(|c| c.number == number)
    }

    pub fn column_by_name(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Returns the 0-based index used in field names together with the row.
    pub fn row_by_name(&self, name: &str) -> Option<(usize, &Row)> {
        self.rows.iter().enumerate().find(|(_, r)| r.name == name)
    }

    /// Column numbers marked correct for a row, in number order.
    pub fn correct_numbers(&self, row: &Row) -> BTreeSet<u32> {
        row.correct_answers
            .iter()
            .filter_map(|id| self.column(*id))
            .map(|c| c.number)
            .collect()
    }

    /// The combined feedback text for an outcome.
    pub fn feedback_for(&self, outcome: Outcome) -> &str {
        let fb = &self.options.feedback;
        match outcome {
            Outcome::Right => &fb.correct,
            Outcome::Partial => &fb.partially_correct,
            Outcome::Wrong => &fb.incorrect,
        }
    }
}

/// A column before persistence: no id yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDraft {
    pub number: u32,
    pub name: String,
}

/// A row before persistence. Correct answers are column numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowDraft {
    pub number: u32,
    pub name: String,
    #[serde(default)]
    pub correct: BTreeSet<u32>,
    #[serde(default)]
    pub feedback: String,
    #[serde(default)]
    pub feedback_format: FeedbackFormat,
}

/// The shape produced by the authoring form and the importer, and consumed
/// by [`crate::store::QuestionStore::save_question`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionDraft {
    /// Set when re-saving an existing question.
    #[serde(default)]
    pub id: Option<QuestionId>,
    pub name: String,
    #[serde(default)]
    pub question_text: String,
    pub options: MatrixOptions,
    pub columns: Vec<ColumnDraft>,
    pub rows: Vec<RowDraft>,
}
