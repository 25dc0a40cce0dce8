//! Error types for loading and encoding matrix questions.
//!
//! Validation problems are not errors here; they are returned as data by
//! [`crate::validation::QuestionForm::validate`].

use thiserror::Error;

use crate::model::{ColumnId, QuestionId, RowId};

/// A question could not be assembled from its persisted records.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The question has no options record.
    #[error("question {0} has no matrix options")]
    MissingOptions(QuestionId),

    /// The question has no column records.
    #[error("question {0} has no columns")]
    NoColumns(QuestionId),

    /// The question has no row records.
    #[error("question {0} has no rows")]
    NoRows(QuestionId),

    /// A row's stored correct answers could not be decoded.
    #[error("row {row} has malformed correct answers: {source}")]
    CorrectAnswers {
        row: RowId,
        #[source]
        source: CorrectAnswersError,
    },

    /// A row marks a column as correct that does not belong to the question.
    #[error("row {row} references column {column}, which is not part of the question")]
    UnknownColumn { row: RowId, column: ColumnId },

    /// The persistence collaborator failed.
    #[error("store error: {0:#}")]
    Store(#[from] anyhow::Error),
}

/// The at-rest correct-answer string could not be decoded.
#[derive(Debug, Error)]
pub enum CorrectAnswersError {
    #[error("invalid column id '{0}'")]
    InvalidId(String),

    #[error("unsupported JSON value: {0}")]
    Unsupported(String),
}

/// A human-oriented selection could not be turned into response fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("no row named '{0}'")]
    UnknownRow(String),

    #[error("row '{row}' has no column named '{column}'")]
    UnknownColumn { row: String, column: String },

    #[error("row '{row}' takes exactly one column in single-choice mode, got {count}")]
    NotSingle { row: String, count: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_error_messages() {
        assert_eq!(
            LoadError::NoColumns(QuestionId(4)).to_string(),
            "question 4 has no columns"
        );
        let err = LoadError::UnknownColumn {
            row: RowId(2),
            column: ColumnId(99),
        };
        assert!(err.to_string().contains("column 99"));
    }

    #[test]
    fn codec_error_messages() {
        let err = CodecError::UnknownColumn {
            row: "France".into(),
            column: "Lyon".into(),
        };
        assert_eq!(err.to_string(), "row 'France' has no column named 'Lyon'");
    }
}
