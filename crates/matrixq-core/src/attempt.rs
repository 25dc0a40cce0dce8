//! Per-attempt column order.
//!
//! When a question shuffles answers, the column order is fixed once at the
//! start of an attempt and stored by the host so every later page view shows
//! the same order. Response fields stay keyed by column number, so the order
//! only affects display.

use anyhow::{bail, Context, Result};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::model::{Column, ColumnId, MatrixQuestion};

/// Column display order for one attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptLayout {
    column_order: Vec<ColumnId>,
}

impl AttemptLayout {
    /// Fix the column order for a new attempt.
    pub fn start<R: Rng + ?Sized>(question: &MatrixQuestion, rng: &mut R) -> Self {
        let mut column_order: Vec<ColumnId> = question.columns.iter().map(|c| c.id).collect();
        if question.options.shuffle_answers {
            column_order.shuffle(rng);
        }
        Self { column_order }
    }

    pub fn column_order(&self) -> &[ColumnId] {
        &self.column_order
    }

    /// Columns in display order.
    pub fn ordered_columns<'q>(&self, question: &'q MatrixQuestion) -> Vec<&'q Column> {
        self.column_order
            .iter()
            .filter_map(|id| question.column(*id))
            .collect()
    }

    /// Serialize as a comma-separated id list for the host's attempt state.
    pub fn to_state(&self) -> String {
        self.column_order
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Restore a layout saved with [`AttemptLayout::to_state`].
    ///
    /// The state must name every column of the question exactly once.
    pub fn from_state(question: &MatrixQuestion, state: &str) -> Result<Self> {
        let column_order = state
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .map(|s| {
                s.parse::<ColumnId>()
                    .with_context(|| format!("invalid column id in attempt state: '{s}'"))
            })
            .collect::<Result<Vec<_>>>()?;

        for id in &column_order {
            if question.column(*id).is_none() {
                bail!("column {id} is not part of question {}", question.id);
            }
        }
        let mut seen = column_order.clone();
        seen.sort();
        seen.dedup();
        if seen.len() != column_order.len() || seen.len() != question.columns.len() {
            bail!(
                "attempt state lists {} column(s), question {} has {}",
                column_order.len(),
                question.id,
                question.columns.len()
            );
        }

        Ok(Self { column_order })
    }
}
