//! Persistence collaborator.
//!
//! The host owns storage; the core only needs the records back in number
//! order. [`load_question`] assembles a [`MatrixQuestion`] and refuses to
//! hand out a partially loaded one. [`MemoryStore`] is the bundled
//! implementation used by the CLI and tests.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::RwLock;

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CorrectAnswersError, LoadError};
use crate::model::{
    Column, ColumnId, FeedbackFormat, MatrixOptions, MatrixQuestion, QuestionDraft, QuestionId,
    Row, RowId,
};

/// Question-level record: options plus the host's name and text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionsRecord {
    pub question_id: QuestionId,
    pub name: String,
    #[serde(default)]
    pub question_text: String,
    pub options: MatrixOptions,
}

/// A row as stored: correct answers are the encoded at-rest string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowRecord {
    pub id: RowId,
    pub question_id: QuestionId,
    pub number: u32,
    pub name: String,
    pub correct_answers: String,
    #[serde(default)]
    pub feedback: String,
    #[serde(default)]
    pub feedback_format: FeedbackFormat,
}

/// Storage the host provides for matrix question records.
#[async_trait]
pub trait QuestionStore: Send + Sync {
    /// Options record, or `None` if the question has none.
    async fn load_options(&self, question: QuestionId) -> Result<Option<OptionsRecord>>;

    /// Column records in number order.
    async fn load_columns(&self, question: QuestionId) -> Result<Vec<Column>>;

    /// Row records in number order.
    async fn load_rows(&self, question: QuestionId) -> Result<Vec<RowRecord>>;

    /// Persist a draft, assigning ids. Re-saving an existing id replaces it.
    async fn save_question(&self, draft: &QuestionDraft) -> Result<QuestionId>;

    /// Remove a question and its rows and columns.
    async fn delete_question(&self, question: QuestionId) -> Result<()>;
}

/// Encode a correct-answer set for storage: `{"<column id>": "1", ...}`.
pub fn encode_correct_answers(answers: &BTreeSet<ColumnId>) -> String {
    let map: serde_json::Map<String, Value> = answers
        .iter()
        .map(|id| (id.to_string(), Value::String("1".into())))
        .collect();
    Value::Object(map).to_string()
}

/// Decode a stored correct-answer set.
///
/// Accepts the JSON object form (entries whose value is not `"1"`/`1`/`true`
/// are skipped), a bare id, a JSON array of ids, or a comma-delimited list.
pub fn decode_correct_answers(raw: &str) -> Result<BTreeSet<ColumnId>, CorrectAnswersError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(BTreeSet::new());
    }

    let parse_id = |s: &str| {
        s.parse::<ColumnId>()
            .map_err(|_| CorrectAnswersError::InvalidId(s.to_string()))
    };
    let id_from_value = |v: &Value| match v {
        Value::Number(n) => n
            .as_i64()
            .map(ColumnId)
            .ok_or_else(|| CorrectAnswersError::InvalidId(n.to_string())),
        Value::String(s) => parse_id(s.as_str()),
        other => Err(CorrectAnswersError::Unsupported(other.to_string())),
    };
    let is_marked = |v: &Value| match v {
        Value::String(s) => s.trim() == "1",
        Value::Number(n) => n.as_i64() == Some(1),
        Value::Bool(b) => *b,
        _ => false,
    };

    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => map
            .iter()
            .filter(|(_, v)| is_marked(v))
            .map(|(k, _)| parse_id(k.as_str()))
            .collect(),
        Ok(Value::Array(items)) => items.iter().map(id_from_value).collect(),
        Ok(value @ (Value::Number(_) | Value::String(_))) => {
            Ok(BTreeSet::from([id_from_value(&value)?]))
        }
        Ok(other) => Err(CorrectAnswersError::Unsupported(other.to_string())),
        Err(_) => raw.split(',').map(|s| parse_id(s.trim())).collect(),
    }
}

/// Load and assemble a question. Options, columns and rows are fetched
/// concurrently.
pub async fn load_question(
    store: &dyn QuestionStore,
    question: QuestionId,
) -> Result<MatrixQuestion, LoadError> {
    let (options, columns, rows) = futures::try_join!(
        store.load_options(question),
        store.load_columns(question),
        store.load_rows(question),
    )?;

    let options = options.ok_or(LoadError::MissingOptions(question))?;
    if columns.is_empty() {
        return Err(LoadError::NoColumns(question));
    }
    if rows.is_empty() {
        return Err(LoadError::NoRows(question));
    }

    let column_ids: BTreeSet<ColumnId> = columns.iter().map(|c| c.id).collect();
    let rows = rows
        .into_iter()
        .map(|record| {
            let correct_answers = decode_correct_answers(&record.correct_answers)
                .map_err(|source| LoadError::CorrectAnswers {
                    row: record.id,
                    source,
                })?;
            if let Some(column) = correct_answers.difference(&column_ids).next() {
                return Err(LoadError::UnknownColumn {
                    row: record.id,
                    column: *column,
                });
            }
            Ok(Row {
                id: record.id,
                question_id: record.question_id,
                number: record.number,
                name: record.name,
                correct_answers,
                feedback: record.feedback,
                feedback_format: record.feedback_format,
            })
        })
        .collect::<Result<Vec<_>, LoadError>>()?;

    tracing::debug!(
        "loaded question {question}: {} rows x {} columns",
        rows.len(),
        columns.len()
    );

    Ok(
        MatrixQuestion::new(question, options.name, options.options, rows, columns)
            .with_question_text(options.question_text),
    )
}

#[derive(Debug, Clone)]
struct StoredQuestion {
    options: OptionsRecord,
    columns: Vec<Column>,
    rows: Vec<RowRecord>,
}

/// In-memory [`QuestionStore`].
pub struct MemoryStore {
    questions: RwLock<HashMap<QuestionId, StoredQuestion>>,
    next_id: AtomicI64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            questions: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    fn allocate(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    fn read<T>(
        &self,
        question: QuestionId,
        f: impl FnOnce(&StoredQuestion) -> T,
    ) -> Result<Option<T>> {
        let guard = self
            .questions
            .read()
            .map_err(|_| anyhow!("question store lock poisoned"))?;
        Ok(guard.get(&question).map(f))
    }

    /// Number of stored questions.
    pub fn len(&self) -> usize {
        self.questions.read().map(|q| q.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl QuestionStore for MemoryStore {
    async fn load_options(&self, question: QuestionId) -> Result<Option<OptionsRecord>> {
        self.read(question, |q| q.options.clone())
    }

    async fn load_columns(&self, question: QuestionId) -> Result<Vec<Column>> {
        Ok(self
            .read(question, |q| q.columns.clone())?
            .unwrap_or_default())
    }

    async fn load_rows(&self, question: QuestionId) -> Result<Vec<RowRecord>> {
        Ok(self.read(question, |q| q.rows.clone())?.unwrap_or_default())
    }

    async fn save_question(&self, draft: &QuestionDraft) -> Result<QuestionId> {
        let question_id = match draft.id {
            Some(id) => {
                // Keep fresh ids above any id a caller brings along.
                self.next_id.fetch_max(id.0 + 1, Ordering::Relaxed);
                id
            }
            None => QuestionId(self.allocate()),
        };

        let mut columns: Vec<Column> = draft
            .columns
            .iter()
            .map(|c| Column {
                id: ColumnId(self.allocate()),
                question_id,
                number: c.number,
                name: c.name.clone(),
            })
            .collect();
        columns.sort_by_key(|c| c.number);
        let by_number: BTreeMap<u32, ColumnId> =
            columns.iter().map(|c| (c.number, c.id)).collect();
        if by_number.len() != columns.len() {
            bail!("question '{}' has duplicate column numbers", draft.name);
        }

        let mut rows = Vec::with_capacity(draft.rows.len());
        for row in &draft.rows {
            let correct = row
                .correct
                .iter()
                .map(|number| {
                    by_number.get(number).copied().ok_or_else(|| {
                        anyhow!("row '{}' marks unknown column {number} as correct", row.name)
                    })
                })
                .collect::<Result<BTreeSet<_>>>()?;
            rows.push(RowRecord {
                id: RowId(self.allocate()),
                question_id,
                number: row.number,
                name: row.name.clone(),
                correct_answers: encode_correct_answers(&correct),
                feedback: row.feedback.clone(),
                feedback_format: row.feedback_format,
            });
        }
        rows.sort_by_key(|r| r.number);

        let stored = StoredQuestion {
            options: OptionsRecord {
                question_id,
                name: draft.name.clone(),
                question_text: draft.question_text.clone(),
                options: draft.options.clone(),
            },
            columns,
            rows,
        };
        self.questions
            .write()
            .map_err(|_| anyhow!("question store lock poisoned"))?
            .insert(question_id, stored);

        tracing::info!(
            "saved question {question_id} '{}' ({} rows, {} columns)",
            draft.name,
            draft.rows.len(),
            draft.columns.len()
        );
        Ok(question_id)
    }

    async fn delete_question(&self, question: QuestionId) -> Result<()> {
        self.questions
            .write()
            .map_err(|_| anyhow!("question store lock poisoned"))?
            .remove(&question);
        Ok(())
    }
}
