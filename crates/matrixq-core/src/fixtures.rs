//! Shared question builders for unit tests.

use std::collections::BTreeSet;

use crate::model::{
    Column, ColumnId, CombinedFeedback, FeedbackFormat, GradeMethod, InputType, MatrixOptions,
    MatrixQuestion, QuestionId, Row, RowId,
};

pub const QUESTION: QuestionId = QuestionId(1);

pub fn columns(count: u32) -> Vec<Column> {
    (1..=count)
        .map(|n| Column {
            id: ColumnId(100 + i64::from(n)),
            question_id: QUESTION,
            number: n,
            name: format!("col {n}"),
        })
        .collect()
}

pub fn row(number: u32, correct: &[u32]) -> Row {
    Row {
        id: RowId(200 + i64::from(number)),
        question_id: QUESTION,
        number,
        name: format!("row {number}"),
        correct_answers: correct
            .iter()
            .map(|c| ColumnId(100 + i64::from(*c)))
            .collect::<BTreeSet<_>>(),
        feedback: format!("feedback for row {number}"),
        feedback_format: FeedbackFormat::Html,
    }
}

pub fn feedback() -> CombinedFeedback {
    CombinedFeedback {
        correct: "Well done.".into(),
        partially_correct: "Parts are right.".into(),
        incorrect: "Not quite.".into(),
    }
}

/// `rows` × `columns` single-choice grid; row `n` is correct in column
/// `((n - 1) % columns) + 1`.
pub fn single_question(rows: u32, columns: u32) -> MatrixQuestion {
    let options = MatrixOptions {
        input_type: InputType::Single,
        grade_method: GradeMethod::Partial,
        shuffle_answers: false,
        show_num_correct: true,
        feedback: feedback(),
    };
    let rows = (1..=rows).map(|n| row(n, &[((n - 1) % columns) + 1])).collect();
    MatrixQuestion::new(QUESTION, "single grid", options, rows, self::columns(columns))
}

/// 3 rows × 7 columns with 7 correct slots: {1,2,3}, {4,5}, {6,7}.
pub fn multiple_question(grade_method: GradeMethod) -> MatrixQuestion {
    let options = MatrixOptions {
        input_type: InputType::Multiple,
        grade_method,
        shuffle_answers: false,
        show_num_correct: true,
        feedback: feedback(),
    };
    let rows = vec![row(1, &[1, 2, 3]), row(2, &[4, 5]), row(3, &[6, 7])];
    MatrixQuestion::new(QUESTION, "multiple grid", options, rows, columns(7))
}
