//! Grading engine.
//!
//! Two pure strategies, one per [`InputType`], behind the [`Grader`] trait.
//! [`QuestionGrader`] picks the strategy from the question's options so
//! callers never branch on the input type themselves.
//!
//! Missing or malformed response fields are read as "not selected"; grading
//! never fails.

use crate::codec::{
    field_name, is_selected_value, selected_column, selected_numbers, Response, SELECTED,
};
use crate::model::{Column, GradeMethod, InputType, MatrixQuestion, Outcome};

/// Result of grading one response.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grade {
    /// Score in `[0, 1]`.
    pub fraction: f64,
    pub outcome: Outcome,
}

impl Grade {
    fn from_parts(correct: usize, total: usize) -> Self {
        let fraction = if total == 0 {
            0.0
        } else {
            correct as f64 / total as f64
        };
        Self {
            fraction,
            outcome: Outcome::from_fraction(fraction),
        }
    }
}

/// Operations the host and the renderer need from a grading strategy.
pub trait Grader {
    /// Whether the learner has answered enough for the attempt to count as
    /// complete.
    fn is_complete(&self, response: &Response) -> bool;

    /// Whether the response can be graded at all.
    fn is_gradable(&self, response: &Response) -> bool;

    fn grade(&self, response: &Response) -> Grade;

    /// A response that earns full marks.
    fn correct_response(&self) -> Response;

    /// One-line human-readable description of the response.
    fn summarise(&self, response: &Response) -> String;

    /// Whether two responses select exactly the same cells.
    fn is_same_response(&self, a: &Response, b: &Response) -> bool;

    /// Whether a cell is selected; drives radio/checkbox state.
    fn is_choice_selected(&self, response: &Response, row_index: usize, column: &Column) -> bool;

    /// `(correct parts, total parts)` under the question's credit policy.
    fn num_parts_right(&self, response: &Response) -> (usize, usize);
}

/// Radio-button grid: one column per row.
#[derive(Debug, Clone, Copy)]
pub struct SingleChoiceGrader<'q> {
    question: &'q MatrixQuestion,
}

impl<'q> SingleChoiceGrader<'q> {
    pub fn new(question: &'q MatrixQuestion) -> Self {
        Self { question }
    }

    /// The correct column number of each row, in row order.
    fn correct_number(&self, row_index: usize) -> Option<u32> {
        let row = self.question.rows.get(row_index)?;
        self.question.correct_numbers(row).into_iter().next()
    }

    fn num_correct_rows(&self, response: &Response) -> usize {
        (0..self.question.rows.len())
            .filter(|&r| {
                let chosen = selected_column(self.question, response, r).map(|c| c.number);
                chosen.is_some() && chosen == self.correct_number(r)
            })
            .count()
    }
}

impl Grader for SingleChoiceGrader<'_> {
    fn is_complete(&self, response: &Response) -> bool {
        // Unanswered rows do not make the response incomplete.
        !response.is_empty()
    }

    fn is_gradable(&self, response: &Response) -> bool {
        self.is_complete(response)
    }

    fn grade(&self, response: &Response) -> Grade {
        let (correct, total) = self.num_parts_right(response);
        let grade = Grade::from_parts(correct, total);
        tracing::debug!(
            "question {}: {correct}/{total} rows correct, fraction {:.4}",
            self.question.id,
            grade.fraction
        );
        grade
    }

    fn correct_response(&self) -> Response {
        (0..self.question.rows.len())
            .filter_map(|r| {
                self.correct_number(r)
                    .map(|number| (field_name(r, None), number.to_string()))
            })
            .collect()
    }

    fn summarise(&self, response: &Response) -> String {
        self.question
            .rows
            .iter()
            .enumerate()
            .filter_map(|(r, row)| {
                selected_column(self.question, response, r)
                    .map(|column| format!("{} → {}", row.name, column.name))
            })
            .collect::<Vec<_>>()
            .join("; ")
    }

    fn is_same_response(&self, a: &Response, b: &Response) -> bool {
        (0..self.question.rows.len()).all(|r| {
            let field = field_name(r, None);
            a.get(&field) == b.get(&field)
        })
    }

    fn is_choice_selected(&self, response: &Response, row_index: usize, column: &Column) -> bool {
        selected_column(self.question, response, row_index).is_some_and(|c| c.id == column.id)
    }

    fn num_parts_right(&self, response: &Response) -> (usize, usize) {
        (self.num_correct_rows(response), self.question.rows.len())
    }
}

/// Checkbox grid: any subset of columns per row.
#[derive(Debug, Clone, Copy)]
pub struct MultipleChoiceGrader<'q> {
    question: &'q MatrixQuestion,
    method: GradeMethod,
}

impl<'q> MultipleChoiceGrader<'q> {
    pub fn new(question: &'q MatrixQuestion) -> Self {
        Self {
            question,
            method: question.options.grade_method,
        }
    }

    /// Rows whose selection equals the correct set, and the row count.
    pub fn num_grade_allornone(&self, response: &Response) -> (usize, usize) {
        let correct = self
            .question
            .rows
            .iter()
            .enumerate()
            .filter(|(r, row)| {
                selected_numbers(self.question, response, *r) == self.question.correct_numbers(row)
            })
            .count();
        (correct, self.question.rows.len())
    }

    /// Selected cells that are correct, and the total number of correct cells.
    ///
    /// Incorrect extra selections do not reduce the count.
    pub fn num_parts_grade_partial(&self, response: &Response) -> (usize, usize) {
        let correct = self
            .question
            .rows
            .iter()
            .enumerate()
            .map(|(r, row)| {
                let expected = self.question.correct_numbers(row);
                selected_numbers(self.question, response, r)
                    .intersection(&expected)
                    .count()
            })
            .sum();
        (correct, self.num_correct_choices())
    }

    /// Total correct cells across all rows.
    pub fn num_correct_choices(&self) -> usize {
        self.question
            .rows
            .iter()
            .map(|row| self.question.correct_numbers(row).len())
            .sum()
    }
}

impl Grader for MultipleChoiceGrader<'_> {
    fn is_complete(&self, response: &Response) -> bool {
        (0..self.question.rows.len())
            .any(|r| !selected_numbers(self.question, response, r).is_empty())
    }

    fn is_gradable(&self, response: &Response) -> bool {
        !response.is_empty()
    }

    fn grade(&self, response: &Response) -> Grade {
        let (correct, total) = self.num_parts_right(response);
        let grade = Grade::from_parts(correct, total);
        tracing::debug!(
            "question {} ({}): {correct}/{total} parts correct, fraction {:.4}",
            self.question.id,
            self.method,
            grade.fraction
        );
        grade
    }

    fn correct_response(&self) -> Response {
        let mut response = Response::new();
        for (r, row) in self.question.rows.iter().enumerate() {
            for number in self.question.correct_numbers(row) {
                response.insert(field_name(r, Some(number)), SELECTED);
            }
        }
        response
    }

    fn summarise(&self, response: &Response) -> String {
        self.question
            .rows
            .iter()
            .enumerate()
            .filter_map(|(r, row)| {
                let names: Vec<&str> = selected_numbers(self.question, response, r)
                    .into_iter()
                    .filter_map(|n| self.question.column_by_number(n))
                    .map(|c| c.name.as_str())
                    .collect();
                if names.is_empty() {
                    None
                } else {
                    Some(format!("{} → {}", row.name, names.join(", ")))
                }
            })
            .collect::<Vec<_>>()
            .join("; ")
    }

    fn is_same_response(&self, a: &Response, b: &Response) -> bool {
        let selected = |response: &Response, field: &str| {
            response.get(field).is_some_and(is_selected_value)
        };
        (0..self.question.rows.len()).all(|r| {
            self.question.columns.iter().all(|c| {
                let field = field_name(r, Some(c.number));
                selected(a, &field) == selected(b, &field)
            })
        })
    }

    fn is_choice_selected(&self, response: &Response, row_index: usize, column: &Column) -> bool {
        response
            .get(&field_name(row_index, Some(column.number)))
            .is_some_and(is_selected_value)
    }

    fn num_parts_right(&self, response: &Response) -> (usize, usize) {
        match self.method {
            GradeMethod::Partial => self.num_parts_grade_partial(response),
            GradeMethod::AllNone => self.num_grade_allornone(response),
        }
    }
}

/// Strategy chosen by the question's input type.
#[derive(Debug, Clone, Copy)]
pub enum QuestionGrader<'q> {
    Single(SingleChoiceGrader<'q>),
    Multiple(MultipleChoiceGrader<'q>),
}

impl<'q> QuestionGrader<'q> {
    pub fn new(question: &'q MatrixQuestion) -> Self {
        match question.options.input_type {
            InputType::Single => QuestionGrader::Single(SingleChoiceGrader::new(question)),
            InputType::Multiple => QuestionGrader::Multiple(MultipleChoiceGrader::new(question)),
        }
    }

    fn inner(&self) -> &dyn Grader {
        match self {
            QuestionGrader::Single(g) => g,
            QuestionGrader::Multiple(g) => g,
        }
    }

    /// Message to show when a response cannot be graded.
    pub fn validation_error(&self, response: &Response) -> Option<String> {
        if self.is_gradable(response) {
            None
        } else {
            Some("Please select at least one answer.".to_string())
        }
    }
}

impl Grader for QuestionGrader<'_> {
    fn is_complete(&self, response: &Response) -> bool {
        self.inner().is_complete(response)
    }

    fn is_gradable(&self, response: &Response) -> bool {
        self.inner().is_gradable(response)
    }

    fn grade(&self, response: &Response) -> Grade {
        self.inner().grade(response)
    }

    fn correct_response(&self) -> Response {
        self.inner().correct_response()
    }

    fn summarise(&self, response: &Response) -> String {
        self.inner().summarise(response)
    }

    fn is_same_response(&self, a: &Response, b: &Response) -> bool {
        self.inner().is_same_response(a, b)
    }

    fn is_choice_selected(&self, response: &Response, row_index: usize, column: &Column) -> bool {
        self.inner().is_choice_selected(response, row_index, column)
    }

    fn num_parts_right(&self, response: &Response) -> (usize, usize) {
        self.inner().num_parts_right(response)
    }
}

impl MatrixQuestion {
    /// The grading strategy for this question.
    pub fn grader(&self) -> QuestionGrader<'_> {
        QuestionGrader::new(self)
    }
}
