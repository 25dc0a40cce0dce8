//! Feedback selection after grading.
//!
//! Picks text; never renders or escapes it.

use crate::codec::Response;
use crate::grading::Grader;
use crate::model::{MatrixQuestion, Outcome};

/// Hint line telling the learner how many parts they got right.
pub fn num_correct_hint(correct: usize, total: usize) -> String {
    format!("You have {correct} of {total} parts correct.")
}

/// The overall-outcome feedback for a response.
///
/// With `show_num_correct`, a partially correct response also gets the
/// [`num_correct_hint`] line.
pub fn combined_feedback(question: &MatrixQuestion, response: &Response) -> String {
    let grader = question.grader();
    let outcome = grader.grade(response).outcome;
    let text = question.feedback_for(outcome);

    if !(question.options.show_num_correct && outcome == Outcome::Partial) {
        return text.to_string();
    }

    let (correct, total) = grader.num_parts_right(response);
    let hint = num_correct_hint(correct, total);
    if text.trim().is_empty() {
        hint
    } else {
        format!("{text}\n{hint}")
    }
}

/// A row's own feedback, shown once the learner has selected something in
/// that row.
pub fn row_feedback<'q>(
    question: &'q MatrixQuestion,
    response: &Response,
    row_index: usize,
) -> Option<&'q str> {
    let row = question.rows.get(row_index)?;
    if row.feedback.trim().is_empty() {
        return None;
    }
    let grader = question.grader();
    let answered = question
        .columns
        .iter()
        .any(|c| grader.is_choice_selected(response, row_index, c));
    answered.then_some(row.feedback.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::model::GradeMethod;

    #[test]
    fn right_response_gets_correct_text_only() {
        let q = fixtures::single_question(2, 2);
        let r = q.grader().correct_response();
        assert_eq!(combined_feedback(&q, &r), "Well done.");
    }

    #[test]
    fn partial_response_gets_hint() {
        let q = fixtures::multiple_question(GradeMethod::AllNone);
        let r: Response = [
            ("rowanswers0_1", "1"),
            ("rowanswers0_2", "1"),
            ("rowanswers0_3", "1"),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            combined_feedback(&q, &r),
            "Parts are right.\nYou have 1 of 3 parts correct."
        );
    }

    #[test]
    fn hint_suppressed_without_show_num_correct() {
        let mut q = fixtures::single_question(2, 2);
        q.options.show_num_correct = false;
        let r: Response = [("rowanswers0", "1")].into_iter().collect();
        assert_eq!(combined_feedback(&q, &r), "Parts are right.");
    }

    #[test]
    fn wrong_response_gets_incorrect_text() {
        let q = fixtures::single_question(2, 2);
        assert_eq!(combined_feedback(&q, &Response::new()), "Not quite.");
    }

    #[test]
    fn row_feedback_only_for_answered_rows() {
        let q = fixtures::single_question(3, 3);
        let r: Response = [("rowanswers1", "1")].into_iter().collect();
        assert_eq!(row_feedback(&q, &r, 1), Some("feedback for row 2"));
        assert_eq!(row_feedback(&q, &r, 0), None);
        assert_eq!(row_feedback(&q, &r, 9), None);
    }
}
