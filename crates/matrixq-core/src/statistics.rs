//! Random-guess baseline and attempt statistics.
//!
//! The random-guess score is the fraction a learner would expect by ticking
//! cells uniformly at random; hosts compare it against observed facility.

use serde::{Deserialize, Serialize};

use crate::codec::{selected_numbers, Response};
use crate::grading::Grader;
use crate::model::{MatrixQuestion, Outcome};

/// Expected fraction from uniform random guessing.
///
/// `correct slots / (rows × columns)`. Returns `None` when the question has
/// no rows or no columns.
pub fn random_guess_score(question: &MatrixQuestion) -> Option<f64> {
    let rows = question.rows.len();
    let columns = question.columns.len();
    if rows == 0 || columns == 0 {
        return None;
    }
    let slots: usize = question
        .rows
        .iter()
        .map(|row| question.correct_numbers(row).len())
        .sum();
    Some(slots as f64 / (rows * columns) as f64)
}

/// Statistics over a batch of graded attempts at one question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptStats {
    /// Number of responses graded.
    pub attempts: usize,
    pub right: usize,
    pub partial: usize,
    pub wrong: usize,
    /// Mean fraction (facility); 0 when there are no attempts.
    pub mean_fraction: f64,
    /// Baseline for comparison with `mean_fraction`.
    pub random_guess_score: Option<f64>,
    /// Per-row rate of fully correct answers, in row order.
    pub per_row: Vec<RowStats>,
}

/// How often one row was answered exactly right.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowStats {
    pub row: String,
    pub correct_rate: f64,
}

/// Grade every response and aggregate.
pub fn compute_attempt_stats(question: &MatrixQuestion, responses: &[Response]) -> AttemptStats {
    let grader = question.grader();
    let n = responses.len();

    let mut right = 0usize;
    let mut partial = 0usize;
    let mut wrong = 0usize;
    let mut total_fraction = 0.0f64;

    for response in responses {
        let grade = grader.grade(response);
        total_fraction += grade.fraction;
        match grade.outcome {
            Outcome::Right => right += 1,
            Outcome::Partial => partial += 1,
            Outcome::Wrong => wrong += 1,
        }
    }

    let per_row = question
        .rows
        .iter()
        .enumerate()
        .map(|(r, row)| {
            let expected = question.correct_numbers(row);
            let correct = responses
                .iter()
                .filter(|response| {
                    if question.is_multiple() {
                        selected_numbers(question, response, r) == expected
                    } else {
                        question
                            .columns
                            .iter()
                            .filter(|c| expected.contains(&c.number))
                            .any(|c| grader.is_choice_selected(response, r, c))
                    }
                })
                .count();
            RowStats {
                row: row.name.clone(),
                correct_rate: correct as f64 / n.max(1) as f64,
            }
        })
        .collect();

    AttemptStats {
        attempts: n,
        right,
        partial,
        wrong,
        mean_fraction: total_fraction / n.max(1) as f64,
        random_guess_score: random_guess_score(question),
        per_row,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::model::GradeMethod;

    #[test]
    fn random_guess_single_four_by_four() {
        let q = fixtures::single_question(4, 4);
        let score = random_guess_score(&q).unwrap();
        assert!((score - 0.25).abs() < f64::EPSILON, "got {score}");
    }

    #[test]
    fn random_guess_multiple() {
        let q = fixtures::multiple_question(GradeMethod::Partial);
        let score = random_guess_score(&q).unwrap();
        assert!((score - 7.0 / 21.0).abs() < 1e-12, "got {score}");
    }

    #[test]
    fn random_guess_undefined_without_columns() {
        let mut q = fixtures::single_question(4, 4);
        q.columns.clear();
        assert_eq!(random_guess_score(&q), None);

        let mut q = fixtures::single_question(4, 4);
        q.rows.clear();
        assert_eq!(random_guess_score(&q), None);
    }

    #[test]
    fn attempt_stats_counts_outcomes() {
        let q = fixtures::single_question(2, 2);
        let responses: Vec<Response> = vec![
            [("rowanswers0", "1"), ("rowanswers1", "2")].into_iter().collect(),
            [("rowanswers0", "1"), ("rowanswers1", "1")].into_iter().collect(),
            Response::new(),
        ];
        let stats = compute_attempt_stats(&q, &responses);
        assert_eq!(stats.attempts, 3);
        assert_eq!((stats.right, stats.partial, stats.wrong), (1, 1, 1));
        assert!((stats.mean_fraction - 0.5).abs() < 1e-12);
        assert!((stats.per_row[0].correct_rate - 2.0 / 3.0).abs() < 1e-12);
        assert!((stats.per_row[1].correct_rate - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(stats.random_guess_score, Some(0.5));
    }

    #[test]
    fn attempt_stats_multiple_rows_need_exact_match() {
        let q = fixtures::multiple_question(GradeMethod::Partial);
        let responses: Vec<Response> = vec![[
            ("rowanswers0_1", "1"),
            ("rowanswers0_2", "1"),
            ("rowanswers1_4", "1"),
            ("rowanswers1_5", "1"),
        ]
        .into_iter()
        .collect()];
        let stats = compute_attempt_stats(&q, &responses);
        let rates: Vec<f64> = stats.per_row.iter().map(|r| r.correct_rate).collect();
        assert_eq!(rates, vec![0.0, 1.0, 0.0]);
    }

    #[test]
    fn attempt_stats_empty_batch() {
        let q = fixtures::single_question(2, 2);
        let stats = compute_attempt_stats(&q, &[]);
        assert_eq!(stats.attempts, 0);
        assert_eq!(stats.mean_fraction, 0.0);
        assert!(stats.per_row.iter().all(|r| r.correct_rate == 0.0));
    }
}
