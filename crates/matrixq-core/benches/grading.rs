use std::collections::BTreeSet;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use matrixq_core::codec::{field_name, Response};
use matrixq_core::grading::Grader;
use matrixq_core::model::{
    Column, ColumnId, FeedbackFormat, GradeMethod, InputType, MatrixOptions, MatrixQuestion,
    QuestionId, Row, RowId,
};
use matrixq_core::statistics::{compute_attempt_stats, random_guess_score};

/// Square grid where row `n` is correct in column `n` (and `n + 1` for
/// multiple choice).
fn grid(size: u32, input_type: InputType, grade_method: GradeMethod) -> MatrixQuestion {
    let question = QuestionId(1);
    let columns = (1..=size)
        .map(|n| Column {
            id: ColumnId(1000 + i64::from(n)),
            question_id: question,
            number: n,
            name: format!("col {n}"),
        })
        .collect();
    let rows = (1..=size)
        .map(|n| {
            let mut correct = BTreeSet::from([ColumnId(1000 + i64::from(n))]);
            if input_type == InputType::Multiple && n < size {
                correct.insert(ColumnId(1001 + i64::from(n)));
            }
            Row {
                id: RowId(i64::from(n)),
                question_id: question,
                number: n,
                name: format!("row {n}"),
                correct_answers: correct,
                feedback: String::new(),
                feedback_format: FeedbackFormat::Html,
            }
        })
        .collect();
    let options = MatrixOptions {
        input_type,
        grade_method,
        ..Default::default()
    };
    MatrixQuestion::new(question, "bench grid", options, rows, columns)
}

/// Every other row answered correctly.
fn half_right(question: &MatrixQuestion) -> Response {
    let mut response = Response::new();
    for r in (0..question.rows.len()).step_by(2) {
        let number = r as u32 + 1;
        if question.is_multiple() {
            response.insert(field_name(r, Some(number)), "1");
        } else {
            response.insert(field_name(r, None), number.to_string());
        }
    }
    response
}

fn bench_grade(c: &mut Criterion) {
    let mut group = c.benchmark_group("grade");

    for (label, input_type, method) in [
        ("single", InputType::Single, GradeMethod::Partial),
        ("multiple_partial", InputType::Multiple, GradeMethod::Partial),
        ("multiple_allnone", InputType::Multiple, GradeMethod::AllNone),
    ] {
        let question = grid(20, input_type, method);
        let response = half_right(&question);
        group.bench_function(format!("{label} 20x20"), |b| {
            let grader = question.grader();
            b.iter(|| grader.grade(black_box(&response)))
        });
    }

    group.finish();
}

fn bench_compare(c: &mut Criterion) {
    let question = grid(20, InputType::Multiple, GradeMethod::Partial);
    let a = half_right(&question);
    let b_response = question.grader().correct_response();

    c.bench_function("is_same_response 20x20", |b| {
        let grader = question.grader();
        b.iter(|| grader.is_same_response(black_box(&a), black_box(&b_response)))
    });
}

fn bench_stats(c: &mut Criterion) {
    let question = grid(10, InputType::Single, GradeMethod::Partial);
    let responses: Vec<Response> = (0..100)
        .map(|i| {
            if i % 3 == 0 {
                question.grader().correct_response()
            } else {
                half_right(&question)
            }
        })
        .collect();

    c.bench_function("random_guess_score 10x10", |b| {
        b.iter(|| random_guess_score(black_box(&question)))
    });

    c.bench_function("attempt_stats 100 responses", |b| {
        b.iter(|| compute_attempt_stats(black_box(&question), black_box(&responses)))
    });
}

criterion_group!(benches, bench_grade, bench_compare, bench_stats);
criterion_main!(benches);
