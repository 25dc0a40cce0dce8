//! The `matrixq fields` command: list the response fields a question
//! accepts and the values of its correct response.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use matrixq_core::codec::{expected_fields, parse_field_name, FieldKind};
use matrixq_core::grading::Grader;

pub async fn execute(question_path: PathBuf, config_path: Option<PathBuf>) -> Result<()> {
    let config = super::config(config_path)?;
    let question = super::load_question_file(&question_path, &config).await?;
    let correct = question.grader().correct_response();

    let mut table = Table::new();
    table.set_header(vec!["Field", "Kind", "Row", "Column", "Correct value"]);

    for (field, kind) in expected_fields(&question) {
        let key = parse_field_name(&field);
        let row = key
            .and_then(|k| question.rows.get(k.row_index))
            .map(|r| r.name.as_str())
            .unwrap_or("");
        let column = key
            .and_then(|k| k.column_number)
            .and_then(|n| question.column_by_number(n))
            .map(|c| c.name.as_str())
            .unwrap_or("");
        let kind = match kind {
            FieldKind::Integer => "integer",
            FieldKind::Boolean => "boolean",
        };
        table.add_row(vec![
            Cell::new(&field),
            Cell::new(kind),
            Cell::new(row),
            Cell::new(column),
            Cell::new(correct.get(&field).unwrap_or("")),
        ]);
    }

    println!("{table}");
    Ok(())
}
