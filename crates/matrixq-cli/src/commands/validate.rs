//! The `matrixq validate` command.

use std::path::PathBuf;

use anyhow::Result;

use matrixq_core::parser;
use matrixq_core::validation::QuestionForm;

pub fn execute(question_path: PathBuf, config_path: Option<PathBuf>) -> Result<()> {
    let config = super::config(config_path)?;
    let drafts = if question_path.is_dir() {
        parser::load_question_directory(&question_path, &config)?
    } else {
        vec![parser::parse_question(&question_path, &config)?]
    };

    let mut invalid = 0;

    for draft in &drafts {
        println!(
            "Question: {} ({} rows x {} columns, {})",
            draft.name,
            draft.rows.len(),
            draft.columns.len(),
            draft.options.input_type
        );

        let errors = QuestionForm::from(draft).validate();
        for (field, message) in errors.iter() {
            println!("  [{field}] ERROR: {message}");
        }
        if !errors.is_empty() {
            invalid += 1;
        }
    }

    if invalid == 0 {
        println!("All questions valid.");
        Ok(())
    } else {
        anyhow::bail!("{invalid} question(s) failed validation")
    }
}
