//! The `matrixq init` command.

use std::path::Path;

use anyhow::{Context, Result};

use matrixq_core::config::MatrixConfig;

pub fn execute() -> Result<()> {
    if Path::new("matrixq.toml").exists() {
        println!("matrixq.toml already exists, skipping.");
    } else {
        let config = toml::to_string_pretty(&MatrixConfig::default())
            .context("failed to serialize default config")?;
        std::fs::write("matrixq.toml", format!("# matrixq defaults\n\n{config}"))?;
        println!("Created matrixq.toml");
    }

    std::fs::create_dir_all("questions")?;
    for (path, content) in [
        ("questions/example.toml", EXAMPLE_QUESTION),
        ("questions/example-responses.json", EXAMPLE_RESPONSES),
    ] {
        if Path::new(path).exists() {
            println!("{path} already exists, skipping.");
        } else {
            std::fs::write(path, content)?;
            println!("Created {path}");
        }
    }

    println!("\nNext steps:");
    println!("  1. Run: matrixq validate --question questions/example.toml");
    println!("  2. Run: matrixq fields --question questions/example.toml");
    println!(
        "  3. Run: matrixq grade --question questions/example.toml --responses questions/example-responses.json"
    );

    Ok(())
}

const EXAMPLE_QUESTION: &str = r#"[question]
name = "Example grid"
question_text = "Match each animal to its class."
input_type = "single"
shuffle_answers = true
show_num_correct = true

[question.feedback]
correct = "All rows are right."
partially_correct = "Some rows are right."
incorrect = "None of the rows are right."

[[columns]]
name = "Mammal"

[[columns]]
name = "Bird"

[[columns]]
name = "Reptile"

[[rows]]
name = "Dolphin"
correct = ["Mammal"]
feedback = "Dolphins breathe air and nurse their young."

[[rows]]
name = "Penguin"
correct = ["Bird"]

[[rows]]
name = "Gecko"
correct = ["Reptile"]
"#;

const EXAMPLE_RESPONSES: &str = r#"[
  { "label": "all right", "answers": { "Dolphin": "Mammal", "Penguin": "Bird", "Gecko": "Reptile" } },
  { "label": "one slip", "answers": { "Dolphin": "Mammal", "Penguin": "Mammal", "Gecko": "Reptile" } },
  { "label": "raw fields", "fields": { "rowanswers0": "2", "rowanswers1": "3" } }
]
"#;
