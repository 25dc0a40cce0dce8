//! CLI integration tests using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const CAPITALS: &str = "../../questions/capitals.toml";
const CAPITALS_RESPONSES: &str = "../../questions/capitals-responses.json";
const ELEMENTS: &str = "../../questions/elements.toml";
const ELEMENTS_RESPONSES: &str = "../../questions/elements-responses.json";

fn matrixq() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("matrixq").unwrap()
}

#[test]
fn validate_valid_question() {
    matrixq()
        .arg("validate")
        .arg("--question")
        .arg(CAPITALS)
        .assert()
        .success()
        .stdout(predicate::str::contains("4 rows x 4 columns, single"))
        .stdout(predicate::str::contains("All questions valid"));
}

#[test]
fn validate_directory() {
    matrixq()
        .arg("validate")
        .arg("--question")
        .arg("../../questions")
        .assert()
        .success()
        .stdout(predicate::str::contains("European capitals"))
        .stdout(predicate::str::contains("Element properties"));
}

#[test]
fn validate_reports_form_errors() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("thin.toml");
    std::fs::write(
        &path,
        r#"
[question]
name = "Too thin"

[[columns]]
name = "only"

[[rows]]
name = "x"
correct = ["only"]

[[rows]]
name = "y"
correct = ["only"]
"#,
    )
    .unwrap();

    matrixq()
        .arg("validate")
        .arg("--question")
        .arg(&path)
        .assert()
        .failure()
        .stdout(predicate::str::contains("[columnname] ERROR"))
        .stderr(predicate::str::contains("failed validation"));
}

#[test]
fn validate_nonexistent_file() {
    matrixq()
        .arg("validate")
        .arg("--question")
        .arg("nonexistent.toml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn grade_single_choice_responses() {
    matrixq()
        .arg("grade")
        .arg("--question")
        .arg(CAPITALS)
        .arg("--responses")
        .arg(CAPITALS_RESPONSES)
        .assert()
        .success()
        .stdout(predicate::str::contains("three of four"))
        .stdout(predicate::str::contains("0.750"))
        .stdout(predicate::str::contains("Spain → Paris"))
        .stdout(predicate::str::contains("1 right, 1 partial, 2 wrong"));
}

#[test]
fn grade_multiple_choice_as_json() {
    let output = matrixq()
        .arg("grade")
        .arg("--question")
        .arg(ELEMENTS)
        .arg("--responses")
        .arg(ELEMENTS_RESPONSES)
        .arg("--format")
        .arg("json")
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let fractions: Vec<f64> = report["attempts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["fraction"].as_f64().unwrap())
        .collect();
    assert_eq!(fractions.len(), 3);
    assert!((fractions[0] - 1.0).abs() < 1e-9);
    assert!((fractions[1] - 5.0 / 7.0).abs() < 1e-9);
    assert!((fractions[2] - 2.0 / 7.0).abs() < 1e-9);
    assert_eq!(report["attempts"][1]["outcome"], "partial");
}

#[test]
fn grade_shows_feedback() {
    matrixq()
        .arg("grade")
        .arg("--question")
        .arg(CAPITALS)
        .arg("--responses")
        .arg(CAPITALS_RESPONSES)
        .arg("--feedback")
        .assert()
        .success()
        .stdout(predicate::str::contains("You have 3 of 4 parts correct."))
        .stdout(predicate::str::contains("Please select at least one answer."));
}

#[test]
fn grade_rejects_unknown_names() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.json");
    std::fs::write(&path, r#"[{ "answers": { "Atlantis": "Paris" } }]"#).unwrap();

    matrixq()
        .arg("grade")
        .arg("--question")
        .arg(CAPITALS)
        .arg("--responses")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Atlantis"));
}

#[test]
fn stats_prints_random_guess_score() {
    matrixq()
        .arg("stats")
        .arg("--question")
        .arg(ELEMENTS)
        .assert()
        .success()
        .stdout(predicate::str::contains("Random guess score: 0.333"));
}

#[test]
fn stats_with_responses() {
    matrixq()
        .arg("stats")
        .arg("--question")
        .arg(CAPITALS)
        .arg("--responses")
        .arg(CAPITALS_RESPONSES)
        .assert()
        .success()
        .stdout(predicate::str::contains("Attempts: 4"))
        .stdout(predicate::str::contains("Random guess score: 0.250"))
        .stdout(predicate::str::contains("Germany"));
}

#[test]
fn trailing_blank_slots_are_dropped_on_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("padded.toml");
    std::fs::write(
        &path,
        r#"
[question]
name = "Padded"
input_type = "single"

[[columns]]
name = "a"

[[columns]]
name = "b"

[[columns]]
name = ""

[[rows]]
name = "x"
correct = ["a"]

[[rows]]
name = "y"
correct = ["b"]

[[rows]]
name = ""
"#,
    )
    .unwrap();

    matrixq()
        .arg("stats")
        .arg("--question")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Random guess score: 0.500"));

    matrixq()
        .arg("fields")
        .arg("--question")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("rowanswers1"))
        .stdout(predicate::str::contains("rowanswers2").not());
}

#[test]
fn fields_lists_response_fields() {
    matrixq()
        .arg("fields")
        .arg("--question")
        .arg(ELEMENTS)
        .assert()
        .success()
        .stdout(predicate::str::contains("rowanswers0_1"))
        .stdout(predicate::str::contains("rowanswers2_7"))
        .stdout(predicate::str::contains("boolean"));
}

#[test]
fn grade_then_compare_reports() {
    let dir = TempDir::new().unwrap();
    let partial_dir = dir.path().join("partial");
    let allnone_dir = dir.path().join("allnone");

    let allnone_question = dir.path().join("elements-allnone.toml");
    let content = std::fs::read_to_string(ELEMENTS)
        .unwrap()
        .replace(r#"grade_method = "partial""#, r#"grade_method = "allnone""#);
    std::fs::write(&allnone_question, content).unwrap();

    for (question, out) in [
        (std::path::Path::new(ELEMENTS), &partial_dir),
        (allnone_question.as_path(), &allnone_dir),
    ] {
        matrixq()
            .arg("grade")
            .arg("--question")
            .arg(question)
            .arg("--responses")
            .arg(ELEMENTS_RESPONSES)
            .arg("--output")
            .arg(out)
            .assert()
            .success()
            .stderr(predicate::str::contains("Report saved to"));
    }

    let report_in = |d: &std::path::Path| {
        std::fs::read_dir(d)
            .unwrap()
            .next()
            .unwrap()
            .unwrap()
            .path()
    };

    matrixq()
        .arg("compare")
        .arg("--baseline")
        .arg(report_in(&partial_dir))
        .arg("--current")
        .arg(report_in(&allnone_dir))
        .assert()
        .success()
        .stdout(predicate::str::contains("2 lowered, 0 raised, 1 unchanged"))
        .stdout(predicate::str::contains("first two rows"));

    matrixq()
        .arg("compare")
        .arg("--baseline")
        .arg(report_in(&partial_dir))
        .arg("--current")
        .arg(report_in(&allnone_dir))
        .arg("--fail-on-change")
        .assert()
        .failure();
}

#[test]
fn compare_nonexistent_report() {
    matrixq()
        .arg("compare")
        .arg("--baseline")
        .arg("no_such_file.json")
        .arg("--current")
        .arg("also_no_file.json")
        .assert()
        .failure();
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    matrixq()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created matrixq.toml"))
        .stdout(predicate::str::contains("Created questions/example.toml"));

    assert!(dir.path().join("matrixq.toml").exists());
    assert!(dir.path().join("questions/example-responses.json").exists());

    matrixq()
        .current_dir(dir.path())
        .arg("grade")
        .arg("--question")
        .arg("questions/example.toml")
        .arg("--responses")
        .arg("questions/example-responses.json")
        .assert()
        .success()
        .stdout(predicate::str::contains("one slip"));
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();

    matrixq()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success();

    matrixq()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn help_output() {
    matrixq()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Matrix question grading engine"));
}

#[test]
fn version_output() {
    matrixq()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("matrixq"));
}
