//! Integration tests for `scriptdeps header`.

mod common;

use common::{TestProject, stdout_lines};
use predicates::prelude::*;
use scriptdeps_cli::test_utils::ScriptFixture;

#[test]
fn test_header_lists_declarations() {
    let project = TestProject::new(&ScriptFixture::widget_app());

    let output = project.cmd().args(["header", "widgets/grid.js"]).output().unwrap();
    assert!(output.status.success(), "{output:?}");
    assert_eq!(
        stdout_lines(&output),
        ["using ../lib/util;", "using core;", "using-options debug;"]
    );
}

#[test]
fn test_header_ignores_declarations_after_code() {
    let fixture = ScriptFixture::new().with_file("late.js", "/* using a */\ncode();\nusing b;\n");
    let project = TestProject::new(&fixture);

    project
        .cmd()
        .args(["header", "late.js"])
        .assert()
        .success()
        .stdout(predicate::str::diff("using a;\n"));
}

#[test]
fn test_header_json() {
    let fixture = ScriptFixture::new().with_file(
        "page.js",
        "// using jquery-{version} nocombine\n// using;\n// using-options debug\nrun();\n",
    );
    let project = TestProject::new(&fixture);

    let output = project.cmd().args(["header", "page.js", "--format", "json"]).output().unwrap();
    assert!(output.status.success(), "{output:?}");

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["dependencies"][0]["name"], "jquery-{version}");
    assert_eq!(json["dependencies"][0]["options"], serde_json::json!(["nocombine"]));
    assert_eq!(json["options"], serde_json::json!(["debug"]));
    assert_eq!(json["malformed"][0]["line"], 2);
}

#[test]
fn test_header_without_declarations() {
    let project = TestProject::new(&ScriptFixture::widget_app());

    project
        .cmd()
        .args(["header", "lib/util.js"])
        .assert()
        .success()
        .stdout(predicate::str::contains("declares no dependencies"));
}

#[test]
fn test_header_missing_file() {
    let project = TestProject::new(&ScriptFixture::new());

    project
        .cmd()
        .args(["header", "nope.js"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read nope.js"));
}
