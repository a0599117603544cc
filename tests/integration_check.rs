//! Integration tests for `scriptdeps check`.

mod common;

use common::TestProject;
use predicates::prelude::*;
use scriptdeps_cli::test_utils::ScriptFixture;

#[test]
fn test_check_clean_project_without_config() {
    let project = TestProject::new(&ScriptFixture::widget_app());

    project
        .cmd()
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ app.js: 5 file(s)"))
        .stdout(predicate::str::contains("✓ lib/util.js: 1 file(s)"));
}

#[test]
fn test_check_reports_every_issue_kind() {
    let fixture = ScriptFixture::cyclic()
        .with_file("broken.js", "using;\nusing nowhere\n")
        .with_config("[bundles]\nloop = [\"a.js\"]\nbroken = [\"broken.js\"]\nok = [\"base.js\"]\n");
    let project = TestProject::new(&fixture);

    project
        .cmd()
        .arg("check")
        .assert()
        .failure()
        .stdout(predicate::str::contains("✗ loop: 1 issue(s)"))
        .stdout(predicate::str::contains("✗ broken: 2 issue(s)"))
        .stdout(predicate::str::contains("✓ ok: 1 file(s)"))
        .stderr(predicate::str::contains("Circular dependency: a.js → b.js → c.js → a.js"))
        .stderr(predicate::str::contains("broken.js:1"))
        .stderr(predicate::str::contains("Cannot resolve 'nowhere' from broken.js"))
        .stderr(predicate::str::contains("Dependency check found 3 issue(s)"));
}

#[test]
fn test_check_single_bundle() {
    let fixture = ScriptFixture::cyclic()
        .with_config("[bundles]\nloop = [\"a.js\"]\nok = [\"base.js\"]\n");
    let project = TestProject::new(&fixture);

    project
        .cmd()
        .args(["check", "--bundle", "ok"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ok"))
        .stdout(predicate::str::contains("loop").not());
}

#[test]
fn test_check_json() {
    let fixture = ScriptFixture::cyclic().with_config("[bundles]\nloop = [\"a.js\"]\n");
    let project = TestProject::new(&fixture);

    let output = project.cmd().args(["check", "--format", "json"]).output().unwrap();
    assert!(!output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json[0]["target"], "loop");
    assert_eq!(json[0]["clean"], false);
    assert_eq!(
        json[0]["cycles"][0]["members"],
        serde_json::json!(["a.js", "b.js", "c.js"])
    );
}

#[test]
fn test_check_empty_root() {
    let project = TestProject::new(&ScriptFixture::new());

    project
        .cmd()
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("No scripts found"));
}
