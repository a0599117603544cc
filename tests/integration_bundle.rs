//! Integration tests for `scriptdeps bundle`.

mod common;

use common::TestProject;
use predicates::prelude::*;
use scriptdeps_cli::test_utils::ScriptFixture;
use std::fs;

fn nocombine_fixture() -> ScriptFixture {
    ScriptFixture::new()
        .with_file("app.js", "// using editor nocombine\n// using util\napp();\n")
        .with_file("editor.js", "editor();\n")
        .with_file("util.js", "util();")
        .with_file("legacy.js", "/* using-options nocombine */\nlegacy();\n")
}

#[test]
fn test_bundle_to_stdout_in_load_order() {
    let project = TestProject::new(&ScriptFixture::widget_app());

    let output = project.cmd().args(["bundle", "app.js"]).output().unwrap();
    assert!(output.status.success(), "{output:?}");

    let bundle = String::from_utf8_lossy(&output.stdout);
    let markers: Vec<_> =
        bundle.lines().filter(|l| l.starts_with("/* ") && l.ends_with(".js */")).collect();
    assert_eq!(
        markers,
        [
            "/* lib/jquery-1.10.2.js */",
            "/* lib/util.js */",
            "/* widgets/core.js */",
            "/* widgets/grid.js */",
            "/* app.js */"
        ]
    );
    assert!(bundle.contains("start();"));
    assert!(String::from_utf8_lossy(&output.stderr).contains("fingerprint sha256:"));
}

#[test]
fn test_bundle_skips_nocombine_files() {
    let project = TestProject::new(&nocombine_fixture());
    let target = project.file("dist/app.bundle.js");

    project
        .cmd()
        .args(["bundle", "app.js", "legacy.js", "-o"])
        .arg(&target)
        .assert()
        .success()
        .stderr(predicate::str::contains("editor.js (nocombine, serve separately)"))
        .stderr(predicate::str::contains("legacy.js (nocombine, serve separately)"))
        .stderr(predicate::str::contains("Bundled 2 of 4 file(s)"));

    let bundle = fs::read_to_string(&target).unwrap();
    assert_eq!(
        bundle,
        "/* util.js */\nutil();\n/* app.js */\n// using editor nocombine\n// using util\napp();\n"
    );
}

#[test]
fn test_bundle_fingerprint_tracks_content() {
    let project = TestProject::new(&nocombine_fixture());
    let fingerprint = |project: &TestProject| {
        let output = project.cmd().args(["bundle", "app.js"]).output().unwrap();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        stderr
            .split_whitespace()
            .find(|word| word.starts_with("sha256:"))
            .map(str::to_string)
            .unwrap()
    };

    let first = fingerprint(&project);
    assert_eq!(first, fingerprint(&project));

    project.write("util.js", "util(2);");
    assert_ne!(first, fingerprint(&project));
}

#[test]
fn test_bundle_from_config() {
    let fixture =
        ScriptFixture::widget_app().with_config("[bundles]\nwidgets = [\"widgets/grid.js\"]\n");
    let project = TestProject::new(&fixture);

    project
        .cmd()
        .args(["bundle", "--bundle", "widgets"])
        .assert()
        .success()
        .stdout(predicate::str::contains("/* widgets/grid.js */"))
        .stdout(predicate::str::contains("/* app.js */").not());
}

#[test]
fn test_bundle_strict_failure_writes_nothing() {
    let project = TestProject::new(&ScriptFixture::new().with_file("app.js", "using gone\n"));
    let target = project.file("out.js");

    project
        .cmd()
        .args(["bundle", "app.js", "--strict", "-o"])
        .arg(&target)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot resolve dependency 'gone'"));
    assert!(!target.exists());
}
