//! End-to-end CLI tests: run the `insights` binary against a temp project
//! directory with a small `beads.jsonl` fixture.

use std::io::Write;

use assert_cmd::Command;
use predicates::str::contains;
use tempfile::TempDir;

const FIXTURE: &str = r#"{"id":"a","title":"root task","status":"open","priority":1,"issue_type":"task","dependencies":[]}
{"id":"b","title":"blocked by a","status":"open","priority":2,"issue_type":"task","dependencies":[{"depends_on_id":"a","type":"blocks"}]}
{"id":"c","title":"blocked by b","status":"open","priority":2,"issue_type":"task","dependencies":[{"depends_on_id":"b","type":"blocks"}]}
{"id":"d","title":"closed leaf","status":"closed","priority":3,"issue_type":"task","dependencies":[]}
"#;

fn project_with_fixture() -> TempDir {
    let dir = TempDir::new().expect("tempdir");
    let mut file = std::fs::File::create(dir.path().join("beads.jsonl")).expect("create fixture");
    file.write_all(FIXTURE.as_bytes()).expect("write fixture");
    dir
}

fn cmd() -> Command {
    Command::cargo_bin("insights").expect("binary builds")
}

#[test]
fn analyze_emits_json_envelope() {
    let dir = project_with_fixture();
    cmd()
        .current_dir(dir.path())
        .args(["--format", "json", "analyze"])
        .assert()
        .success()
        .stdout(contains("\"node_count\": 4"))
        .stdout(contains("\"data_hash\""))
        .stdout(contains("\"generated_at\""));
}

#[test]
fn triage_excludes_blocked_and_closed_issues() {
    let dir = project_with_fixture();
    cmd()
        .current_dir(dir.path())
        .args(["--format", "json", "triage"])
        .assert()
        .success()
        .stdout(contains("\"a\""))
        .stdout(contains("\"triage\""));
}

#[test]
fn analyze_missing_input_exits_with_input_error_code() {
    let dir = TempDir::new().expect("tempdir");
    cmd().current_dir(dir.path()).arg("analyze").assert().failure().code(4);
}

#[test]
fn baseline_save_then_show_round_trips() {
    let dir = project_with_fixture();
    cmd()
        .current_dir(dir.path())
        .args(["baseline", "save", "--description", "first snapshot"])
        .assert()
        .success();

    cmd()
        .current_dir(dir.path())
        .args(["--format", "json", "baseline", "show"])
        .assert()
        .success()
        .stdout(contains("first snapshot"));
}

#[test]
fn drift_without_baseline_fails_with_usage_error_code() {
    let dir = project_with_fixture();
    cmd().current_dir(dir.path()).arg("drift").assert().failure().code(3);
}

#[test]
fn drift_after_baseline_save_exits_zero_with_no_changes() {
    let dir = project_with_fixture();
    cmd().current_dir(dir.path()).args(["baseline", "save"]).assert().success();

    cmd()
        .current_dir(dir.path())
        .args(["--format", "json", "drift"])
        .assert()
        .success()
        .stdout(contains("\"alerts\""));
}

#[test]
fn diff_reports_new_and_closed_ids() {
    let dir = project_with_fixture();
    let from_path = dir.path().join("from.jsonl");
    let to_path = dir.path().join("to.jsonl");
    std::fs::write(&from_path, "{\"id\":\"a\",\"status\":\"open\"}\n").unwrap();
    std::fs::write(
        &to_path,
        "{\"id\":\"a\",\"status\":\"closed\"}\n{\"id\":\"b\",\"status\":\"open\"}\n",
    )
    .unwrap();

    cmd()
        .current_dir(dir.path())
        .args(["--format", "json", "diff"])
        .arg(&from_path)
        .arg(&to_path)
        .assert()
        .success()
        .stdout(contains("\"new_ids\""))
        .stdout(contains("\"b\""))
        .stdout(contains("\"closed_ids\""));
}

#[test]
fn plan_focus_restricts_output_to_one_track() {
    let dir = project_with_fixture();
    cmd()
        .current_dir(dir.path())
        .args(["--format", "json", "plan", "--focus", "a"])
        .assert()
        .success()
        .stdout(contains("\"focus\": \"a\""));
}

#[test]
fn recommend_emits_recommendations_payload() {
    let dir = project_with_fixture();
    cmd()
        .current_dir(dir.path())
        .args(["--format", "json", "recommend"])
        .assert()
        .success()
        .stdout(contains("\"recommendations\""));
}
