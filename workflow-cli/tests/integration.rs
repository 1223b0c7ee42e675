use std::process::Command;

fn workflow() -> Command {
    Command::new(env!("CARGO_BIN_EXE_workflow"))
}

#[test]
fn trivial_workflow_reaches_end_successfully() {
    let output = workflow()
        .args(["tests/fixtures/trivial.yaml"])
        .output()
        .expect("failed to execute");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.starts_with("ok:"));
}

#[test]
fn unknown_actor_fails_with_nonzero_exit() {
    let output = workflow()
        .args(["tests/fixtures/missing-actor.yaml"])
        .output()
        .expect("failed to execute");

    assert!(!output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.starts_with("fail:"));
    assert!(stdout.contains("ghost"));
}

#[test]
fn missing_file_reports_error_on_stderr() {
    let output = workflow()
        .args(["tests/fixtures/does-not-exist.yaml"])
        .output()
        .expect("failed to execute");

    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("error"));
}

#[test]
fn sub_workflow_call_through_interpreter_actor_succeeds() {
    let output = workflow()
        .args(["tests/fixtures/parent.yaml", "--base-dir", "tests/fixtures"])
        .output()
        .expect("failed to execute");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.starts_with("ok:"));
}
