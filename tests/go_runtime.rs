// Runs the call-expectation runtime under `go test` against a generated mock.
#[path = "common/mod.rs"]
mod common;

use std::fs;
use std::process::Command;

use common::GoProject;
use fake_gen::generate_interface_file;

const BEHAVIOR_TEST: &str = include_str!("fixtures/runtime_behavior_test.go");

const COUNTER: &str = r#"package svc

type Counter interface {
	Next() int
	Name(id int) string
}
"#;

fn go_available() -> bool {
    Command::new("go")
        .arg("version")
        .output()
        .is_ok_and(|output| output.status.success())
}

#[test]
fn test_runtime_call_queue_semantics() {
    if !go_available() {
        eprintln!("skipping runtime behavior test: go is not on PATH");
        return;
    }

    let project = GoProject::with_go_mod("module example.com/app\n\ngo 1.20\n");
    let file = project.write("svc/svc.go", COUNTER);
    let target =
        generate_interface_file(&file, "Counter", &project.output(), "mocks", false).unwrap();
    let dir = target.parent().unwrap();
    fs::write(dir.join("runtime_behavior_test.go"), BEHAVIOR_TEST).unwrap();

    let mut go = Command::new("go");
    go.args(["test", "-count=1", "./mocks/svc/"])
        .current_dir(&project.root)
        .env("GOTOOLCHAIN", "local")
        .env("GOFLAGS", "-mod=mod");
    if std::env::var_os("GOCACHE").is_none() && std::env::var_os("HOME").is_none() {
        go.env("GOCACHE", project.root.join(".gocache"));
    }
    let output = go.output().unwrap();
    assert!(
        output.status.success(),
        "go test failed:\n{}\n{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
}
