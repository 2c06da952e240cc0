//! Integration tests for the input-rejection path: `post` with no
//! usable text must emit the NO_TEXT envelope and exit 1 before any
//! browser is launched.

use std::path::PathBuf;
use std::process::{Command, Stdio};

fn xpost_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // Remove test binary name
    path.pop(); // Remove deps
    path.push("xpost");
    path
}

fn run_xpost(args: &[&str]) -> (bool, String) {
    let output = Command::new(xpost_binary())
        .args(args)
        .stdin(Stdio::null())
        .output()
        .expect("Failed to execute xpost");
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    (output.status.success(), stdout)
}

#[test]
fn post_with_no_args_and_empty_stdin_is_no_text() {
    let (ok, stdout) = run_xpost(&["post"]);
    assert!(!ok);
    let envelope: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(envelope["ok"], false);
    assert_eq!(envelope["error"], "NO_TEXT");
}

#[test]
fn post_with_whitespace_args_is_no_text() {
    let (ok, stdout) = run_xpost(&["post", "  ", ""]);
    assert!(!ok);
    let envelope: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(envelope["error"], "NO_TEXT");
}

#[test]
fn no_text_failure_emits_exactly_one_stdout_line() {
    let (_, stdout) = run_xpost(&["post"]);
    assert_eq!(stdout.trim().lines().count(), 1);
}
