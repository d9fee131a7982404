//! CLI end-to-end tests.
//!
//! These tests spawn the actual `amdeps` binary against throwaway project
//! trees and validate stdout JSON, written files, and exit codes.
//!
//! Exit code expectations:
//! - 0: Success
//! - 2: Invalid arguments or config
//! - 3: Resolution error (no index, symbol not found)
//! - 4: Apply error (malformed module header)
//! - 6: Selection cancelled

use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use serde_json::Value;
use tempfile::TempDir;

const MAIN: &str = "require.def(\"app/views/Main\",\n    [\n        \"old/Foo\"\n    ],\n    function(Foo, Bar) {\n        return new Foo(Bar);\n    }\n);\n";

/// Run amdeps in `workspace` and return (stdout json, stderr, exit_code).
fn run_amdeps(workspace: &Path, args: &[&str], stdin: &str) -> (Value, String, i32) {
    let mut child = Command::new(env!("CARGO_BIN_EXE_amdeps"))
        .arg("--workspace")
        .arg(workspace)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to execute amdeps");

    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(stdin.as_bytes())
        .expect("write stdin");
    let output = child.wait_with_output().expect("wait for amdeps");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let json: Value = serde_json::from_str(&stdout)
        .unwrap_or_else(|e| panic!("stdout should be JSON ({}): {}\n{}", e, stdout, stderr));
    (json, stderr, output.status.code().unwrap_or(-1))
}

fn write(root: &Path, relative: &str, text: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, text).unwrap();
}

/// Two projects, `Bar` defined in both.
fn fixture() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "app/script/views/Main.js", MAIN);
    write(root, "app/script/models/Foo.js", "require.def('x', [], function() {});\n");
    write(root, "app/script/models/Bar.js", "require.def('x', [], function() {});\n");
    write(root, "app/script/models/BarSpec.js", "");
    write(root, "lib/script/util/Bar.js", "require.def('x', [], function() {});\n");
    write(
        root,
        "amdeps.toml",
        "reindex_on_save = false\n\n[[project]]\nid = \"app\"\npath = \"app\"\n\n[[project]]\nid = \"lib\"\npath = \"lib\"\n",
    );
    dir
}

fn read(root: &Path, relative: &str) -> String {
    fs::read_to_string(root.join(relative)).unwrap()
}

#[test]
fn index_reports_counts() {
    let dir = fixture();
    let (json, _, code) = run_amdeps(dir.path(), &["index"], "");
    assert_eq!(code, 0);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["projects"], 2);
    assert_eq!(json["files"], 4);
    assert!(dir.path().join(".amdeps/index.json").exists());
}

#[test]
fn update_without_index_exits_3() {
    let dir = fixture();
    let (json, _, code) = run_amdeps(dir.path(), &["update", "app/script/views/Main.js"], "");
    assert_eq!(code, 3);
    assert_eq!(json["status"], "error");
    assert_eq!(json["error"]["code"], 3);
}

#[test]
fn update_prompts_for_ambiguous_name() {
    let dir = fixture();
    run_amdeps(dir.path(), &["index"], "");

    let (json, stderr, code) =
        run_amdeps(dir.path(), &["update", "app/script/views/Main.js"], "2\n");
    assert_eq!(code, 0, "stderr: {}", stderr);
    assert_eq!(json["written"], true);
    assert_eq!(json["prompts"], 1);
    assert!(stderr.contains("1) app/models/Bar"));
    assert!(stderr.contains("2) lib/util/Bar"));

    assert_eq!(
        read(dir.path(), "app/script/views/Main.js"),
        "require.def(\"app/views/Main\",\n    [\n        \"app/models/Foo\",\n        \"lib/util/Bar\"\n    ],\n    function(Foo, Bar) {\n        return new Foo(Bar);\n    }\n);\n"
    );
}

#[test]
fn cancelled_choice_exits_6_and_leaves_file() {
    let dir = fixture();
    run_amdeps(dir.path(), &["index"], "");

    let (json, _, code) = run_amdeps(
        dir.path(),
        &["--non-interactive", "update", "app/script/views/Main.js"],
        "",
    );
    assert_eq!(code, 6);
    assert_eq!(json["error"]["code"], 6);
    assert_eq!(read(dir.path(), "app/script/views/Main.js"), MAIN);
}

#[test]
fn dry_run_reports_diff_only() {
    let dir = fixture();
    let (json, _, code) = run_amdeps(
        dir.path(),
        &["--reindex", "--dry-run", "update", "app/script/views/Main.js"],
        "1\n",
    );
    assert_eq!(code, 0);
    assert_eq!(json["written"], false);
    assert!(json["diff"].as_str().unwrap().contains("+        \"app/models/Bar\""));
    assert_eq!(read(dir.path(), "app/script/views/Main.js"), MAIN);
}

#[test]
fn inject_unknown_symbol_exits_3() {
    let dir = fixture();
    write(
        dir.path(),
        "app/script/views/Other.js",
        "require.def('o', [], function() {\n    return Widget;\n});\n",
    );
    let (json, _, code) = run_amdeps(
        dir.path(),
        &["--reindex", "inject", "app/script/views/Other.js", "--at", "2:12"],
        "",
    );
    assert_eq!(code, 3);
    assert_eq!(json["error"]["details"]["name"], "Widget");
}

#[test]
fn inject_relative_wraps_require() {
    let dir = fixture();
    write(dir.path(), "app/script/views/Other.js", "var foo = Foo;\n");
    let (json, _, code) = run_amdeps(
        dir.path(),
        &["--reindex", "inject-relative", "app/script/views/Other.js", "--at", "1:11"],
        "",
    );
    assert_eq!(code, 0);
    assert_eq!(json["inserted"], "require(\"../models/Foo\")");
    assert_eq!(
        read(dir.path(), "app/script/views/Other.js"),
        "var foo = require(\"../models/Foo\");\n"
    );
}

#[test]
fn sort_malformed_module_exits_4() {
    let dir = fixture();
    write(dir.path(), "app/script/plain.js", "var x = 1;\n");
    let (json, _, code) = run_amdeps(dir.path(), &["sort", "app/script/plain.js"], "");
    assert_eq!(code, 4);
    assert_eq!(json["status"], "error");
}

#[test]
fn inject_dependencies_with_explicit_pairs() {
    let dir = fixture();
    let (json, _, code) = run_amdeps(
        dir.path(),
        &[
            "inject-dependencies",
            "app/script/views/Main.js",
            "--dep",
            "Bar=lib/util/Bar",
            "--dep",
            "Baz=app/models/Baz",
        ],
        "",
    );
    assert_eq!(code, 0);
    assert_eq!(json["changed"], true);
    let text = read(dir.path(), "app/script/views/Main.js");
    assert!(text.contains("function(Foo, Bar, Baz)"));
    assert!(text.contains("\"old/Foo\",\n        \"lib/util/Bar\",\n        \"app/models/Baz\""));
}

#[test]
fn bad_config_exits_2() {
    let dir = fixture();
    write(dir.path(), "amdeps.toml", "[[project]]\nid = \"\"\npath = \".\"\n");
    let (json, _, code) = run_amdeps(dir.path(), &["index"], "");
    assert_eq!(code, 2);
    assert_eq!(json["error"]["code"], 2);
}
