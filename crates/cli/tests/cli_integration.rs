use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

fn make_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock is before UNIX_EPOCH")
        .as_nanos();
    let pid = std::process::id();
    let dir = std::env::temp_dir().join(format!("argdecl-integ-{prefix}-{pid}-{nanos}"));
    fs::create_dir_all(&dir).expect("failed to create temp dir");
    dir
}

fn argdecl() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_argdecl"));
    cmd.env("RUST_LOG", "warn");
    cmd
}

fn run(cmd: &mut Command, what: &str) -> Output {
    cmd.output()
        .unwrap_or_else(|e| panic!("failed to run argdecl {what}: {e}"))
}

fn assert_success(out: &Output, what: &str) {
    assert!(
        out.status.success(),
        "argdecl {what} failed:\nstatus: {}\nstderr:\n{}",
        out.status,
        String::from_utf8_lossy(&out.stderr),
    );
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

fn export_demo(dir: &Path) -> PathBuf {
    let path = dir.join("schemas/pkg.json");
    let out = run(
        argdecl().arg("export-demo").arg("--output").arg(&path),
        "export-demo",
    );
    assert_success(&out, "export-demo");
    path
}

const MIXED_SCHEMA: &str = r#"{
  "format-version": 1,
  "command": {
    "name": "mixed",
    "type-name": "Mixed",
    "args": [
      { "prop": "input", "name": "input", "kind": "required" }
    ],
    "commands": [
      { "prop": "command", "command": { "name": "run" } }
    ]
  }
}"#;

const COPY_SCHEMA: &str = r#"{
  "format-version": 1,
  "command": {
    "name": "copy",
    "about": "Copy files",
    "options": [
      { "prop": "recursive", "long": "--recursive", "short": "-r" },
      { "prop": "mode", "long": "--mode", "type": "integer" }
    ],
    "args": [
      { "prop": "src", "name": "src", "kind": "required" },
      { "prop": "dest", "name": "dest", "kind": "required" }
    ]
  }
}"#;

#[test]
fn help_works() {
    let out = run(argdecl().arg("--help"), "--help");
    assert_success(&out, "--help");
    let text = stdout(&out);
    assert!(
        text.contains("check") && text.contains("parse") && text.contains("export-demo"),
        "unexpected help output:\n{text}"
    );
}

#[test]
fn export_demo_writes_schema_file() {
    let dir = make_temp_dir("export");
    let path = export_demo(&dir);

    let contents = fs::read_to_string(&path).expect("schema written");
    let json: serde_json::Value = serde_json::from_str(&contents).expect("valid JSON");
    assert_eq!(json["format-version"], 1);
    assert_eq!(json["command"]["name"], "pkg");
    let commands: Vec<&str> = json["command"]["commands"]
        .as_array()
        .expect("commands array")
        .iter()
        .map(|c| c["command"]["name"].as_str().unwrap_or_default())
        .collect();
    assert_eq!(commands, ["install", "remove", "search"]);
    assert!(!path.with_extension("tmp").exists());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn export_demo_prints_to_stdout() {
    let out = run(argdecl().arg("export-demo"), "export-demo");
    assert_success(&out, "export-demo");
    let json: serde_json::Value = serde_json::from_str(&stdout(&out)).expect("valid JSON");
    assert_eq!(json["command"]["type-name"], "Pkg");
}

#[test]
fn check_accepts_exported_schema() {
    let dir = make_temp_dir("check-ok");
    let path = export_demo(&dir);

    let out = run(argdecl().arg("check").arg(&path), "check");
    assert_success(&out, "check");
    assert_eq!(stdout(&out).trim(), "ok: pkg");

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn check_rejects_invalid_schema() {
    let dir = make_temp_dir("check-bad");
    let path = dir.join("mixed.json");
    fs::write(&path, MIXED_SCHEMA).expect("write schema");

    let out = run(argdecl().arg("check").arg(&path), "check");
    assert!(!out.status.success(), "check unexpectedly passed");
    let err = stderr(&out);
    assert!(
        err.contains("both of positional arguments and subcommands are defined in Mixed"),
        "unexpected stderr:\n{err}"
    );

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn check_reports_missing_schema() {
    let dir = make_temp_dir("check-missing");
    let out = run(
        argdecl().arg("check").arg(dir.join("absent.json")),
        "check",
    );
    assert!(!out.status.success());
    assert!(stderr(&out).contains("schema not found"));
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn help_walks_subcommand_path() {
    let dir = make_temp_dir("help-path");
    let path = export_demo(&dir);

    let out = run(
        argdecl().arg("help").arg(&path).arg("install"),
        "help install",
    );
    assert_success(&out, "help install");
    let text = stdout(&out);
    assert!(
        text.starts_with("install - Install packages\n\nUSAGE\n    pkg install [OPTIONS] [package]...\n"),
        "unexpected help:\n{text}"
    );

    let out = run(
        argdecl().arg("help").arg(&path).arg("upgrade"),
        "help upgrade",
    );
    assert!(!out.status.success());
    assert!(stderr(&out).contains("command \"upgrade\" is not defined under \"pkg\""));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn parse_prints_values_as_json() {
    let dir = make_temp_dir("parse-json");
    let path = dir.join("copy.json");
    fs::write(&path, COPY_SCHEMA).expect("write schema");

    let out = run(
        argdecl()
            .arg("parse")
            .arg(&path)
            .args(["--", "-r", "a.txt", "--mode", "644", "b.txt"]),
        "parse",
    );
    assert_success(&out, "parse");
    let json: serde_json::Value = serde_json::from_str(&stdout(&out)).expect("valid JSON");
    assert_eq!(
        json,
        serde_json::json!({
            "recursive": true,
            "mode": 644,
            "src": "a.txt",
            "dest": "b.txt"
        })
    );

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn parse_error_prints_help_and_fails() {
    let dir = make_temp_dir("parse-error");
    let path = dir.join("copy.json");
    fs::write(&path, COPY_SCHEMA).expect("write schema");

    let out = run(
        argdecl().arg("parse").arg(&path).args(["--", "a.txt"]),
        "parse",
    );
    assert_eq!(out.status.code(), Some(1));
    let err = stderr(&out);
    assert!(
        err.starts_with("parse error: missing arguments: <dest>\n\ncopy - Copy files\n"),
        "unexpected stderr:\n{err}"
    );

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn demo_runs_typed_command() {
    let out = run(
        argdecl().args(["demo", "--", "install", "-fj", "2", "serde"]),
        "demo",
    );
    assert_success(&out, "demo");
    assert_eq!(
        stdout(&out).trim(),
        "install serde (force: true, jobs: 2)"
    );

    let out = run(argdecl().args(["demo", "--", "--version"]), "demo");
    assert_success(&out, "demo --version");
    assert_eq!(
        stdout(&out).trim(),
        format!("pkg {}", env!("CARGO_PKG_VERSION"))
    );

    let out = run(argdecl().args(["demo", "--", "remove", "--force"]), "demo");
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).starts_with("parse error: option \"--force\" is not defined\n\n"));
}
