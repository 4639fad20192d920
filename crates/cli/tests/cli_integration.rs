use std::path::PathBuf;
use std::process::{Command, Output};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn argdecode() -> Command {
    Command::new(env!("CARGO_BIN_EXE_argdecode"))
}

fn run(cmd: &mut Command) -> Output {
    cmd.output().expect("failed to run argdecode")
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

#[test]
fn help_works() {
    let out = run(argdecode().arg("--help"));
    assert!(
        out.status.success(),
        "argdecode --help failed:\nstatus: {}\nstderr:\n{}",
        out.status,
        stderr(&out),
    );
    let text = stdout(&out);
    assert!(
        text.contains("tokens") && text.contains("index") && text.contains("check"),
        "unexpected help output:\n{text}"
    );
}

#[test]
fn tokens_prints_pairs_then_positionals() {
    let out = run(argdecode().args(["tokens", "--", "--name=Lucy", "-ea8", "math", "--", "-x"]));
    assert!(out.status.success(), "stderr:\n{}", stderr(&out));
    assert_eq!(
        stdout(&out),
        "--name\tLucy\n-e\ttrue\n-a\t8\n_\tmath\n_\t-x\n"
    );
}

#[test]
fn tokens_json() {
    let out = run(argdecode().args(["tokens", "--json", "--", "--foo", "-b"]));
    assert!(out.status.success(), "stderr:\n{}", stderr(&out));
    let json: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "pairs": [["--foo", "true"], ["-b", "true"]],
            "positionals": []
        })
    );
}

#[test]
fn index_groups_repeated_keys() {
    let out = run(argdecode().args(["index", "--", "-f", "1", "-f", "2", "--v", "x"]));
    assert!(out.status.success(), "stderr:\n{}", stderr(&out));
    let json: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(json, serde_json::json!({ "f": [1, 2], "v": "x", "_": [] }));
}

#[test]
fn check_decodes_record() {
    let out = run(argdecode()
        .arg("check")
        .arg("--schema")
        .arg(fixture("student.json"))
        .args(["--", "--name=Lucy", "-ea8", "-t", "a", "--tag", "b", "math", "art"]));
    assert!(out.status.success(), "stderr:\n{}", stderr(&out));
    let json: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "name": "Lucy",
            "english": true,
            "age": 8,
            "ratio": 0.5,
            "tag": ["b", "a"],
            "_": ["math", "art"]
        })
    );
}

#[test]
fn check_reports_every_error() {
    let out = run(argdecode()
        .arg("check")
        .arg("--schema")
        .arg(fixture("student.json"))
        .args(["--", "--ratio", "world", "-e", "123"]));
    assert!(!out.status.success());
    let err = stderr(&out);
    assert!(err.contains("error: name: expected String, found nothing"), "stderr:\n{err}");
    assert!(err.contains("error: english: expected Bool, found Int"), "stderr:\n{err}");
    assert!(err.contains("error: age: expected Int, found nothing"), "stderr:\n{err}");
    assert!(err.contains("error: ratio: expected Float, found String"), "stderr:\n{err}");
    assert!(err.contains("4 argument error(s)"), "stderr:\n{err}");
}

#[test]
fn check_json_errors() {
    let out = run(argdecode()
        .arg("check")
        .arg("--json")
        .arg("--schema")
        .arg(fixture("student.json"))
        .args(["--", "-n", "x", "-a", "1", "-a", "2"]));
    assert!(!out.status.success());
    let json: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(
        json,
        serde_json::json!([{
            "kind": "cardinality",
            "expected": "Int",
            "found": "List",
            "path": ["age"]
        }])
    );
}

#[test]
fn check_rejects_invalid_schema() {
    let out = run(argdecode()
        .arg("check")
        .arg("--schema")
        .arg(fixture("invalid.json")));
    assert!(!out.status.success());
    assert!(stderr(&out).contains("schema error"), "stderr:\n{}", stderr(&out));
}

#[test]
fn check_missing_schema_file() {
    let out = run(argdecode()
        .arg("check")
        .arg("--schema")
        .arg(fixture("does-not-exist.json")));
    assert!(!out.status.success());
    assert!(stderr(&out).contains("failed to read schema"), "stderr:\n{}", stderr(&out));
}
