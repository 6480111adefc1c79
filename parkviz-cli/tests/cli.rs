use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

fn temp_path(label: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "parkviz-cli-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

fn write_result(dir: &Path, name: &str, model: &str, removals: &str) {
    let body = format!(
        r#"{{
  "scenario": {{
    "trees": "{{\"width\":12,\"height\":8,\"trees\":[{{\"treeId\":1,\"x\":1,\"y\":1}},{{\"treeId\":2,\"x\":2,\"y\":2}},{{\"treeId\":3,\"x\":3,\"y\":3}}]}}",
    "hintMode": "clusters",
    "csvHash": "park-7"
  }},
  "result": {{ "identifiedTrees": "{removals}" }},
  "meta": {{ "tag": "sweep", "timestamp": "2024-06-01T12:00:00Z" }},
  "llm": {{ "model": "{model}" }}
}}"#
    );
    fs::write(dir.join(name), body).expect("write result file");
}

fn seeded_dir(label: &str) -> PathBuf {
    let dir = temp_path(label);
    fs::create_dir_all(&dir).expect("create input dir");
    write_result(&dir, "[p7][s1]_b.json", "gpt", "2,1");
    write_result(&dir, "[p7][s1]_a.json", "gpt", "1,2");
    write_result(&dir, "[p7][s1]_c.json", "claude", "3");
    fs::write(dir.join("notes.txt"), "not a result").expect("write notes");
    dir
}

#[test]
fn cli_writes_manifest_and_render_requests() {
    let exe = env!("CARGO_BIN_EXE_parkviz");
    let input = seeded_dir("in");
    let out_dir = temp_path("out");
    let report = temp_path("report.json");

    let status = Command::new(exe)
        .arg(&input)
        .args(["--report", "json", "--out-dir"])
        .arg(&out_dir)
        .arg("--output")
        .arg(&report)
        .status()
        .expect("run cli");
    assert!(status.success());

    let manifest: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out_dir.join("metadata.json")).unwrap())
            .expect("manifest json");
    assert_eq!(manifest["summary"]["records"], 3);
    assert_eq!(manifest["summary"]["groups"], 1);
    assert!(manifest["generatedAt"].is_string());
    assert_eq!(
        manifest["duplicates"]["modelGroups"]["gpt"]["[1,2]"],
        serde_json::json!(["[p7][s1]_a.json", "[p7][s1]_b.json"])
    );
    assert_eq!(manifest["groups"][0]["parkLayout"], "park-7");

    let requests: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out_dir.join("render_requests.json")).unwrap())
            .expect("requests json");
    let requests = requests.as_array().expect("request list");
    // ORIGINAL, then COMPOSITE + members for gpt and for claude.
    assert_eq!(requests.len(), 6);
    assert_eq!(requests[0]["kind"], "original");
    assert_eq!(requests[0]["filename"], "[p7][s1]_[ORIGINAL].png");
    assert_eq!(requests[1]["label"], "[p7][s1] COMPOSITE gpt clusters >=50%");

    let reported: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report).unwrap()).expect("report json");
    assert_eq!(reported["summary"], manifest["summary"]);

    fs::remove_dir_all(input).ok();
    fs::remove_dir_all(out_dir).ok();
    fs::remove_file(report).ok();
}

#[test]
fn cli_markdown_report_lists_failures_and_strict_fails() {
    let exe = env!("CARGO_BIN_EXE_parkviz");
    let input = seeded_dir("strict");
    fs::write(input.join("broken.json"), "{ not json").unwrap();
    let report = temp_path("report.md");

    let lenient = Command::new(exe)
        .arg(&input)
        .args(["--report", "markdown", "--output"])
        .arg(&report)
        .status()
        .expect("run cli");
    assert!(lenient.success());
    let content = fs::read_to_string(&report).expect("read report");
    assert!(content.contains("# Park Result Gallery"));
    assert!(content.contains("`broken.json`"));

    let strict = Command::new(exe)
        .arg(&input)
        .args(["--report", "json", "--strict", "--output"])
        .arg(&report)
        .status()
        .expect("run cli");
    assert_eq!(strict.code(), Some(1));

    fs::remove_dir_all(input).ok();
    fs::remove_file(report).ok();
}

#[test]
fn cli_invalid_utf8_file_is_a_per_file_failure() {
    let exe = env!("CARGO_BIN_EXE_parkviz");
    let input = temp_path("utf8");
    fs::create_dir_all(&input).unwrap();
    write_result(&input, "a.json", "gpt", "1");
    fs::write(input.join("b.json"), [0xFF_u8, 0xFE, 0x7B]).unwrap();
    let report = temp_path("utf8-report.json");

    let status = Command::new(exe)
        .arg(&input)
        .args(["--report", "json", "--output"])
        .arg(&report)
        .status()
        .expect("run cli");
    assert!(status.success());

    let reported: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report).unwrap()).expect("report json");
    assert_eq!(reported["summary"]["records"], 1);
    assert_eq!(reported["summary"]["failures"], 1);
    assert_eq!(reported["failures"][0]["file"], "b.json");

    fs::remove_dir_all(input).ok();
    fs::remove_file(report).ok();
}

#[test]
fn cli_rejects_inputs_without_json() {
    let exe = env!("CARGO_BIN_EXE_parkviz");
    let dir = temp_path("empty");
    fs::create_dir_all(&dir).unwrap();
    let notes = dir.join("notes.txt");
    fs::write(&notes, "nothing here").unwrap();

    let output = Command::new(exe).arg(&notes).output().expect("run cli");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no JSON files selected"));

    fs::remove_dir_all(dir).ok();
}

#[test]
fn cli_threshold_flag_changes_composite() {
    let exe = env!("CARGO_BIN_EXE_parkviz");
    let input = seeded_dir("threshold");
    let out_dir = temp_path("threshold-out");

    let status = Command::new(exe)
        .arg(&input)
        .args(["--threshold", "1", "--report", "json", "--out-dir"])
        .arg(&out_dir)
        .arg("--output")
        .arg(temp_path("threshold-report.json"))
        .status()
        .expect("run cli");
    assert!(status.success());

    let requests: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out_dir.join("render_requests.json")).unwrap())
            .unwrap();
    let composite = requests
        .as_array()
        .unwrap()
        .iter()
        .find(|request| request["kind"] == "composite")
        .expect("composite request");
    assert_eq!(composite["removalIds"], serde_json::json!([1, 2]));
    assert_eq!(composite["label"], "[p7][s1] COMPOSITE gpt clusters >=100%");

    fs::remove_dir_all(input).ok();
    fs::remove_dir_all(out_dir).ok();
}
