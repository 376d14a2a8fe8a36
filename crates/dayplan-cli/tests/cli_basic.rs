//! Basic CLI E2E tests.
//!
//! Tests invoke the built `dayplan` binary against temporary input files and
//! an isolated config file, then verify the JSON it prints.

use std::path::{Path, PathBuf};
use std::process::Command;

use serde_json::{json, Value};
use tempfile::TempDir;

const NEW_YORK_CONFIG: &str = r#"
[workday]
timezone = "America/New_York"
work_start = "09:00"
work_end = "17:00"
"#;

struct Workspace {
    dir: TempDir,
    config: PathBuf,
}

impl Workspace {
    fn new(config: &str) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let config_path = dir.path().join("config.toml");
        std::fs::write(&config_path, config).expect("Failed to write config");
        Self {
            dir,
            config: config_path,
        }
    }

    fn file(&self, name: &str, value: &Value) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, serde_json::to_string(value).unwrap()).expect("Failed to write input");
        path
    }

    /// Run the CLI and return (stdout, stderr, exit code)
    fn run(&self, args: &[&str], env: &[(&str, &str)]) -> (String, String, i32) {
        let mut command = Command::new(env!("CARGO_BIN_EXE_dayplan"));
        command
            .args(args)
            .env("DAYPLAN_CONFIG", &self.config)
            .env_remove("PLANNER_EXCEPTIONS_INCLUDE_CRITICAL")
            .env_remove("PLANNER_EXCEPTIONS_CRITICAL_THRESHOLD")
            .env_remove("RUST_LOG");
        for (key, value) in env {
            command.env(key, value);
        }
        let output = command.output().expect("Failed to execute CLI command");

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        let code = output.status.code().unwrap_or(-1);
        (stdout, stderr, code)
    }

    fn run_json(&self, args: &[&str]) -> Value {
        self.run_json_with_env(args, &[])
    }

    fn run_json_with_env(&self, args: &[&str], env: &[(&str, &str)]) -> Value {
        let (stdout, stderr, code) = self.run(args, env);
        assert_eq!(code, 0, "CLI command failed: {args:?}\n{stderr}");
        serde_json::from_str(&stdout).expect("Failed to parse JSON output")
    }
}

fn path_arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

fn events() -> Value {
    json!([
        { "externalEventId": "standup", "startAt": "2026-10-19T13:00:00Z", "endAt": "2026-10-19T13:30:00Z",
          "title": "Standup", "contentHash": "h1" },
        { "externalEventId": "review", "startAt": "2026-10-19T13:30:00Z", "endAt": "2026-10-19T14:30:00Z",
          "title": "Review", "contentHash": "h2" },
        { "externalEventId": "dinner", "startAt": "2026-10-19T23:00:00Z", "endAt": "2026-10-20T00:30:00Z",
          "title": "Dinner", "contentHash": "h3" }
    ])
}

#[test]
fn test_windows_use_config_timezone() {
    let ws = Workspace::new(NEW_YORK_CONFIG);
    let out = ws.run_json(&["windows", "--start", "2026-10-19", "--end", "2026-10-21"]);

    assert_eq!(out["days"].as_array().unwrap().len(), 3);
    assert_eq!(out["utcRangeStart"], "2026-10-19T13:00:00Z");
    assert_eq!(out["days"][0]["dateLocal"], "2026-10-19");
    assert_eq!(out["days"][0]["workEndUtc"], "2026-10-19T21:00:00Z");
}

#[test]
fn test_invalid_range_fails() {
    let ws = Workspace::new("");
    let (stdout, stderr, code) = ws.run(&["windows", "--start", "2026-10-20", "--end", "2026-10-19"], &[]);

    assert_eq!(code, 1);
    assert!(stdout.is_empty());
    assert!(stderr.contains("error:"), "{stderr}");
}

#[test]
fn test_busy_merges_touching_events() {
    let ws = Workspace::new(NEW_YORK_CONFIG);
    let events = ws.file("events.json", &events());
    let out = ws.run_json(&["busy", "--events", path_arg(&events), "--start", "2026-10-19", "--end", "2026-10-19"]);

    assert_eq!(out["blocks"].as_array().unwrap().len(), 1);
    assert_eq!(out["stats"]["busyMinutes"], 90);
    assert_eq!(out["stats"]["blockCount"], 1);
    // 14:30-21:00 UTC
    assert_eq!(out["stats"]["largestFocusBlockMinutes"], 390);
}

#[test]
fn test_diff_first_sync_then_no_changes() {
    let ws = Workspace::new("");
    let current = ws.file("events.json", &events());
    let missing = ws.dir.path().join("never-written.json");

    let first = ws.run_json(&["diff", "--current", path_arg(&current), "--previous", path_arg(&missing)]);
    assert_eq!(first["delta"]["added"], json!(["dinner", "review", "standup"]));
    assert_eq!(first["delta"]["removed"], json!([]));

    let stored = ws.file("previous.json", &first["fingerprint"]);
    let second = ws.run_json(&["diff", "--current", path_arg(&current), "--previous", path_arg(&stored)]);
    assert_eq!(second["delta"], json!({ "added": [], "removed": [], "changed": [] }));
}

#[test]
fn test_hash_fills_content_hash() {
    let ws = Workspace::new("");
    let events = ws.file("events.json", &events());
    let out = ws.run_json(&["hash", "--events", path_arg(&events)]);

    let hash = out[0]["contentHash"].as_str().unwrap();
    assert_eq!(hash.len(), 64);
    assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    assert_ne!(out[0]["contentHash"], out[1]["contentHash"]);
}

#[test]
fn test_score_respects_environment() {
    let ws = Workspace::new("");
    let tasks = ws.file(
        "tasks.json",
        &json!([{ "id": "vip", "priorityScore": 95, "dueAt": "2026-10-23T12:00:00Z" }]),
    );
    let args = ["score", "--tasks", path_arg(&tasks), "--now", "2026-10-19T12:00:00Z"];

    let off = ws.run_json(&args);
    assert_eq!(off[0]["isException"], false);
    assert_eq!(off[0]["score"]["urgencyBoost"], 8.0);
    assert_eq!(off[0]["score"]["finalScore"], 22.25);

    let on = ws.run_json_with_env(&args, &[("PLANNER_EXCEPTIONS_INCLUDE_CRITICAL", "yes")]);
    assert_eq!(on[0]["isException"], true);
}

#[test]
fn test_capacity_with_pinned_tasks() {
    let ws = Workspace::new(NEW_YORK_CONFIG);
    let events = ws.file("events.json", &events());
    let tasks = ws.file(
        "tasks.json",
        &json!([
            { "id": "a", "estimatedMinutes": 200 },
            { "id": "b", "estimatedMinutes": "150" },
            { "id": "c", "estimatedMinutes": 999 }
        ]),
    );

    let out = ws.run_json(&[
        "capacity", "--tasks", path_arg(&tasks), "--events", path_arg(&events),
        "--date", "2026-10-19", "--top3", "a,b",
    ]);

    // 510 - 30 - 90 - 10 - 90
    assert_eq!(out["available_minutes"], 290);
    assert_eq!(out["required_minutes"], 350);
    assert_eq!(out["overage_minutes"], 60);
    assert_eq!(out["rag"], "yellow");
    assert_eq!(out["breakdown"]["meeting_minutes"], 90);
}

#[test]
fn test_plan_ranks_and_projects() {
    let ws = Workspace::new(NEW_YORK_CONFIG);
    let events = ws.file("events.json", &events());
    let tasks = ws.file(
        "tasks.json",
        &json!([
            { "id": "ship", "priorityScore": 60, "dueAt": "2026-10-19T20:00:00Z", "estimatedMinutes": 90 },
            { "id": "docs", "priorityScore": 40, "estimatedMinutes": 60 },
            { "id": "old", "status": "Done", "priorityScore": 100 }
        ]),
    );
    let deps = ws.file(
        "deps.json",
        &json!([{ "taskId": "docs", "kind": "task", "targetId": "ghost" }]),
    );

    let out = ws.run_json(&[
        "plan", "--tasks", path_arg(&tasks), "--events", path_arg(&events),
        "--deps", path_arg(&deps), "--now", "2026-10-19T12:00:00Z",
    ]);

    assert_eq!(out["ranked"].as_array().unwrap().len(), 2);
    assert_eq!(out["ranked"][0]["taskId"], "ship");
    assert_eq!(out["ranked"][1]["blockedByDependency"], true);
    assert_eq!(out["ranked"][1]["dependencies"][0]["title"], "unknown");
    assert_eq!(out["topThree"], json!(["ship", "docs"]));
    assert_eq!(out["today"]["date"], "2026-10-19");
    assert_eq!(out["today"]["busy"]["busyMinutes"], 90);
    assert_eq!(out["tomorrow"]["date"], "2026-10-20");
}

#[test]
fn test_config_get_and_show() {
    let ws = Workspace::new(NEW_YORK_CONFIG);

    let (stdout, _, code) = ws.run(&["config", "get", "workday.timezone"], &[]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "America/New_York");

    let (stdout, _, code) = ws.run(&["config", "get", "capacity.work_minutes"], &[]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "510");

    let (stdout, _, code) = ws.run(&["config", "show"], &[]);
    assert_eq!(code, 0);
    assert!(stdout.contains("[workday]"));
    assert!(stdout.contains("work_end = \"17:00\""));

    let (_, stderr, code) = ws.run(&["config", "get", "no.such.key"], &[]);
    assert_eq!(code, 1);
    assert!(stderr.contains("unknown key"));
}

#[test]
fn test_explicit_config_flag_overrides_environment() {
    let ws = Workspace::new("");
    let other = ws.dir.path().join("other.toml");
    std::fs::write(&other, "[exceptions]\ncritical_threshold = 75\n").unwrap();

    let (stdout, _, code) = ws.run(&["--config", path_arg(&other), "config", "get", "exceptions.critical_threshold"], &[]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "75.0");

    let (_, stderr, code) = ws.run(&["--config", "/nonexistent/dayplan.toml", "config", "show"], &[]);
    assert_eq!(code, 1);
    assert!(stderr.contains("cannot read"), "{stderr}");
}
