use std::collections::HashMap;
use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::path::Path;
use std::process::Command;
use std::thread;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

fn packsync_cmd(home: &Path, root: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("packsync"));
    cmd.env("HOME", home)
        .env("USERPROFILE", home)
        .env("RUST_LOG", "warn")
        .arg("--root")
        .arg(root);
    cmd
}

/// Loopback server answering `requests` GETs from `routes`, 404 otherwise.
fn serve(routes: HashMap<&'static str, &'static [u8]>, requests: usize) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
    let addr = listener.local_addr().expect("local addr");
    thread::spawn(move || {
        for stream in listener.incoming().take(requests) {
            let Ok(mut stream) = stream else { continue };
            let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));
            let mut request_line = String::new();
            if reader.read_line(&mut request_line).is_err() {
                continue;
            }
            let mut line = String::new();
            while reader.read_line(&mut line).map(|n| n > 2).unwrap_or(false) {
                line.clear();
            }
            let name = request_line
                .split_whitespace()
                .nth(1)
                .unwrap_or("/")
                .trim_start_matches('/');
            let response = match routes.get(name) {
                Some(body) => {
                    let mut raw = format!(
                        "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                        body.len()
                    )
                    .into_bytes();
                    raw.extend_from_slice(body);
                    raw
                }
                None => b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
                    .to_vec(),
            };
            let _ = stream.write_all(&response);
            let _ = stream.flush();
        }
    });
    format!("http://{addr}/{{name}}")
}

fn write_settings(root: &Path, url_template: &str) {
    fs::write(
        root.join("packsync.yaml"),
        format!("remote:\n  url_template: \"{url_template}\"\n  timeout_secs: 5\nextension: art\n"),
    )
    .expect("write settings");
}

fn seed(root: &Path, files: &[(&str, &[u8])]) {
    let mods = root.join("mods");
    fs::create_dir_all(&mods).expect("create mods dir");
    for (file, bytes) in files {
        fs::write(mods.join(file), bytes).expect("seed artifact");
    }
}

#[test]
fn check_without_mods_dir_reports_nothing() {
    let home = TempDir::new().expect("home");
    let root = TempDir::new().expect("root");
    write_settings(root.path(), "http://127.0.0.1:9/{name}");

    packsync_cmd(home.path(), root.path())
        .arg("check")
        .assert()
        .success()
        .stdout(contains("No artifacts found."));
}

#[test]
fn check_json_classifies_without_writing() {
    let home = TempDir::new().expect("home");
    let root = TempDir::new().expect("root");
    seed(root.path(), &[("alpha.art", b"v1"), ("beta.art", b"v1")]);
    let url = serve(HashMap::from([("alpha", b"v2".as_slice()), ("beta", b"v1".as_slice())]), 2);
    write_settings(root.path(), &url);

    let output = packsync_cmd(home.path(), root.path())
        .args(["check", "--json"])
        .output()
        .expect("run check");
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(report["summary"]["artifacts"], 2);
    assert_eq!(report["summary"]["stale"], 1);
    assert_eq!(report["artifacts"][0]["name"], "alpha");
    assert_eq!(report["artifacts"][0]["signal"]["status"], "stale");
    assert_eq!(report["artifacts"][1]["signal"]["status"], "current");

    assert_eq!(fs::read(root.path().join("mods/alpha.art")).unwrap(), b"v1");
    assert!(!root.path().join("mods_backup").exists());
}

#[test]
fn update_replaces_stale_artifact_and_keeps_backup() {
    let home = TempDir::new().expect("home");
    let root = TempDir::new().expect("root");
    seed(root.path(), &[("alpha.art", b"v1"), ("beta.art", b"v1")]);
    let url = serve(HashMap::from([("alpha", b"v2".as_slice()), ("beta", b"v1".as_slice())]), 2);
    write_settings(root.path(), &url);

    packsync_cmd(home.path(), root.path())
        .arg("update")
        .assert()
        .success()
        .stdout(contains("1 updated, 1 unchanged, 0 failed"));

    assert_eq!(fs::read(root.path().join("mods/alpha.art")).unwrap(), b"v2");
    assert_eq!(
        fs::read(root.path().join("mods_backup/alpha.art")).unwrap(),
        b"v1"
    );
    assert!(!root.path().join("mods_backup/beta.art").exists());
}

#[test]
fn load_json_updates_then_attempts_every_load() {
    let home = TempDir::new().expect("home");
    let root = TempDir::new().expect("root");
    seed(root.path(), &[("alpha.art", b"v1"), ("beta.art", b"v1")]);
    // alpha inline, the batch pass over alpha and beta, then beta inline.
    let url = serve(HashMap::from([("alpha", b"v2".as_slice()), ("beta", b"v1".as_slice())]), 4);
    write_settings(root.path(), &url);

    let output = packsync_cmd(home.path(), root.path())
        .args(["load", "--json"])
        .output()
        .expect("run load");
    assert!(output.status.success());

    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(summary["updated"], 1);
    assert_eq!(summary["unchanged"], 1);
    assert_eq!(summary["batch_passes"], 1);
    let attempts = summary["loaded"].as_u64().unwrap() + summary["load_failed"].as_u64().unwrap();
    assert_eq!(attempts, 2);

    assert_eq!(fs::read(root.path().join("mods/alpha.art")).unwrap(), b"v2");
    assert_eq!(
        fs::read(root.path().join("mods_backup/alpha.art")).unwrap(),
        b"v1"
    );
    assert!(!root.path().join("mods_backup/beta.art").exists());
}

#[test]
fn malformed_settings_fail_with_context() {
    let home = TempDir::new().expect("home");
    let root = TempDir::new().expect("root");
    fs::write(root.path().join("packsync.yaml"), "remote: [unterminated\n").unwrap();

    packsync_cmd(home.path(), root.path())
        .arg("check")
        .assert()
        .failure()
        .stderr(contains("failed to load settings"));
}

#[test]
fn chat_replaces_banned_messages_until_exit() {
    let home = TempDir::new().expect("home");
    let root = TempDir::new().expect("root");
    fs::write(
        root.path().join("censorwords.yml"),
        "censored_words:\n  - spam\n",
    )
    .unwrap();

    assert_cmd::Command::from_std(packsync_cmd(home.path(), root.path()))
        .args(["chat", "--author", "User123"])
        .write_stdin("buy spam now\nbuy good stuff\nEXIT\nspam after exit\n")
        .assert()
        .success()
        .stdout(contains(
            "Your message was removed because it contains a prohibited word.",
        ))
        .stdout(contains("[Chat] User123: buy good stuff"))
        .stdout(contains("[Chat] User123: buy spam now").not())
        .stdout(contains("spam after exit").not());
}
