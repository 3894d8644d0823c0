//! End-to-end launcher tests against a fake chrome executable
//!
//! The fake is a shell script that mimics the one piece of Chrome behavior
//! the launcher depends on: printing the DevTools announcement on stderr.
//! No real browser is needed.

#![cfg(unix)]

use crd::CrdError;
use crd::browser::{ChromeLauncher, LaunchOptions};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

const ANNOUNCE: &str =
    r#"echo "DevTools listening on ws://127.0.0.1:9222/devtools/browser/abc" >&2"#;

fn fake_chrome(dir: &TempDir, body: &str) -> PathBuf {
    let path = dir.path().join("fake-chrome");
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("Failed to write fake chrome");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
        .expect("Failed to chmod fake chrome");
    path
}

fn options_for(script: PathBuf) -> LaunchOptions {
    LaunchOptions::new()
        .chrome_path(script)
        .endpoint_timeout(Duration::from_secs(5))
        .stop_grace(Duration::from_secs(5))
}

#[test]
fn test_discovers_endpoint_and_stops_cleanly() {
    let dir = TempDir::new().expect("Failed to create scratch dir");
    let script = fake_chrome(&dir, &format!("{ANNOUNCE}\nexec sleep 600"));

    let mut launcher = ChromeLauncher::new(options_for(script));
    launcher.start().expect("Failed to start launcher");

    assert_eq!(launcher.endpoint(), Some("http://127.0.0.1:9222"));
    assert!(launcher.is_running());
    let profile = launcher
        .user_data_dir()
        .expect("No user data dir while running")
        .to_path_buf();
    assert!(profile.exists());

    launcher.stop();
    assert!(!launcher.is_running());
    assert!(launcher.endpoint().is_none());
    assert!(!profile.exists());

    // A second stop must not fail and must leave the same state
    launcher.stop();
    assert!(!launcher.is_running());
    assert!(launcher.endpoint().is_none());
}

#[test]
fn test_start_twice_fails_and_preserves_state() {
    let dir = TempDir::new().expect("Failed to create scratch dir");
    let script = fake_chrome(&dir, &format!("{ANNOUNCE}\nexec sleep 600"));

    let mut launcher = ChromeLauncher::new(options_for(script));
    launcher.start().expect("Failed to start launcher");

    assert!(matches!(launcher.start(), Err(CrdError::AlreadyRunning)));
    // The running instance is untouched
    assert_eq!(launcher.endpoint(), Some("http://127.0.0.1:9222"));
    assert!(launcher.is_running());

    launcher.stop();
}

#[test]
fn test_force_kills_process_that_ignores_termination() {
    let dir = TempDir::new().expect("Failed to create scratch dir");
    let script = fake_chrome(
        &dir,
        &format!("trap '' TERM INT\n{ANNOUNCE}\nwhile :; do sleep 1; done"),
    );

    let mut launcher = ChromeLauncher::new(
        options_for(script).stop_grace(Duration::from_millis(500)),
    );
    launcher.start().expect("Failed to start launcher");
    assert!(launcher.is_running());
    let profile = launcher
        .user_data_dir()
        .expect("No user data dir while running")
        .to_path_buf();

    launcher.stop();
    assert!(!launcher.is_running());
    assert!(!profile.exists());
}

#[test]
fn test_child_exiting_without_announcement_is_reported() {
    let dir = TempDir::new().expect("Failed to create scratch dir");
    let script = fake_chrome(&dir, "echo 'no devtools today' >&2\nexit 1");

    let mut launcher = ChromeLauncher::new(options_for(script));
    let result = launcher.start();

    assert!(matches!(result, Err(CrdError::EndpointClosed)));
    assert!(!launcher.is_running());
    assert!(launcher.endpoint().is_none());
}

#[test]
fn test_silent_child_times_out() {
    let dir = TempDir::new().expect("Failed to create scratch dir");
    let script = fake_chrome(&dir, "exec sleep 600");

    let mut launcher = ChromeLauncher::new(
        options_for(script).endpoint_timeout(Duration::from_millis(300)),
    );
    let result = launcher.start();

    assert!(matches!(result, Err(CrdError::EndpointTimeout(_))));
    assert!(!launcher.is_running());
    assert!(launcher.endpoint().is_none());
}

#[test]
fn test_wait_reports_exit() {
    let dir = TempDir::new().expect("Failed to create scratch dir");
    let script = fake_chrome(&dir, &format!("{ANNOUNCE}\nexec sleep 2"));

    let mut launcher = ChromeLauncher::new(options_for(script));
    launcher.start().expect("Failed to start launcher");

    // Still alive well before the sleep ends
    assert!(!launcher.wait(Some(Duration::from_millis(100))));
    // Exits on its own within the window
    assert!(launcher.wait(Some(Duration::from_secs(10))));
    assert!(!launcher.is_running());

    launcher.stop();
}
