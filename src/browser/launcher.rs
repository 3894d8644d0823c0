//! Chrome process lifecycle
//!
//! [`ChromeLauncher`] owns exactly one Chrome child process and the private
//! user-data directory it runs against. Chrome is started with
//! `--remote-debugging-port=0`, so the OS picks the DevTools port; the
//! launcher discovers it by scanning the child's stderr for the
//! `DevTools listening on ws://...` announcement and derives the HTTP debug
//! endpoint from it.

use crate::browser::config::LaunchOptions;
use crate::error::{CrdError, Result};
use std::ffi::OsString;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStderr, Command, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};
use tempfile::TempDir;

/// Well-known install locations, tried before falling back to PATH lookup
#[cfg(windows)]
const CHROME_CANDIDATES: &[&str] = &[
    r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
    r"C:\Program Files\Google\Chrome\Application\chrome.exe",
];

#[cfg(not(windows))]
const CHROME_CANDIDATES: &[&str] = &[
    "/usr/bin/google-chrome",
    "/usr/bin/google-chrome-stable",
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
];

/// Command name resolved via PATH when no candidate path exists
const CHROME_FALLBACK: &str = "google-chrome";

/// Poll interval for exit checks
const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Pause after the process is gone, before releasing its resources
const SETTLE_DELAY: Duration = Duration::from_secs(1);

/// Manages a single Chrome child process and its DevTools debug endpoint
pub struct ChromeLauncher {
    chrome: PathBuf,
    options: LaunchOptions,
    user_data_dir: Option<TempDir>,
    process: Option<Child>,
    endpoint: Option<String>,
}

impl ChromeLauncher {
    pub fn new(options: LaunchOptions) -> Self {
        let chrome = options
            .chrome_path
            .clone()
            .unwrap_or_else(default_chrome_path);
        Self {
            chrome,
            options,
            user_data_dir: None,
            process: None,
            endpoint: None,
        }
    }

    /// The HTTP debug endpoint (`http://<host>:<port>`), set while running
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    /// The private user-data directory, present between start() and stop()
    pub fn user_data_dir(&self) -> Option<&Path> {
        self.user_data_dir.as_ref().map(TempDir::path)
    }

    /// Spawn Chrome and block until its DevTools endpoint is known
    ///
    /// Fails with [`CrdError::AlreadyRunning`] if a child process already
    /// exists, with [`CrdError::EndpointTimeout`] if no announcement appears
    /// within the configured window, and with [`CrdError::EndpointClosed`] if
    /// the child exits without ever printing one. On failure after the spawn,
    /// the child is torn down again.
    pub fn start(&mut self) -> Result<()> {
        if self.process.is_some() {
            return Err(CrdError::AlreadyRunning);
        }

        let profile = match &self.user_data_dir {
            Some(dir) => dir.path().to_path_buf(),
            None => {
                let dir = tempfile::Builder::new().prefix("crd-profile-").tempdir()?;
                let path = dir.path().to_path_buf();
                self.user_data_dir = Some(dir);
                path
            }
        };
        log::info!("user data dir: {}", profile.display());

        let mut child = Command::new(&self.chrome)
            .args(build_args(&profile, self.options.headless))
            .stderr(Stdio::piped())
            .spawn()?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| CrdError::MalformedEndpoint("chrome stderr was not captured".into()))?;
        self.process = Some(child);

        match scan_for_endpoint(stderr, self.options.endpoint_timeout) {
            Ok(endpoint) => {
                log::info!("remote debugging endpoint: {endpoint}");
                self.endpoint = Some(endpoint);
                Ok(())
            }
            Err(e) => {
                self.stop();
                Err(e)
            }
        }
    }

    /// Wait for the process to exit
    ///
    /// Returns true immediately if nothing is running, false if a timeout was
    /// given and expired first, true once the process has exited.
    pub fn wait(&mut self, timeout: Option<Duration>) -> bool {
        let Some(child) = self.process.as_mut() else {
            return true;
        };
        match timeout {
            None => {
                let _ = child.wait();
                true
            }
            Some(timeout) => poll_exit(child, timeout),
        }
    }

    /// True iff a child process exists and has not yet reported an exit code
    pub fn is_running(&mut self) -> bool {
        match self.process.as_mut() {
            Some(child) => matches!(child.try_wait(), Ok(None)),
            None => false,
        }
    }

    /// Terminate the process and release its resources
    ///
    /// Requests graceful termination first, force-kills once the grace window
    /// expires, reaps the exit status unconditionally, and removes the
    /// user-data directory last. Idempotent: with nothing running only the
    /// remaining directory cleanup happens.
    pub fn stop(&mut self) {
        self.endpoint = None;
        if let Some(mut child) = self.process.take() {
            if matches!(child.try_wait(), Ok(None)) {
                terminate(&mut child);
                if !poll_exit(&mut child, self.options.stop_grace) {
                    log::warn!(
                        "chrome ignored termination for {:?}, killing",
                        self.options.stop_grace
                    );
                    let _ = child.kill();
                }
            }
            let _ = child.wait();
            thread::sleep(SETTLE_DELAY);
        }
        if let Some(dir) = self.user_data_dir.take() {
            if let Err(e) = dir.close() {
                log::warn!("failed to remove user data dir: {e}");
            }
        }
    }
}

impl Drop for ChromeLauncher {
    fn drop(&mut self) {
        // Safety net only: no graceful window, no settle delay. The TempDir
        // removes itself.
        if let Some(mut child) = self.process.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

/// First existing candidate path, else the bare command name for PATH lookup
fn default_chrome_path() -> PathBuf {
    for candidate in CHROME_CANDIDATES {
        if Path::new(candidate).exists() {
            return PathBuf::from(candidate);
        }
    }
    PathBuf::from(CHROME_FALLBACK)
}

/// Command-line flags for the Chrome process
fn build_args(user_data_dir: &Path, headless: bool) -> Vec<OsString> {
    let mut user_data_flag = OsString::from("--user-data-dir=");
    user_data_flag.push(user_data_dir);

    let mut args = vec![
        OsString::from("--enable-logging"),
        OsString::from("--remote-debugging-port=0"),
        user_data_flag,
        OsString::from("--ignore-certificate-errors"),
    ];
    if headless {
        args.push(OsString::from("--headless"));
        args.push(OsString::from("--disable-gpu"));
    }
    args
}

/// Block until the child announces its DevTools endpoint, or fail
///
/// A dedicated thread scans stderr line by line; non-matching lines are
/// skipped. The thread keeps draining stderr until EOF even after the match,
/// so Chrome can never block on a full pipe, and re-logs every line at trace
/// level.
fn scan_for_endpoint(stderr: ChildStderr, timeout: Duration) -> Result<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut tx = Some(tx);
        for line in BufReader::new(stderr).lines() {
            let Ok(line) = line else { break };
            log::trace!(target: "chrome", "{line}");
            if let Some(ws_url) = parse_listening_line(&line) {
                if let Some(tx) = tx.take() {
                    let _ = tx.send(ws_url.to_string());
                }
            }
        }
    });

    match rx.recv_timeout(timeout) {
        Ok(ws_url) => http_endpoint_for(&ws_url),
        Err(RecvTimeoutError::Timeout) => Err(CrdError::EndpointTimeout(timeout)),
        // Sender dropped without a match: stderr hit EOF, the child is gone
        Err(RecvTimeoutError::Disconnected) => Err(CrdError::EndpointClosed),
    }
}

/// Extract the ws:// URL from Chrome's announcement line, e.g.
/// `DevTools listening on ws://127.0.0.1:37283/devtools/browser/<id>`
fn parse_listening_line(line: &str) -> Option<&str> {
    let (_, rest) = line.split_once("listening on ")?;
    let token = rest.split_whitespace().next()?;
    token.starts_with("ws:").then_some(token)
}

/// Derive the HTTP debug endpoint from the announced WebSocket URL
fn http_endpoint_for(ws_url: &str) -> Result<String> {
    let rest = ws_url
        .strip_prefix("ws://")
        .ok_or_else(|| CrdError::MalformedEndpoint(ws_url.to_string()))?;
    let host_port = rest.split('/').next().unwrap_or(rest);
    if host_port.is_empty() {
        return Err(CrdError::MalformedEndpoint(ws_url.to_string()));
    }
    Ok(format!("http://{host_port}"))
}

/// Poll for exit up to `timeout`; true once exited
fn poll_exit(child: &mut Child, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        match child.try_wait() {
            Ok(None) => {}
            // Exited, or the handle is unusable; either way stop waiting
            Ok(Some(_)) | Err(_) => return true,
        }
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return false;
        }
        thread::sleep(EXIT_POLL_INTERVAL.min(remaining));
    }
}

#[cfg(unix)]
fn terminate(child: &mut Child) {
    use nix::sys::signal::{Signal, kill};
    use nix::unistd::Pid;

    let _ = kill(Pid::from_raw(child.id() as i32), Signal::SIGTERM);
}

#[cfg(not(unix))]
fn terminate(child: &mut Child) {
    let _ = child.kill();
}
