//! Launch configuration for the Chrome process

use std::path::PathBuf;
use std::time::Duration;

/// Options controlling how the Chrome process is launched and stopped
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    /// Run Chrome with `--headless --disable-gpu`
    pub headless: bool,

    /// Explicit path to the Chrome executable; when unset, the launcher
    /// searches the platform candidate list and falls back to PATH lookup
    pub chrome_path: Option<PathBuf>,

    /// How long to wait for Chrome to announce its DevTools endpoint on
    /// stderr before giving up
    pub endpoint_timeout: Duration,

    /// How long to wait after a graceful termination request before
    /// force-killing the process
    pub stop_grace: Duration,
}

impl LaunchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn chrome_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.chrome_path = Some(path.into());
        self
    }

    pub fn endpoint_timeout(mut self, timeout: Duration) -> Self {
        self.endpoint_timeout = timeout;
        self
    }

    pub fn stop_grace(mut self, grace: Duration) -> Self {
        self.stop_grace = grace;
        self
    }
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            headless: false,
            chrome_path: None,
            endpoint_timeout: Duration::from_secs(30),
            stop_grace: Duration::from_secs(10),
        }
    }
}
