//! Error types and result aliases

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while driving Chrome over the DevTools protocol
#[derive(Debug, Error)]
pub enum CrdError {
    /// start() was called on a launcher or session that is already running
    #[error("chrome is already running")]
    AlreadyRunning,

    /// Spawning the chrome process failed (executable missing, permissions, ...)
    #[error("failed to launch chrome: {0}")]
    LaunchFailed(#[from] std::io::Error),

    /// Chrome exited before it announced its DevTools endpoint on stderr
    #[error("chrome exited before announcing its DevTools endpoint")]
    EndpointClosed,

    /// No DevTools endpoint announcement appeared within the configured window
    #[error("no DevTools endpoint announced within {0:?}")]
    EndpointTimeout(Duration),

    /// The announced DevTools URL did not have the expected shape
    #[error("malformed DevTools announcement: {0}")]
    MalformedEndpoint(String),

    /// Fetching /json/version from the debug endpoint failed
    #[error("failed to fetch DevTools version metadata: {0}")]
    VersionFetch(#[from] reqwest::Error),

    /// Connecting the CDP client to the browser failed
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// A tab-level CDP call failed
    #[error("tab operation failed: {0}")]
    TabOperationFailed(String),

    /// A navigation request was rejected
    #[error("navigation failed: {0}")]
    NavigationFailed(String),
}

/// Result type alias for this crate
pub type Result<T> = std::result::Result<T, CrdError>;
