//! # crd
//!
//! A small Chrome remote-debugging utility built on the Chrome DevTools
//! Protocol (CDP): launch a Chrome process, attach to its debug endpoint,
//! inject a script that runs on every new document, navigate, and log the
//! network responses the tab observes.
//!
//! The crate deliberately owns no protocol logic. Chrome is spawned with
//! `--remote-debugging-port=0`; the OS-assigned endpoint is discovered by
//! scanning the process's stderr, and everything on the wire is delegated to
//! the external `headless_chrome` client.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use crd::{DebugSession, LaunchOptions};
//! use std::time::Duration;
//!
//! # fn main() -> crd::Result<()> {
//! let mut session = DebugSession::new(LaunchOptions::new().headless(true));
//! session.start()?;
//!
//! // Run a script before any page script on every new document
//! let script_id = session.add_script("console.log('hello');")?;
//!
//! // Navigate; responses are logged as `<elapsed> <url> <status>`
//! session.navigate("https://example.com")?;
//! session.wait(Some(Duration::from_secs(10)));
//!
//! session.remove_script(&script_id)?;
//! session.stop();
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! - [`browser`]: Chrome process lifecycle and the debugging session
//! - [`netlog`]: response-log entries, listeners, filtering and formatting
//! - [`error`]: error types and result alias

pub mod browser;
pub mod error;
pub mod netlog;

pub use browser::{ChromeLauncher, DebugSession, LaunchOptions};
pub use error::{CrdError, Result};
pub use netlog::{ListenerId, ResponseEntry, ResponseListener};
