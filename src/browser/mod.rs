//! Browser process and debugging-session management
//!
//! This module contains the two halves of the tool:
//! - ChromeLauncher: spawns and supervises the Chrome process, discovering
//!   its OS-assigned DevTools endpoint from stderr
//! - DebugSession: attaches the external CDP client to that endpoint and
//!   drives one tab

mod cdp;
pub mod config;
pub mod launcher;
pub mod session;

pub use config::LaunchOptions;
pub use launcher::ChromeLauncher;
pub use session::DebugSession;
