//! Non-interactive network-response watcher
//!
//! Starts a Chrome session, injects the beforeunload guard script, optionally
//! opens a URL, then logs every network response the tab observes until the
//! process is interrupted or the browser exits.

use anyhow::Result;
use clap::Parser;
use crd::{DebugSession, LaunchOptions};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Injected on every new document: makes the browser prompt before a page
/// is unloaded.
const BEFOREUNLOAD_SCRIPT: &str = r#"
window.addEventListener("beforeunload", function (event) {
  event.preventDefault();
  event.returnValue = '';
});
"#;

#[derive(Parser)]
#[command(
    name = "crd-watch",
    about = "Open a URL and log network responses until interrupted",
    version
)]
struct Cli {
    /// URL to open once the browser is up
    #[arg(long)]
    url: Option<String>,

    /// Launch Chrome headless
    #[arg(long)]
    headless: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&interrupted);
    ctrlc::set_handler(move || {
        eprintln!("\ninterrupt received, shutting down...");
        flag.store(true, Ordering::Relaxed);
    })?;

    let mut session = DebugSession::new(LaunchOptions::new().headless(cli.headless));
    session.start()?;
    session.add_script(BEFOREUNLOAD_SCRIPT)?;
    if let Some(url) = &cli.url {
        session.navigate(url)?;
    }

    while !interrupted.load(Ordering::Relaxed) {
        if session.wait(Some(Duration::from_millis(250))) {
            log::info!("browser exited");
            break;
        }
    }

    session.stop();
    Ok(())
}
