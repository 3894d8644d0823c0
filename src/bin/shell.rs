//! Interactive remote-debugging shell
//!
//! Starts a Chrome session, injects the beforeunload guard script, and reads
//! commands from stdin until `exit` or EOF. Network responses observed by the
//! tab are logged as they arrive.

use anyhow::Result;
use clap::Parser;
use crd::{CrdError, DebugSession, LaunchOptions};
use std::io::{self, BufRead, Write};

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
    name = "crd-shell",
    about = "Interactive Chrome remote-debugging shell",
    version
)]
struct Cli {
    /// Launch Chrome headless
    #[arg(long)]
    headless: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut session = DebugSession::new(LaunchOptions::new().headless(cli.headless));
    session.start()?;
    // The guard script starts out enabled, like `beforeunload on`
    let mut script_id = Some(session.add_script(BEFOREUNLOAD_SCRIPT)?);

    println!("Welcome to the CRD shell. Type 'help' for commands.");
    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }
        let words: Vec<&str> = line.split_whitespace().collect();
        let result = match words.as_slice() {
            [] => Ok(()),
            ["beforeunload", op] => beforeunload(&session, &mut script_id, op),
            ["beforeunload", ..] => {
                eprintln!("usage: beforeunload {{status|show|on|off}}");
                Ok(())
            }
            ["open", url] => session.navigate(url),
            ["open", ..] => {
                eprintln!("usage: open <url>");
                Ok(())
            }
            ["help"] => {
                print_help();
                Ok(())
            }
            ["exit"] | ["quit"] | ["bye"] => break,
            [command, ..] => {
                eprintln!("unknown command: {command} (try 'help')");
                Ok(())
            }
        };
        // Command failures are reported, not fatal
        if let Err(e) = result {
            eprintln!("error: {e}");
        }
    }

    session.stop();
    Ok(())
}

fn beforeunload(
    session: &DebugSession,
    script_id: &mut Option<String>,
    op: &str,
) -> std::result::Result<(), CrdError> {
    match op {
        "status" => println!("{}", if script_id.is_some() { "on" } else { "off" }),
        "show" => println!("{BEFOREUNLOAD_SCRIPT}"),
        "on" => {
            if script_id.is_none() {
                *script_id = Some(session.add_script(BEFOREUNLOAD_SCRIPT)?);
            }
        }
        "off" => {
            if let Some(id) = script_id.take() {
                session.remove_script(&id)?;
            }
        }
        _ => eprintln!("usage: beforeunload {{status|show|on|off}}"),
    }
    Ok(())
}

fn print_help() {
    println!("COMMANDS:");
    println!("    beforeunload status    Show whether the guard script is active");
    println!("    beforeunload show      Print the guard script source");
    println!("    beforeunload on        Inject the guard script");
    println!("    beforeunload off       Remove the guard script");
    println!("    open <url>             Navigate the tab to <url>");
    println!("    exit | quit | bye      Leave the shell");
}
