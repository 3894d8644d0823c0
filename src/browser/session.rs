//! Remote-debugging session
//!
//! [`DebugSession`] composes a [`ChromeLauncher`] with the external CDP
//! client: it starts Chrome, connects to the discovered debug endpoint,
//! enables the `Page` and `Network` domains on one tab, and feeds
//! `Network.responseReceived` events into the response log. All protocol
//! traffic goes through the client library; the session itself is a thin
//! lifecycle wrapper.

use crate::browser::cdp;
use crate::browser::config::LaunchOptions;
use crate::browser::launcher::ChromeLauncher;
use crate::error::{CrdError, Result};
use crate::netlog::{self, ListenerId, ResponseEntry, ResponseListener, ResponseLog};
use headless_chrome::protocol::cdp::types::Event;
use headless_chrome::{Browser, Tab};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

/// The client's default idle timeout is 30 seconds; raise it so a quiet tab
/// does not drop the connection while we sit waiting for events.
const IDLE_BROWSER_TIMEOUT: Duration = Duration::from_secs(60 * 60);

/// Version metadata served by the browser at `/json/version`
#[derive(Debug, Clone, Deserialize)]
struct VersionInfo {
    #[serde(rename = "Browser")]
    browser: String,
    #[serde(rename = "Protocol-Version")]
    protocol_version: String,
    #[serde(rename = "webSocketDebuggerUrl")]
    web_socket_debugger_url: String,
}

/// One Chrome process, one CDP connection, one tab
///
/// The session is one-shot: `start()` may be called exactly once, and after
/// `stop()` the session is finished. Network responses observed by the tab
/// are dispatched to the registered [`ResponseListener`]s; `start()` always
/// registers a default listener that writes each entry to the log.
pub struct DebugSession {
    options: LaunchOptions,
    launcher: Option<ChromeLauncher>,
    browser: Option<Browser>,
    tab: Option<Arc<Tab>>,
    responses: Arc<ResponseLog>,
    started: bool,
}

impl DebugSession {
    pub fn new(options: LaunchOptions) -> Self {
        Self {
            options,
            launcher: None,
            browser: None,
            tab: None,
            responses: Arc::new(ResponseLog::new()),
            started: false,
        }
    }

    /// Launch Chrome and attach to it
    ///
    /// Fails with [`CrdError::AlreadyRunning`] unless this is the first
    /// `start()` on this session. If anything fails after the process is up,
    /// the process is stopped again before the error propagates.
    pub fn start(&mut self) -> Result<()> {
        if self.started {
            return Err(CrdError::AlreadyRunning);
        }
        self.started = true;

        self.responses.add_listener(Arc::new(|entry: &ResponseEntry| {
            log::info!("{}", netlog::format_entry(entry));
        }));

        let mut launcher = ChromeLauncher::new(self.options.clone());
        launcher.start()?;

        match self.connect(&launcher) {
            Ok((browser, tab)) => {
                self.launcher = Some(launcher);
                self.browser = Some(browser);
                self.tab = Some(tab);
                Ok(())
            }
            Err(e) => {
                launcher.stop();
                Err(e)
            }
        }
    }

    /// Connect the CDP client to a started launcher and prepare the tab
    fn connect(&self, launcher: &ChromeLauncher) -> Result<(Browser, Arc<Tab>)> {
        let endpoint = launcher.endpoint().ok_or(CrdError::EndpointClosed)?;
        let version = fetch_version(endpoint)?;
        log::info!(
            "browser: {}, protocol version: {}",
            version.browser,
            version.protocol_version
        );

        let browser =
            Browser::connect_with_timeout(version.web_socket_debugger_url, IDLE_BROWSER_TIMEOUT)
                .map_err(|e| CrdError::ConnectionFailed(e.to_string()))?;
        let tab = browser
            .new_tab()
            .map_err(|e| CrdError::TabOperationFailed(e.to_string()))?;

        tab.call_method(cdp::PageEnable {})
            .map_err(|e| CrdError::TabOperationFailed(e.to_string()))?;
        tab.call_method(cdp::NetworkEnable {})
            .map_err(|e| CrdError::TabOperationFailed(e.to_string()))?;

        let responses = Arc::clone(&self.responses);
        tab.add_event_listener(Arc::new(move |event: &Event| {
            if let Event::NetworkResponseReceived(e) = event {
                let response = &e.params.response;
                responses.record(Some(&response.url), Some(response.status as i64));
            }
        }))
        .map_err(|e| CrdError::TabOperationFailed(e.to_string()))?;

        Ok((browser, tab))
    }

    /// Block until the browser goes away or the timeout expires
    ///
    /// Returns true once the browser process has exited (which also closes
    /// the connection), false if the timeout expired first. With no timeout
    /// this suspends the caller indefinitely.
    pub fn wait(&mut self, timeout: Option<Duration>) -> bool {
        match self.launcher.as_mut() {
            Some(launcher) => launcher.wait(timeout),
            None => true,
        }
    }

    /// True while the underlying browser process is alive
    pub fn is_running(&mut self) -> bool {
        self.launcher
            .as_mut()
            .is_some_and(ChromeLauncher::is_running)
    }

    /// Shut the session down
    ///
    /// Ordering matters: the tab and client connection are dropped first so
    /// the client's message loop winds down before the process goes away; the
    /// launcher then terminates the process and releases the user-data
    /// directory last. Idempotent.
    pub fn stop(&mut self) {
        self.tab = None;
        self.browser = None;
        if let Some(mut launcher) = self.launcher.take() {
            launcher.stop();
        }
    }

    /// Inject a script to run on every new document load in the tab
    ///
    /// Returns the script identifier for [`remove_script`].
    ///
    /// [`remove_script`]: DebugSession::remove_script
    pub fn add_script(&self, source: &str) -> Result<String> {
        let result = self
            .tab()?
            .call_method(cdp::AddScriptToEvaluateOnNewDocument {
                source: source.to_string(),
            })
            .map_err(|e| CrdError::TabOperationFailed(e.to_string()))?;
        Ok(result.identifier)
    }

    /// Unregister a previously injected script
    pub fn remove_script(&self, identifier: &str) -> Result<()> {
        self.tab()?
            .call_method(cdp::RemoveScriptToEvaluateOnNewDocument {
                identifier: identifier.to_string(),
            })
            .map_err(|e| CrdError::TabOperationFailed(e.to_string()))?;
        Ok(())
    }

    /// Ask the tab to load `url`
    ///
    /// The URL is passed through unvalidated; the browser rejects what it
    /// cannot load. Resets the response log's navigation clock.
    pub fn navigate(&self, url: &str) -> Result<()> {
        let tab = self.tab()?;
        self.responses.mark_navigation();
        tab.navigate_to(url)
            .map_err(|e| CrdError::NavigationFailed(e.to_string()))?;
        Ok(())
    }

    /// Register an additional listener for filtered response entries
    pub fn add_response_listener(&self, listener: Arc<dyn ResponseListener>) -> ListenerId {
        self.responses.add_listener(listener)
    }

    /// Unregister a response listener by id
    pub fn remove_response_listener(&self, id: ListenerId) -> bool {
        self.responses.remove_listener(id)
    }

    fn tab(&self) -> Result<&Arc<Tab>> {
        self.tab
            .as_ref()
            .ok_or_else(|| CrdError::TabOperationFailed("session is not started".to_string()))
    }
}

impl Default for DebugSession {
    fn default() -> Self {
        Self::new(LaunchOptions::default())
    }
}

fn fetch_version(endpoint: &str) -> Result<VersionInfo> {
    let url = format!("{endpoint}/json/version");
    // Allow Chrome a moment to bring up /json/version on a fresh launch
    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()?;
    let response = client.get(&url).send()?.error_for_status()?;
    Ok(response.json()?)
}
