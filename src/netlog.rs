//! Network-response log
//!
//! Collects `Network.responseReceived` notifications into [`ResponseEntry`]
//! values and fans them out to registered listeners. The filtering rules are
//! deliberately small: events without a URL are dropped, and `data:` URLs are
//! dropped so inline payloads never flood the log.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Identifier returned by [`ResponseLog::add_listener`]
pub type ListenerId = u64;

/// One logged network response
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseEntry {
    /// Response URL
    pub url: String,
    /// HTTP status code, if the producer supplied one
    pub status: Option<i64>,
    /// Time since the navigation that triggered this response was requested
    pub elapsed: Duration,
}

/// Receiver for filtered response entries
///
/// Listeners are invoked on the CDP client's event thread, so implementations
/// must be cheap and must not block.
pub trait ResponseListener: Send + Sync {
    fn on_response(&self, entry: &ResponseEntry);
}

impl<F> ResponseListener for F
where
    F: Fn(&ResponseEntry) + Send + Sync,
{
    fn on_response(&self, entry: &ResponseEntry) {
        self(entry)
    }
}

/// Registry of response listeners plus the navigation clock
///
/// The clock starts at construction and is rewound by [`mark_navigation`],
/// so `elapsed` in each entry measures time since the most recent navigation
/// request.
///
/// [`mark_navigation`]: ResponseLog::mark_navigation
pub struct ResponseLog {
    origin: Mutex<Instant>,
    listeners: Mutex<Vec<(ListenerId, Arc<dyn ResponseListener>)>>,
    next_id: AtomicU64,
}

impl ResponseLog {
    pub fn new() -> Self {
        Self {
            origin: Mutex::new(Instant::now()),
            listeners: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Reset the navigation clock; called when a navigation is requested
    pub fn mark_navigation(&self) {
        let mut origin = self.origin.lock().unwrap_or_else(|e| e.into_inner());
        *origin = Instant::now();
    }

    /// Register a listener; returns an id usable with [`remove_listener`]
    ///
    /// [`remove_listener`]: ResponseLog::remove_listener
    pub fn add_listener(&self, listener: Arc<dyn ResponseListener>) -> ListenerId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut listeners = self.listeners.lock().unwrap_or_else(|e| e.into_inner());
        listeners.push((id, listener));
        id
    }

    /// Unregister a listener; returns false if the id was not registered
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.lock().unwrap_or_else(|e| e.into_inner());
        let before = listeners.len();
        listeners.retain(|(listener_id, _)| *listener_id != id);
        listeners.len() != before
    }

    /// Feed one raw response event through the filter and out to listeners
    ///
    /// Events without a URL and events for `data:` URLs are suppressed.
    pub fn record(&self, url: Option<&str>, status: Option<i64>) {
        let Some(url) = url else { return };
        if has_data_scheme(url) {
            return;
        }
        let elapsed = self
            .origin
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .elapsed();
        let entry = ResponseEntry {
            url: url.to_string(),
            status,
            elapsed,
        };
        let listeners = self.listeners.lock().unwrap_or_else(|e| e.into_inner());
        for (_, listener) in listeners.iter() {
            listener.on_response(&entry);
        }
    }
}

impl Default for ResponseLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Render an entry as one log line: `<elapsed> <url> <status>`
///
/// Status renders as `-` when absent.
pub fn format_entry(entry: &ResponseEntry) -> String {
    let status = entry
        .status
        .map_or_else(|| "-".to_string(), |s| s.to_string());
    format!(
        "{:.3}s {} {}",
        entry.elapsed.as_secs_f64(),
        entry.url,
        status
    )
}

fn has_data_scheme(url: &str) -> bool {
    url.get(..5).is_some_and(|p| p.eq_ignore_ascii_case("data:"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn collecting_log() -> (ResponseLog, Arc<Mutex<Vec<ResponseEntry>>>) {
        let log = ResponseLog::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        log.add_listener(Arc::new(move |entry: &ResponseEntry| {
            sink.lock().unwrap().push(entry.clone());
        }));
        (log, seen)
    }

    #[test]
    fn test_record_dispatches_to_listeners() {
        let (log, seen) = collecting_log();

        log.record(Some("https://example.com/app.js"), Some(200));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].url, "https://example.com/app.js");
        assert_eq!(seen[0].status, Some(200));
    }

    #[test]
    fn test_record_suppresses_missing_url() {
        let (log, seen) = collecting_log();

        log.record(None, Some(200));

        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_record_suppresses_data_urls() {
        let (log, seen) = collecting_log();

        log.record(Some("data:text/html,<h1>hi</h1>"), Some(200));
        log.record(Some("DATA:image/png;base64,AAAA"), None);

        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_record_keeps_short_and_odd_urls() {
        let (log, seen) = collecting_log();

        // Shorter than the "data:" prefix must not panic or be dropped
        log.record(Some("a"), None);
        log.record(Some("about:blank"), None);

        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_removed_listener_stops_receiving() {
        let log = ResponseLog::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let id = log.add_listener(Arc::new(move |entry: &ResponseEntry| {
            sink.lock().unwrap().push(entry.clone());
        }));

        log.record(Some("https://example.com/"), Some(200));
        assert!(log.remove_listener(id));
        log.record(Some("https://example.com/second"), Some(200));

        assert_eq!(seen.lock().unwrap().len(), 1);
        // Removing twice reports failure but does not panic
        assert!(!log.remove_listener(id));
    }

    #[test]
    fn test_format_entry_with_status() {
        let entry = ResponseEntry {
            url: "https://example.com/".to_string(),
            status: Some(404),
            elapsed: Duration::from_millis(1500),
        };
        assert_eq!(format_entry(&entry), "1.500s https://example.com/ 404");
    }

    #[test]
    fn test_format_entry_defaults_status_to_dash() {
        let entry = ResponseEntry {
            url: "https://example.com/".to_string(),
            status: None,
            elapsed: Duration::from_millis(250),
        };
        assert_eq!(format_entry(&entry), "0.250s https://example.com/ -");
    }

    #[test]
    fn test_mark_navigation_rewinds_clock() {
        let (log, seen) = collecting_log();

        std::thread::sleep(Duration::from_millis(20));
        log.mark_navigation();
        log.record(Some("https://example.com/"), Some(200));

        let seen = seen.lock().unwrap();
        assert!(seen[0].elapsed < Duration::from_millis(20));
    }
}
