//! Typed payloads for the few CDP commands this crate issues directly
//!
//! Protocol semantics stay entirely with the external client; these structs
//! only name the methods and carry their parameters through the client's
//! transport via its [`Method`] trait.

use headless_chrome::protocol::cdp::types::Method;
use serde::{Deserialize, Serialize};

/// `Page.enable` — required before page-level notifications and scripts
#[derive(Serialize, Debug, Clone)]
pub struct PageEnable {}

impl Method for PageEnable {
    const NAME: &'static str = "Page.enable";
    type ReturnObject = serde_json::Value;
}

/// `Network.enable` — turns on network-event notifications for the tab
#[derive(Serialize, Debug, Clone)]
pub struct NetworkEnable {}

impl Method for NetworkEnable {
    const NAME: &'static str = "Network.enable";
    type ReturnObject = serde_json::Value;
}

/// `Page.addScriptToEvaluateOnNewDocument` — run `source` before any page
/// script on every new document in the tab
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AddScriptToEvaluateOnNewDocument {
    pub source: String,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AddScriptReturnObject {
    pub identifier: String,
}

impl Method for AddScriptToEvaluateOnNewDocument {
    const NAME: &'static str = "Page.addScriptToEvaluateOnNewDocument";
    type ReturnObject = AddScriptReturnObject;
}

/// `Page.removeScriptToEvaluateOnNewDocument` — unregister by identifier
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RemoveScriptToEvaluateOnNewDocument {
    pub identifier: String,
}

impl Method for RemoveScriptToEvaluateOnNewDocument {
    const NAME: &'static str = "Page.removeScriptToEvaluateOnNewDocument";
    type ReturnObject = serde_json::Value;
}
