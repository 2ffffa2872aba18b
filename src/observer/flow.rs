// src/observer/flow.rs
//! HTTP flows reassembled from observed events

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One request/response exchange, paired by its nonce
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpFlow {
    /// Nonce shared by the request and its response
    pub nonce: String,

    /// HTTP method of the request
    pub method: String,

    /// Requested route
    pub route: String,

    /// Per-login security token seen with the request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssecurity: Option<String>,

    /// Plaintext request body
    pub req_body: String,

    /// Plaintext response body, empty until the response is seen
    pub res_body: String,

    /// When the request event arrived
    pub requested_at: DateTime<Utc>,

    /// When the response event arrived
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl HttpFlow {
    pub fn is_complete(&self) -> bool {
        self.completed_at.is_some()
    }

    /// Time between request and response, once complete
    pub fn elapsed(&self) -> Option<chrono::Duration> {
        self.completed_at.map(|done| done - self.requested_at)
    }
}
