//! Result envelope printed to stdout.
//!
//! Exactly one JSON object per invocation, on stdout; all logging goes
//! to stderr. Success envelopes carry the fields of the outcome they
//! report, failure envelopes carry a stable error code.
//!
//! ```json
//! {"ok":true,"posted":true,"url":"https://x.com/home"}
//! {"ok":true,"authenticated":true,"interrupted":false}
//! {"ok":false,"error":"TWEET_TEXTBOX_NOT_FOUND_IN_ANY_FRAME"}
//! ```

use serde::Serialize;
use xpost_core::workflow::LoginOutcome;
use xpost_core::PostOutcome;

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct Envelope {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub posted: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authenticated: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interrupted: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Envelope {
    pub fn posted(outcome: &PostOutcome) -> Self {
        Self {
            ok: true,
            posted: Some(outcome.posted),
            url: Some(outcome.url.clone()),
            authenticated: None,
            interrupted: None,
            error: None,
        }
    }

    pub fn logged_in(outcome: &LoginOutcome) -> Self {
        Self {
            ok: true,
            posted: None,
            url: None,
            authenticated: Some(outcome.authenticated),
            interrupted: Some(outcome.interrupted),
            error: None,
        }
    }

    pub fn failure(code: impl Into<String>) -> Self {
        Self {
            ok: false,
            posted: None,
            url: None,
            authenticated: None,
            interrupted: None,
            error: Some(code.into()),
        }
    }

    /// One line of JSON on stdout.
    pub fn emit(&self) {
        match serde_json::to_string(self) {
            Ok(json) => println!("{json}"),
            Err(err) => {
                // Unreachable for this struct shape; keep the contract
                // of exactly one stdout line regardless.
                println!("{{\"ok\":false,\"error\":\"ENVELOPE_SERIALIZATION_FAILED\"}}");
                tracing::error!(target = "xpost", error = %err, "envelope serialization failed");
            }
        }
    }
}
