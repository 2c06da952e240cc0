//! Human-in-the-loop posting workflow for X.
//!
//! The crate drives a persistent Chrome session over CDP: it reuses a
//! durable profile directory, pauses for manual login when the target
//! site asks for it, locates the compose controls across shadow DOM and
//! frames under a time budget, performs the fill/submit interaction and
//! classifies completion heuristically. The login flow additionally
//! snapshots cookie/storage state on every termination path.

pub mod auth;
pub mod config;
pub mod element;
pub mod error;
pub mod guard;
pub mod interact;
mod js;
pub mod locate;
pub mod selectors;
pub mod session;
pub mod snapshot;
pub mod verify;
pub mod workflow;

pub use config::SessionConfig;
pub use error::{Result, WorkflowError};
pub use verify::PostOutcome;
pub use workflow::LoginOutcome;
