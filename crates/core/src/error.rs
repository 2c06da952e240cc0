use thiserror::Error;

pub type Result<T> = std::result::Result<T, WorkflowError>;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("browser launch failed: {0}")]
    Launch(String),

    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    /// The location engine exhausted its budget. The full diagnostic
    /// report has already been logged by the engine; `code` is the
    /// stable identifier surfaced in the result envelope.
    #[error("{code}")]
    ElementNotFound { code: &'static str },

    #[error("interaction on {selector} failed: {reason}")]
    Interaction { selector: String, reason: String },

    #[error("javascript evaluation failed: {0}")]
    Js(String),

    #[error("session snapshot failed: {0}")]
    Persistence(String),

    #[error("operator wait failed: {0}")]
    OperatorWait(String),

    /// A guarded flow panicked; carries the panic message.
    #[error("workflow fault: {0}")]
    Fault(String),

    #[error(transparent)]
    Cdp(#[from] chromiumoxide::error::CdpError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl WorkflowError {
    /// Stable error code for the structured result envelope.
    pub fn code(&self) -> String {
        match self {
            WorkflowError::Launch(_) => "BROWSER_LAUNCH_FAILED".to_string(),
            WorkflowError::Navigation { .. } => "NAVIGATION_FAILED".to_string(),
            WorkflowError::ElementNotFound { code } => (*code).to_string(),
            WorkflowError::Interaction { selector, reason } => {
                format!("INTERACTION_FAILED: {selector}: {reason}")
            }
            WorkflowError::Js(_) => "JS_EVAL_FAILED".to_string(),
            WorkflowError::Persistence(_) => "SNAPSHOT_FAILED".to_string(),
            WorkflowError::OperatorWait(_) => "OPERATOR_WAIT_FAILED".to_string(),
            WorkflowError::Fault(_) => "WORKFLOW_FAULT".to_string(),
            WorkflowError::Cdp(_) => "CDP_ERROR".to_string(),
            WorkflowError::Io(_) => "IO_ERROR".to_string(),
            WorkflowError::Json(_) => "INTERNAL_ERROR".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_not_found_code_is_surfaced_verbatim() {
        let err = WorkflowError::ElementNotFound {
            code: "TWEET_TEXTBOX_NOT_FOUND_IN_ANY_FRAME",
        };
        assert_eq!(err.code(), "TWEET_TEXTBOX_NOT_FOUND_IN_ANY_FRAME");
        assert_eq!(err.to_string(), "TWEET_TEXTBOX_NOT_FOUND_IN_ANY_FRAME");
    }

    #[test]
    fn interaction_failure_is_verbatim() {
        let err = WorkflowError::Interaction {
            selector: "[data-testid=\"tweetButton\"]".to_string(),
            reason: "click timed out".to_string(),
        };
        assert!(err.code().contains("click timed out"));
    }
}
