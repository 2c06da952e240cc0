//! Target-site contract: URLs, cookie names and selector candidates.
//!
//! Everything in this module is an external assumption about x.com's
//! markup and routing. The site changes without notice; the candidate
//! lists are ordered from the expected `data-testid` markers down to
//! permissive fallbacks, and the location engine dumps a full
//! diagnostic report when none of them match.

use crate::locate::Target;

pub const COMPOSE_URL: &str = "https://x.com/compose/post";
pub const COMPOSE_PATH: &str = "/compose/post";
pub const LOGIN_FLOW_URL: &str = "https://x.com/i/flow/login";
pub const LOGIN_PATH_MARKER: &str = "/login";

/// Joint presence of both cookies is the sole authenticated-state
/// signal; either one alone means "not authenticated".
pub const AUTH_TOKEN_COOKIE: &str = "auth_token";
pub const CSRF_COOKIE: &str = "ct0";

pub const TWEET_TEXTBOX: Target = Target {
    name: "tweet textbox",
    failure_code: "TWEET_TEXTBOX_NOT_FOUND_IN_ANY_FRAME",
    candidates: &[
        r#"[data-testid="tweetTextarea_0"]"#,
        r#"[data-testid="tweetTextarea_0"] div[contenteditable="true"]"#,
        r#"div[contenteditable="true"][role="textbox"]"#,
        r#"div[contenteditable="true"]"#,
    ],
};

pub const POST_BUTTON: Target = Target {
    name: "post button",
    failure_code: "TWEET_BUTTON_NOT_FOUND_IN_ANY_FRAME",
    candidates: &[
        r#"[data-testid="tweetButton"]"#,
        r#"[data-testid="tweetButtonInline"]"#,
        r#"button[data-testid="tweetButton"]"#,
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidate_lists_lead_with_testid_markers() {
        assert!(TWEET_TEXTBOX.candidates[0].contains("tweetTextarea_0"));
        assert!(POST_BUTTON.candidates[0].contains("tweetButton"));
    }

    #[test]
    fn compose_url_contains_compose_path() {
        assert!(COMPOSE_URL.contains(COMPOSE_PATH));
    }
}
