//! Heuristic completion verification.
//!
//! The site offers no stable post-success marker, but a successful
//! submit always navigates away from the compose route. After a fixed
//! settle delay the current URL is classified: off the compose path
//! means posted. This misreads an error dialog that happens to
//! navigate, which is accepted; the reported URL lets the operator
//! audit the claim.

use std::time::Duration;

use serde::Serialize;
use tracing::info;

use crate::error::Result;
use crate::selectors::COMPOSE_PATH;
use crate::session::Session;

/// Time allowed for the post-submit navigation to land.
pub const COMPLETION_SETTLE: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PostOutcome {
    pub posted: bool,
    pub url: String,
}

pub fn classify_completion(url: &str) -> bool {
    !url.contains(COMPOSE_PATH)
}

/// Waits out the settle delay and classifies the landing URL.
pub async fn confirm_post(session: &Session) -> Result<PostOutcome> {
    tokio::time::sleep(COMPLETION_SETTLE).await;
    let url = session.current_url().await?;
    let posted = classify_completion(&url);
    info!(target = "xpost.verify", posted, url = %url, "completion classified");
    Ok(PostOutcome { posted, url })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaving_compose_route_counts_as_posted() {
        assert!(classify_completion("https://x.com/home"));
        assert!(classify_completion("https://x.com/username/status/123"));
    }

    #[test]
    fn remaining_on_compose_route_counts_as_not_posted() {
        assert!(!classify_completion("https://x.com/compose/post"));
        assert!(!classify_completion("https://x.com/compose/post?draft=1"));
    }

    #[test]
    fn any_navigation_off_compose_classifies_as_posted() {
        // URL-only classification cannot tell a success navigation from
        // any other navigation; the reported URL carries the evidence.
        assert!(classify_completion("https://x.com/i/flow/login"));
    }
}
