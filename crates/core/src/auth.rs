//! Authentication gate.
//!
//! The workflow never handles credentials. When the site redirects to
//! its login flow, the run pauses, tells the operator to sign in using
//! the visible browser window, and resumes on Enter. Cookie presence
//! is reported for observability but only the URL decides the gate.

use std::io::{BufRead, Write};

use tracing::{info, warn};

use crate::error::{Result, WorkflowError};
use crate::selectors::{AUTH_TOKEN_COOKIE, COMPOSE_URL, CSRF_COOKIE, LOGIN_PATH_MARKER};
use crate::session::Session;
use crate::snapshot::StoredCookie;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthCookieStatus {
    pub has_auth_token: bool,
    pub has_csrf: bool,
}

impl AuthCookieStatus {
    /// Both cookies present; either alone is not authenticated.
    pub fn authenticated(&self) -> bool {
        self.has_auth_token && self.has_csrf
    }
}

pub fn inspect_cookies(cookies: &[StoredCookie]) -> AuthCookieStatus {
    AuthCookieStatus {
        has_auth_token: cookies.iter().any(|c| c.name == AUTH_TOKEN_COOKIE),
        has_csrf: cookies.iter().any(|c| c.name == CSRF_COOKIE),
    }
}

/// Logs cookie names and domains. Values never reach the log.
pub fn log_cookie_report(cookies: &[StoredCookie]) {
    let status = inspect_cookies(cookies);
    info!(
        target = "xpost.auth",
        total = cookies.len(),
        auth_token = status.has_auth_token,
        csrf = status.has_csrf,
        "cookie report"
    );
    for cookie in cookies {
        info!(
            target = "xpost.auth",
            name = %cookie.name,
            domain = %cookie.domain,
            "cookie present"
        );
    }
}

pub fn is_login_url(url: &str) -> bool {
    url.contains(LOGIN_PATH_MARKER)
}

/// Outcome of [`pass_gate`]. `Unconfirmed` means the operator resumed
/// but the page still looks like the login flow; the workflow proceeds
/// anyway and lets element location produce the real diagnosis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    Authenticated,
    Unconfirmed,
}

/// Navigates to the compose surface and, if the site bounced to its
/// login flow, pauses for a manual sign-in before one re-navigation.
pub async fn pass_gate(session: &Session) -> Result<AuthOutcome> {
    session.goto(COMPOSE_URL).await?;
    let url = session.current_url().await?;
    if !is_login_url(&url) {
        return Ok(AuthOutcome::Authenticated);
    }

    info!(target = "xpost.auth", url = %url, "login flow detected, pausing for operator");
    println!("Login required. Sign in using the browser window, then press Enter here.");
    wait_for_operator().await?;

    session.goto(COMPOSE_URL).await?;
    let url = session.current_url().await?;
    if is_login_url(&url) {
        warn!(
            target = "xpost.auth",
            url = %url,
            "still on login flow after operator resume, proceeding anyway"
        );
        return Ok(AuthOutcome::Unconfirmed);
    }
    Ok(AuthOutcome::Authenticated)
}

/// Blocks until the operator presses Enter on stdin. The blocking read
/// runs on the blocking pool so the runtime (and signal handling) stay
/// live while we wait.
pub async fn wait_for_operator() -> Result<()> {
    tokio::task::spawn_blocking(|| {
        let _ = std::io::stdout().flush();
        let mut line = String::new();
        std::io::stdin()
            .lock()
            .read_line(&mut line)
            .map(|_| ())
            .map_err(|e| WorkflowError::OperatorWait(e.to_string()))
    })
    .await
    .map_err(|e| WorkflowError::OperatorWait(format!("stdin task failed: {e}")))?
}
