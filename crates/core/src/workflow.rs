//! End-to-end flows: post and login.
//!
//! Both flows own the session lifecycle: launch, drive, and close on
//! every path. The login flow additionally runs under the termination
//! guard so a Ctrl-C or SIGTERM during the manual sign-in still gets
//! its snapshot written before the browser goes away.

use std::path::Path;
use std::time::Duration;

use serde::Serialize;
use tracing::{error, info, warn};

use crate::auth;
use crate::config::SessionConfig;
use crate::error::{Result, WorkflowError};
use crate::guard::{self, Termination};
use crate::interact;
use crate::locate::{self, SearchBudget};
use crate::selectors::{LOGIN_FLOW_URL, POST_BUTTON, TWEET_TEXTBOX};
use crate::session::{Session, COOKIE_SETTLE};
use crate::verify::{self, PostOutcome};

const TEXTBOX_TIMEOUT: Duration = Duration::from_secs(10);
const BUTTON_TIMEOUT: Duration = Duration::from_secs(5);
const LOCATE_POLL: Duration = Duration::from_millis(300);

/// Posts `text` through the compose surface. The session is closed
/// before this returns, success or not.
pub async fn run_post(config: &SessionConfig, text: &str) -> Result<PostOutcome> {
    let session = Session::launch(config).await?;
    let result = post_inner(&session, text).await;
    session.close().await;
    result
}

async fn post_inner(session: &Session, text: &str) -> Result<PostOutcome> {
    match session.all_cookies().await {
        Ok(cookies) => auth::log_cookie_report(&cookies),
        Err(err) => warn!(target = "xpost.workflow", error = %err, "cookie report unavailable"),
    }

    auth::pass_gate(session).await?;

    let textbox = locate::locate(
        session.page(),
        &TWEET_TEXTBOX,
        &SearchBudget::starting_now(TEXTBOX_TIMEOUT, LOCATE_POLL),
    )
    .await?;
    interact::fill_text(session.page(), &textbox, text).await?;

    let button = locate::locate(
        session.page(),
        &POST_BUTTON,
        &SearchBudget::starting_now(BUTTON_TIMEOUT, LOCATE_POLL),
    )
    .await?;
    interact::click_action(&button).await?;

    verify::confirm_post(session).await
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct LoginOutcome {
    /// Both auth cookies were present at capture time.
    pub authenticated: bool,
    /// The flow was cut short by a signal rather than the operator
    /// finishing it.
    pub interrupted: bool,
}

/// Interactive login: opens the login flow, waits for the operator to
/// sign in, then snapshots cookies and storage. The snapshot and the
/// browser close both run on completion, interruption and fault alike.
pub async fn run_login(config: &SessionConfig) -> Result<LoginOutcome> {
    let session = Session::launch(config).await?;
    let termination = guard::run_until_terminated(login_inner(&session)).await;
    let authenticated = finalize(session, &config.snapshot_path).await;

    match termination {
        Termination::Completed(Ok(())) => Ok(LoginOutcome {
            authenticated,
            interrupted: false,
        }),
        Termination::Completed(Err(err)) => Err(err),
        Termination::Interrupted | Termination::Terminated => {
            info!(target = "xpost.workflow", authenticated, "login interrupted, state saved");
            Ok(LoginOutcome {
                authenticated,
                interrupted: true,
            })
        }
        Termination::Faulted(msg) => Err(WorkflowError::Fault(msg)),
    }
}

async fn login_inner(session: &Session) -> Result<()> {
    // Same post-launch report as the post flow: shows up front whether
    // the durable profile already carries the auth cookies.
    match session.all_cookies().await {
        Ok(cookies) => auth::log_cookie_report(&cookies),
        Err(err) => warn!(target = "xpost.workflow", error = %err, "cookie report unavailable"),
    }

    session.goto(LOGIN_FLOW_URL).await?;
    println!("Sign in using the browser window. Press Enter here when you are done.");
    auth::wait_for_operator().await?;

    // Let script-written cookies reach the network stack before capture.
    tokio::time::sleep(COOKIE_SETTLE).await;
    Ok(())
}

/// Runs the two teardown obligations independently: a snapshot failure
/// must not skip the browser close, and vice versa. Returns whether
/// the captured cookies amount to an authenticated session.
async fn finalize(session: Session, snapshot_path: &Path) -> bool {
    let mut authenticated = false;
    match session.capture_snapshot().await {
        Ok(snapshot) => {
            let status = auth::inspect_cookies(&snapshot.cookies);
            auth::log_cookie_report(&snapshot.cookies);
            authenticated = status.authenticated();
            if let Err(err) = snapshot.write_atomic(snapshot_path) {
                error!(target = "xpost.workflow", error = %err, "snapshot write failed");
            }
        }
        Err(err) => {
            error!(target = "xpost.workflow", error = %err, "snapshot capture failed");
        }
    }
    session.close().await;
    authenticated
}
