use tracing::error;
use xpost_core::{workflow, SessionConfig};

use crate::output::Envelope;

/// An interrupted login still exits 0: the snapshot was written and
/// the operator chose to stop. A login the operator completed without
/// the auth cookies appearing is a failure.
pub async fn execute(config: &SessionConfig) -> i32 {
    match workflow::run_login(config).await {
        Ok(outcome) if outcome.interrupted => {
            Envelope::logged_in(&outcome).emit();
            0
        }
        Ok(outcome) if outcome.authenticated => {
            Envelope::logged_in(&outcome).emit();
            0
        }
        Ok(_) => {
            Envelope::failure("AUTH_COOKIES_NOT_FOUND").emit();
            1
        }
        Err(err) => {
            error!(target = "xpost", error = %err, "login failed");
            Envelope::failure(err.code()).emit();
            1
        }
    }
}
