use tracing::error;
use xpost_core::{workflow, SessionConfig};

use crate::input;
use crate::output::Envelope;

pub async fn execute(config: &SessionConfig, text_args: &[String]) -> i32 {
    // Rejected before any browser launch.
    let Some(text) = input::gather(text_args) else {
        Envelope::failure("NO_TEXT").emit();
        return 1;
    };

    match workflow::run_post(config, &text).await {
        Ok(outcome) => {
            Envelope::posted(&outcome).emit();
            0
        }
        Err(err) => {
            error!(target = "xpost", error = %err, "post failed");
            Envelope::failure(err.code()).emit();
            1
        }
    }
}
