mod login;
mod post;

use crate::cli::{Cli, Commands};

/// Runs the selected command and returns the process exit code. Every
/// path emits exactly one result envelope on stdout first.
pub async fn dispatch(cli: Cli) -> i32 {
    let config = cli.session_config();
    match cli.command {
        Commands::Post { text } => post::execute(&config, &text).await,
        Commands::Login => login::execute(&config).await,
    }
}
