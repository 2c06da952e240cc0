use clap::{Parser, Subcommand};
use std::path::PathBuf;

use xpost_core::SessionConfig;

#[derive(Parser, Debug)]
#[command(name = "xpost")]
#[command(about = "Human-in-the-loop posting for X from the command line")]
#[command(version)]
pub struct Cli {
    /// Increase verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Durable browser profile directory
    #[arg(long, global = true, value_name = "DIR", default_value = "./x-profile")]
    pub profile: PathBuf,

    /// Path for the cookie/storage snapshot written by `login`
    #[arg(
        long,
        global = true,
        value_name = "FILE",
        default_value = "./storageState.mobile.json"
    )]
    pub snapshot: PathBuf,

    /// Run the browser without a visible window. Manual login is
    /// impossible headless; only useful with an already-authenticated
    /// profile.
    #[arg(long, global = true)]
    pub headless: bool,

    /// Chrome/Chromium executable to launch instead of the detected one
    #[arg(long, global = true, value_name = "PATH")]
    pub chrome: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            profile_dir: self.profile.clone(),
            snapshot_path: self.snapshot.clone(),
            headless: self.headless,
            chrome_executable: self.chrome.clone(),
            ..SessionConfig::default()
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Post text through the compose surface
    Post {
        /// The text to post; multiple arguments are joined with
        /// spaces, and with none given stdin is read to EOF
        text: Vec<String>,
    },

    /// Open the login flow, wait for a manual sign-in, then snapshot
    /// the session state
    Login,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_collects_all_positional_text() {
        let cli = Cli::try_parse_from(["xpost", "post", "hello", "world"]).unwrap();
        match cli.command {
            Commands::Post { text } => assert_eq!(text, vec!["hello", "world"]),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn post_without_text_still_parses() {
        // The missing-text failure is reported through the result
        // envelope, not as a usage error.
        let cli = Cli::try_parse_from(["xpost", "post"]).unwrap();
        match cli.command {
            Commands::Post { text } => assert!(text.is_empty()),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn defaults_match_the_durable_profile_layout() {
        let cli = Cli::try_parse_from(["xpost", "login"]).unwrap();
        let config = cli.session_config();
        assert_eq!(config.profile_dir, PathBuf::from("./x-profile"));
        assert_eq!(
            config.snapshot_path,
            PathBuf::from("./storageState.mobile.json")
        );
        assert!(!config.headless);
    }

    #[test]
    fn overrides_reach_the_session_config() {
        let cli = Cli::try_parse_from([
            "xpost",
            "--profile",
            "/tmp/p",
            "--snapshot",
            "/tmp/s.json",
            "--headless",
            "post",
            "x",
        ])
        .unwrap();
        let config = cli.session_config();
        assert_eq!(config.profile_dir, PathBuf::from("/tmp/p"));
        assert_eq!(config.snapshot_path, PathBuf::from("/tmp/s.json"));
        assert!(config.headless);
    }
}
