use std::path::PathBuf;

/// iPhone Safari user agent; the mobile compose surface renders a much
/// simpler DOM than the desktop one.
pub const MOBILE_USER_AGENT: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) \
     AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";

/// Launch-time configuration for a [`crate::session::Session`].
///
/// The profile directory is the durable browser state (cookies, local
/// storage, cache); the snapshot path is the separate cookie/storage
/// serialization written by the login flow.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub profile_dir: PathBuf,
    pub snapshot_path: PathBuf,
    pub headless: bool,
    pub chrome_executable: Option<PathBuf>,
    pub user_agent: String,
    pub accept_language: String,
    pub viewport: (u32, u32),
    pub device_scale_factor: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            profile_dir: PathBuf::from("./x-profile"),
            snapshot_path: PathBuf::from("./storageState.mobile.json"),
            headless: false,
            chrome_executable: None,
            user_agent: MOBILE_USER_AGENT.to_string(),
            accept_language: "ja-JP".to_string(),
            viewport: (430, 900),
            device_scale_factor: 3.0,
        }
    }
}
