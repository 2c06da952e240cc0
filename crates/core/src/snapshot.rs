//! Serialized session state.
//!
//! The snapshot is a self-contained record of cookies and per-origin
//! localStorage, written atomically so an interrupt mid-write can
//! never leave a truncated file where a previous good snapshot was.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Result, WorkflowError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredCookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,
    pub secure: bool,
    pub http_only: bool,
    pub session: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub same_site: Option<String>,
}

/// localStorage entries for one origin. BTreeMap keeps the file diff
/// stable across captures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OriginStorage {
    pub origin: String,
    pub entries: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub captured_at_unix: u64,
    pub cookies: Vec<StoredCookie>,
    pub origins: Vec<OriginStorage>,
}

impl SessionSnapshot {
    pub fn new(cookies: Vec<StoredCookie>, origins: Vec<OriginStorage>) -> Self {
        let captured_at_unix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self {
            captured_at_unix,
            cookies,
            origins,
        }
    }

    /// Writes via a sibling temp file plus rename. Rename is atomic on
    /// the same filesystem, so readers see either the old snapshot or
    /// the new one, never a partial write.
    pub fn write_atomic(&self, path: &Path) -> Result<()> {
        let payload = serde_json::to_vec_pretty(self)?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &payload).map_err(|e| {
            WorkflowError::Persistence(format!("write {}: {e}", tmp.display()))
        })?;
        std::fs::rename(&tmp, path).map_err(|e| {
            WorkflowError::Persistence(format!("rename into {}: {e}", path.display()))
        })?;
        info!(
            target = "xpost.snapshot",
            path = %path.display(),
            cookies = self.cookies.len(),
            origins = self.origins.len(),
            "session snapshot written"
        );
        Ok(())
    }

    pub fn read(path: &Path) -> Result<Self> {
        let payload = std::fs::read(path)?;
        Ok(serde_json::from_slice(&payload)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SessionSnapshot {
        SessionSnapshot::new(
            vec![StoredCookie {
                name: "auth_token".to_string(),
                value: "deadbeef".to_string(),
                domain: ".x.com".to_string(),
                path: "/".to_string(),
                secure: true,
                http_only: true,
                session: false,
                same_site: Some("None".to_string()),
            }],
            vec![OriginStorage {
                origin: "https://x.com".to_string(),
                entries: BTreeMap::from([("device_id".to_string(), "abc".to_string())]),
            }],
        )
    }

    #[test]
    fn round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        sample().write_atomic(&path).unwrap();

        let loaded = SessionSnapshot::read(&path).unwrap();
        assert_eq!(loaded.cookies.len(), 1);
        assert_eq!(loaded.cookies[0].name, "auth_token");
        assert_eq!(loaded.origins[0].origin, "https://x.com");
        assert!(loaded.captured_at_unix > 0);
    }

    #[test]
    fn overwrite_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        sample().write_atomic(&path).unwrap();
        sample().write_atomic(&path).unwrap();

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("state.json")]);
    }

    #[test]
    fn write_into_missing_directory_is_a_persistence_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope").join("state.json");
        let err = sample().write_atomic(&path).unwrap_err();
        assert_eq!(err.code(), "SNAPSHOT_FAILED");
    }
}
