//! Read access to saved profiles.
//!
//! The profile editor saves every profile into one JSON object keyed by
//! profile name:
//!
//! ```json
//! {
//!   "work": {
//!     "programs": [ { "name": "Notepad", "path": "C:\\...\\notepad.exe" } ],
//!     "created_at": "",
//!     "modified_at": "1718000000"
//!   }
//! }
//! ```
//!
//! Only the `programs` list matters here; other keys are ignored.

use crate::profile::Profile;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Errors from loading profiles.
#[derive(Debug, thiserror::Error)]
pub enum ProfileStoreError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("profile {0:?} not found")]
    NotFound(String),
    #[error("profile {profile:?}: program #{position} has an empty executable path")]
    EmptyPath { profile: String, position: usize },
}

/// Source of profile definitions.
pub trait ProfileStore {
    /// Names of every stored profile, sorted.
    fn profile_names(&self) -> Result<Vec<String>, ProfileStoreError>;

    /// Load the profile called `name`.
    fn load_profile(&self, name: &str) -> Result<Profile, ProfileStoreError>;
}

/// A [`ProfileStore`] backed by the editor's `profiles.json` file.
///
/// The file is re-read on every call so edits made while the program runs
/// are picked up.
pub struct JsonProfileStore {
    path: PathBuf,
}

impl JsonProfileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// The filesystem path of the store.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, Profile>, ProfileStoreError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => {
                return Err(ProfileStoreError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        serde_json::from_str(&contents).map_err(|source| ProfileStoreError::Json {
            path: self.path.clone(),
            source,
        })
    }
}

impl ProfileStore for JsonProfileStore {
    fn profile_names(&self) -> Result<Vec<String>, ProfileStoreError> {
        Ok(self.read_all()?.into_keys().collect())
    }

    fn load_profile(&self, name: &str) -> Result<Profile, ProfileStoreError> {
        let mut profile = self
            .read_all()?
            .remove(name)
            .ok_or_else(|| ProfileStoreError::NotFound(name.to_string()))?;
        profile.name = name.to_string();
        if let Some(position) = profile
            .programs
            .iter()
            .position(|p| p.executable_path.trim().is_empty())
        {
            return Err(ProfileStoreError::EmptyPath {
                profile: profile.name,
                position: position + 1,
            });
        }
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::MonitorSelector;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Monotonic counter to generate unique file paths per test.
    static TEST_ID: AtomicU32 = AtomicU32::new(0);

    /// Helper: write `contents` to a unique temporary file.
    fn tmp_store(contents: &str) -> JsonProfileStore {
        let id = TEST_ID.fetch_add(1, Ordering::SeqCst);
        let path = std::env::temp_dir().join(format!(
            "winstage-test-{}-{}.json",
            std::process::id(),
            id
        ));
        std::fs::write(&path, contents).unwrap();
        JsonProfileStore::new(path)
    }

    const EDITOR_FILE: &str = r#"{
        "work": {
            "programs": [
                {
                    "name": "Notepad",
                    "path": "C:\\Windows\\System32\\notepad.exe",
                    "window_config": { "monitor": "secondary", "maximized": false,
                                       "x": 100, "y": 100, "width": 800, "height": 600 },
                    "start_minimized": false,
                    "avoid_duplicates": true
                },
                { "name": "Calc", "path": "C:\\Windows\\System32\\calc.exe" }
            ],
            "created_at": "",
            "modified_at": "1718000000"
        },
        "evening": { "programs": [] }
    }"#;

    #[test]
    fn loads_profile_by_name() {
        let store = tmp_store(EDITOR_FILE);
        let p = store.load_profile("work").unwrap();
        assert_eq!(p.name, "work");
        assert_eq!(p.programs.len(), 2);
        assert_eq!(p.programs[0].program_name(), "Notepad");
        let geo = p.programs[0].window_geometry.as_ref().unwrap();
        assert_eq!(geo.monitor_selector, MonitorSelector::Secondary);
        assert_eq!(p.programs[1].program_name(), "Calc");
        let _ = std::fs::remove_file(store.path());
    }

    #[test]
    fn lists_names_sorted() {
        let store = tmp_store(EDITOR_FILE);
        assert_eq!(store.profile_names().unwrap(), vec!["evening", "work"]);
        let _ = std::fs::remove_file(store.path());
    }

    #[test]
    fn unknown_profile_is_not_found() {
        let store = tmp_store(EDITOR_FILE);
        let err = store.load_profile("gaming").unwrap_err();
        assert!(matches!(err, ProfileStoreError::NotFound(ref n) if n == "gaming"));
        let _ = std::fs::remove_file(store.path());
    }

    #[test]
    fn missing_file_is_an_empty_store() {
        let store = JsonProfileStore::new(std::env::temp_dir().join("winstage-no-such-store.json"));
        assert!(store.profile_names().unwrap().is_empty());
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let store = tmp_store("not json at all");
        assert!(matches!(
            store.profile_names().unwrap_err(),
            ProfileStoreError::Json { .. }
        ));
        let _ = std::fs::remove_file(store.path());
    }

    #[test]
    fn empty_executable_path_is_rejected() {
        let store = tmp_store(r#"{ "bad": { "programs": [ { "path": "/usr/bin/a" }, { "path": " " } ] } }"#);
        let err = store.load_profile("bad").unwrap_err();
        assert!(matches!(err, ProfileStoreError::EmptyPath { position: 2, .. }));
        let _ = std::fs::remove_file(store.path());
    }
}
