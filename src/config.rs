//! Couch connection configuration.
//!
//! The tool is pointed at a JSON file mapping couch ids to connection
//! entries, selected on the command line with `--couch`:
//!
//! ```json
//! {
//!   "couches": {
//!     "production": {
//!       "database": "https://couch.example.org/libremap",
//!       "user": "maintenance",
//!       "pass": "secret"
//!     },
//!     "dev": { "database": "http://localhost:5984/libremap-dev" }
//!   }
//! }
//! ```

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read couches file {1}: {0}")]
    Io(std::io::Error, PathBuf),

    #[error("Failed to parse couches file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("No couch entry named {0:?} in couches file")]
    UnknownCouch(String),
}

/// The couches file as a whole.
///
/// Entries may carry extra keys beyond the ones modeled here; they are
/// ignored. A missing `database` field is a parse error.
#[derive(Debug, Clone, Deserialize)]
pub struct CouchesFile {
    pub couches: HashMap<String, CouchConfig>,
}

/// A single connection entry.
#[derive(Debug, Clone, Deserialize)]
pub struct CouchConfig {
    /// Full URL of the database, e.g. `http://couch.example.org/libremap`.
    pub database: String,
    /// Basic-auth username, if the database requires authentication.
    #[serde(default)]
    pub user: Option<String>,
    /// Basic-auth password.
    #[serde(default)]
    pub pass: Option<String>,
}

impl CouchesFile {
    /// Load and parse a couches file from disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(e, path.as_ref().to_path_buf()))?;

        Self::from_str(&contents)
    }

    /// Parse a couches file from a JSON string.
    pub fn from_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(contents)?)
    }

    /// Look up the entry for the given couch id.
    pub fn couch(&self, id: &str) -> Result<&CouchConfig, ConfigError> {
        self.couches
            .get(id)
            .ok_or_else(|| ConfigError::UnknownCouch(id.to_string()))
    }
}

impl CouchConfig {
    /// Whether this entry carries any credentials at all.
    ///
    /// Either field alone is enough; the original deployment configs
    /// sometimes set only `pass`.
    pub fn has_credentials(&self) -> bool {
        self.user.is_some() || self.pass.is_some()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const SAMPLE: &str = r#"{
        "couches": {
            "production": {
                "database": "https://couch.example.org/libremap",
                "user": "maintenance",
                "pass": "secret"
            },
            "dev": { "database": "http://localhost:5984/libremap-dev" }
        }
    }"#;

    #[test]
    fn parses_entries_with_and_without_credentials() {
        let file = CouchesFile::from_str(SAMPLE).unwrap();

        let prod = file.couch("production").unwrap();
        assert_eq!(prod.database, "https://couch.example.org/libremap");
        assert_eq!(prod.user.as_deref(), Some("maintenance"));
        assert_eq!(prod.pass.as_deref(), Some("secret"));
        assert!(prod.has_credentials());

        let dev = file.couch("dev").unwrap();
        assert_eq!(dev.database, "http://localhost:5984/libremap-dev");
        assert_eq!(dev.user, None);
        assert_eq!(dev.pass, None);
        assert!(!dev.has_credentials());
    }

    #[test]
    fn unknown_couch_id_is_an_error() {
        let file = CouchesFile::from_str(SAMPLE).unwrap();
        let err = file.couch("staging").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownCouch(ref id) if id == "staging"));
    }

    #[test]
    fn extra_keys_on_an_entry_are_ignored() {
        let file = CouchesFile::from_str(
            r#"{"couches": {"x": {"database": "http://x/db", "comment": "legacy"}}}"#,
        )
        .unwrap();
        assert_eq!(file.couch("x").unwrap().database, "http://x/db");
    }

    #[test]
    fn missing_database_field_is_a_parse_error() {
        let err = CouchesFile::from_str(r#"{"couches": {"x": {"user": "u"}}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = CouchesFile::from_str("{not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_reports_the_path() {
        let err = CouchesFile::from_file("/nonexistent/couch.json").unwrap_err();
        match err {
            ConfigError::Io(_, path) => {
                assert_eq!(path, PathBuf::from("/nonexistent/couch.json"));
            }
            other => panic!("expected Io error, got {other:?}"),
        }
    }

    #[test]
    fn loads_from_a_real_file() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(SAMPLE.as_bytes()).unwrap();

        let file = CouchesFile::from_file(tmp.path()).unwrap();
        assert_eq!(file.couches.len(), 2);
    }

    #[test]
    fn pass_only_entry_still_counts_as_credentials() {
        let file =
            CouchesFile::from_str(r#"{"couches": {"x": {"database": "http://x/db", "pass": "p"}}}"#)
                .unwrap();
        assert!(file.couch("x").unwrap().has_credentials());
    }
}
