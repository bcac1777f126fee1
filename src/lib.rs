//! Maintenance jobs for LibreMap.
//!
//! The tool currently runs a single job: remove router documents whose
//! `mtime` is older than a configurable number of days. It queries the
//! `libremap-api/routers_by_mtime` view of a CouchDB database for expired
//! documents and deletes them in one `_bulk_docs` batch.

pub mod config;
pub mod couch;
pub mod runner;

pub use config::{ConfigError, CouchConfig, CouchesFile};
pub use couch::{ConnectionError, CouchClient, DeleteDoc, DeleteOutcome, QueryError, ViewRow};
pub use runner::{MaintenanceError, RunSummary, cutoff_timestamp, run};
