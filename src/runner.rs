//! The maintenance run itself.
//!
//! One pass: compute the cutoff, collect stale routers from the view, delete
//! them in a single batch, and fold the per-document outcomes into a
//! [`RunSummary`]. There is no retry anywhere; a revision conflict on one
//! document is counted as a failure and the run still completes.

use std::fmt;

use chrono::{DateTime, Duration, Utc};

use crate::{
    config::ConfigError,
    couch::{ConnectionError, CouchClient, DeleteDoc, DeleteOutcome, QueryError},
};

/// Timestamps are compared as strings against the `mtime` values the view is
/// keyed on, so the cutoff must render the same way those were written:
/// naive UTC ISO-8601 with microseconds.
const MTIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

#[derive(Debug, thiserror::Error)]
pub enum MaintenanceError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error(transparent)]
    Query(#[from] QueryError),
}

/// Results from a single maintenance run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Number of router documents deleted.
    pub deleted: usize,
    /// Number of documents whose deletion was rejected.
    pub failed: usize,
}

impl RunSummary {
    /// Total number of candidates the run attempted to delete.
    pub fn total(&self) -> usize {
        self.deleted + self.failed
    }

    fn from_outcomes(candidates: usize, outcomes: &[DeleteOutcome]) -> Self {
        let failed = outcomes.iter().filter(|o| !o.is_success()).count();
        Self {
            deleted: candidates - failed,
            failed,
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} documents have been deleted ({} failed).",
            self.deleted, self.failed
        )
    }
}

/// Cutoff for the view query: `now` minus the maximum age.
pub fn cutoff_timestamp(now: DateTime<Utc>, max_age_days: i64) -> String {
    (now - Duration::days(max_age_days))
        .format(MTIME_FORMAT)
        .to_string()
}

/// Run one maintenance pass against the given database.
pub async fn run(client: &CouchClient, max_age_days: i64) -> Result<RunSummary, QueryError> {
    let endkey = cutoff_timestamp(Utc::now(), max_age_days);

    tracing::info!(
        endkey = %endkey,
        max_age_days,
        "Querying routers not modified since cutoff"
    );

    let rows = client.stale_routers(&endkey).await?;
    if rows.is_empty() {
        tracing::info!("No stale routers to delete");
        return Ok(RunSummary::default());
    }

    let docs: Vec<DeleteDoc> = rows.into_iter().map(DeleteDoc::from).collect();
    tracing::info!(candidates = docs.len(), "Deleting stale routers");

    let outcomes = client.bulk_delete(&docs).await?;
    for outcome in &outcomes {
        if let DeleteOutcome::Failed { id, error, reason } = outcome {
            tracing::debug!(
                id = %id,
                error = %error,
                reason = reason.as_deref().unwrap_or(""),
                "Document deletion rejected"
            );
        }
    }

    let summary = RunSummary::from_outcomes(docs.len(), &outcomes);
    tracing::info!(
        deleted = summary.deleted,
        failed = summary.failed,
        "Maintenance run complete"
    );
    Ok(summary)
}
