//! Run-scoped persistence of metadata and budget state.

use super::MetadataRecorder;
use crate::budget::{BudgetStore, BudgetTracker};
use chrono::{DateTime, TimeZone};
use std::fmt::Display;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Name of the metadata file for a run started at `started`.
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use streetlayer::metadata::metadata_filename;
///
/// let started = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
/// assert_eq!(metadata_filename(&started), "metadata_20240309_140507.csv");
/// ```
pub fn metadata_filename<Tz>(started: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!("metadata_{}.csv", started.format("%Y%m%d_%H%M%S"))
}

/// Owns everything that must be written once a run ends.
///
/// [`finish`](Self::finish) writes the metadata CSV and saves the budget
/// state. A session dropped without `finish` (early return, panic) performs
/// the same writes and logs any failure.
pub struct AcquisitionSession {
    recorder: MetadataRecorder,
    budget: Arc<BudgetTracker>,
    store: BudgetStore,
    metadata_path: PathBuf,
    finished: bool,
}

impl AcquisitionSession {
    pub fn new(budget: Arc<BudgetTracker>, store: BudgetStore, metadata_path: PathBuf) -> Self {
        Self {
            recorder: MetadataRecorder::new(),
            budget,
            store,
            metadata_path,
            finished: false,
        }
    }

    pub fn recorder(&self) -> &MetadataRecorder {
        &self.recorder
    }

    pub fn recorder_mut(&mut self) -> &mut MetadataRecorder {
        &mut self.recorder
    }

    pub fn metadata_path(&self) -> &Path {
        &self.metadata_path
    }

    /// Writes metadata and budget state.
    ///
    /// Returns whether a metadata file was written. Both writes are attempted
    /// even if the first fails; the first error is returned.
    pub fn finish(mut self) -> io::Result<bool> {
        self.persist()
    }

    fn persist(&mut self) -> io::Result<bool> {
        self.finished = true;

        let metadata = self.recorder.flush(&self.metadata_path);
        let state = self.budget.snapshot();
        let budget = self.store.save(&state);
        info!(
            cumulative_cost = state.cumulative_cost,
            request_count = state.request_count,
            "Session closed"
        );

        let written = metadata?;
        budget?;
        Ok(written)
    }
}

impl Drop for AcquisitionSession {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        warn!("Session dropped before finish, saving state");
        if let Err(e) = self.persist() {
            warn!(error = %e, "Failed to save session state");
        }
    }
}
