//! Durable budget state.
//!
//! The state file is a two-line CSV:
//!
//! ```text
//! cumulative_cost,request_count
//! 12.341,1763
//! ```
//!
//! Floats are written with the shortest round-trip representation, so a
//! saved state loads back bit-identical.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

const HEADER: &str = "cumulative_cost,request_count";

/// Cumulative spend against the budget cap.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BudgetState {
    /// Total cost of all recorded requests
    pub cumulative_cost: f64,
    /// Number of recorded billable requests
    pub request_count: u64,
}

/// Reasons a budget state file could not be parsed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BudgetParseError {
    #[error("budget state is empty")]
    Empty,

    #[error("expected 'cumulative_cost,request_count' header, found '{0}'")]
    BadHeader(String),

    #[error("expected 'cost,count' row, found '{0}'")]
    BadRow(String),

    #[error("invalid cumulative cost '{0}'")]
    InvalidCost(String),

    #[error("invalid request count '{0}'")]
    InvalidCount(String),
}

impl BudgetState {
    pub fn new(cumulative_cost: f64, request_count: u64) -> Self {
        Self {
            cumulative_cost,
            request_count,
        }
    }

    /// Parses the state file contents.
    pub fn parse(content: &str) -> Result<Self, BudgetParseError> {
        let mut lines = content.lines().map(str::trim).filter(|l| !l.is_empty());

        let header = lines.next().ok_or(BudgetParseError::Empty)?;
        if header != HEADER {
            return Err(BudgetParseError::BadHeader(header.to_string()));
        }

        let row = lines.next().ok_or(BudgetParseError::Empty)?;
        let (cost, count) = row
            .split_once(',')
            .ok_or_else(|| BudgetParseError::BadRow(row.to_string()))?;

        let cumulative_cost = cost
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|c| c.is_finite() && *c >= 0.0)
            .ok_or_else(|| BudgetParseError::InvalidCost(cost.to_string()))?;
        let request_count = count
            .trim()
            .parse::<u64>()
            .map_err(|_| BudgetParseError::InvalidCount(count.to_string()))?;

        Ok(Self {
            cumulative_cost,
            request_count,
        })
    }

    /// Serializes the state in the file format.
    pub fn to_file_string(&self) -> String {
        format!(
            "{}\n{},{}\n",
            HEADER, self.cumulative_cost, self.request_count
        )
    }
}

/// Loads and saves [`BudgetState`] at a fixed path.
#[derive(Debug, Clone)]
pub struct BudgetStore {
    path: PathBuf,
}

impl BudgetStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the persisted state.
    ///
    /// A missing, unreadable or corrupt file resets to the zero state; this
    /// never fails.
    pub fn load(&self) -> BudgetState {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No budget state yet, starting from zero");
                return BudgetState::default();
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Cannot read budget state, starting from zero");
                return BudgetState::default();
            }
        };

        match BudgetState::parse(&content) {
            Ok(state) => {
                debug!(
                    path = %self.path.display(),
                    cumulative_cost = state.cumulative_cost,
                    request_count = state.request_count,
                    "Budget state loaded"
                );
                state
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Corrupt budget state, starting from zero");
                BudgetState::default()
            }
        }
    }

    /// Persists `state`, replacing the previous file atomically.
    pub fn save(&self, state: &BudgetState) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, state.to_file_string())?;
        std::fs::rename(&tmp, &self.path)?;

        debug!(
            path = %self.path.display(),
            cumulative_cost = state.cumulative_cost,
            request_count = state.request_count,
            "Budget state saved"
        );
        Ok(())
    }
}
