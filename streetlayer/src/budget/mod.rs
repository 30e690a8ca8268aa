//! Monetary budget for billable imagery requests.
//!
//! The [`BudgetTracker`] is shared by every acquisition worker. All reads and
//! writes of the spend ledger happen under one mutex, so concurrent successes
//! are never lost and the cap is never overshot.
//!
//! Workers reserve a request slot before contacting the provider and commit
//! the reservation once the image is on disk. Dropping an uncommitted
//! reservation releases the slot.
//!
//! The tracker only changes the in-memory ledger. [`BudgetStore`] loads it once
//! at startup and saves it once at shutdown, so a crash loses at most the
//! spend recorded since the last save.

mod store;

pub use store::{BudgetParseError, BudgetState, BudgetStore};

use parking_lot::Mutex;
use std::sync::Arc;

/// Tolerance used when counting how many requests the remaining money covers.
///
/// Only applies to [`BudgetTracker::max_affordable`]. Admission checks compare
/// money directly so a request is never admitted with less than its cost left.
const AFFORD_EPSILON: f64 = 1e-9;

/// Default monetary cap across all runs.
pub const DEFAULT_BUDGET_CAP: f64 = 200.0;

/// Default cost of one billable image request.
pub const DEFAULT_COST_PER_REQUEST: f64 = 0.007;

#[derive(Debug)]
struct Ledger {
    state: BudgetState,
    reserved: u64,
}

/// Thread-safe spend tracker against a fixed cap.
#[derive(Debug)]
pub struct BudgetTracker {
    cap: f64,
    cost_per_request: f64,
    ledger: Mutex<Ledger>,
}

impl BudgetTracker {
    /// Creates a tracker starting from a previously persisted state.
    pub fn new(cap: f64, cost_per_request: f64, initial: BudgetState) -> Self {
        Self {
            cap,
            cost_per_request,
            ledger: Mutex::new(Ledger {
                state: initial,
                reserved: 0,
            }),
        }
    }

    pub fn cap(&self) -> f64 {
        self.cap
    }

    pub fn cost_per_request(&self) -> f64 {
        self.cost_per_request
    }

    /// Money left under the cap (`cap - cumulative_cost`).
    pub fn remaining_budget(&self) -> f64 {
        self.cap - self.ledger.lock().state.cumulative_cost
    }

    /// Whether one more request fits under the cap.
    pub fn can_afford_one(&self) -> bool {
        self.admits(&self.ledger.lock(), 0)
    }

    /// Records one successful billable request.
    pub fn record_success(&self) {
        let mut ledger = self.ledger.lock();
        ledger.state.request_count += 1;
        ledger.state.cumulative_cost += self.cost_per_request;
    }

    /// Caps `requested` at the number of requests the remaining budget covers.
    pub fn max_affordable(&self, requested: usize) -> usize {
        let affordable = self.affordable(&self.ledger.lock().state);
        requested.min(usize::try_from(affordable).unwrap_or(usize::MAX))
    }

    /// Reserves budget for one request.
    ///
    /// Returns `None` when the remaining budget, minus requests already
    /// reserved by in-flight workers, cannot cover another request.
    pub fn try_reserve(self: &Arc<Self>) -> Option<BudgetReservation> {
        let mut ledger = self.ledger.lock();
        if !self.admits(&ledger, ledger.reserved) {
            return None;
        }
        ledger.reserved += 1;
        Some(BudgetReservation {
            tracker: Arc::clone(self),
            committed: false,
        })
    }

    /// Number of reservations currently outstanding.
    pub fn reserved(&self) -> u64 {
        self.ledger.lock().reserved
    }

    /// Copy of the current ledger state.
    pub fn snapshot(&self) -> BudgetState {
        self.ledger.lock().state
    }

    /// Whether one more request fits after `reserved` outstanding ones.
    fn admits(&self, ledger: &Ledger, reserved: u64) -> bool {
        if self.cost_per_request <= 0.0 {
            return true;
        }
        let remaining = self.cap - ledger.state.cumulative_cost;
        remaining - reserved as f64 * self.cost_per_request >= self.cost_per_request
    }

    fn affordable(&self, state: &BudgetState) -> u64 {
        if self.cost_per_request <= 0.0 {
            return u64::MAX;
        }
        let remaining = self.cap - state.cumulative_cost;
        if remaining <= 0.0 {
            return 0;
        }
        (remaining / self.cost_per_request + AFFORD_EPSILON).floor() as u64
    }

    fn settle(&self, commit: bool) {
        let mut ledger = self.ledger.lock();
        ledger.reserved = ledger.reserved.saturating_sub(1);
        if commit {
            ledger.state.request_count += 1;
            ledger.state.cumulative_cost += self.cost_per_request;
        }
    }
}

/// One reserved request slot.
///
/// [`commit`](Self::commit) records the spend; dropping releases the slot.
#[derive(Debug)]
#[must_use = "dropping a reservation releases it without recording spend"]
pub struct BudgetReservation {
    tracker: Arc<BudgetTracker>,
    committed: bool,
}

impl BudgetReservation {
    /// Records the reserved request as spent.
    pub fn commit(mut self) {
        self.committed = true;
        self.tracker.settle(true);
    }
}

impl Drop for BudgetReservation {
    fn drop(&mut self) {
        if !self.committed {
            self.tracker.settle(false);
        }
    }
}
