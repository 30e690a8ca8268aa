//! Process-wide shared state, passed explicitly.

use crate::budget::{BudgetState, BudgetTracker};
use crate::geometry::GeometryCache;
use std::sync::Arc;

/// State shared by every run in a process.
///
/// Created once at startup and handed to whatever needs it; nothing in the
/// library reaches for globals.
#[derive(Debug, Clone)]
pub struct AcquisitionContext {
    pub budget: Arc<BudgetTracker>,
    pub geometry: Arc<GeometryCache>,
}

impl AcquisitionContext {
    pub fn new(budget: Arc<BudgetTracker>, geometry: Arc<GeometryCache>) -> Self {
        Self { budget, geometry }
    }

    /// Context with a fresh geometry cache and a tracker seeded from `state`.
    pub fn with_budget(cap: f64, cost_per_request: f64, state: BudgetState) -> Self {
        Self::new(
            Arc::new(BudgetTracker::new(cap, cost_per_request, state)),
            Arc::new(GeometryCache::new()),
        )
    }
}
