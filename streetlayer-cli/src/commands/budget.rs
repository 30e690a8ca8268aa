//! Budget command - show persisted spend against the cap.

use streetlayer::budget::{BudgetStore, BudgetTracker};
use streetlayer::config::ConfigFile;

use super::common::format_money;
use crate::error::CliError;

/// Run the budget command.
pub fn run() -> Result<(), CliError> {
    let config = ConfigFile::load()?;
    let store = BudgetStore::new(config.budget.state_file.clone());
    let state = store.load();
    let tracker = BudgetTracker::new(config.budget.cap, config.budget.cost_per_request, state);

    println!("Budget file:      {}", store.path().display());
    println!("Cap:              {}", format_money(tracker.cap()));
    println!("Spent:            {}", format_money(state.cumulative_cost));
    println!("Requests:         {}", state.request_count);
    println!("Remaining:        {}", format_money(tracker.remaining_budget()));
    println!(
        "Affordable:       {} images at {} each",
        tracker.max_affordable(usize::MAX),
        format_money(tracker.cost_per_request())
    );

    Ok(())
}
