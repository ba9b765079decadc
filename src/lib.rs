//! Pocketbook keeps a personal finance ledger (counterparties, debts, income,
//! expenses and payment due-dates) and drives it through a scriptable shell.

pub mod cli;
pub mod errors;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Pocketbook tracing initialized.");
    });
}
