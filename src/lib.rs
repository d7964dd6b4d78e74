#![doc(test(attr(deny(warnings))))]

//! Ledger Core keeps a personal-finance ledger consistent: income and expense
//! transactions with running totals, category budgets with cached spend, savings
//! plans, and the read-only views a front-end renders from them.

pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod errors;
pub mod ledger;
pub mod storage;
pub mod utils;

pub use errors::{LedgerError, Result};
pub use ledger::{Ledger, LedgerStore, StoreOptions};

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Ledger Core tracing initialized.");
    });
}
