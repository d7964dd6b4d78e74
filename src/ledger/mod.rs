//! Ledger state tree and the store that guards its invariants.

#[allow(clippy::module_inception)]
pub mod ledger;
pub mod store;

pub use ledger::{ledger_warnings, Ledger, Selection, Totals};
pub use store::{LedgerStore, StoreOptions};
