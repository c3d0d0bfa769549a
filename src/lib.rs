// Finance Tracker - Core Library
// Ledger store, totals and CSV export, shared by the CLI, the TUI and tests

pub mod amount;
pub mod db;
pub mod error;
pub mod export;
pub mod form;
pub mod logging;
pub mod totals;

// Re-export commonly used types
pub use db::{
    Kind, Ledger, Transaction, DEFAULT_DB_PATH,
    ensure_schema, insert_transaction, get_all_transactions,
};
pub use amount::format_amount;
pub use error::{ExportError, LedgerError};
pub use export::{export, write_records, DEFAULT_EXPORT_PATH};
pub use form::{validate, NewTransaction};
pub use totals::{compute_totals, Totals};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
