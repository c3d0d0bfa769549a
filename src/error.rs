// Error types for the ledger core
//
// Every failure reaches the caller as a LedgerError carrying the underlying
// cause's message. Nothing here retries; front-ends decide how to show it.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    /// Malformed or empty form input, rejected before it reaches the store
    #[error("{0}")]
    Validation(String),

    /// Opening, initializing, reading or writing the SQLite database failed
    #[error("{0}")]
    Storage(#[from] rusqlite::Error),

    /// Opening or writing the export destination failed
    #[error("{0}")]
    Export(#[from] ExportError),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Csv(#[from] csv::Error),
}

impl LedgerError {
    pub fn validation(message: impl Into<String>) -> Self {
        LedgerError::Validation(message.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, LedgerError::Validation(_))
    }
}

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        LedgerError::Export(ExportError::Io(err))
    }
}

impl From<csv::Error> for LedgerError {
    fn from(err: csv::Error) -> Self {
        LedgerError::Export(ExportError::Csv(err))
    }
}

pub type Result<T, E = LedgerError> = std::result::Result<T, E>;
