use crate::error::Result;
use rusqlite::{params, Connection};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::error::LedgerError;

/// Default database file, relative to the working directory
pub const DEFAULT_DB_PATH: &str = "finance.db";

// ============================================================================
// KIND
// ============================================================================

/// Income/Expense classification of a transaction
///
/// Stored records keep whatever capitalisation they were entered with, so
/// comparisons against a `Kind` always ignore case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Income,
    Expense,
}

impl Kind {
    pub const ALL: [Kind; 2] = [Kind::Income, Kind::Expense];

    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Income => "Income",
            Kind::Expense => "Expense",
        }
    }

    /// Case-insensitive lookup; `None` for anything that is not a known kind
    pub fn parse(value: &str) -> Option<Kind> {
        Kind::ALL.into_iter().find(|kind| kind.matches(value))
    }

    pub fn matches(&self, value: &str) -> bool {
        value.eq_ignore_ascii_case(self.as_str())
    }

    pub fn toggle(self) -> Kind {
        match self {
            Kind::Income => Kind::Expense,
            Kind::Expense => Kind::Income,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Kind {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        Kind::parse(s.trim())
            .ok_or_else(|| LedgerError::validation(format!("Unknown transaction type: {}", s)))
    }
}

// ============================================================================
// TRANSACTION
// ============================================================================

/// One ledger row. Records are append-only: nothing updates or deletes them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    /// Engine-assigned rowid, only used for ordering
    #[serde(skip_serializing)]
    pub id: i64,

    #[serde(rename = "Type")]
    pub kind: String,

    #[serde(rename = "Category")]
    pub category: String,

    #[serde(rename = "Amount")]
    pub amount: f64,
}

impl Transaction {
    /// Known kind of this record, matched case-insensitively
    pub fn kind(&self) -> Option<Kind> {
        Kind::parse(&self.kind)
    }
}

// ============================================================================
// SQL HELPERS
// ============================================================================

pub fn ensure_schema(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS transactions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            kind TEXT NOT NULL,
            category TEXT NOT NULL,
            amount REAL NOT NULL
        )",
        [],
    )?;

    Ok(())
}

/// Insert one record and return the id the engine assigned to it
pub fn insert_transaction(conn: &Connection, kind: &str, category: &str, amount: f64) -> Result<i64> {
    conn.execute(
        "INSERT INTO transactions (kind, category, amount) VALUES (?1, ?2, ?3)",
        params![kind, category, amount],
    )?;

    Ok(conn.last_insert_rowid())
}

pub fn get_all_transactions(conn: &Connection) -> Result<Vec<Transaction>> {
    let mut stmt = conn.prepare(
        "SELECT id, kind, category, amount
         FROM transactions
         ORDER BY id ASC",
    )?;

    let transactions = stmt
        .query_map([], |row| {
            Ok(Transaction {
                id: row.get(0)?,
                kind: row.get(1)?,
                category: row.get(2)?,
                amount: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(transactions)
}

// ============================================================================
// LEDGER STORE
// ============================================================================

/// File-backed ledger
///
/// Holds only the database path. Every operation opens its own connection and
/// drops it before returning; there is no pooling and no shared handle.
#[derive(Debug, Clone)]
pub struct Ledger {
    path: PathBuf,
}

impl Ledger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(&self) -> Result<Connection> {
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        Ok(conn)
    }

    /// Create the transactions table if it is absent. Safe to call repeatedly.
    pub fn ensure_schema(&self) -> Result<()> {
        let conn = self.connect()?;
        ensure_schema(&conn)?;
        tracing::debug!(path = %self.path.display(), "schema ready");
        Ok(())
    }

    pub fn append(&self, kind: &str, category: &str, amount: f64) -> Result<()> {
        let conn = self.connect()?;
        let id = insert_transaction(&conn, kind, category, amount)?;
        tracing::debug!(id, kind, category, amount, "transaction appended");
        Ok(())
    }

    /// Full snapshot in insertion order
    pub fn list_all(&self) -> Result<Vec<Transaction>> {
        let conn = self.connect()?;
        let transactions = get_all_transactions(&conn)?;
        tracing::debug!(count = transactions.len(), "loaded snapshot");
        Ok(transactions)
    }

    /// Append and re-read the full snapshot inside one SQLite transaction, so
    /// the returned rows are exactly the state right after this insert.
    pub fn append_and_snapshot(&self, kind: &str, category: &str, amount: f64) -> Result<Vec<Transaction>> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;

        let id = insert_transaction(&tx, kind, category, amount)?;
        let snapshot = get_all_transactions(&tx)?;
        tx.commit()?;

        tracing::debug!(id, kind, category, amount, count = snapshot.len(), "transaction recorded");
        Ok(snapshot)
    }
}
