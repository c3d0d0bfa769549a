// CSV export of a ledger snapshot
//
// Fields are written without quoting. A category containing a comma produces
// an extra column on that line; the format has always behaved this way.

use crate::amount::format_amount;
use crate::db::{Ledger, Transaction};
use crate::error::{ExportError, Result};
use csv::{QuoteStyle, Terminator, WriterBuilder};
use serde::Serialize;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tempfile::{Builder, NamedTempFile};

/// Default export file, relative to the working directory
pub const DEFAULT_EXPORT_PATH: &str = "expenses.csv";

pub const HEADER: [&str; 3] = ["Type", "Category", "Amount"];

#[derive(Serialize)]
struct ExportRow<'a> {
    kind: &'a str,
    category: &'a str,
    amount: String,
}

impl<'a> From<&'a Transaction> for ExportRow<'a> {
    fn from(tx: &'a Transaction) -> Self {
        Self {
            kind: &tx.kind,
            category: &tx.category,
            amount: format_amount(tx.amount),
        }
    }
}

fn line_terminator() -> Terminator {
    if cfg!(windows) {
        Terminator::CRLF
    } else {
        Terminator::Any(b'\n')
    }
}

/// Write the header and one line per record, in snapshot order
pub fn write_records<W: Write>(records: &[Transaction], writer: W) -> Result<()> {
    let mut wtr = WriterBuilder::new()
        .has_headers(false)
        .quote_style(QuoteStyle::Never)
        .terminator(line_terminator())
        .from_writer(writer);

    wtr.write_record(HEADER)?;
    for tx in records {
        wtr.serialize(ExportRow::from(tx))?;
    }
    wtr.flush()?;

    Ok(())
}

/// Temporary file next to `destination`. Created with the mode a plain
/// `File::create` would get (0o666 minus the umask).
fn staging_file(destination: &Path) -> io::Result<NamedTempFile> {
    let dir = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut builder = Builder::new();
    builder.prefix(".export-");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o666));
    }

    builder.tempfile_in(dir)
}

/// Export `records` to `destination`, replacing any previous file.
///
/// Rows go to a temporary file next to the destination which is then renamed
/// over it, so a failed export leaves the old file (or nothing) in place. An
/// existing destination keeps its permissions.
pub fn export(records: &[Transaction], destination: &Path) -> Result<()> {
    let mut staged = staging_file(destination)?;
    write_records(records, staged.as_file_mut())?;
    staged.as_file().sync_all()?;

    if let Ok(existing) = fs::metadata(destination) {
        staged.as_file().set_permissions(existing.permissions())?;
    }
    staged
        .persist(destination)
        .map_err(|e| ExportError::Io(e.error))?;

    tracing::info!(rows = records.len(), path = %destination.display(), "exported transactions");
    Ok(())
}

impl Ledger {
    /// Take a fresh snapshot from the store and export it. Returns the row count.
    pub fn export_to(&self, destination: &Path) -> Result<usize> {
        let records = self.list_all()?;
        export(&records, destination)?;
        Ok(records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LedgerError;
    use std::fs;

    fn tx(kind: &str, category: &str, amount: f64) -> Transaction {
        Transaction {
            id: 0,
            kind: kind.to_string(),
            category: category.to_string(),
            amount,
        }
    }

    fn nl() -> &'static str {
        if cfg!(windows) {
            "\r\n"
        } else {
            "\n"
        }
    }

    #[test]
    fn test_export_fidelity() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("expenses.csv");
        let records = vec![tx("Income", "Salary", 1000.0), tx("Expense", "Rent", 450.5)];

        export(&records, &path).unwrap();

        let expected = ["Type,Category,Amount", "Income,Salary,1000.00", "Expense,Rent,450.50"]
            .iter()
            .map(|line| format!("{}{}", line, nl()))
            .collect::<String>();
        assert_eq!(fs::read_to_string(&path).unwrap(), expected);
    }

    #[test]
    fn test_empty_snapshot_writes_header_only() {
        let mut out = Vec::new();
        write_records(&[], &mut out).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), format!("Type,Category,Amount{}", nl()));
    }

    #[test]
    fn test_amount_rounding_and_sign() {
        let records = vec![
            tx("Expense", "Fee", 0.125),
            tx("Expense", "Fee", 1.005),
            tx("Expense", "Fee", 2.675),
            tx("Expense", "Fee", 0.375),
            tx("income", "Refund", -3.0),
        ];
        let mut out = Vec::new();
        write_records(&records, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text.lines().skip(1).collect::<Vec<_>>(),
            vec![
                "Expense,Fee,0.13",
                "Expense,Fee,1.01",
                "Expense,Fee,2.68",
                "Expense,Fee,0.38",
                "income,Refund,-3.00",
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_overwrite_keeps_destination_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("expenses.csv");
        fs::write(&path, "old\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o640)).unwrap();

        export(&[], &path).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o640);
    }

    #[cfg(unix)]
    #[test]
    fn test_fresh_export_mode_follows_umask() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let reference = dir.path().join("reference.csv");
        fs::File::create(&reference).unwrap();
        let path = dir.path().join("expenses.csv");

        export(&[], &path).unwrap();

        let mode = |p: &Path| fs::metadata(p).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode(&path), mode(&reference));
    }

    #[test]
    fn test_commas_in_category_are_not_escaped() {
        let mut out = Vec::new();
        write_records(&[tx("Expense", "Food, Drinks", 12.0)], &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().nth(1), Some("Expense,Food, Drinks,12.00"));
    }

    #[test]
    fn test_export_overwrites_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("expenses.csv");
        fs::write(&path, "stale contents that are much longer than the new export\n").unwrap();

        export(&[tx("Income", "Salary", 10.0)], &path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().collect::<Vec<_>>(), vec!["Type,Category,Amount", "Income,Salary,10.00"]);
    }

    #[test]
    fn test_unwritable_destination_is_export_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no_such_dir").join("expenses.csv");

        let err = export(&[tx("Income", "Salary", 10.0)], &path).unwrap_err();
        assert!(matches!(err, LedgerError::Export(_)));
        assert!(!path.exists());
    }

    #[test]
    fn test_ledger_export_to_uses_fresh_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = Ledger::new(dir.path().join("finance.db"));
        ledger.ensure_schema().unwrap();
        ledger.append("Income", "Salary", 1000.0).unwrap();
        ledger.append("Expense", "Rent", 450.5).unwrap();

        let path = dir.path().join("out.csv");
        let rows = ledger.export_to(&path).unwrap();

        assert_eq!(rows, 2);
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(
            text.lines().collect::<Vec<_>>(),
            vec!["Type,Category,Amount", "Income,Salary,1000.00", "Expense,Rent,450.50"]
        );
    }
}
