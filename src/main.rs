// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use finance_tracker::logging::{self, LogTarget};
use finance_tracker::{compute_totals, format_amount, validate, Ledger, DEFAULT_DB_PATH, DEFAULT_EXPORT_PATH};

/// Personal income/expense tracker backed by SQLite.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// File path to the SQLite database.
    #[arg(long, env = "FINANCE_DB", default_value = DEFAULT_DB_PATH, global = true)]
    db: PathBuf,

    /// Append log output to this file. CLI commands log to stderr when unset.
    #[arg(long, env = "FINANCE_LOG", global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive form and table (default)
    Ui {
        /// Where "Export to CSV" writes.
        #[arg(long, default_value = DEFAULT_EXPORT_PATH)]
        export_path: PathBuf,
    },
    /// Record one transaction
    Add {
        /// Income or Expense (any case)
        kind: String,
        category: String,
        #[arg(allow_hyphen_values = true)]
        amount: String,
    },
    /// Print every transaction in insertion order
    List {
        /// Print the snapshot as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print total income, total expense and balance
    Totals,
    /// Write all transactions to a CSV file
    Export {
        #[arg(short, long, default_value = DEFAULT_EXPORT_PATH)]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let command = cli.command.unwrap_or(Command::Ui {
        export_path: PathBuf::from(DEFAULT_EXPORT_PATH),
    });

    let target = match (&command, cli.log_file.as_deref()) {
        (_, Some(path)) => LogTarget::File(path),
        (Command::Ui { .. }, None) => LogTarget::Off,
        (_, None) => LogTarget::Stderr,
    };
    logging::init(target)?;

    let ledger = Ledger::new(&cli.db);

    match command {
        Command::Ui { export_path } => run_ui_mode(ledger, export_path),
        Command::Add { kind, category, amount } => run_add(&ledger, &kind, &category, &amount),
        Command::List { json } => run_list(&ledger, json),
        Command::Totals => run_totals(&ledger),
        Command::Export { output } => run_export(&ledger, &output),
    }
}

fn open(ledger: &Ledger) -> Result<()> {
    ledger
        .ensure_schema()
        .with_context(|| format!("Error initializing database {}", ledger.path().display()))
}

fn run_add(ledger: &Ledger, kind: &str, category: &str, amount: &str) -> Result<()> {
    let new = validate(kind, category, amount)?;

    open(ledger)?;
    let snapshot = ledger.record(&new).context("Error adding transaction")?;

    println!("✓ Added {} {} {}", new.kind, new.category, format_amount(new.amount));
    println!("{}", compute_totals(&snapshot));

    Ok(())
}

fn run_list(ledger: &Ledger, json: bool) -> Result<()> {
    open(ledger)?;
    let transactions = ledger.list_all().context("Error loading transactions")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&transactions)?);
        return Ok(());
    }

    println!("{:<10} {:<30} {:>12}", "Type", "Category", "Amount");
    for tx in &transactions {
        println!("{:<10} {:<30} {:>12}", tx.kind, tx.category, format_amount(tx.amount));
    }

    Ok(())
}

fn run_totals(ledger: &Ledger) -> Result<()> {
    open(ledger)?;
    let transactions = ledger.list_all().context("Error loading transactions")?;

    println!("{}", compute_totals(&transactions));

    Ok(())
}

fn run_export(ledger: &Ledger, output: &Path) -> Result<()> {
    open(ledger)?;
    let rows = ledger.export_to(output).context("Error exporting CSV")?;

    println!("✓ Exported {} transactions to {}", rows, output.display());

    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(ledger: Ledger, export_path: PathBuf) -> Result<()> {
    let mut app = ui::App::new(ledger, export_path);
    ui::run_ui(&mut app)?;

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_ledger: Ledger, _export_path: PathBuf) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use the add / list / totals / export commands.");
    std::process::exit(1);
}
