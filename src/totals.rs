// Running totals over a ledger snapshot
//
// Always a full recompute from the snapshot the store returned; nothing here
// is cached between calls.

use crate::amount::format_amount;
use crate::db::{Kind, Transaction};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Totals {
    pub income: f64,
    pub expense: f64,
    pub balance: f64,
}

/// Sum income and expense amounts, matching kinds case-insensitively.
/// Records of any other kind count toward neither total.
pub fn compute_totals(records: &[Transaction]) -> Totals {
    let mut income = 0.0;
    let mut expense = 0.0;

    for record in records {
        match record.kind() {
            Some(Kind::Income) => income += record.amount,
            Some(Kind::Expense) => expense += record.amount,
            None => {}
        }
    }

    Totals {
        income,
        expense,
        balance: income - expense,
    }
}

impl fmt::Display for Totals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Total Income: {}  Total Expense: {}  Balance: {}",
            format_amount(self.income),
            format_amount(self.expense),
            format_amount(self.balance)
        )
    }
}
