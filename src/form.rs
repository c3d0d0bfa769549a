// Input validation for the entry form
//
// The store accepts whatever it is given, so every front-end runs raw input
// through `validate` before calling it.

use crate::db::{Kind, Ledger, Transaction};
use crate::error::{LedgerError, Result};

pub const EMPTY_CATEGORY: &str = "Please enter a category.";
pub const INVALID_AMOUNT: &str = "Please enter a valid amount.";

/// A validated record, ready to append
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// Kind as the user entered it (case preserved, surrounding space trimmed)
    pub kind: String,
    pub category: String,
    pub amount: f64,
}

pub fn validate(kind: &str, category: &str, amount: &str) -> Result<NewTransaction> {
    let kind = kind.trim();
    kind.parse::<Kind>()?;

    let category = category.trim();
    if category.is_empty() {
        return Err(LedgerError::validation(EMPTY_CATEGORY));
    }

    let amount = match amount.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => return Err(LedgerError::validation(INVALID_AMOUNT)),
    };

    Ok(NewTransaction {
        kind: kind.to_string(),
        category: category.to_string(),
        amount,
    })
}

impl Ledger {
    /// Append a validated record and return the refreshed snapshot
    pub fn record(&self, new: &NewTransaction) -> Result<Vec<Transaction>> {
        self.append_and_snapshot(&new.kind, &new.category, new.amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_input() {
        let new = validate("Expense", "  Rent ", " 450.5 ").unwrap();

        assert_eq!(
            new,
            NewTransaction {
                kind: "Expense".to_string(),
                category: "Rent".to_string(),
                amount: 450.5,
            }
        );
    }

    #[test]
    fn test_kind_case_preserved() {
        let new = validate("income", "Gift", "20").unwrap();
        assert_eq!(new.kind, "income");
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let err = validate("Transfer", "Savings", "10").unwrap_err();
        assert_eq!(err.to_string(), "Unknown transaction type: Transfer");
    }

    #[test]
    fn test_empty_category_rejected() {
        for category in ["", "   ", "\t"] {
            let err = validate("Income", category, "10").unwrap_err();
            assert!(err.is_validation());
            assert_eq!(err.to_string(), EMPTY_CATEGORY);
        }
    }

    #[test]
    fn test_bad_amount_rejected() {
        for amount in ["", "abc", "12,50", "NaN", "inf", "-infinity"] {
            let err = validate("Expense", "Food", amount).unwrap_err();
            assert_eq!(err.to_string(), INVALID_AMOUNT, "amount {:?} should be rejected", amount);
        }
    }

    #[test]
    fn test_negative_amount_allowed() {
        let new = validate("Income", "Correction", "-25").unwrap();
        assert_eq!(new.amount, -25.0);
    }

    #[test]
    fn test_category_checked_before_amount() {
        let err = validate("Income", "", "abc").unwrap_err();
        assert_eq!(err.to_string(), EMPTY_CATEGORY);
    }

    #[test]
    fn test_record_appends_and_refreshes() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = Ledger::new(dir.path().join("finance.db"));
        ledger.ensure_schema().unwrap();

        let new = validate("Income", "Salary", "1000").unwrap();
        let snapshot = ledger.record(&new).unwrap();

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].kind, "Income");
        assert_eq!(snapshot[0].amount, 1000.0);
    }
}
