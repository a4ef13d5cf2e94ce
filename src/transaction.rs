//! Transaction models for CSV parsing and validated internal representation.

use crate::decimal::Money;
use crate::error::{EngineError, Result};
use serde::Deserialize;
use std::fmt;

/// Column names an input file must carry, in any order.
pub const EXPECTED_HEADERS: [&str; 3] = ["debitAccount", "creditAccount", "amount"];

/// An account identifier: exactly 26 characters, otherwise opaque.
///
/// Ordering is lexicographic on the underlying string, which is the order
/// reports are emitted in.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AccountId(String);

impl AccountId {
    /// Required identifier length in characters.
    pub const LENGTH: usize = 26;

    /// Wraps `value` if it is exactly [`AccountId::LENGTH`] characters long.
    pub fn parse(value: &str) -> Option<Self> {
        if value.chars().count() == Self::LENGTH {
            Some(AccountId(value.to_string()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Raw transfer record as read from CSV.
///
/// All fields are kept as strings so each one can be rejected with its own
/// error instead of a generic deserialization failure.
#[derive(Debug, Deserialize)]
pub struct TransactionRecord {
    /// Account the amount is taken from
    #[serde(rename = "debitAccount")]
    pub debit_account: String,

    /// Account the amount is paid into
    #[serde(rename = "creditAccount")]
    pub credit_account: String,

    /// Decimal amount, at most 2 decimal places
    pub amount: String,
}

impl TransactionRecord {
    /// Validates the raw record into a typed transaction.
    ///
    /// Checks run in a fixed order (debit account, credit account, amount) so
    /// the reported violation for a record is deterministic. Account ids are
    /// opaque and taken as given, padding included.
    pub fn validate(&self, row: usize) -> Result<Transaction> {
        let debit_account = AccountId::parse(&self.debit_account)
            .ok_or(EngineError::InvalidDebitAccount { row })?;
        let credit_account = AccountId::parse(&self.credit_account)
            .ok_or(EngineError::InvalidCreditAccount { row })?;
        let amount = Money::parse_amount(&self.amount).ok_or(EngineError::InvalidAmount { row })?;

        Ok(Transaction::new(debit_account, credit_account, amount))
    }
}

/// Checks that a header row names exactly the expected columns.
pub fn check_headers<'a, I>(headers: I) -> Result<()>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = Vec::with_capacity(EXPECTED_HEADERS.len());
    for header in headers {
        let header = header.trim();
        if !EXPECTED_HEADERS.iter().any(|h| *h == header) || seen.contains(&header) {
            return Err(EngineError::UnexpectedField {
                field: header.to_string(),
            });
        }
        seen.push(header);
    }

    if let Some(missing) = EXPECTED_HEADERS.iter().find(|h| !seen.contains(*h)) {
        return Err(EngineError::UnexpectedField {
            field: missing.to_string(),
        });
    }
    Ok(())
}

/// A validated transfer ready for aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub debit_account: AccountId,
    pub credit_account: AccountId,
    amount_minor_units: i64,
}

impl Transaction {
    /// Creates a transaction from already-validated parts.
    pub fn new(debit_account: AccountId, credit_account: AccountId, amount: Money) -> Self {
        // parse_amount caps the amount far below i64::MAX
        let amount_minor_units = amount.to_minor_units() as i64;
        Transaction {
            debit_account,
            credit_account,
            amount_minor_units,
        }
    }

    /// Transfer amount in hundredths of the currency unit; always positive.
    pub fn amount_minor_units(&self) -> i64 {
        self.amount_minor_units
    }

    pub fn amount(&self) -> Money {
        Money::from_minor_units(i128::from(self.amount_minor_units))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEBIT: &str = "32309111922661937852684864";
    const CREDIT: &str = "06105023389842834748547303";

    fn record(debit: &str, credit: &str, amount: &str) -> TransactionRecord {
        TransactionRecord {
            debit_account: debit.to_string(),
            credit_account: credit.to_string(),
            amount: amount.to_string(),
        }
    }

    #[test]
    fn test_validate_transfer() {
        let tx = record(DEBIT, CREDIT, "100.00").validate(2).unwrap();
        assert_eq!(tx.debit_account.as_str(), DEBIT);
        assert_eq!(tx.credit_account.as_str(), CREDIT);
        assert_eq!(tx.amount_minor_units(), 10000);
        assert_eq!(tx.amount().to_string(), "100.00");
    }

    #[test]
    fn test_validate_trims_amount_only() {
        let tx = record(DEBIT, CREDIT, " 1.5 ").validate(2).unwrap();
        assert_eq!(tx.amount_minor_units(), 150);
    }

    #[test]
    fn test_validate_rejects_padded_account_ids() {
        let err = record(&format!(" {} ", DEBIT), CREDIT, "1.00")
            .validate(2)
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidDebitAccount { row: 2 }));

        let err = record(DEBIT, &format!("{} ", CREDIT), "1.00")
            .validate(2)
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidCreditAccount { row: 2 }));
    }

    #[test]
    fn test_validate_rejects_short_debit_account() {
        let err = record(&DEBIT[..25], CREDIT, "1.00").validate(7).unwrap_err();
        assert!(matches!(err, EngineError::InvalidDebitAccount { row: 7 }));
    }

    #[test]
    fn test_validate_rejects_long_credit_account() {
        let long = format!("{}0", CREDIT);
        let err = record(DEBIT, &long, "1.00").validate(3).unwrap_err();
        assert!(matches!(err, EngineError::InvalidCreditAccount { row: 3 }));
    }

    #[test]
    fn test_validate_rejects_zero_amount() {
        let err = record(DEBIT, CREDIT, "0").validate(2).unwrap_err();
        assert!(matches!(err, EngineError::InvalidAmount { row: 2 }));
    }

    #[test]
    fn test_validate_reports_debit_before_amount() {
        let err = record("short", CREDIT, "0").validate(2).unwrap_err();
        assert!(matches!(err, EngineError::InvalidDebitAccount { .. }));
    }

    #[test]
    fn test_account_id_counts_characters() {
        let unicode: String = "ą".repeat(26);
        assert!(AccountId::parse(&unicode).is_some());
        assert!(AccountId::parse("").is_none());
    }

    #[test]
    fn test_check_headers() {
        assert!(check_headers(["debitAccount", "creditAccount", "amount"]).is_ok());
        assert!(check_headers(["amount", " debitAccount", "creditAccount"]).is_ok());

        let err = check_headers(["debitAccount", "creditAccount", "amount", "memo"]).unwrap_err();
        assert!(matches!(err, EngineError::UnexpectedField { ref field } if field == "memo"));

        let err = check_headers(["debitAccount", "amount"]).unwrap_err();
        assert!(matches!(err, EngineError::UnexpectedField { ref field } if field == "creditAccount"));

        let err = check_headers(["debitAccount", "debitAccount", "amount"]).unwrap_err();
        assert!(matches!(err, EngineError::UnexpectedField { ref field } if field == "debitAccount"));
    }
}
