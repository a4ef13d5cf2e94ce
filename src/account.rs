//! Per-account aggregate model.
//!
//! Maintains the invariant: `balance == Σ credits − Σ debits` over every
//! transfer applied to the account.

use crate::decimal::Money;
use crate::transaction::AccountId;
use parking_lot::Mutex;
use serde::Serialize;

/// Mutable counters of one account, always accessed under the entry lock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Counters {
    debit_count: u64,
    credit_count: u64,
    balance_minor_units: i128,
}

/// A live ledger entry shared between workers.
///
/// The debit/credit count and the balance are updated together under a
/// per-entry lock, so concurrent updates to the same account never tear and
/// updates to different accounts never contend.
#[derive(Debug)]
pub struct AccountEntry {
    account: AccountId,
    counters: Mutex<Counters>,
}

impl AccountEntry {
    /// Creates a new entry with zero counts and zero balance.
    pub fn new(account: AccountId) -> Self {
        AccountEntry {
            account,
            counters: Mutex::new(Counters::default()),
        }
    }

    pub fn account(&self) -> &AccountId {
        &self.account
    }

    /// Records an outgoing transfer: one more debit, balance decreases.
    pub fn debit(&self, amount_minor_units: i64) {
        let mut counters = self.counters.lock();
        counters.debit_count += 1;
        counters.balance_minor_units -= i128::from(amount_minor_units);
    }

    /// Records an incoming transfer: one more credit, balance increases.
    pub fn credit(&self, amount_minor_units: i64) {
        let mut counters = self.counters.lock();
        counters.credit_count += 1;
        counters.balance_minor_units += i128::from(amount_minor_units);
    }

    /// Copies the current state out of the entry.
    pub fn aggregate(&self) -> AccountAggregate {
        let counters = *self.counters.lock();
        AccountAggregate {
            account: self.account.clone(),
            debit_count: counters.debit_count,
            credit_count: counters.credit_count,
            balance_minor_units: counters.balance_minor_units,
        }
    }
}

/// Point-in-time view of one account, as produced by a ledger snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountAggregate {
    pub account: AccountId,
    pub debit_count: u64,
    pub credit_count: u64,

    /// Balance in hundredths of the currency unit.
    pub balance_minor_units: i128,
}

impl AccountAggregate {
    /// Balance rounded for display (2 decimals, half-to-even).
    pub fn balance(&self) -> Money {
        Money::from_minor_units(self.balance_minor_units)
    }

    /// Output row in the report's column layout.
    pub fn to_row(&self) -> AccountRow<'_> {
        AccountRow {
            account: self.account.as_str(),
            debit_count: self.debit_count,
            credit_count: self.credit_count,
            balance: self.balance(),
        }
    }
}

/// One rendered report line.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountRow<'a> {
    pub account: &'a str,
    pub debit_count: u64,
    pub credit_count: u64,
    pub balance: Money,
}
