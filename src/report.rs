//! Report building: a sorted, rendered view of a finished ledger.

use crate::account::AccountAggregate;
use crate::error::Result;
use crate::ledger::LedgerStore;
use std::io::Write;

/// Final per-account results of one aggregation run, sorted by account id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    accounts: Vec<AccountAggregate>,
}

impl Report {
    /// Snapshots `ledger`. Call only after the run's barrier has released.
    pub fn from_ledger(ledger: &LedgerStore) -> Self {
        Report {
            accounts: ledger.snapshot(),
        }
    }

    pub fn accounts(&self) -> &[AccountAggregate] {
        &self.accounts
    }

    /// Looks up one account by id.
    pub fn account(&self, account: &str) -> Option<&AccountAggregate> {
        self.accounts
            .binary_search_by(|a| a.account.as_str().cmp(account))
            .ok()
            .map(|idx| &self.accounts[idx])
    }

    /// Sum of all balances in minor units; zero for any valid input.
    pub fn total_balance_minor_units(&self) -> i128 {
        self.accounts.iter().map(|a| a.balance_minor_units).sum()
    }

    /// Writes the report as CSV.
    ///
    /// Columns are `account,debitCount,creditCount,balance`; balances carry
    /// exactly 2 decimal places.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        if self.accounts.is_empty() {
            csv_writer.write_record(["account", "debitCount", "creditCount", "balance"])?;
        }
        for account in &self.accounts {
            csv_writer.serialize(account.to_row())?;
        }

        csv_writer.flush()?;
        Ok(())
    }
}
