//! Concurrent account store for one aggregation run.

use crate::account::{AccountAggregate, AccountEntry};
use crate::transaction::AccountId;
use dashmap::DashMap;
use std::sync::Arc;

/// Shared mapping from account id to its live entry.
///
/// Entries are created lazily the first time an account is referenced and
/// exactly once, no matter how many workers race on it. The map shard is only
/// locked for the lookup; the returned entry is updated under its own lock.
#[derive(Debug, Default)]
pub struct LedgerStore {
    accounts: DashMap<AccountId, Arc<AccountEntry>>,
}

impl LedgerStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        LedgerStore {
            accounts: DashMap::new(),
        }
    }

    /// Returns the entry for `account`, registering a zeroed one if absent.
    pub fn get_or_create(&self, account: &AccountId) -> Arc<AccountEntry> {
        if let Some(entry) = self.accounts.get(account) {
            return Arc::clone(entry.value());
        }

        // Insert-if-absent under the shard lock; a racing creator loses and
        // observes the winner's entry.
        let entry = self
            .accounts
            .entry(account.clone())
            .or_insert_with(|| Arc::new(AccountEntry::new(account.clone())));
        Arc::clone(entry.value())
    }

    /// Applies one outgoing transfer to `account`.
    pub fn apply_debit(&self, account: &AccountId, amount_minor_units: i64) {
        self.get_or_create(account).debit(amount_minor_units);
    }

    /// Applies one incoming transfer to `account`.
    pub fn apply_credit(&self, account: &AccountId, amount_minor_units: i64) {
        self.get_or_create(account).credit(amount_minor_units);
    }

    /// Returns every account ordered by id ascending.
    ///
    /// Only meaningful once all writers have finished; callers reach this
    /// through the completion barrier.
    pub fn snapshot(&self) -> Vec<AccountAggregate> {
        let mut aggregates: Vec<AccountAggregate> = self
            .accounts
            .iter()
            .map(|entry| entry.value().aggregate())
            .collect();
        aggregates.sort_by(|a, b| a.account.cmp(&b.account));
        aggregates
    }

    /// Number of distinct accounts seen so far.
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}
