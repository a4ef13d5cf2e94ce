//! Applies one batch of transfers to the ledger.

use crate::ledger::LedgerStore;
use crate::transaction::Transaction;

/// Applies every transfer in `batch`: debit side first, then credit side.
///
/// Touches no state besides `ledger`, so any number of batches may run at
/// once against the same store.
pub fn apply_batch(ledger: &LedgerStore, batch: &[Transaction]) {
    for tx in batch {
        ledger.apply_debit(&tx.debit_account, tx.amount_minor_units());
        ledger.apply_credit(&tx.credit_account, tx.amount_minor_units());
    }
}
