use dashmap::{DashMap, DashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::models::{Address, Transaction};

/// In-memory registry of subscribed addresses and their transaction logs.
///
/// Both maps are sharded, so writers touching different addresses rarely
/// contend. Each per-address log is only mutated while its shard's write lock
/// is held, which means a reader sees an append entirely or not at all.
#[derive(Debug, Default)]
pub struct TransactionStore {
    subscriptions: DashSet<Address>,
    transactions: DashMap<Address, Vec<Transaction>>,
    recorded: AtomicUsize,
}

impl TransactionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an address. Returns `false` if it was already subscribed.
    pub fn subscribe(&self, address: impl Into<Address>) -> bool {
        self.subscriptions.insert(address.into())
    }

    pub fn is_subscribed(&self, address: impl Into<Address>) -> bool {
        self.subscriptions.contains(&address.into())
    }

    /// Append a transaction to the address's log. No uniqueness check.
    pub fn record_transaction(&self, address: impl Into<Address>, tx: Transaction) {
        self.transactions.entry(address.into()).or_default().push(tx);
        self.recorded.fetch_add(1, Ordering::Relaxed);
    }

    /// Snapshot of the address's log in discovery order. Empty if unknown.
    pub fn get_transactions(&self, address: impl Into<Address>) -> Vec<Transaction> {
        self.transactions
            .get(&address.into())
            .map(|log| log.value().clone())
            .unwrap_or_default()
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Total number of log entries across all addresses
    pub fn transaction_count(&self) -> usize {
        self.recorded.load(Ordering::Relaxed)
    }
}
