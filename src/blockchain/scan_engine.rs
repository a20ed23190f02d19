use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::blockchain::chain_reader::{ChainReader, RawTransaction};
use crate::error::MonitorError;
use crate::logging::{ErrorLogger, LogContext, MetricsLogger};
use crate::models::{Address, Direction, Transaction};
use crate::store::{DedupTracker, RecordKey, TransactionStore};

/// Scans blocks on demand for transactions touching a queried address.
///
/// There is no background polling: each call to
/// [`ScanEngine::get_transactions`] pulls every block from the cursor up to
/// the chain head, persists new matches for the queried address and for
/// every subscribed sender or receiver, then advances the cursor. Calls may
/// run concurrently; the cursor only ever moves forward and each
/// (address, hash) pair is recorded at most once.
pub struct ScanEngine {
    reader: Arc<dyn ChainReader>,
    store: Arc<TransactionStore>,
    dedup: Arc<DedupTracker>,
    cursor: AtomicU64,
    head: AtomicU64,
    log: LogContext,
}

impl ScanEngine {
    /// Build an engine, probing the chain once for the starting cursor.
    /// A failed probe starts the cursor at 0.
    pub async fn new(
        reader: Arc<dyn ChainReader>,
        store: Arc<TransactionStore>,
        dedup: Arc<DedupTracker>,
        log: &LogContext,
    ) -> Self {
        let log = log.for_component("scan_engine");
        let init = log.for_operation("initialization");

        let start = match reader.fetch_current_block().await {
            Ok(height) => {
                init.with_block_number(height)
                    .info(&format!("Fetched current block {} during initialization", height));
                height
            }
            Err(e) => {
                ErrorLogger::log_error(&init.with_error_code(e.error_code()), &MonitorError::from(e));
                0
            }
        };

        Self {
            reader,
            store,
            dedup,
            cursor: AtomicU64::new(start),
            head: AtomicU64::new(start),
            log,
        }
    }

    /// Last block height fully processed
    pub fn cursor(&self) -> u64 {
        self.cursor.load(Ordering::Acquire)
    }

    /// Last chain height observed, without a network round trip
    pub fn last_known_head(&self) -> u64 {
        self.head.load(Ordering::Acquire)
    }

    pub fn store(&self) -> &TransactionStore {
        &self.store
    }

    /// Current chain height, or the last known one if the node is unreachable
    pub async fn get_current_block(&self) -> u64 {
        let context = self.log.for_operation("get_current_block");
        match self.reader.fetch_current_block().await {
            Ok(height) => {
                self.head.store(height, Ordering::Release);
                context.with_block_number(height).debug(&format!("Current block updated to {}", height));
                height
            }
            Err(e) => {
                let stale = self.last_known_head();
                context
                    .with_error_code(e.error_code())
                    .with_block_number(stale)
                    .warn(&format!("Error fetching current block, serving last known {}: {}", stale, e));
                stale
            }
        }
    }

    pub fn subscribe(&self, address: &str) -> bool {
        let address = Address::new(address);
        let context = self.log.for_operation("subscribe").with_address(address.as_str());

        if self.store.subscribe(address.clone()) {
            context.info(&format!("Address {} successfully subscribed", address));
            true
        } else {
            context.warn(&format!("Address {} is already subscribed", address));
            false
        }
    }

    /// Everything recorded so far for `address`, in discovery order
    pub fn recorded_transactions(&self, address: &str) -> Vec<Transaction> {
        self.store.get_transactions(address)
    }

    /// Scan from the cursor to the chain head and return the transactions in
    /// that range involving `address`.
    ///
    /// Returns `None` only when the chain head cannot be read (or is 0).
    /// Blocks that fail to load are logged and skipped; the cursor still
    /// advances past them.
    pub async fn get_transactions(&self, address: &str) -> Option<Vec<Transaction>> {
        let address = Address::new(address);
        let context = self.log.for_operation("get_transactions").with_address(address.as_str());

        if address.is_empty() {
            context.warn("Refusing to scan for an empty address");
            return None;
        }

        let head = match self.reader.fetch_current_block().await {
            Ok(0) => {
                context.error("Node reported block height 0, skipping scan");
                return None;
            }
            Ok(height) => height,
            Err(e) => {
                ErrorLogger::log_error(&context.with_error_code(e.error_code()), &MonitorError::from(e));
                return None;
            }
        };
        self.head.store(head, Ordering::Release);

        let started = Instant::now();
        let from_block = self.cursor();
        let mut matches = Vec::new();
        let mut skipped_blocks = 0usize;

        for block_number in from_block..=head {
            let block = match self.reader.fetch_block_by_number(block_number).await {
                Ok(block) => block,
                Err(e) => {
                    skipped_blocks += 1;
                    context
                        .clone()
                        .with_block_number(block_number)
                        .with_error_code(e.error_code())
                        .with_metadata("transient", json!(e.is_transient()))
                        .error(&format!("Error fetching block {}: {}", block_number, e));
                    continue;
                }
            };

            for raw in &block.transactions {
                if let Some(tx) = self.process_transaction(&address, raw, block_number) {
                    matches.push(tx);
                }
            }
        }

        let previous = self.cursor.fetch_max(head, Ordering::AcqRel);
        if previous > head {
            context
                .clone()
                .with_metadata("cursor", json!(previous))
                .debug(&format!("Cursor already at {}, not moving back to {}", previous, head));
        }

        MetricsLogger::log_scan_completed(
            &self.log,
            address.as_str(),
            from_block,
            head,
            skipped_blocks,
            matches.len(),
            started.elapsed().as_millis() as u64,
        );

        Some(matches)
    }

    /// Classify one transaction against `address` and against any subscribed
    /// sender or receiver, recording it once per watching address. Only the
    /// match for `address` is returned.
    fn process_transaction(&self, address: &Address, raw: &RawTransaction, block_number: u64) -> Option<Transaction> {
        let from = Address::new(&raw.from);
        let to = Address::new(raw.to.as_deref().unwrap_or_default());

        let mut watchers = vec![address];
        for side in [&from, &to] {
            if !side.is_empty() && !watchers.contains(&side) && self.store.is_subscribed(side) {
                watchers.push(side);
            }
        }

        let value = raw.decimal_value();
        let mut queried = None;
        for watcher in watchers {
            let Some(direction) = Direction::classify(watcher, &from, &to) else {
                continue;
            };
            let tx = Transaction {
                hash: raw.hash.clone(),
                from: from.clone(),
                to: to.clone(),
                value: value.clone(),
                direction,
            };
            self.record_once(watcher, &tx, block_number);
            if watcher == address {
                queried = Some(tx);
            }
        }

        queried
    }

    fn record_once(&self, watcher: &Address, tx: &Transaction, block_number: u64) {
        if !self.dedup.try_mark(RecordKey::new(watcher, &tx.hash)) {
            return;
        }
        self.store.record_transaction(watcher, tx.clone());
        self.log
            .for_operation("record_transaction")
            .with_address(watcher.as_str())
            .with_transaction_hash(&tx.hash)
            .with_block_number(block_number)
            .with_metadata("direction", json!(tx.direction))
            .debug(&format!("Recorded {:?} transaction {}", tx.direction, tx.hash));
    }
}
