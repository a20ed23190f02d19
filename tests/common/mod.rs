#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use eth_tx_monitor::blockchain::{Block, ChainReader, RawTransaction, ScanEngine};
use eth_tx_monitor::error::RpcError;
use eth_tx_monitor::logging::LogContext;
use eth_tx_monitor::store::{DedupTracker, TransactionStore};

/// Scriptable in-memory chain
#[derive(Default)]
pub struct MockChain {
    height: AtomicU64,
    head_unavailable: AtomicBool,
    blocks: Mutex<HashMap<u64, Vec<RawTransaction>>>,
    failing_blocks: Mutex<HashSet<u64>>,
    block_fetches: AtomicUsize,
}

impl MockChain {
    pub fn new(height: u64) -> Arc<Self> {
        let chain = Self::default();
        chain.height.store(height, Ordering::SeqCst);
        Arc::new(chain)
    }

    pub fn set_height(&self, height: u64) {
        self.height.store(height, Ordering::SeqCst);
    }

    pub fn set_head_unavailable(&self, unavailable: bool) {
        self.head_unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn add_block(&self, block_number: u64, transactions: Vec<RawTransaction>) {
        self.blocks.lock().unwrap().insert(block_number, transactions);
    }

    pub fn fail_block(&self, block_number: u64) {
        self.failing_blocks.lock().unwrap().insert(block_number);
    }

    pub fn block_fetches(&self) -> usize {
        self.block_fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChainReader for MockChain {
    async fn fetch_current_block(&self) -> Result<u64, RpcError> {
        if self.head_unavailable.load(Ordering::SeqCst) {
            return Err(RpcError::Status {
                status: 503,
                reason: "Service Unavailable".to_string(),
            });
        }
        Ok(self.height.load(Ordering::SeqCst))
    }

    async fn fetch_block_by_number(&self, block_number: u64) -> Result<Block, RpcError> {
        self.block_fetches.fetch_add(1, Ordering::SeqCst);
        if self.failing_blocks.lock().unwrap().contains(&block_number) {
            return Err(RpcError::Method {
                code: -32000,
                message: format!("header not found for block {}", block_number),
            });
        }
        let transactions = self
            .blocks
            .lock()
            .unwrap()
            .get(&block_number)
            .cloned()
            .unwrap_or_default();
        Ok(Block::new(block_number, transactions))
    }
}

pub fn tx(hash: &str, from: &str, to: &str, value: &str) -> RawTransaction {
    RawTransaction::new(hash, from, to, value)
}

pub async fn engine_for(chain: &Arc<MockChain>) -> Arc<ScanEngine> {
    let reader: Arc<dyn ChainReader> = chain.clone();
    Arc::new(
        ScanEngine::new(
            reader,
            Arc::new(TransactionStore::new()),
            Arc::new(DedupTracker::new()),
            &LogContext::new("test", "setup"),
        )
        .await,
    )
}
