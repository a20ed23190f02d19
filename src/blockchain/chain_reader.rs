use async_trait::async_trait;
use serde::Deserialize;

use crate::error::RpcError;

/// Read access to the chain, as needed by the scan engine.
///
/// Every call may fail transiently; callers decide whether a failure is fatal.
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Height of the latest block known to the node
    async fn fetch_current_block(&self) -> Result<u64, RpcError>;

    /// Block at `block_number` with its full transaction list, in block order
    async fn fetch_block_by_number(&self, block_number: u64) -> Result<Block, RpcError>;
}

/// A block as returned by `eth_getBlockByNumber(_, true)`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Block {
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(default)]
    pub transactions: Vec<RawTransaction>,
}

impl Block {
    pub fn new(block_number: u64, transactions: Vec<RawTransaction>) -> Self {
        Self {
            number: Some(format!("0x{:x}", block_number)),
            hash: None,
            transactions,
        }
    }
}

/// A transaction object inside a block, as the node reports it
#[derive(Debug, Clone, Deserialize)]
pub struct RawTransaction {
    pub hash: String,
    pub from: String,
    /// `None` for contract creation
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub value: String,
}

impl RawTransaction {
    pub fn new(hash: &str, from: &str, to: &str, value: &str) -> Self {
        Self {
            hash: hash.to_string(),
            from: from.to_string(),
            to: Some(to.to_string()),
            value: value.to_string(),
        }
    }

    /// The transferred amount as a decimal string.
    ///
    /// Nodes report `value` as a hex quantity; anything without a `0x` prefix
    /// is assumed to be decimal already. Values that do not fit in 128 bits
    /// are passed through untouched.
    pub fn decimal_value(&self) -> String {
        let raw = self.value.trim();
        let digits = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
            Some(digits) => digits,
            None => return raw.to_string(),
        };
        if digits.is_empty() {
            return "0".to_string();
        }
        u128::from_str_radix(digits, 16)
            .map(|v| v.to_string())
            .unwrap_or_else(|_| raw.to_string())
    }
}
