use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::blockchain::chain_reader::{Block, ChainReader};
use crate::error::RpcError;
use crate::logging::{LogContext, MetricsLogger, PerformanceMonitor};

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    method: &'a str,
    params: Vec<Value>,
    id: u64,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

/// JSON-RPC 2.0 client for an Ethereum-compatible node
pub struct RpcClient {
    client: Client,
    endpoint: String,
    next_id: AtomicU64,
    log: LogContext,
}

impl RpcClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration, log: &LogContext) -> Result<Self, RpcError> {
        let endpoint = endpoint.into();
        let log = log.for_component("rpc_client");
        log.for_operation("initialization")
            .with_metadata("endpoint", json!(endpoint))
            .with_metadata("timeout_seconds", json!(timeout.as_secs()))
            .info("Initializing RPC client");

        let client = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            endpoint,
            next_id: AtomicU64::new(1),
            log,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn make_request(&self, method: &str, params: Vec<Value>) -> Result<Value, RpcError> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
        };

        self.log
            .for_operation("make_request")
            .with_metadata("method", json!(method))
            .trace(&format!("Sending RPC request: {}", method));

        let response = self.client.post(&self.endpoint).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RpcError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let body = response.bytes().await?;
        let rpc_response: JsonRpcResponse = serde_json::from_slice(&body)?;

        if let Some(error) = rpc_response.error {
            return Err(RpcError::Method {
                code: error.code,
                message: error.message,
            });
        }

        Ok(rpc_response.result)
    }

    /// Run one RPC call with timing and metrics around it
    async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value, RpcError> {
        let monitor = PerformanceMonitor::new(&self.log, method);
        let result = self.make_request(method, params).await;
        let duration = monitor.finish_with_result(&result);
        MetricsLogger::log_rpc_call(&self.log, method, duration, result.is_ok());
        result
    }

    pub async fn get_latest_block_number(&self) -> Result<u64, RpcError> {
        let result = self.call("eth_blockNumber", vec![]).await?;

        let hex_string = result
            .as_str()
            .ok_or_else(|| RpcError::InvalidResponse("Block number is not a string".to_string()))?;
        let block_number = parse_hex_to_u64(hex_string)?;

        self.log
            .for_operation("get_latest_block_number")
            .with_block_number(block_number)
            .debug(&format!("Retrieved latest block number: {}", block_number));
        Ok(block_number)
    }

    pub async fn get_block(&self, block_number: u64) -> Result<Block, RpcError> {
        let params = vec![
            Value::String(format!("0x{:x}", block_number)),
            Value::Bool(true), // full transaction objects
        ];

        let result = self.call("eth_getBlockByNumber", params).await?;
        if result.is_null() {
            return Err(RpcError::BlockNotFound { block_number });
        }

        let block: Block = serde_json::from_value(result)?;

        self.log
            .for_operation("get_block")
            .with_block_number(block_number)
            .with_metadata("transaction_count", json!(block.transactions.len()))
            .debug(&format!(
                "Retrieved block {} with {} transactions",
                block_number,
                block.transactions.len()
            ));
        Ok(block)
    }
}

#[async_trait]
impl ChainReader for RpcClient {
    async fn fetch_current_block(&self) -> Result<u64, RpcError> {
        self.get_latest_block_number().await
    }

    async fn fetch_block_by_number(&self, block_number: u64) -> Result<Block, RpcError> {
        self.get_block(block_number).await
    }
}

/// Parse an `0x`-prefixed (or bare) hex quantity
pub fn parse_hex_to_u64(hex_str: &str) -> Result<u64, RpcError> {
    let trimmed = hex_str.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    u64::from_str_radix(digits, 16).map_err(|e| RpcError::HexParse {
        value: hex_str.to_string(),
        reason: e.to_string(),
    })
}
