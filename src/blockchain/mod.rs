pub mod chain_reader;
pub mod rpc_client;
pub mod scan_engine;

pub use chain_reader::{Block, ChainReader, RawTransaction};
pub use rpc_client::{parse_hex_to_u64, RpcClient};
pub use scan_engine::ScanEngine;
