pub mod api;
pub mod blockchain;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod store;

pub use blockchain::{ChainReader, RpcClient, ScanEngine};
pub use config::AppConfig;
pub use error::{MonitorError, Result, RpcError};
pub use logging::{init_logging, LogContext};
pub use store::{DedupTracker, TransactionStore};
