pub mod dedup_tracker;
pub mod transaction_store;


pub use dedup_tracker::{DedupTracker, RecordKey};
pub use transaction_store::TransactionStore;
