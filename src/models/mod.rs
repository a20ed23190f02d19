pub mod address;
pub mod transaction;

pub use address::{normalize_address, Address};
pub use transaction::{Direction, Transaction};
