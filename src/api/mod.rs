pub mod cli;
pub mod http;

pub use cli::{Cli, CliError, CliHandler, Commands};
pub use http::{
    build_router, get_current_block, get_status, get_transactions, subscribe, ApiServer,
    AppState, CurrentBlockResponse, StatusResponse, TransactionResponse,
};
