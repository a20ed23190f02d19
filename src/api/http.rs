use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::blockchain::ScanEngine;
use crate::error::ApiError;
use crate::logging::LogContext;
use crate::models::Transaction;

pub const NOT_FOUND_MESSAGE: &str = "No transactions found for the given address";
pub const ADDRESS_REQUIRED_MESSAGE: &str = "Address is required";

/// Body of `POST /subscribe`
#[derive(Debug, Deserialize)]
pub struct SubscribeRequest {
    #[serde(default)]
    pub address: String,
}

/// `{"status": ..., "message": ...}` reply used by `POST /subscribe`
#[derive(Debug, Serialize)]
pub struct StatusMessage {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl StatusMessage {
    fn success() -> Self {
        Self { status: "success".to_string(), message: None }
    }

    fn error(message: &str) -> Self {
        Self { status: "error".to_string(), message: Some(message.to_string()) }
    }
}

#[derive(Debug, Serialize)]
pub struct CurrentBlockResponse {
    pub current_block: u64,
}

/// Wire shape of a recorded transaction
#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    pub hash: String,
    pub from: String,
    pub to: String,
    pub value: String,
    pub incoming: bool,
}

impl From<Transaction> for TransactionResponse {
    fn from(tx: Transaction) -> Self {
        let incoming = tx.is_incoming();
        Self {
            hash: tx.hash,
            from: tx.from.into_string(),
            to: tx.to.into_string(),
            value: tx.value,
            incoming,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
    pub scan_cursor: u64,
    pub chain_head: u64,
    pub subscriptions: usize,
    pub recorded_transactions: usize,
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ScanEngine>,
    pub log: LogContext,
}

impl AppState {
    pub fn new(engine: Arc<ScanEngine>, log: &LogContext) -> Self {
        Self {
            engine,
            log: log.for_component("http"),
        }
    }
}

/// Routes of the public API
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/subscribe", post(subscribe))
        .route("/current-block", get(get_current_block))
        .route("/status", get(get_status))
        .route("/transactions", get(missing_address))
        .route("/transactions/", get(missing_address))
        .route("/transactions/:address", get(get_transactions))
        .layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
        .with_state(state)
}

/// HTTP API server
pub struct ApiServer {
    state: AppState,
    pub host: String,
    pub port: u16,
}

impl ApiServer {
    pub fn new(state: AppState, host: &str, port: u16) -> Self {
        Self {
            state,
            host: host.to_string(),
            port,
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Serve until `shutdown` resolves
    pub async fn start<F>(&self, shutdown: F) -> Result<(), ApiError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = build_router(self.state.clone());
        let addr = self.address();

        let listener = TcpListener::bind(&addr).await.map_err(|e| ApiError::Bind {
            addr: addr.clone(),
            reason: e.to_string(),
        })?;

        self.state
            .log
            .for_operation("start")
            .with_metadata("address", json!(addr))
            .info(&format!("HTTP API server starting on {}", addr));

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| ApiError::Server(e.to_string()))?;

        self.state.log.for_operation("stop").info("HTTP API server stopped");
        Ok(())
    }
}

/// POST /subscribe
pub async fn subscribe(
    State(state): State<AppState>,
    payload: Result<Json<SubscribeRequest>, JsonRejection>,
) -> (StatusCode, Json<StatusMessage>) {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            state
                .log
                .for_operation("subscribe")
                .warn(&format!("Rejected subscribe body: {}", rejection));
            return (StatusCode::BAD_REQUEST, Json(StatusMessage::error("Invalid request body")));
        }
    };

    if request.address.trim().is_empty() {
        return (StatusCode::BAD_REQUEST, Json(StatusMessage::error(ADDRESS_REQUIRED_MESSAGE)));
    }

    if state.engine.subscribe(&request.address) {
        (StatusCode::OK, Json(StatusMessage::success()))
    } else {
        (StatusCode::CONFLICT, Json(StatusMessage::error("Address already subscribed")))
    }
}

/// GET /current-block
pub async fn get_current_block(State(state): State<AppState>) -> Json<CurrentBlockResponse> {
    let current_block = state.engine.get_current_block().await;
    Json(CurrentBlockResponse { current_block })
}

/// GET /transactions/{address}
///
/// Runs a scan for the address, then answers with everything recorded for
/// it so far. An empty log is a 404 whether or not the address is subscribed.
pub async fn get_transactions(
    Path(address): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Vec<TransactionResponse>>, (StatusCode, &'static str)> {
    if address.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, ADDRESS_REQUIRED_MESSAGE));
    }

    let context = state.log.for_operation("get_transactions").with_address(&address);
    match state.engine.get_transactions(&address).await {
        Some(new_matches) => context.debug(&format!("Scan found {} matches", new_matches.len())),
        None => context.warn("Scan unavailable, serving recorded transactions only"),
    }

    let recorded = state.engine.recorded_transactions(&address);
    if recorded.is_empty() {
        return Err((StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE));
    }

    Ok(Json(recorded.into_iter().map(TransactionResponse::from).collect()))
}

/// GET /transactions and GET /transactions/ without an address
pub async fn missing_address() -> (StatusCode, &'static str) {
    (StatusCode::BAD_REQUEST, ADDRESS_REQUIRED_MESSAGE)
}

/// GET /status
pub async fn get_status(State(state): State<AppState>) -> Json<StatusResponse> {
    let engine = &state.engine;
    Json(StatusResponse {
        status: "healthy".to_string(),
        scan_cursor: engine.cursor(),
        chain_head: engine.last_known_head(),
        subscriptions: engine.store().subscription_count(),
        recorded_transactions: engine.store().transaction_count(),
    })
}
