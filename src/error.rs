use thiserror::Error;

/// Main error type for the transaction monitor
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

/// Errors returned by the upstream JSON-RPC node
#[derive(Error, Debug)]
pub enum RpcError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP error: {status} {reason}")]
    Status { status: u16, reason: String },

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("RPC method error: code={code}, message={message}")]
    Method { code: i64, message: String },

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Block not found: {block_number}")]
    BlockNotFound { block_number: u64 },

    #[error("Failed to parse hex value '{value}': {reason}")]
    HexParse { value: String, reason: String },
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not readable: {0}")]
    FileNotFound(String),

    #[error("Configuration parsing failed: {0}")]
    Parsing(String),

    #[error("Invalid URL format: {0}")]
    InvalidUrl(String),
}

/// HTTP server errors
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Failed to bind to {addr}: {reason}")]
    Bind { addr: String, reason: String },

    #[error("Server error: {0}")]
    Server(String),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, MonitorError>;

/// Error severity levels for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Process cannot continue
    Critical,
    /// A request could not be served
    High,
    /// Degraded result, the caller still gets an answer
    Medium,
    /// Mostly informational
    Low,
}

impl MonitorError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            MonitorError::Config(_) => ErrorSeverity::Critical,
            MonitorError::Api(ApiError::Bind { .. }) => ErrorSeverity::Critical,
            MonitorError::Api(_) => ErrorSeverity::High,
            MonitorError::Rpc(e) => e.severity(),
        }
    }
}

impl RpcError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            RpcError::BlockNotFound { .. } => ErrorSeverity::Low,
            RpcError::Http(_) | RpcError::Status { .. } => ErrorSeverity::High,
            _ => ErrorSeverity::Medium,
        }
    }

    /// Whether a later call has a reasonable chance of succeeding
    pub fn is_transient(&self) -> bool {
        match self {
            RpcError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            RpcError::Status { status, .. } => *status == 429 || *status >= 500,
            RpcError::BlockNotFound { .. } => true,
            RpcError::Method { .. }
            | RpcError::Json(_)
            | RpcError::InvalidResponse(_)
            | RpcError::HexParse { .. } => false,
        }
    }

    /// Short machine-readable code used in structured log lines
    pub fn error_code(&self) -> &'static str {
        match self {
            RpcError::Http(_) => "rpc_http",
            RpcError::Status { .. } => "rpc_status",
            RpcError::Json(_) => "rpc_json",
            RpcError::Method { .. } => "rpc_method",
            RpcError::InvalidResponse(_) => "rpc_invalid_response",
            RpcError::BlockNotFound { .. } => "rpc_block_not_found",
            RpcError::HexParse { .. } => "rpc_hex_parse",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rpc_error_display() {
        let err = RpcError::Method {
            code: -32601,
            message: "Method not found".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "RPC method error: code=-32601, message=Method not found"
        );

        let err = RpcError::BlockNotFound { block_number: 42 };
        assert_eq!(err.to_string(), "Block not found: 42");
    }

    #[test]
    fn test_monitor_error_wraps_rpc_error() {
        let err: MonitorError = RpcError::InvalidResponse("No result in response".to_string()).into();
        assert!(err.to_string().contains("No result in response"));
        assert_eq!(err.severity(), ErrorSeverity::Medium);
    }

    #[test]
    fn test_result_alias_converts_sub_errors() {
        fn bind() -> Result<()> {
            Err(ApiError::Bind { addr: "127.0.0.1:80".to_string(), reason: "denied".to_string() })?
        }
        let err = bind().unwrap_err();
        assert!(matches!(err, MonitorError::Api(ApiError::Bind { .. })));
        assert_eq!(err.severity(), ErrorSeverity::Critical);
    }

    #[test]
    fn test_severity_classification() {
        let config: MonitorError = ConfigError::InvalidUrl("ftp://node".to_string()).into();
        assert_eq!(config.severity(), ErrorSeverity::Critical);

        let status: MonitorError = RpcError::Status {
            status: 502,
            reason: "Bad Gateway".to_string(),
        }
        .into();
        assert_eq!(status.severity(), ErrorSeverity::High);

        let missing: MonitorError = RpcError::BlockNotFound { block_number: 7 }.into();
        assert_eq!(missing.severity(), ErrorSeverity::Low);
    }

    #[test]
    fn test_transient_classification() {
        assert!(RpcError::Status { status: 503, reason: "Service Unavailable".to_string() }.is_transient());
        assert!(RpcError::Status { status: 429, reason: "Too Many Requests".to_string() }.is_transient());
        assert!(!RpcError::Status { status: 400, reason: "Bad Request".to_string() }.is_transient());
        assert!(!RpcError::Method { code: -32602, message: "Invalid params".to_string() }.is_transient());
        assert!(!RpcError::HexParse { value: "0xzz".to_string(), reason: "invalid digit".to_string() }.is_transient());
    }

    #[test]
    fn test_error_codes_are_distinct() {
        let codes = [
            RpcError::Status { status: 500, reason: String::new() }.error_code(),
            RpcError::Method { code: 1, message: String::new() }.error_code(),
            RpcError::InvalidResponse(String::new()).error_code(),
            RpcError::BlockNotFound { block_number: 0 }.error_code(),
            RpcError::HexParse { value: String::new(), reason: String::new() }.error_code(),
        ];
        let unique: std::collections::HashSet<_> = codes.iter().collect();
        assert_eq!(unique.len(), codes.len());
    }
}
