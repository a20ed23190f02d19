use log::{debug, error, info, trace, warn, Level, LevelFilter};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use crate::config::LoggingConfig;
use crate::error::{ErrorSeverity, MonitorError};

/// Map a configured level name to a filter. Unknown names fall back to `info`.
pub fn parse_level(level: &str) -> LevelFilter {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" | "warning" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        _ => LevelFilter::Info,
    }
}

/// Structured logging context handed to each component at construction.
///
/// A context carries the component name, the operation currently being
/// performed, arbitrary metadata, and its own verbosity. Components derive
/// per-operation contexts from the one they were built with via
/// [`LogContext::for_operation`].
#[derive(Debug, Clone)]
pub struct LogContext {
    pub component: String,
    pub operation: String,
    pub metadata: HashMap<String, Value>,
    level: LevelFilter,
}

impl LogContext {
    pub fn new(component: &str, operation: &str) -> Self {
        Self {
            component: component.to_string(),
            operation: operation.to_string(),
            metadata: HashMap::new(),
            level: LevelFilter::Trace,
        }
    }

    pub fn with_level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }

    /// Context for another component, inheriting this context's verbosity
    pub fn for_component(&self, component: &str) -> Self {
        Self::new(component, "init").with_level(self.level)
    }

    /// Context for an operation of the same component. Metadata is not carried over.
    pub fn for_operation(&self, operation: &str) -> Self {
        Self::new(&self.component, operation).with_level(self.level)
    }

    pub fn level(&self) -> LevelFilter {
        self.level
    }

    pub fn enabled(&self, level: Level) -> bool {
        level <= self.level
    }

    pub fn with_metadata(mut self, key: &str, value: Value) -> Self {
        self.metadata.insert(key.to_string(), value);
        self
    }

    pub fn with_block_number(self, block_number: u64) -> Self {
        self.with_metadata("block_number", json!(block_number))
    }

    pub fn with_transaction_hash(self, tx_hash: &str) -> Self {
        self.with_metadata("transaction_hash", json!(tx_hash))
    }

    pub fn with_address(self, address: &str) -> Self {
        self.with_metadata("address", json!(address))
    }

    pub fn with_duration_ms(self, duration_ms: u64) -> Self {
        self.with_metadata("duration_ms", json!(duration_ms))
    }

    pub fn with_error_code(self, error_code: &str) -> Self {
        self.with_metadata("error_code", json!(error_code))
    }

    fn format_message(&self, level: &str, message: &str) -> String {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        let mut log_entry = json!({
            "timestamp": timestamp,
            "level": level,
            "component": self.component,
            "operation": self.operation,
            "message": message,
        });

        for (key, value) in &self.metadata {
            log_entry[key] = value.clone();
        }

        log_entry.to_string()
    }

    pub fn info(&self, message: &str) {
        if self.enabled(Level::Info) {
            info!("{}", self.format_message("INFO", message));
        }
    }

    pub fn warn(&self, message: &str) {
        if self.enabled(Level::Warn) {
            warn!("{}", self.format_message("WARN", message));
        }
    }

    pub fn error(&self, message: &str) {
        if self.enabled(Level::Error) {
            error!("{}", self.format_message("ERROR", message));
        }
    }

    pub fn debug(&self, message: &str) {
        if self.enabled(Level::Debug) {
            debug!("{}", self.format_message("DEBUG", message));
        }
    }

    pub fn trace(&self, message: &str) {
        if self.enabled(Level::Trace) {
            trace!("{}", self.format_message("TRACE", message));
        }
    }
}

/// Times a single operation and reports the outcome through a [`LogContext`]
pub struct PerformanceMonitor {
    start: Instant,
    context: LogContext,
}

impl PerformanceMonitor {
    pub fn new(base: &LogContext, operation: &str) -> Self {
        Self {
            start: Instant::now(),
            context: base.for_operation(operation),
        }
    }

    pub fn with_metadata(mut self, key: &str, value: Value) -> Self {
        self.context = self.context.with_metadata(key, value);
        self
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    pub fn finish_with_result<T, E>(self, result: &Result<T, E>) -> u64
    where
        E: std::fmt::Display,
    {
        let duration = self.elapsed_ms();
        let context = self.context.with_duration_ms(duration);

        match result {
            Ok(_) => context.trace(&format!("Operation completed successfully in {}ms", duration)),
            Err(e) => context
                .with_metadata("error", json!(e.to_string()))
                .debug(&format!("Operation failed after {}ms: {}", duration, e)),
        }

        duration
    }
}

/// Error logging utilities
pub struct ErrorLogger;

impl ErrorLogger {
    pub fn log_error(context: &LogContext, error: &MonitorError) {
        let severity = error.severity();
        let log_context = context
            .clone()
            .with_metadata("error_type", json!(format!("{:?}", error)))
            .with_metadata("severity", json!(format!("{:?}", severity)));

        let message = format!("Error occurred: {}", error);

        match severity {
            ErrorSeverity::Critical | ErrorSeverity::High => log_context.error(&message),
            ErrorSeverity::Medium => log_context.warn(&message),
            ErrorSeverity::Low => log_context.info(&message),
        }
    }
}

/// Operational metrics emitted as structured log lines
pub struct MetricsLogger;

impl MetricsLogger {
    pub fn log_rpc_call(context: &LogContext, method: &str, duration_ms: u64, success: bool) {
        let context = context
            .for_operation("rpc_call")
            .with_metadata("method", json!(method))
            .with_duration_ms(duration_ms)
            .with_metadata("success", json!(success));

        if success {
            context.debug(&format!("RPC call {} completed in {}ms", method, duration_ms));
        } else {
            context.warn(&format!("RPC call {} failed after {}ms", method, duration_ms));
        }
    }

    pub fn log_scan_completed(
        context: &LogContext,
        address: &str,
        from_block: u64,
        to_block: u64,
        skipped_blocks: usize,
        matches: usize,
        duration_ms: u64,
    ) {
        let context = context
            .for_operation("scan_completed")
            .with_address(address)
            .with_metadata("from_block", json!(from_block))
            .with_metadata("to_block", json!(to_block))
            .with_metadata("skipped_blocks", json!(skipped_blocks))
            .with_metadata("matches", json!(matches))
            .with_duration_ms(duration_ms);

        let message = format!(
            "Scanned blocks {}..={} for {}: {} matches, {} blocks skipped",
            from_block, to_block, address, matches, skipped_blocks
        );
        if skipped_blocks > 0 {
            context.warn(&message);
        } else {
            context.info(&message);
        }
    }
}

/// Install the `env_logger` backend and return the root logging context.
///
/// `RUST_LOG`, when set, refines the configured level. Calling this twice is
/// harmless: the second backend install is ignored.
pub fn init_logging(config: &LoggingConfig) -> LogContext {
    let level = parse_level(&config.level);
    let json_format = config.format == "json";

    let mut builder = env_logger::Builder::new();
    builder.filter_level(level).parse_env("RUST_LOG");

    builder.format(move |buf, record| {
        use std::io::Write;

        let message = record.args().to_string();
        let structured = serde_json::from_str::<Value>(&message).ok().filter(Value::is_object);

        if json_format {
            let entry = match structured {
                Some(value) => value,
                None => json!({
                    "timestamp": chrono::Utc::now().to_rfc3339(),
                    "level": record.level().to_string(),
                    "target": record.target(),
                    "message": message,
                }),
            };
            writeln!(buf, "{}", entry)
        } else {
            let body = match structured {
                Some(value) => {
                    let component = value["component"].as_str().unwrap_or_default().to_string();
                    let text = value["message"].as_str().unwrap_or_default().to_string();
                    format!("[{}] {} {}", component, text, value)
                }
                None => message,
            };
            writeln!(
                buf,
                "{} [{}] {}: {}",
                chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.target(),
                body
            )
        }
    });

    let root = LogContext::new("monitor", "startup").with_level(level);
    match builder.try_init() {
        Ok(()) => root.info("Structured logging initialized"),
        Err(_) => root.debug("Logger already installed, keeping existing backend"),
    }
    root
}
