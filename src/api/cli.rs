use clap::{Parser, Subcommand};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Server answered {status}: {body}")]
    Server { status: u16, body: String },
}

#[derive(Parser, Debug)]
#[command(name = "tx-monitor-cli")]
#[command(about = "Command-line client for a running transaction monitor")]
#[command(version)]
pub struct Cli {
    /// Base URL of the monitor's HTTP API
    #[arg(long, default_value = "http://127.0.0.1:8080")]
    pub server: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Subscribe an address
    Subscribe { address: String },
    /// Scan for and list an address's transactions
    Transactions { address: String },
    /// Show the chain's current block height
    CurrentBlock,
    /// Show scan cursor and store counters
    Status,
}

/// Executes [`Commands`] against the HTTP API
pub struct CliHandler {
    client: Client,
    base_url: String,
}

impl CliHandler {
    pub fn new(base_url: &str) -> Result<Self, CliError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|source| CliError::Request { url: base_url.to_string(), source })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Run a command and return the server's answer as JSON
    pub async fn execute_command(&self, command: &Commands) -> Result<Value, CliError> {
        match command {
            Commands::Subscribe { address } => {
                let url = self.url("/subscribe");
                let response = self
                    .client
                    .post(&url)
                    .json(&json!({ "address": address }))
                    .send()
                    .await
                    .map_err(|source| CliError::Request { url: url.clone(), source })?;
                Self::read_json(&url, response, &[StatusCode::OK, StatusCode::CONFLICT]).await
            }
            Commands::Transactions { address } => {
                self.get_json(&format!("/transactions/{}", address.trim())).await
            }
            Commands::CurrentBlock => self.get_json("/current-block").await,
            Commands::Status => self.get_json("/status").await,
        }
    }

    async fn get_json(&self, path: &str) -> Result<Value, CliError> {
        let url = self.url(path);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| CliError::Request { url: url.clone(), source })?;
        Self::read_json(&url, response, &[StatusCode::OK]).await
    }

    async fn read_json(
        url: &str,
        response: reqwest::Response,
        accepted: &[StatusCode],
    ) -> Result<Value, CliError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| CliError::Request { url: url.to_string(), source })?;

        if !accepted.contains(&status) {
            return Err(CliError::Server { status: status.as_u16(), body });
        }

        Ok(serde_json::from_str(&body).unwrap_or(Value::String(body)))
    }
}
