//! JSON-RPC client for the ledger full node.
//!
//! # Responsibilities
//! - Send one JSON-RPC request at a time with a bounded wait
//! - Separate transport failures from structured ledger rejections
//! - Record per-method call metrics
//!
//! No retries: a resubmitted transaction is not guaranteed to be idempotent.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use url::Url;
use uuid::Uuid;

use crate::blockchain::types::{SubmissionError, SubmissionResult};
use crate::observability::metrics;

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: String,
    method: &'a str,
    params: Value,
}

#[derive(Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

/// Error object of a JSON-RPC response.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcErrorObject {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}

impl fmt::Display for RpcErrorObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "code {}: {}", self.code, self.message)?;
        if let Some(data) = &self.data {
            write!(f, " ({})", data)?;
        }
        Ok(())
    }
}

/// Ledger RPC client.
#[derive(Clone)]
pub struct RpcClient {
    http: reqwest::Client,
    url: Url,
    /// Upper bound for a single request, including reading the body.
    timeout_duration: Duration,
}

impl RpcClient {
    pub fn new(url: Url, timeout_duration: Duration) -> SubmissionResult<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| SubmissionError::network(format!("cannot build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            url,
            timeout_duration,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Invoke `method` and decode its `result`.
    pub async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> SubmissionResult<T> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: Uuid::new_v4().to_string(),
            method,
            params,
        };

        let started = Instant::now();
        let result = match timeout(self.timeout_duration, self.send(&request)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(method, timeout_ms = self.timeout_duration.as_millis() as u64, "RPC timeout");
                Err(SubmissionError::network(format!(
                    "{} timed out after {} ms",
                    method,
                    self.timeout_duration.as_millis()
                )))
            }
        };

        let outcome = match &result {
            Ok(_) => "ok",
            Err(SubmissionError::RemoteRejection { .. }) => "rejected",
            Err(_) => "network_error",
        };
        metrics::record_rpc_call(method, outcome, started.elapsed());
        result
    }

    async fn send<T: DeserializeOwned>(&self, request: &RpcRequest<'_>) -> SubmissionResult<T> {
        let method = request.method;
        tracing::debug!(method, url = %self.url, "Sending RPC request");

        let response = self
            .http
            .post(self.url.clone())
            .json(request)
            .send()
            .await
            .map_err(|e| SubmissionError::network(format!("{}: {}", method, e)))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| SubmissionError::network(format!("{}: {}", method, e)))?;

        let parsed: RpcResponse<T> = match serde_json::from_slice(&body) {
            Ok(parsed) => parsed,
            Err(_) if !status.is_success() => {
                return Err(SubmissionError::network(format!("{} returned HTTP {}", method, status)));
            }
            Err(e) => {
                return Err(SubmissionError::network(format!(
                    "undecodable response to {}: {}",
                    method, e
                )));
            }
        };

        if let Some(error) = parsed.error {
            tracing::warn!(method, error = %error, "RPC rejected request");
            return Err(SubmissionError::RemoteRejection {
                raw_reason: error.to_string(),
                digest: None,
            });
        }

        parsed.result.ok_or_else(|| {
            SubmissionError::network(format!("response to {} has neither result nor error", method))
        })
    }
}

impl fmt::Debug for RpcClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RpcClient")
            .field("url", &self.url.as_str())
            .field("timeout_ms", &self.timeout_duration.as_millis())
            .finish()
    }
}
