//! JSON-RPC 2.0 over HTTP.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use agora_ledger::LedgerError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::trace;

use crate::error::{rpc_error, transport_error};

/// Connection timeout, separate from the per-request timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Serialize)]
struct Request<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Deserialize)]
struct Response<T> {
    result: Option<T>,
    error: Option<ErrorObject>,
}

#[derive(Deserialize)]
struct ErrorObject {
    code: i64,
    message: String,
}

/// A cheap-to-clone handle on one JSON-RPC endpoint.
#[derive(Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    url: String,
    next_id: Arc<AtomicU64>,
}

impl HttpTransport {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, LedgerError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| LedgerError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            url: url.into(),
            next_id: Arc::new(AtomicU64::new(1)),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Issue one call and deserialize its `result`.
    pub async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, LedgerError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        trace!(id, method, "json-rpc request");

        let response = self
            .http
            .post(&self.url)
            .json(&Request {
                jsonrpc: "2.0",
                id,
                method,
                params,
            })
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(LedgerError::Transport(format!(
                "{method}: HTTP status {}",
                response.status()
            )));
        }

        let body: Response<T> = response.json().await.map_err(transport_error)?;
        match (body.result, body.error) {
            (_, Some(err)) => Err(rpc_error(err.code, err.message)),
            (Some(result), None) => Ok(result),
            (None, None) => Err(LedgerError::Decode(format!("{method}: response has no result"))),
        }
    }
}
