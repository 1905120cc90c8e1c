//! Transfer Service API Client
//!
//! HTTP client for the external transfer service: token transfer submission
//! and order history lookups. Responses are decoded into explicit structures;
//! any shape deviation surfaces as a submission or polling error.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::config::ServiceConfig;
use crate::error::{Result, TransferError};
use crate::intent::TransferIntent;

const TRANSFER_PATH: &str = "/api/v1/transfer/tokens/execute";
const ORDERS_PATH: &str = "/api/v1/orders";

// ============================================================================
// API RESPONSE WRAPPER
// ============================================================================

/// Response envelope used by every transfer service endpoint.
///
/// ```json
/// {
///   "status": "success"|"error",
///   "data": <payload>|null,
///   "error": <details>|null
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// "success" on success
    pub status: String,
    /// Response payload
    pub data: Option<T>,
    /// Error details (free-form)
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

impl<T> ApiResponse<T> {
    fn is_success(&self) -> bool {
        self.status.eq_ignore_ascii_case("success")
    }

    fn error_message(&self) -> String {
        match &self.error {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(serde_json::Value::Object(obj)) => obj
                .get("message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| serde_json::Value::Object(obj.clone()).to_string()),
            Some(other) => other.to_string(),
            None => "Unknown error".to_string(),
        }
    }
}

// ============================================================================
// REQUEST / RESPONSE STRUCTURES
// ============================================================================

/// Body of a token transfer submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferRequest {
    /// Canonical network identifier
    pub network_name: String,
    /// Token address (single space for the native token)
    pub token_address: String,
    /// Quantity, string-encoded
    pub quantity: String,
    /// Recipient address
    pub recipient_address: String,
}

impl From<&TransferIntent> for TransferRequest {
    fn from(intent: &TransferIntent) -> Self {
        Self {
            network_name: intent.network_name.to_string(),
            token_address: intent.token_address.clone(),
            quantity: intent.quantity.to_string(),
            recipient_address: intent.recipient_address.clone(),
        }
    }
}

/// Payload of a successful submission.
#[derive(Debug, Clone, Deserialize)]
pub struct TransferSubmission {
    /// Order ID assigned by the service
    #[serde(rename = "orderId")]
    pub order_id: Option<String>,
}

/// Order status query.
#[derive(Debug, Clone, Serialize)]
pub struct OrderQuery {
    pub order_id: String,
}

/// Payload of an order history response.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderHistory {
    /// Jobs attached to the order; the first one is authoritative
    pub jobs: Vec<OrderJob>,
}

/// Execution job of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderJob {
    /// Raw job status ("SUCCESS", "FAILED", or an in-progress value)
    pub status: String,
    /// On-chain transaction hash, once known
    #[serde(default)]
    pub transaction_hash: Option<String>,
    /// Last update time as reported by the service
    #[serde(default)]
    pub updated_at: Option<String>,
}

// ============================================================================
// API TRAITS
// ============================================================================

/// Submits transfers to the external service.
#[async_trait]
pub trait TransferApi: Send + Sync {
    /// Submits a transfer and returns the assigned order ID.
    async fn submit_transfer(&self, request: &TransferRequest) -> Result<String>;
}

/// Reads order status from the external service.
#[async_trait]
pub trait OrderStatusApi: Send + Sync {
    /// Returns the jobs attached to an order (possibly none yet).
    async fn order_jobs(&self, order_id: &str) -> Result<Vec<OrderJob>>;
}

// ============================================================================
// HTTP CLIENT
// ============================================================================

/// reqwest-based client for the transfer service.
#[derive(Clone)]
pub struct TransferServiceClient {
    /// Base URL of the service (e.g. "https://sandbox-api.okto.tech")
    base_url: String,
    /// Session bearer token
    auth_token: String,
    /// HTTP client instance
    client: reqwest::Client,
}

impl TransferServiceClient {
    /// Creates a client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL of the transfer service
    /// * `auth_token` - Session token sent as a bearer credential
    /// * `timeout` - Per-request timeout
    pub fn new(base_url: impl Into<String>, auth_token: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .no_proxy()
            .build()?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth_token: auth_token.into(),
            client,
        })
    }

    /// Creates a client from configuration; the token is read from the
    /// environment variable named by `auth_token_env`.
    pub fn from_config(config: &ServiceConfig) -> anyhow::Result<Self> {
        let token = std::env::var(&config.auth_token_env)
            .map_err(|_| anyhow::anyhow!("{} not set", config.auth_token_env))?;
        Self::new(
            config.base_url.clone(),
            token,
            Duration::from_millis(config.request_timeout_ms),
        )
    }
}

#[async_trait]
impl TransferApi for TransferServiceClient {
    async fn submit_transfer(&self, request: &TransferRequest) -> Result<String> {
        let url = format!("{}{}", self.base_url, TRANSFER_PATH);
        debug!("POST {} {:?}", url, request);

        let http_response = self
            .client
            .post(&url)
            .bearer_auth(&self.auth_token)
            .json(request)
            .send()
            .await
            .map_err(|e| TransferError::Submission(format!("failed to send transfer request: {}", e)))?;

        let status = http_response.status();
        let body = http_response
            .text()
            .await
            .map_err(|e| TransferError::Submission(format!("failed to read transfer response: {}", e)))?;

        let response: ApiResponse<TransferSubmission> = serde_json::from_str(&body).map_err(|e| {
            TransferError::Submission(format!("unexpected transfer response (HTTP {}): {}", status, e))
        })?;

        if !status.is_success() || !response.is_success() {
            return Err(TransferError::Submission(format!(
                "transfer service error (HTTP {}): {}",
                status,
                response.error_message()
            )));
        }

        response
            .data
            .and_then(|d| d.order_id)
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| TransferError::Submission("transfer response did not include an orderId".into()))
    }
}

#[async_trait]
impl OrderStatusApi for TransferServiceClient {
    async fn order_jobs(&self, order_id: &str) -> Result<Vec<OrderJob>> {
        let url = format!("{}{}", self.base_url, ORDERS_PATH);
        let query = OrderQuery {
            order_id: order_id.to_string(),
        };

        let http_response = self
            .client
            .get(&url)
            .bearer_auth(&self.auth_token)
            .query(&query)
            .send()
            .await
            .map_err(|e| TransferError::Polling(format!("failed to send order status request: {}", e)))?;

        let status = http_response.status();
        if !status.is_success() {
            return Err(TransferError::Polling(format!("order status request failed with HTTP {}", status)));
        }

        let response: ApiResponse<OrderHistory> = http_response
            .json()
            .await
            .map_err(|e| TransferError::Polling(format!("unexpected order status response: {}", e)))?;

        if !response.is_success() {
            return Err(TransferError::Polling(format!(
                "transfer service error: {}",
                response.error_message()
            )));
        }

        response
            .data
            .map(|history| history.jobs)
            .ok_or_else(|| TransferError::Polling("order status response did not include data".into()))
    }
}
