//! Order state as tracked by the status monitor

use serde::{Deserialize, Serialize};

/// Status of a submitted order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Submitted, not yet settled
    Processing,
    /// Settled on-chain
    Success,
    /// Rejected, reverted, or abandoned after exhausting status checks
    Failed,
}

impl OrderStatus {
    /// Maps a raw job status. Anything other than `SUCCESS` or `FAILED` is
    /// still in progress.
    pub fn from_job_status(status: &str) -> Self {
        match status {
            "SUCCESS" => OrderStatus::Success,
            "FAILED" => OrderStatus::Failed,
            _ => OrderStatus::Processing,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Success | OrderStatus::Failed)
    }
}

/// A submitted transfer as seen by the monitor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferOrder {
    /// Opaque ID assigned by the transfer service
    pub order_id: String,
    /// Current status
    pub status: OrderStatus,
    /// Transaction hash, once reported
    pub transaction_hash: Option<String>,
    /// Last update time reported by the service
    pub updated_at: Option<String>,
    /// Human-readable progress text
    pub message: String,
    /// Status checks performed so far
    pub attempts: u32,
}

impl TransferOrder {
    /// Fresh order right after submission.
    pub fn submitted(order_id: impl Into<String>) -> Self {
        Self {
            order_id: order_id.into(),
            status: OrderStatus::Processing,
            transaction_hash: None,
            updated_at: None,
            message: "Initiating transfer...".to_string(),
            attempts: 0,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}
