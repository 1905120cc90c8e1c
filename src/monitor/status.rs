//! Order status monitor
//!
//! Polls the order status API for one order until the first job reports a
//! terminal status or the attempt budget runs out. Polls run strictly in
//! sequence with a fixed pause between them.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::order::{OrderStatus, TransferOrder};
use crate::client::OrderStatusApi;
use crate::config::MonitorConfig;

/// Message used when every status check failed to reach the service.
pub const POLL_EXHAUSTED_MESSAGE: &str = "Failed to get transaction status after multiple attempts";

/// Message shown while the service reports a non-terminal job.
pub const PROCESSING_MESSAGE: &str = "Processing transaction...";

/// Bounded poller for a single order.
#[derive(Clone)]
pub struct StatusMonitor {
    api: Arc<dyn OrderStatusApi>,
    interval: Duration,
    max_attempts: u32,
}

impl StatusMonitor {
    /// Creates a monitor.
    ///
    /// # Arguments
    ///
    /// * `api` - Order status API
    /// * `config` - Polling interval and attempt budget
    pub fn new(api: Arc<dyn OrderStatusApi>, config: &MonitorConfig) -> Self {
        Self {
            api,
            interval: Duration::from_millis(config.polling_interval_ms),
            max_attempts: config.max_attempts.max(1),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Monitors an order to a terminal state.
    pub async fn monitor(&self, order_id: &str) -> TransferOrder {
        self.monitor_with_progress(order_id, |_| {}).await
    }

    /// Monitors an order to a terminal state, passing every intermediate
    /// (non-terminal) snapshot to `on_progress`.
    ///
    /// # Arguments
    ///
    /// * `order_id` - Order ID returned by the transfer service
    /// * `on_progress` - Called after each non-terminal poll
    ///
    /// # Returns
    ///
    /// The order in `SUCCESS` or `FAILED` state. Never returns a processing order.
    pub async fn monitor_with_progress<F>(&self, order_id: &str, mut on_progress: F) -> TransferOrder
    where
        F: FnMut(&TransferOrder),
    {
        let mut order = TransferOrder::submitted(order_id);
        let max = self.max_attempts;

        loop {
            order.attempts += 1;
            let attempt = order.attempts;

            let poll_failed = match self.api.order_jobs(order_id).await {
                Ok(jobs) => {
                    match jobs.into_iter().next() {
                        Some(job) => {
                            let status = OrderStatus::from_job_status(&job.status);
                            if job.transaction_hash.is_some() {
                                order.transaction_hash = job.transaction_hash;
                            }
                            if job.updated_at.is_some() {
                                order.updated_at = job.updated_at;
                            }

                            match status {
                                OrderStatus::Success => {
                                    order.status = OrderStatus::Success;
                                    order.message = "Transaction completed successfully".to_string();
                                    info!(
                                        "Order {} succeeded after {} status checks (tx: {})",
                                        order_id,
                                        attempt,
                                        order.transaction_hash.as_deref().unwrap_or("unknown")
                                    );
                                    return order;
                                }
                                OrderStatus::Failed => {
                                    order.status = OrderStatus::Failed;
                                    order.message = "Transaction failed".to_string();
                                    warn!("Order {} failed after {} status checks", order_id, attempt);
                                    return order;
                                }
                                OrderStatus::Processing => {
                                    debug!(
                                        "Order {} is {} (attempt {}/{})",
                                        order_id, job.status, attempt, max
                                    );
                                    order.message = PROCESSING_MESSAGE.to_string();
                                }
                            }
                        }
                        None => {
                            order.message =
                                format!("Checking transaction status (attempt {}/{})...", attempt, max);
                        }
                    }
                    false
                }
                Err(e) => {
                    warn!("Status check error for order {} (attempt {}/{}): {}", order_id, attempt, max, e);
                    order.message = format!("Checking transaction status (attempt {}/{})...", attempt, max);
                    true
                }
            };

            if attempt >= max {
                order.status = OrderStatus::Failed;
                order.message = if poll_failed {
                    POLL_EXHAUSTED_MESSAGE.to_string()
                } else {
                    format!("Transaction not confirmed after {} status checks", attempt)
                };
                warn!("Giving up on order {}: {}", order_id, order.message);
                return order;
            }

            on_progress(&order);
            tokio::time::sleep(self.interval).await;
        }
    }
}
