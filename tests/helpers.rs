//! Shared test helpers
//!
//! The module is organized into several categories:
//! - **Constants**: Dummy addresses, order IDs and transaction hashes
//! - **Mock APIs**: In-memory transfer and order status APIs that record calls
//! - **Builders**: Contacts, jobs, monitor configs and orchestrators

#![allow(dead_code)]

use async_trait::async_trait;
use omnify::client::{OrderJob, OrderStatusApi, TransferApi, TransferRequest};
use omnify::config::MonitorConfig;
use omnify::contacts::Contact;
use omnify::error::{Result, TransferError};
use omnify::intent::IntentParser;
use omnify::monitor::StatusMonitor;
use omnify::network::Network;
use omnify::orchestrator::TransferOrchestrator;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Aptos testnet recipient used in the worked example
pub const DUMMY_APTOS_ADDR: &str = "0xc3df44663b7541bc5ce2793c12814dad216cdf05855c66381a8cb797e6bf9656";

/// Solana address stored for contact "Alice"
pub const SOL_ADDR_ALICE: &str = "SoLAddrAlice111111111111111111111111111111";

/// Aptos address stored for contact "bob smith"
pub const APT_ADDR_BOB: &str = "0x000000000000000000000000000000000000000000000000000000000000b0b0";

/// Order ID returned by the mock transfer API
pub const DUMMY_ORDER_ID: &str = "ord-0001";

/// Transaction hash reported by successful jobs
pub const DUMMY_TX_HASH: &str = "0x1111111111111111111111111111111111111111111111111111111111111111";

// ============================================================================
// MOCK TRANSFER API
// ============================================================================

/// Transfer API that records every request and answers with a fixed result.
pub struct RecordingTransferApi {
    pub requests: Mutex<Vec<TransferRequest>>,
    response: Result<String>,
}

impl RecordingTransferApi {
    pub fn accepting(order_id: &str) -> Arc<Self> {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
            response: Ok(order_id.to_string()),
        })
    }

    pub fn rejecting(error: TransferError) -> Arc<Self> {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
            response: Err(error),
        })
    }

    pub fn submitted(&self) -> Vec<TransferRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl TransferApi for RecordingTransferApi {
    async fn submit_transfer(&self, request: &TransferRequest) -> Result<String> {
        self.requests.lock().unwrap().push(request.clone());
        self.response.clone()
    }
}

// ============================================================================
// MOCK ORDER STATUS API
// ============================================================================

/// Order status API that replays a script of responses, then repeats a
/// fallback response forever. Poll times are taken from the tokio clock so
/// tests running with a paused clock can check the pacing.
pub struct ScriptedOrderStatusApi {
    script: Mutex<VecDeque<Result<Vec<OrderJob>>>>,
    fallback: Result<Vec<OrderJob>>,
    calls: AtomicU32,
    pub poll_times: Mutex<Vec<tokio::time::Instant>>,
}

impl ScriptedOrderStatusApi {
    pub fn new(script: Vec<Result<Vec<OrderJob>>>, fallback: Result<Vec<OrderJob>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            fallback,
            calls: AtomicU32::new(0),
            poll_times: Mutex::new(Vec::new()),
        })
    }

    /// Reports the same job status on every poll.
    pub fn always(status: &str) -> Arc<Self> {
        Self::new(vec![], Ok(vec![job(status, None)]))
    }

    /// Reports `PENDING` for `pending_polls` polls, then `SUCCESS` with a hash.
    pub fn succeeding_after(pending_polls: usize) -> Arc<Self> {
        let script = (0..pending_polls).map(|_| Ok(vec![job("PENDING", None)])).collect();
        Self::new(script, Ok(vec![job("SUCCESS", Some(DUMMY_TX_HASH))]))
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn poll_times(&self) -> Vec<tokio::time::Instant> {
        self.poll_times.lock().unwrap().clone()
    }
}

#[async_trait]
impl OrderStatusApi for ScriptedOrderStatusApi {
    async fn order_jobs(&self, _order_id: &str) -> Result<Vec<OrderJob>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.poll_times.lock().unwrap().push(tokio::time::Instant::now());
        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or_else(|| self.fallback.clone())
    }
}

// ============================================================================
// BUILDERS
// ============================================================================

pub fn job(status: &str, transaction_hash: Option<&str>) -> OrderJob {
    OrderJob {
        status: status.to_string(),
        transaction_hash: transaction_hash.map(str::to_string),
        updated_at: Some("2024-11-01T12:00:00Z".to_string()),
    }
}

pub fn contact(name: &str, address: &str, network: Network) -> Contact {
    Contact {
        name: name.to_string(),
        address: address.to_string(),
        network,
    }
}

/// Contacts used by most orchestrator scenarios.
pub fn default_contacts() -> Vec<Contact> {
    vec![
        contact("Alice", SOL_ADDR_ALICE, Network::Solana),
        contact("bob smith", APT_ADDR_BOB, Network::AptosTestnet),
    ]
}

/// Default monitor settings: 3 s between checks, 20 checks.
pub fn default_monitor_config() -> MonitorConfig {
    MonitorConfig {
        polling_interval_ms: 3000,
        max_attempts: 20,
    }
}

/// Orchestrator over the pattern parser and the given mocks.
pub fn orchestrator(
    contacts: Vec<Contact>,
    transfer_api: Arc<RecordingTransferApi>,
    status_api: Arc<ScriptedOrderStatusApi>,
) -> TransferOrchestrator {
    let monitor = StatusMonitor::new(status_api, &default_monitor_config());
    TransferOrchestrator::new(IntentParser::pattern(), Arc::new(contacts), transfer_api, monitor)
}
