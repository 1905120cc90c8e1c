//! Omnify Library
//!
//! Executes token transfers described in plain language. An instruction is
//! parsed into a structured intent, matched against saved contacts, submitted
//! to an external transfer service, and tracked until the resulting order
//! settles. The crate holds no keys; signing and settlement happen behind the
//! transfer service.

pub mod client;
pub mod config;
pub mod contacts;
pub mod error;
pub mod intent;
pub mod monitor;
pub mod network;
pub mod orchestrator;

// Re-export commonly used types
pub use client::{ApiResponse, OrderJob, OrderStatusApi, TransferApi, TransferRequest, TransferServiceClient};
pub use config::{Config, MonitorConfig, ParserBackend};
pub use contacts::{Contact, ContactResolver, ContactSource};
pub use error::TransferError;
pub use intent::{IntentParser, ParseOutcome, SideCommand, TransferIntent};
pub use monitor::{OrderStatus, StatusMonitor, TransferOrder};
pub use network::{Network, NetworkRegistry};
pub use orchestrator::{Execution, TransferOrchestrator, TransferOutcome, TransferState};
