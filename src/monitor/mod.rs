//! Order monitoring
//!
//! Tracks a submitted order until the transfer service reports a terminal
//! status.

pub mod order;
pub mod status;

pub use order::{OrderStatus, TransferOrder};
pub use status::{StatusMonitor, POLL_EXHAUSTED_MESSAGE, PROCESSING_MESSAGE};
