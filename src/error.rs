//! Transfer Error Types
//!
//! Failure kinds that can end a transfer. Every kind is caught at the
//! orchestrator boundary and converted into a terminal FAILED outcome;
//! none of them is fatal to the process.

use thiserror::Error;

use crate::network::Network;

/// Errors raised while turning an instruction into a completed transfer.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TransferError {
    /// Instruction did not match any extraction rule or a required field is missing
    #[error("parse error: {0}")]
    Parse(String),

    /// Resolved network is not one of the canonical identifiers
    #[error("unsupported network: {0}")]
    UnsupportedNetwork(String),

    /// Resolved contact is stored on a different network than the instruction targets
    #[error(
        "network mismatch: contact '{contact}' is on {contact_network} but the transfer targets {intent_network}"
    )]
    NetworkMismatch {
        contact: String,
        contact_network: Network,
        intent_network: Network,
    },

    /// Transfer service rejected the submission or returned no order ID
    #[error("submission error: {0}")]
    Submission(String),

    /// Order status could not be retrieved or had an unexpected shape
    #[error("polling error: {0}")]
    Polling(String),

    /// Completion backend failed or returned an unusable reply
    #[error("completion backend error: {0}")]
    Completion(String),
}

impl TransferError {
    /// Stable label for logs and serialized outcomes.
    pub fn kind(&self) -> &'static str {
        match self {
            TransferError::Parse(_) => "parse_error",
            TransferError::UnsupportedNetwork(_) => "unsupported_network",
            TransferError::NetworkMismatch { .. } => "network_mismatch",
            TransferError::Submission(_) => "submission_error",
            TransferError::Polling(_) => "polling_error",
            TransferError::Completion(_) => "completion_error",
        }
    }
}

pub type Result<T> = std::result::Result<T, TransferError>;
