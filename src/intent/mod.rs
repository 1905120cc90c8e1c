//! Intent Parsing
//!
//! Turns a free-text instruction into a [`TransferIntent`].
//!
//! Extraction of the raw fields is delegated to an [`IntentExtractor`]
//! (the ordered pattern rules, or a completion backend). The parser itself
//! owns the two steps every backend shares:
//! 1. **Bypass check**: instructions naming a bypass keyword leave the
//!    transfer pipeline and become a [`SideCommand`].
//! 2. **Validation**: the resolved network must be supported and quantity,
//!    token and recipient must all be present.

pub mod completion;
pub mod patterns;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{Result, TransferError};
use crate::network::{Network, NetworkRegistry};

pub use completion::CompletionExtractor;
pub use patterns::PatternExtractor;

/// Token address sent with every transfer. The transfer service expects a
/// single space for the native token of the selected network.
pub const NATIVE_TOKEN_PLACEHOLDER: &str = " ";

/// Default bypass keyword (secondary chain handled outside the transfer pipeline).
pub const DEFAULT_BYPASS_KEYWORD: &str = "movement";

// ============================================================================
// INTENT STRUCTURES
// ============================================================================

/// Structured transfer request derived from free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferIntent {
    /// Canonical network the transfer executes on
    pub network_name: Network,
    /// Always [`NATIVE_TOKEN_PLACEHOLDER`]
    pub token_address: String,
    /// Positive amount to transfer
    pub quantity: f64,
    /// Recipient address (or a contact name awaiting resolution)
    pub recipient_address: String,
}

/// Instruction that was diverted away from the transfer pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SideCommand {
    /// Bypass keyword that matched
    pub keyword: String,
    /// Original instruction text
    pub input: String,
}

/// Result of parsing an instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    /// A validated transfer intent
    Transfer(TransferIntent),
    /// The instruction named a bypass keyword; no intent was produced
    Bypass(SideCommand),
}

/// Raw fields as produced by an extractor, before validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedIntent {
    /// Network text (canonical identifier or alias), if any
    pub network: Option<String>,
    /// Token symbol or token address as extracted
    pub token: Option<String>,
    /// Parsed quantity
    pub quantity: Option<f64>,
    /// Recipient text
    pub recipient: Option<String>,
}

// ============================================================================
// EXTRACTOR BACKEND
// ============================================================================

/// Backend that pulls raw transfer fields out of an instruction.
#[async_trait]
pub trait IntentExtractor: Send + Sync {
    /// Extracts whatever fields the backend can find. Missing fields are left
    /// as `None` and reported by the parser's validation step.
    async fn extract(&self, input: &str) -> Result<ExtractedIntent>;

    /// Backend name for logging
    fn name(&self) -> &str;
}

// ============================================================================
// PARSER
// ============================================================================

/// Instruction parser: bypass check, extraction, validation.
#[derive(Clone)]
pub struct IntentParser {
    extractor: Arc<dyn IntentExtractor>,
    bypass_keywords: Vec<String>,
    registry: NetworkRegistry,
}

impl IntentParser {
    /// Creates a parser over the given extraction backend.
    pub fn new(extractor: Arc<dyn IntentExtractor>) -> Self {
        Self {
            extractor,
            bypass_keywords: vec![DEFAULT_BYPASS_KEYWORD.to_string()],
            registry: NetworkRegistry,
        }
    }

    /// Parser using the ordered pattern rules.
    pub fn pattern() -> Self {
        Self::new(Arc::new(PatternExtractor::new()))
    }

    /// Replaces the bypass keyword list (matched case-insensitively).
    pub fn with_bypass_keywords(mut self, keywords: Vec<String>) -> Self {
        self.bypass_keywords = keywords
            .into_iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        self
    }

    /// Parses an instruction into a transfer intent or a side command.
    ///
    /// # Arguments
    ///
    /// * `input` - Raw instruction text
    ///
    /// # Returns
    ///
    /// * `Ok(ParseOutcome::Transfer)` - Validated intent
    /// * `Ok(ParseOutcome::Bypass)` - Instruction names a bypass keyword
    /// * `Err(TransferError::UnsupportedNetwork)` - Network is not a canonical identifier
    /// * `Err(TransferError::Parse)` - Required fields could not be extracted
    pub async fn parse(&self, input: &str) -> Result<ParseOutcome> {
        let lowered = input.to_lowercase();
        if let Some(keyword) = self.bypass_keywords.iter().find(|k| lowered.contains(k.as_str())) {
            info!("Instruction names bypass keyword '{}', leaving transfer pipeline", keyword);
            return Ok(ParseOutcome::Bypass(SideCommand {
                keyword: keyword.clone(),
                input: input.to_string(),
            }));
        }

        let extracted = self.extractor.extract(input).await?;
        debug!("{} extractor produced {:?}", self.extractor.name(), extracted);

        self.validate(extracted).map(ParseOutcome::Transfer)
    }

    /// Checks network support first, then field completeness.
    fn validate(&self, extracted: ExtractedIntent) -> Result<TransferIntent> {
        let network = match extracted.network.as_deref() {
            Some(text) => self
                .registry
                .normalize(text)
                .filter(|n| self.registry.is_supported(n.as_str()))
                .ok_or_else(|| TransferError::UnsupportedNetwork(text.trim().to_string()))?,
            None => return Err(incomplete(&["network"])),
        };

        let recipient = extracted
            .recipient
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());

        let mut missing = Vec::new();
        if extracted.quantity.is_none() {
            missing.push("quantity");
        }
        if extracted.token.is_none() {
            missing.push("token");
        }
        if recipient.is_none() {
            missing.push("recipient address");
        }
        if !missing.is_empty() {
            return Err(incomplete(&missing));
        }

        let quantity = extracted.quantity.unwrap_or_default();
        if !quantity.is_finite() || quantity <= 0.0 {
            return Err(TransferError::Parse(format!(
                "quantity must be a positive number, got {}",
                quantity
            )));
        }

        Ok(TransferIntent {
            network_name: network,
            token_address: NATIVE_TOKEN_PLACEHOLDER.to_string(),
            quantity,
            recipient_address: recipient.unwrap_or_default(),
        })
    }
}

fn incomplete(missing: &[&str]) -> TransferError {
    TransferError::Parse(format!("incomplete intent: missing {}", missing.join(", ")))
}
