//! Contact Resolution
//!
//! Matches the recipient phrase of an instruction against the user's saved
//! contacts. The contact list belongs to an external store; the resolver only
//! reads the snapshot it is handed.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, TransferError};
use crate::intent::TransferIntent;
use crate::network::Network;

/// Minimum similarity a contact must exceed to be selected.
pub const MATCH_THRESHOLD: f64 = 0.5;

/// Score given when one name contains the other.
pub const CONTAINMENT_SCORE: f64 = 0.9;

/// Shortest base58 word treated as an address (Solana keys are 32-44 chars).
const MIN_BASE58_ADDRESS_LEN: usize = 32;

// ============================================================================
// CONTACT STRUCTURES
// ============================================================================

/// Saved recipient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    /// Display name (matched case-insensitively)
    pub name: String,
    /// Address on `network`
    pub address: String,
    /// Network the address lives on
    pub network: Network,
}

/// Provider of a read-only contact snapshot.
pub trait ContactSource: Send + Sync {
    /// Current contacts, in the store's iteration order.
    fn snapshot(&self) -> Vec<Contact>;
}

impl ContactSource for Vec<Contact> {
    fn snapshot(&self) -> Vec<Contact> {
        self.clone()
    }
}

// ============================================================================
// RECIPIENT PHRASE EXTRACTION
// ============================================================================

/// Ordered recipient patterns; the first match wins.
static RECIPIENT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // "pay alice 5 sol", "send bob smith on solana"
        r"^\s*(?:pay|send|transfer|give)\s+(?:to\s+)?([^\d\s].*?)\s+(?:\d+(?:\.\d+)?\b.*|(?:on|in|using|via)\s+.*)$",
        // "send 5 sol to alice on solana", "5 apt for carol"
        r"\b(?:to|for)\s+(.+?)(?:\s+(?:on|in|using|via)\s+.*)?$",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap_or_else(|e| panic!("invalid built-in pattern {}: {}", p, e)))
    .collect()
});

/// Pulls the lower-cased recipient phrase out of an instruction.
pub fn extract_recipient_phrase(input: &str) -> Option<String> {
    let lowered = input.to_lowercase();
    RECIPIENT_PATTERNS.iter().find_map(|pattern| {
        pattern
            .captures(&lowered)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|phrase| !phrase.is_empty())
    })
}

/// Whether a recipient phrase carries a chain address rather than a name:
/// a `0x` hex word, or a single alphanumeric word of base58 address length.
pub fn is_address_like(phrase: &str) -> bool {
    phrase.split_whitespace().any(|word| {
        let hex = word
            .strip_prefix("0x")
            .or_else(|| word.strip_prefix("0X"))
            .map_or(false, |digits| !digits.is_empty() && digits.chars().all(|c| c.is_ascii_hexdigit()));
        hex || (word.len() >= MIN_BASE58_ADDRESS_LEN && word.chars().all(|c| c.is_ascii_alphanumeric()))
    })
}

// ============================================================================
// SCORING
// ============================================================================

/// Similarity between a contact name and a candidate phrase, in `[0, 1]`.
///
/// Containment in either direction scores [`CONTAINMENT_SCORE`]; otherwise the
/// score is the number of shared words over the larger word count.
pub fn similarity(contact_name: &str, candidate: &str) -> f64 {
    let name = contact_name.trim().to_lowercase();
    let candidate = candidate.trim().to_lowercase();
    if name.is_empty() || candidate.is_empty() {
        return 0.0;
    }

    if name.contains(&candidate) || candidate.contains(&name) {
        return CONTAINMENT_SCORE;
    }

    let name_words: Vec<&str> = name.split_whitespace().collect();
    let candidate_words: Vec<&str> = candidate.split_whitespace().collect();
    let shared = name_words.iter().filter(|w| candidate_words.contains(w)).count();
    if shared == 0 {
        return 0.0;
    }

    shared as f64 / name_words.len().max(candidate_words.len()) as f64
}

// ============================================================================
// RESOLVER
// ============================================================================

/// Fuzzy contact matcher.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContactResolver;

impl ContactResolver {
    pub fn new() -> Self {
        Self
    }

    /// Finds the contact an instruction refers to.
    ///
    /// Picks the highest score above [`MATCH_THRESHOLD`]; on equal scores the
    /// contact seen first is kept.
    ///
    /// # Arguments
    ///
    /// * `input` - Raw instruction text
    /// * `contacts` - Contact snapshot in store order
    ///
    /// # Returns
    ///
    /// * `Some(Contact)` - Best matching contact
    /// * `None` - No recipient phrase, the phrase is already an address, or no
    ///   contact scored above the threshold
    pub fn resolve(&self, input: &str, contacts: &[Contact]) -> Option<Contact> {
        let candidate = extract_recipient_phrase(input)?;
        if is_address_like(&candidate) {
            debug!("Recipient '{}' is an address, skipping contact lookup", candidate);
            return None;
        }
        debug!("Recipient phrase: '{}'", candidate);

        let mut best: Option<(&Contact, f64)> = None;
        for contact in contacts {
            let score = similarity(&contact.name, &candidate);
            if score <= MATCH_THRESHOLD {
                continue;
            }
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((contact, score)),
            }
        }

        best.map(|(contact, score)| {
            info!("Resolved recipient '{}' to contact '{}' (score {:.2})", candidate, contact.name, score);
            contact.clone()
        })
    }

    /// Applies a resolved contact to an intent.
    ///
    /// # Returns
    ///
    /// * `Ok(TransferIntent)` - Intent with the contact's address and network
    /// * `Err(TransferError::NetworkMismatch)` - Contact is stored on another network
    pub fn apply(&self, intent: TransferIntent, contact: &Contact) -> Result<TransferIntent> {
        if intent.network_name != contact.network {
            return Err(TransferError::NetworkMismatch {
                contact: contact.name.clone(),
                contact_network: contact.network,
                intent_network: intent.network_name,
            });
        }

        Ok(TransferIntent {
            network_name: contact.network,
            recipient_address: contact.address.clone(),
            ..intent
        })
    }
}
