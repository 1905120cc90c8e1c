//! Pattern-based intent extraction
//!
//! Transfer shapes are tried in a fixed priority order and the first rule that
//! matches wins; later rules are never consulted. The order is part of the
//! contract, since reordering changes which fields are extracted:
//!
//! 1. **standard**: `send 2 apt to 0xabc`
//! 2. **reversed**: `pay alice 5 sol`
//! 3. **simple**: `0xabc 3 apt`
//!
//! The network comes from an `on/in/using/via <network>` phrase when present,
//! otherwise from the token symbol, otherwise APTOS. The longest run of words
//! after the connective that names a known network is used, so trailing text
//! ("on aptos testnet please") is ignored.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::debug;

use super::{ExtractedIntent, IntentExtractor};
use crate::error::Result;
use crate::network::{Network, NetworkRegistry};

// ============================================================================
// RULE TABLES
// ============================================================================

/// One transfer shape and the capture group of each field.
struct TransferRule {
    name: &'static str,
    pattern: Regex,
    quantity: usize,
    token: usize,
    recipient: usize,
}

static TRANSFER_RULES: Lazy<Vec<TransferRule>> = Lazy::new(|| {
    vec![
        TransferRule {
            name: "standard",
            pattern: rule(r"(?i)\b(?:send|transfer|pay|give)\s+(\d+(?:\.\d+)?)\s+([a-z][a-z0-9]*)\s+(?:to\s+)?(\S+)"),
            quantity: 1,
            token: 2,
            recipient: 3,
        },
        TransferRule {
            name: "reversed",
            pattern: rule(r"(?i)\b(?:send|transfer|pay|give)\s+(?:to\s+)?(.+?)\s+(\d+(?:\.\d+)?)\s+([a-z][a-z0-9]*)\b"),
            quantity: 2,
            token: 3,
            recipient: 1,
        },
        TransferRule {
            name: "simple",
            pattern: rule(r"(?i)^\s*(\S+)\s+(\d+(?:\.\d+)?)\s+([a-z][a-z0-9]*)\b"),
            quantity: 2,
            token: 3,
            recipient: 1,
        },
    ]
});

/// Connective introducing a network phrase.
static NETWORK_CONNECTIVE: Lazy<Regex> = Lazy::new(|| rule(r"(?i)\b(?:on|in|using|via)\s+(?:the\s+)?"));

/// Trailing words dropped from an unrecognized network phrase.
const NETWORK_SUFFIXES: &[&str] = &["network", "chain", "blockchain"];

/// Words that can never be a recipient.
const RESERVED_RECIPIENTS: &[&str] = &[
    "on", "in", "using", "via", "to", "for", "send", "transfer", "pay", "give",
];

/// Suffix variants mapped onto a registry alias.
const NETWORK_VARIATIONS: &[(&str, &str)] = &[
    ("aptos mainnet", "aptos"),
    ("aptos main", "aptos"),
    ("apt mainnet", "aptos"),
    ("apt testnet", "aptos testnet"),
    ("apt test", "aptos testnet"),
    ("base mainnet", "base"),
    ("base main", "base"),
    ("polygon mainnet", "polygon"),
    ("polygon main", "polygon"),
    ("matic mainnet", "polygon"),
    ("matic testnet", "polygon testnet"),
    ("matic test", "polygon testnet"),
    ("polygon amoy testnet", "polygon testnet"),
    ("solana mainnet", "solana"),
    ("solana main", "solana"),
    ("solana mainnet-beta", "solana"),
    ("sol mainnet", "solana"),
    ("solana testnet", "solana devnet"),
    ("solana test", "solana devnet"),
    ("sol devnet", "solana devnet"),
    ("sol dev", "solana devnet"),
];

/// Network implied by a token symbol when no network phrase is given.
const TOKEN_NETWORK_DEFAULTS: &[(&str, Network)] = &[
    ("apt", Network::Aptos),
    ("aptos", Network::Aptos),
    ("sol", Network::Solana),
    ("solana", Network::Solana),
    ("matic", Network::Polygon),
    ("pol", Network::Polygon),
];

fn rule(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid built-in pattern {}: {}", pattern, e))
}

// ============================================================================
// EXTRACTOR
// ============================================================================

/// Heuristic extractor driven by the rule tables above.
#[derive(Debug, Clone, Default)]
pub struct PatternExtractor;

impl PatternExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Runs the extraction synchronously.
    pub fn extract_fields(&self, input: &str) -> ExtractedIntent {
        let shape = match_transfer_shape(input);
        let token = shape.as_ref().map(|(_, token, _)| token.clone());

        let network = match network_phrase(input) {
            Some(phrase) => phrase,
            None => default_network_for_token(token.as_deref()).as_str().to_string(),
        };

        let (quantity, recipient) = match shape {
            Some((quantity, _, recipient)) => (Some(quantity), Some(recipient)),
            None => (None, None),
        };

        ExtractedIntent {
            network: Some(network),
            token,
            quantity,
            recipient,
        }
    }
}

#[async_trait]
impl IntentExtractor for PatternExtractor {
    async fn extract(&self, input: &str) -> Result<ExtractedIntent> {
        Ok(self.extract_fields(input))
    }

    fn name(&self) -> &str {
        "pattern"
    }
}

/// Tries each transfer rule in priority order.
///
/// # Returns
///
/// * `Some((quantity, token, recipient))` - First rule that matched
/// * `None` - No rule matched
fn match_transfer_shape(input: &str) -> Option<(f64, String, String)> {
    TRANSFER_RULES.iter().find_map(|rule| {
        let caps = rule.pattern.captures(input)?;
        let fields = fields_from(rule, &caps)?;
        debug!("Transfer rule '{}' matched", rule.name);
        Some(fields)
    })
}

fn fields_from(rule: &TransferRule, caps: &Captures<'_>) -> Option<(f64, String, String)> {
    let quantity = caps.get(rule.quantity)?.as_str().parse::<f64>().ok()?;
    let token = caps.get(rule.token)?.as_str().to_lowercase();
    let recipient = caps.get(rule.recipient)?.as_str().trim().to_string();

    if RESERVED_RECIPIENTS.contains(&recipient.to_lowercase().as_str()) {
        return None;
    }

    Some((quantity, token, recipient))
}

/// Network text named by the instruction.
///
/// Connectives are tried from last to first; the first one followed by a known
/// network (alias, canonical identifier or suffix variant) wins. When none is,
/// the phrase after the last connective is returned for the registry to reject.
fn network_phrase(input: &str) -> Option<String> {
    let tails: Vec<&str> = NETWORK_CONNECTIVE
        .find_iter(input)
        .map(|m| &input[m.end()..])
        .collect();

    if let Some(known) = tails.iter().rev().find_map(|tail| known_network_prefix(tail)) {
        return Some(known);
    }

    tails
        .last()
        .map(|tail| bare_phrase(tail))
        .filter(|phrase| phrase.starts_with(|c: char| c.is_ascii_alphabetic()))
}

fn phrase_words(tail: &str) -> Vec<String> {
    tail.split_whitespace()
        .map(|w| w.trim_matches(|c: char| matches!(c, '.' | ',' | '!' | '?')).to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}

/// Longest leading run of words that names a network, mapped through the
/// suffix variants.
fn known_network_prefix(tail: &str) -> Option<String> {
    let words = phrase_words(tail);
    (1..=words.len()).rev().find_map(|n| {
        let mapped = apply_network_variation(&words[..n].join(" "));
        NetworkRegistry.normalize(&mapped).map(|_| mapped)
    })
}

/// Unrecognized phrase without a trailing "network/chain" word.
fn bare_phrase(tail: &str) -> String {
    let mut words = phrase_words(tail);
    if words.len() > 1 && words.last().map_or(false, |w| NETWORK_SUFFIXES.contains(&w.as_str())) {
        words.pop();
    }
    words.join(" ")
}

/// Maps mainnet/testnet suffix variants onto registry aliases; other phrases
/// pass through unchanged for the registry to judge.
fn apply_network_variation(phrase: &str) -> String {
    let collapsed = phrase.split_whitespace().collect::<Vec<_>>().join(" ");
    NETWORK_VARIATIONS
        .iter()
        .find(|(variant, _)| *variant == collapsed)
        .map(|(_, alias)| alias.to_string())
        .unwrap_or(collapsed)
}

fn default_network_for_token(token: Option<&str>) -> Network {
    token
        .and_then(|symbol| {
            TOKEN_NETWORK_DEFAULTS
                .iter()
                .find(|(default_symbol, _)| *default_symbol == symbol)
                .map(|(_, network)| *network)
        })
        .unwrap_or(Network::Aptos)
}
