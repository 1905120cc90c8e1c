//! Network Registry
//!
//! Canonical network identifiers accepted by the transfer service and the
//! case-insensitive text aliases users type for them. Alias sets are disjoint,
//! so a lookup can never be ambiguous.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

// ============================================================================
// CANONICAL NETWORKS
// ============================================================================

/// Networks the transfer service can execute on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Network {
    /// Aptos mainnet
    Aptos,
    /// Aptos testnet
    AptosTestnet,
    /// Base mainnet
    Base,
    /// Polygon PoS mainnet
    Polygon,
    /// Polygon Amoy testnet
    PolygonTestnetAmoy,
    /// Solana mainnet-beta
    Solana,
    /// Solana devnet
    SolanaDevnet,
}

impl Network {
    /// All canonical networks, in registry order.
    pub fn all() -> &'static [Network] {
        &[
            Network::Aptos,
            Network::AptosTestnet,
            Network::Base,
            Network::Polygon,
            Network::PolygonTestnetAmoy,
            Network::Solana,
            Network::SolanaDevnet,
        ]
    }

    /// Canonical identifier as sent to the transfer service.
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Aptos => "APTOS",
            Network::AptosTestnet => "APTOS_TESTNET",
            Network::Base => "BASE",
            Network::Polygon => "POLYGON",
            Network::PolygonTestnetAmoy => "POLYGON_TESTNET_AMOY",
            Network::Solana => "SOLANA",
            Network::SolanaDevnet => "SOLANA_DEVNET",
        }
    }

    /// Lower-case aliases that name this network.
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Network::Aptos => &["aptos", "apt"],
            Network::AptosTestnet => &["aptos testnet", "aptos test", "aptostestnet", "aptos-testnet"],
            Network::Base => &["base"],
            Network::Polygon => &["polygon", "matic"],
            Network::PolygonTestnetAmoy => &[
                "polygon testnet",
                "polygon test",
                "polygon-testnet",
                "polygon amoy",
                "amoy",
            ],
            Network::Solana => &["solana", "sol"],
            Network::SolanaDevnet => &["solana devnet", "solana dev", "solana-devnet"],
        }
    }
}

impl Display for Network {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = String;

    /// Parses a canonical identifier (`APTOS_TESTNET`), not an alias.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Network::all()
            .iter()
            .copied()
            .find(|network| network.as_str() == s.trim())
            .ok_or_else(|| format!("unknown network identifier: {}", s))
    }
}

// ============================================================================
// REGISTRY LOOKUP
// ============================================================================

/// Static alias table shared for the lifetime of the process.
#[derive(Debug, Clone, Copy, Default)]
pub struct NetworkRegistry;

impl NetworkRegistry {
    /// Resolves free text to a canonical network.
    ///
    /// Matching trims surrounding whitespace, collapses inner whitespace and
    /// ignores case. Canonical identifiers themselves are also accepted.
    ///
    /// # Arguments
    ///
    /// * `text` - Network phrase as typed by the user (e.g. "Aptos  Testnet")
    ///
    /// # Returns
    ///
    /// * `Some(Network)` - The text names a known network
    /// * `None` - No alias matches
    pub fn normalize(&self, text: &str) -> Option<Network> {
        let cleaned = text.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
        if cleaned.is_empty() {
            return None;
        }

        if let Ok(network) = cleaned.to_uppercase().replace([' ', '-'], "_").parse::<Network>() {
            return Some(network);
        }

        Network::all()
            .iter()
            .copied()
            .find(|network| network.aliases().iter().any(|alias| *alias == cleaned))
    }

    /// Whether `identifier` is one of the canonical network identifiers.
    pub fn is_supported(&self, identifier: &str) -> bool {
        identifier.parse::<Network>().is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_alias_sets_are_disjoint_and_non_empty() {
        let mut seen = HashSet::new();
        for network in Network::all() {
            assert!(!network.aliases().is_empty(), "{} has no alias", network);
            for alias in network.aliases() {
                assert!(seen.insert(*alias), "alias '{}' is listed twice", alias);
            }
        }
    }

    #[test]
    fn test_serde_uses_canonical_identifiers() {
        let json = serde_json::to_string(&Network::PolygonTestnetAmoy).unwrap();
        assert_eq!(json, "\"POLYGON_TESTNET_AMOY\"");
        let parsed: Network = serde_json::from_str("\"SOLANA_DEVNET\"").unwrap();
        assert_eq!(parsed, Network::SolanaDevnet);
    }
}
