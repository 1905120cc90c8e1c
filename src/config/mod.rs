//! Configuration Management Module
//!
//! This module handles loading and managing configuration for the transfer
//! service client, the status monitor, the intent parser and the contact
//! snapshot.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::contacts::Contact;
use crate::network::Network;

// ============================================================================
// CONFIGURATION STRUCTURES
// ============================================================================

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Transfer service connection
    pub service: ServiceConfig,
    /// Order status polling
    #[serde(default)]
    pub monitor: MonitorConfig,
    /// Intent parser settings
    #[serde(default)]
    pub parser: ParserConfig,
    /// Completion backend (required when `parser.backend = "completion"`)
    #[serde(default)]
    pub completion: Option<CompletionConfig>,
    /// Contact snapshot (use [[contact]] in TOML, order is preserved)
    #[serde(default)]
    pub contact: Vec<ContactConfig>,
}

/// Transfer service connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Base URL of the transfer service
    pub base_url: String,
    /// Environment variable holding the session bearer token
    #[serde(default = "default_auth_token_env")]
    pub auth_token_env: String,
    /// Per-request timeout in milliseconds
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

/// Order status polling settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Pause between status checks in milliseconds
    #[serde(default = "default_polling_interval_ms")]
    pub polling_interval_ms: u64,
    /// Maximum number of status checks per order
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            polling_interval_ms: default_polling_interval_ms(),
            max_attempts: default_max_attempts(),
        }
    }
}

/// Which extractor the intent parser uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParserBackend {
    /// Ordered pattern rules
    Pattern,
    /// Chat completion service
    Completion,
}

/// Intent parser settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParserConfig {
    #[serde(default = "default_parser_backend")]
    pub backend: ParserBackend,
    /// Keywords that divert an instruction away from the transfer pipeline
    #[serde(default = "default_bypass_keywords")]
    pub bypass_keywords: Vec<String>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            backend: default_parser_backend(),
            bypass_keywords: default_bypass_keywords(),
        }
    }
}

/// Completion backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    /// Chat completion endpoint
    pub api_url: String,
    #[serde(default = "default_completion_model")]
    pub model: String,
    /// Environment variable holding the API key
    #[serde(default = "default_completion_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_completion_temperature")]
    pub temperature: f32,
}

/// One saved contact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactConfig {
    pub name: String,
    pub address: String,
    /// Canonical network identifier (e.g. "SOLANA")
    pub network: String,
}

fn default_auth_token_env() -> String {
    "OKTO_AUTH_TOKEN".to_string()
}

fn default_request_timeout_ms() -> u64 {
    30000
}

fn default_polling_interval_ms() -> u64 {
    3000
}

fn default_max_attempts() -> u32 {
    20
}

fn default_parser_backend() -> ParserBackend {
    ParserBackend::Pattern
}

fn default_bypass_keywords() -> Vec<String> {
    vec![crate::intent::DEFAULT_BYPASS_KEYWORD.to_string()]
}

fn default_completion_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_completion_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_completion_temperature() -> f32 {
    0.1
}

// ============================================================================
// CONFIGURATION LOADING AND MANAGEMENT
// ============================================================================

impl Config {
    /// Loads configuration from a TOML file.
    ///
    /// Path priority: `path` argument, then the `OMNIFY_CONFIG_PATH` environment
    /// variable, then `config/omnify.toml`.
    ///
    /// # Returns
    ///
    /// * `Ok(Config)` - Successfully loaded and validated configuration
    /// * `Err(anyhow::Error)` - File missing, unparsable, or invalid
    pub fn load_from_path(path: Option<&str>) -> anyhow::Result<Self> {
        let config_path = path
            .map(|p| p.to_string())
            .or_else(|| std::env::var("OMNIFY_CONFIG_PATH").ok())
            .unwrap_or_else(|| "config/omnify.toml".to_string());

        if std::path::Path::new(&config_path).exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config = Self::from_toml_str(&content)?;
            Ok(config)
        } else {
            Err(anyhow::anyhow!(
                "Configuration file '{}' not found. Please copy the template:\n\
                cp config/omnify.template.toml config/omnify.toml\n\
                Then edit config/omnify.toml with your actual values.",
                config_path
            ))
        }
    }

    /// Loads configuration from the default location.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from_path(None)
    }

    /// Parses and validates a TOML document.
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// Checks:
    /// - Service and completion URLs parse
    /// - Polling interval and attempt budget are non-zero
    /// - The completion backend is configured when selected
    /// - Contacts have non-empty, unique names and canonical networks
    pub fn validate(&self) -> anyhow::Result<()> {
        url::Url::parse(&self.service.base_url).map_err(|e| {
            anyhow::anyhow!("Configuration error: invalid service.base_url '{}': {}", self.service.base_url, e)
        })?;

        if self.monitor.polling_interval_ms == 0 {
            anyhow::bail!("Configuration error: monitor.polling_interval_ms must be greater than 0");
        }
        if self.monitor.max_attempts == 0 {
            anyhow::bail!("Configuration error: monitor.max_attempts must be greater than 0");
        }

        if let Some(completion) = &self.completion {
            url::Url::parse(&completion.api_url).map_err(|e| {
                anyhow::anyhow!("Configuration error: invalid completion.api_url '{}': {}", completion.api_url, e)
            })?;
        } else if self.parser.backend == ParserBackend::Completion {
            anyhow::bail!("Configuration error: parser.backend is \"completion\" but no [completion] section is configured");
        }

        let mut names = HashSet::new();
        for contact in &self.contact {
            let key = contact.name.trim().to_lowercase();
            if key.is_empty() {
                anyhow::bail!("Configuration error: contact with address {} has an empty name", contact.address);
            }
            if !names.insert(key) {
                anyhow::bail!("Configuration error: duplicate contact name '{}'", contact.name);
            }
            contact.network.parse::<Network>().map_err(|_| {
                anyhow::anyhow!(
                    "Configuration error: contact '{}' has unsupported network '{}'",
                    contact.name,
                    contact.network
                )
            })?;
            if contact.address.trim().is_empty() {
                anyhow::bail!("Configuration error: contact '{}' has an empty address", contact.name);
            }
        }

        Ok(())
    }

    /// Contact snapshot in file order.
    pub fn contacts(&self) -> anyhow::Result<Vec<Contact>> {
        self.contact
            .iter()
            .map(|c| {
                let network = c
                    .network
                    .parse::<Network>()
                    .map_err(|e| anyhow::anyhow!("contact '{}': {}", c.name, e))?;
                Ok(Contact {
                    name: c.name.clone(),
                    address: c.address.clone(),
                    network,
                })
            })
            .collect()
    }
}
