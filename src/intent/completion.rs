//! Completion-backed intent extraction
//!
//! Alternate extractor that asks an OpenAI-compatible chat completion API to
//! turn the instruction into the transfer JSON object. The reply is checked
//! against a fixed four-key schema, and its network must be an exact canonical
//! identifier. Aliases are resolved by the prompt, never by the reply parser.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{ExtractedIntent, IntentExtractor};
use crate::config::CompletionConfig;
use crate::error::{Result, TransferError};
use crate::network::Network;

/// Instruction prompt sent with every request.
pub const EXTRACTION_PROMPT: &str = r#"Extract transfer details from user input using these exact rules:

1. Format: "transfer {quantity} {token} to {address} on {network}"

2. Extract these fields:
   - quantity: number before the token symbol
   - token_address: always use " " (single space)
   - recipient_address: the address after "to"
   - network_name: map to one of these exact values:
     * "APTOS" for: aptos, apt (if no testnet mentioned)
     * "APTOS_TESTNET" for: aptos testnet, aptos test
     * "BASE" for: base
     * "POLYGON" for: polygon, matic
     * "POLYGON_TESTNET_AMOY" for: polygon testnet, polygon test
     * "SOLANA" for: solana, sol
     * "SOLANA_DEVNET" for: solana devnet, solana dev

3. Always return this exact JSON structure:
{
  "network_name": "<EXACT_NETWORK_NAME>",
  "token_address": " ",
  "quantity": <number>,
  "recipient_address": "<full_address>"
}

Example input: "transfer 2 apt to 0xc3df44663b7541bc5ce2793c12814dad216cdf05855c66381a8cb797e6bf9656 on aptos testnet"
Example output:
{
  "network_name": "APTOS_TESTNET",
  "token_address": " ",
  "quantity": 2,
  "recipient_address": "0xc3df44663b7541bc5ce2793c12814dad216cdf05855c66381a8cb797e6bf9656"
}"#;

// ============================================================================
// CLIENT
// ============================================================================

/// Extractor backed by a chat completion endpoint.
pub struct CompletionExtractor {
    client: Client,
    api_url: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl CompletionExtractor {
    /// Creates an extractor with explicit settings.
    pub fn new(api_url: String, api_key: String, model: String, temperature: f32) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .no_proxy()
            .build()
            .map_err(|e| TransferError::Completion(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_url,
            api_key,
            model,
            temperature,
        })
    }

    /// Creates an extractor from configuration, reading the API key from the
    /// environment variable the configuration names.
    pub fn from_config(config: &CompletionConfig) -> anyhow::Result<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .map_err(|_| anyhow::anyhow!("{} not set", config.api_key_env))?;
        Ok(Self::new(
            config.api_url.clone(),
            api_key,
            config.model.clone(),
            config.temperature,
        )?)
    }

    /// Sends the instruction and returns the assistant's raw reply.
    async fn complete(&self, input: &str) -> Result<String> {
        let request = ChatRequest {
            model: self.model.clone(),
            temperature: self.temperature,
            messages: vec![
                Message {
                    role: "system".into(),
                    content: EXTRACTION_PROMPT.into(),
                },
                Message {
                    role: "user".into(),
                    content: input.into(),
                },
            ],
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| TransferError::Completion(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(TransferError::Completion(format!("API error: {}", error_text)));
        }

        let completion: ChatResponse = response
            .json()
            .await
            .map_err(|e| TransferError::Completion(format!("unexpected response shape: {}", e)))?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| TransferError::Completion("empty response".into()))
    }
}

#[async_trait]
impl IntentExtractor for CompletionExtractor {
    async fn extract(&self, input: &str) -> Result<ExtractedIntent> {
        let reply = self.complete(input).await?;
        parse_reply(&reply)
    }

    fn name(&self) -> &str {
        "completion"
    }
}

// ============================================================================
// REPLY PARSING
// ============================================================================

/// Transfer object the completion backend must return.
#[derive(Debug, Deserialize)]
struct TransferReply {
    network_name: String,
    token_address: String,
    quantity: serde_json::Value,
    recipient_address: String,
}

/// Parses the assistant reply into raw fields.
///
/// Surrounding prose or code fences are tolerated; the outermost `{...}` is
/// taken as the object. A `network_name` that is not a canonical identifier
/// (`"sol"`, `"aptos testnet"`) is rejected with
/// [`TransferError::UnsupportedNetwork`].
pub fn parse_reply(reply: &str) -> Result<ExtractedIntent> {
    let start = reply.find('{');
    let end = reply.rfind('}');
    let body = match (start, end) {
        (Some(s), Some(e)) if s < e => &reply[s..=e],
        _ => {
            return Err(TransferError::Completion(
                "reply does not contain a JSON object".into(),
            ))
        }
    };

    let parsed: TransferReply = serde_json::from_str(body)
        .map_err(|e| TransferError::Completion(format!("reply does not match transfer schema: {}", e)))?;

    let network = parsed
        .network_name
        .parse::<Network>()
        .map_err(|_| TransferError::UnsupportedNetwork(parsed.network_name.trim().to_string()))?;

    let quantity = match &parsed.quantity {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    Ok(ExtractedIntent {
        network: Some(network.as_str().to_string()),
        token: Some(parsed.token_address),
        quantity,
        recipient: Some(parsed.recipient_address),
    })
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    temperature: f32,
    messages: Vec<Message>,
}

#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}
