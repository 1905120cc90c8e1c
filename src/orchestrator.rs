//! Transfer Orchestrator
//!
//! Runs one instruction through the whole pipeline:
//! 1. **Parse**: instruction → validated intent (or a side command)
//! 2. **Resolve**: a matching contact overrides recipient and network
//! 3. **Submit**: the intent is sent to the transfer service for an order ID
//! 4. **Monitor**: the order is polled until it reaches a terminal status
//!
//! Every call owns its own [`TransferContext`], so concurrent calls never
//! share state. Failures at any step end the transfer in FAILED with a
//! readable reason; nothing is retried at this level.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::client::{TransferApi, TransferRequest};
use crate::contacts::{Contact, ContactResolver, ContactSource};
use crate::error::{Result, TransferError};
use crate::intent::{IntentParser, ParseOutcome, SideCommand, TransferIntent};
use crate::monitor::{OrderStatus, StatusMonitor, TransferOrder};

// ============================================================================
// STATE MACHINE
// ============================================================================

/// Lifecycle of a single transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransferState {
    /// Instruction received, not yet submitted
    Initiated,
    /// Transfer service accepted the request and returned an order ID
    Submitted,
    /// Order status is being polled
    Monitoring,
    /// Order settled successfully
    Success,
    /// Transfer failed at any step
    Failed,
}

impl TransferState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransferState::Success | TransferState::Failed)
    }

    /// Whether `next` is a legal successor of this state.
    pub fn can_transition_to(&self, next: TransferState) -> bool {
        use TransferState::*;
        matches!(
            (self, next),
            (Initiated, Submitted)
                | (Initiated, Failed)
                | (Submitted, Monitoring)
                | (Submitted, Failed)
                | (Monitoring, Success)
                | (Monitoring, Failed)
        )
    }
}

/// Per-transfer working state, passed through the pipeline.
#[derive(Debug, Clone)]
pub struct TransferContext {
    pub transfer_id: Uuid,
    pub input: String,
    pub state: TransferState,
    pub intent: Option<TransferIntent>,
    pub contact: Option<Contact>,
    pub order: Option<TransferOrder>,
    pub error: Option<TransferError>,
    pub started_at: DateTime<Utc>,
}

impl TransferContext {
    pub fn new(input: &str) -> Self {
        Self {
            transfer_id: Uuid::new_v4(),
            input: input.to_string(),
            state: TransferState::Initiated,
            intent: None,
            contact: None,
            order: None,
            error: None,
            started_at: Utc::now(),
        }
    }

    fn advance(&mut self, next: TransferState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal transfer transition {:?} -> {:?}",
            self.state,
            next
        );
        debug!("Transfer {}: {:?} -> {:?}", self.transfer_id, self.state, next);
        self.state = next;
    }

    fn fail(mut self, err: TransferError) -> TransferOutcome {
        error!("Transfer {} failed ({}): {}", self.transfer_id, err.kind(), err);
        self.advance(TransferState::Failed);
        self.error = Some(err);
        self.finish()
    }

    fn finish(self) -> TransferOutcome {
        let (error, error_kind) = match (&self.error, &self.order) {
            (Some(err), _) => (Some(err.to_string()), Some(err.kind().to_string())),
            (None, Some(order)) if order.status == OrderStatus::Failed => {
                (Some(order.message.clone()), Some("order_failed".to_string()))
            }
            _ => (None, None),
        };

        TransferOutcome {
            transfer_id: self.transfer_id,
            state: self.state,
            intent: self.intent,
            contact: self.contact.map(|c| c.name),
            order: self.order,
            error,
            error_kind,
            started_at: self.started_at,
            finished_at: Utc::now(),
        }
    }
}

// ============================================================================
// OUTCOMES
// ============================================================================

/// Terminal result of a transfer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferOutcome {
    pub transfer_id: Uuid,
    /// Always SUCCESS or FAILED
    pub state: TransferState,
    pub intent: Option<TransferIntent>,
    /// Name of the contact that supplied the recipient, if any
    pub contact: Option<String>,
    pub order: Option<TransferOrder>,
    /// Human-readable failure reason
    pub error: Option<String>,
    /// Stable failure label (e.g. "network_mismatch")
    pub error_kind: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl TransferOutcome {
    pub fn is_success(&self) -> bool {
        self.state == TransferState::Success
    }

    /// Summary line for display.
    pub fn message(&self) -> String {
        match (&self.error, &self.order) {
            (Some(err), _) => err.clone(),
            (None, Some(order)) => order.message.clone(),
            (None, None) => format!("{:?}", self.state),
        }
    }
}

/// What `execute` did with an instruction.
#[derive(Debug, Clone)]
pub enum Execution {
    /// The instruction went through the transfer pipeline
    Transfer(TransferOutcome),
    /// The instruction named a bypass keyword and never entered the pipeline
    SideCommand(SideCommand),
}

// ============================================================================
// ORCHESTRATOR
// ============================================================================

/// Composes parsing, contact resolution, submission and monitoring.
#[derive(Clone)]
pub struct TransferOrchestrator {
    parser: IntentParser,
    resolver: ContactResolver,
    contacts: Arc<dyn ContactSource>,
    transfer_api: Arc<dyn TransferApi>,
    monitor: StatusMonitor,
}

impl TransferOrchestrator {
    /// Creates an orchestrator.
    ///
    /// # Arguments
    ///
    /// * `parser` - Instruction parser
    /// * `contacts` - Read-only contact snapshot provider
    /// * `transfer_api` - Transfer submission API
    /// * `monitor` - Order status monitor
    pub fn new(
        parser: IntentParser,
        contacts: Arc<dyn ContactSource>,
        transfer_api: Arc<dyn TransferApi>,
        monitor: StatusMonitor,
    ) -> Self {
        Self {
            parser,
            resolver: ContactResolver::new(),
            contacts,
            transfer_api,
            monitor,
        }
    }

    /// Executes one instruction to a terminal outcome.
    ///
    /// Never returns a transfer in a non-terminal state.
    pub async fn execute(&self, input: &str) -> Execution {
        let mut ctx = TransferContext::new(input);
        info!("Transfer {} initiated: {}", ctx.transfer_id, input);

        let intent = match self.parser.parse(input).await {
            Ok(ParseOutcome::Transfer(intent)) => intent,
            Ok(ParseOutcome::Bypass(command)) => {
                info!("Transfer {} not started: side command '{}'", ctx.transfer_id, command.keyword);
                return Execution::SideCommand(command);
            }
            Err(e) => return Execution::Transfer(ctx.fail(e)),
        };

        let intent = match self.resolve_recipient(&mut ctx, input, intent) {
            Ok(intent) => intent,
            Err(e) => return Execution::Transfer(ctx.fail(e)),
        };
        ctx.intent = Some(intent.clone());

        let order_id = match self.transfer_api.submit_transfer(&TransferRequest::from(&intent)).await {
            Ok(order_id) => order_id,
            Err(e) => return Execution::Transfer(ctx.fail(e)),
        };
        info!(
            "Transfer {} submitted: {} {} to {} on {} (order {})",
            ctx.transfer_id,
            intent.quantity,
            intent.token_address,
            intent.recipient_address,
            intent.network_name,
            order_id
        );
        ctx.order = Some(TransferOrder::submitted(&order_id));
        ctx.advance(TransferState::Submitted);

        ctx.advance(TransferState::Monitoring);
        let transfer_id = ctx.transfer_id;
        let order = self
            .monitor
            .monitor_with_progress(&order_id, |progress| {
                info!("Transfer {}: {}", transfer_id, progress.message);
            })
            .await;

        let final_state = if order.status == OrderStatus::Success {
            TransferState::Success
        } else {
            TransferState::Failed
        };
        ctx.order = Some(order);
        ctx.advance(final_state);
        info!("Transfer {} finished: {:?}", ctx.transfer_id, final_state);

        Execution::Transfer(ctx.finish())
    }

    /// Applies a matching contact, if any, to the parsed intent.
    fn resolve_recipient(
        &self,
        ctx: &mut TransferContext,
        input: &str,
        intent: TransferIntent,
    ) -> Result<TransferIntent> {
        let contacts = self.contacts.snapshot();
        match self.resolver.resolve(input, &contacts) {
            Some(contact) => {
                let intent = self.resolver.apply(intent, &contact)?;
                ctx.contact = Some(contact);
                Ok(intent)
            }
            None => Ok(intent),
        }
    }
}
