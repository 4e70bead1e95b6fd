//! Conversation runtime
//!
//! Owns the conversation store and runs each turn through the agent loop,
//! allowing at most one turn in flight per conversation id.

mod executor;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use executor::{AgentLoop, LoopConfig};
pub use traits::*;

use crate::llm::{LlmError, LlmMessage};
use crate::state_machine::TransitionError;
use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;

/// Type alias for the production manager with concrete implementations
pub type ProductionManager =
    ConversationManager<InMemoryStore, ServiceLlmClient, ToolRegistryExecutor>;

/// Reply used when a turn ends without any message
const FALLBACK_REPLY: &str = "Sorry, I couldn't process that.";

/// Attempts at drawing an unused numeric id before falling back to a UUID
const MAX_ID_ATTEMPTS: usize = 100;

/// Errors that fail a whole turn
#[derive(Debug, Error)]
pub enum TurnError {
    #[error("Decision step failed: {0}")]
    Upstream(#[from] LlmError),
    #[error("Decision step did not answer within {0:?}")]
    DecisionTimeout(Duration),
    #[error("Decision step kept requesting tools after {limit} cycles")]
    CycleLimitExceeded { limit: u32 },
    #[error(transparent)]
    Transition(TransitionError),
    #[error("Conversation store failed: {0}")]
    Store(String),
}

impl From<TransitionError> for TurnError {
    fn from(e: TransitionError) -> Self {
        match e {
            TransitionError::CycleLimitExceeded { limit } => TurnError::CycleLimitExceeded { limit },
            other @ TransitionError::InvalidTransition(_) => TurnError::Transition(other),
        }
    }
}

/// Reply to one user turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnReply {
    pub response: String,
    pub conversation_id: String,
}

/// Manager for all conversations
pub struct ConversationManager<S, L, T>
where
    S: ConversationStore + 'static,
    L: LlmClient + 'static,
    T: ToolExecutor + 'static,
{
    store: S,
    agent: AgentLoop<L, T>,
    /// One lock per conversation id, held for the whole turn
    turn_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl<S, L, T> ConversationManager<S, L, T>
where
    S: ConversationStore + 'static,
    L: LlmClient + 'static,
    T: ToolExecutor + 'static,
{
    pub fn new(store: S, agent: AgentLoop<L, T>) -> Self {
        Self {
            store,
            agent,
            turn_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Handle one user message.
    ///
    /// A missing or blank `conversation_id` starts a new conversation. The
    /// stored state is only replaced when the turn succeeds.
    pub async fn handle_turn(
        &self,
        message: &str,
        conversation_id: Option<String>,
    ) -> Result<TurnReply, TurnError> {
        let (conversation_id, is_new) = match conversation_id.filter(|id| !id.trim().is_empty()) {
            Some(id) => (id, false),
            None => (self.generate_id().await?, true),
        };

        let lock = self.turn_lock(&conversation_id).await;
        let _guard = lock.lock().await;

        let result = self.run_locked_turn(message, &conversation_id).await;
        if let Err(e) = &result {
            tracing::error!(conv_id = %conversation_id, error = %e, "Turn failed");
            if is_new {
                // Nothing was stored, so the id was never handed out
                self.turn_locks.lock().await.remove(&conversation_id);
            }
        }
        let response = result?;

        Ok(TurnReply {
            response,
            conversation_id,
        })
    }

    /// Run one turn with the conversation's lock held; returns the reply text
    async fn run_locked_turn(
        &self,
        message: &str,
        conversation_id: &str,
    ) -> Result<String, TurnError> {
        let mut state = self
            .store
            .get(conversation_id)
            .await
            .map_err(TurnError::Store)?
            .unwrap_or_default();
        state.messages.push(LlmMessage::user(message));

        let state = self.agent.run_turn(conversation_id, state).await?;

        let response = state
            .last_text()
            .unwrap_or_else(|| FALLBACK_REPLY.to_string());

        self.store
            .put(conversation_id, state)
            .await
            .map_err(TurnError::Store)?;

        Ok(response)
    }

    /// Current stored state for a conversation
    #[cfg(test)]
    pub async fn conversation(
        &self,
        conv_id: &str,
    ) -> Result<Option<crate::state_machine::ConversationState>, TurnError> {
        self.store.get(conv_id).await.map_err(TurnError::Store)
    }

    async fn turn_lock(&self, conv_id: &str) -> Arc<Mutex<()>> {
        self.turn_locks
            .lock()
            .await
            .entry(conv_id.to_string())
            .or_default()
            .clone()
    }

    /// Draw a fresh 4-digit id, reserving it before returning
    async fn generate_id(&self) -> Result<String, TurnError> {
        let mut locks = self.turn_locks.lock().await;
        for _ in 0..MAX_ID_ATTEMPTS {
            let candidate = rand::thread_rng().gen_range(1000..=9999).to_string();
            if locks.contains_key(&candidate)
                || self
                    .store
                    .contains(&candidate)
                    .await
                    .map_err(TurnError::Store)?
            {
                continue;
            }
            locks.insert(candidate.clone(), Arc::default());
            return Ok(candidate);
        }

        let id = uuid::Uuid::new_v4().to_string();
        locks.insert(id.clone(), Arc::default());
        Ok(id)
    }
}
