//! Trait abstractions for runtime I/O
//!
//! These traits let the loop run against scripted decision steps and
//! recording tool executors in tests.

use crate::llm::{LlmError, LlmRequest, LlmResponse, LlmService, ToolDefinition};
use crate::state_machine::{ConversationState, SlotPatch};
use crate::tools::{ToolOutput, ToolRegistry};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Client for the decision step
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Complete a decision request
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError>;

    /// Get the model ID
    fn model_id(&self) -> &str;
}

/// Executor for tools
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    /// Execute a tool by name; `None` when no tool has that name
    async fn execute(&self, name: &str, input: Value) -> Option<ToolOutput>;

    /// Slots a call updates
    fn slot_patch(&self, name: &str, input: &Value) -> SlotPatch;

    /// Get tool definitions for the decision step
    fn definitions(&self) -> Vec<ToolDefinition>;
}

/// Storage for conversation state, keyed by conversation id
#[async_trait]
pub trait ConversationStore: Send + Sync {
    async fn get(&self, conv_id: &str) -> Result<Option<ConversationState>, String>;

    /// Replace the stored state in full
    async fn put(&self, conv_id: &str, state: ConversationState) -> Result<(), String>;

    async fn contains(&self, conv_id: &str) -> Result<bool, String>;
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: LlmClient + ?Sized> LlmClient for Arc<T> {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        (**self).complete(request).await
    }

    fn model_id(&self) -> &str {
        (**self).model_id()
    }
}

#[async_trait]
impl<T: ToolExecutor + ?Sized> ToolExecutor for Arc<T> {
    async fn execute(&self, name: &str, input: Value) -> Option<ToolOutput> {
        (**self).execute(name, input).await
    }

    fn slot_patch(&self, name: &str, input: &Value) -> SlotPatch {
        (**self).slot_patch(name, input)
    }

    fn definitions(&self) -> Vec<ToolDefinition> {
        (**self).definitions()
    }
}

#[async_trait]
impl<T: ConversationStore + ?Sized> ConversationStore for Arc<T> {
    async fn get(&self, conv_id: &str) -> Result<Option<ConversationState>, String> {
        (**self).get(conv_id).await
    }

    async fn put(&self, conv_id: &str, state: ConversationState) -> Result<(), String> {
        (**self).put(conv_id, state).await
    }

    async fn contains(&self, conv_id: &str) -> Result<bool, String> {
        (**self).contains(conv_id).await
    }
}

// ============================================================================
// Production Adapters
// ============================================================================

/// Process-lifetime conversation store
#[derive(Default)]
pub struct InMemoryStore {
    states: RwLock<HashMap<String, ConversationState>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConversationStore for InMemoryStore {
    async fn get(&self, conv_id: &str) -> Result<Option<ConversationState>, String> {
        Ok(self.states.read().await.get(conv_id).cloned())
    }

    async fn put(&self, conv_id: &str, state: ConversationState) -> Result<(), String> {
        self.states.write().await.insert(conv_id.to_string(), state);
        Ok(())
    }

    async fn contains(&self, conv_id: &str) -> Result<bool, String> {
        Ok(self.states.read().await.contains_key(conv_id))
    }
}

/// Adapter to use an `LlmService` as `LlmClient`
pub struct ServiceLlmClient {
    service: Arc<dyn LlmService>,
}

impl ServiceLlmClient {
    pub fn new(service: Arc<dyn LlmService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl LlmClient for ServiceLlmClient {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        self.service.complete(request).await
    }

    fn model_id(&self) -> &str {
        self.service.model_id()
    }
}

/// Adapter to use `ToolRegistry` as `ToolExecutor`
pub struct ToolRegistryExecutor {
    registry: ToolRegistry,
}

impl ToolRegistryExecutor {
    pub fn new(registry: ToolRegistry) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl ToolExecutor for ToolRegistryExecutor {
    async fn execute(&self, name: &str, input: Value) -> Option<ToolOutput> {
        self.registry.execute(name, input).await
    }

    fn slot_patch(&self, name: &str, input: &Value) -> SlotPatch {
        self.registry.slot_patch(name, input)
    }

    fn definitions(&self) -> Vec<ToolDefinition> {
        self.registry.definitions()
    }
}
