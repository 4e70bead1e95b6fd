//! Tools the decision step can call
//!
//! Tools are stateless singletons registered by name. Each declares which
//! conversation slots a call to it updates, so the loop never special-cases a
//! tool by name when merging state.

mod args;
pub mod gather;
pub mod itinerary;

pub use gather::{GatherInfoTool, GATHER_TOOL_NAME};
pub use itinerary::{ItineraryTool, ITINERARY_TOOL_NAME};

use crate::knowledge::KnowledgeBase;
use crate::llm::ToolDefinition;
use crate::state_machine::SlotPatch;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Result from tool execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolOutput {
    pub success: bool,
    pub output: String,
}

impl ToolOutput {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            output: message.into(),
        }
    }
}

/// Trait for tools that can be executed by the agent
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name
    fn name(&self) -> &str;

    /// Tool description for the decision step
    fn description(&self) -> String;

    /// JSON schema for tool input
    fn input_schema(&self) -> Value;

    /// Slots a call with this input updates. Most tools update none.
    fn slot_patch(&self, _input: &Value) -> SlotPatch {
        SlotPatch::default()
    }

    /// Execute the tool
    async fn run(&self, input: Value) -> ToolOutput;
}

/// Collection of tools available to conversations
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Information gathering plus itinerary generation
    pub fn standard(kb: Arc<KnowledgeBase>) -> Self {
        Self::new(vec![
            Arc::new(GatherInfoTool),
            Arc::new(ItineraryTool::new(kb)),
        ])
    }

    pub fn new(tools: Vec<Arc<dyn Tool>>) -> Self {
        Self { tools }
    }

    fn find(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|tool| tool.name() == name)
    }

    /// Get all tool definitions for the decision step
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .map(|t| ToolDefinition {
                name: t.name().to_string(),
                description: t.description(),
                input_schema: t.input_schema(),
            })
            .collect()
    }

    /// Execute a tool by name; `None` when no tool has that name
    pub async fn execute(&self, name: &str, input: Value) -> Option<ToolOutput> {
        match self.find(name) {
            Some(tool) => Some(tool.run(input).await),
            None => None,
        }
    }

    /// Slot patch for a call; unknown tools patch nothing
    pub fn slot_patch(&self, name: &str, input: &Value) -> SlotPatch {
        self.find(name)
            .map(|tool| tool.slot_patch(input))
            .unwrap_or_default()
    }
}
