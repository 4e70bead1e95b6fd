//! Conversation and loop state types

use crate::llm::LlmMessage;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Trip Slots
// ============================================================================

/// Trip parameters collected across turns
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripSlots {
    pub cities: Option<Vec<String>>,
    pub days: Option<u64>,
    pub people: Option<u64>,
    pub budget: Option<u64>,
    pub transport: Option<String>,
}

impl TripSlots {
    /// Merge a patch. Only fields present in the patch are written, so a slot
    /// that has been set is never cleared.
    pub fn apply(&mut self, patch: SlotPatch) {
        let SlotPatch {
            cities,
            days,
            people,
            budget,
            transport,
        } = patch;
        if cities.is_some() {
            self.cities = cities;
        }
        if days.is_some() {
            self.days = days;
        }
        if people.is_some() {
            self.people = people;
        }
        if budget.is_some() {
            self.budget = budget;
        }
        if transport.is_some() {
            self.transport = transport;
        }
    }
}

/// Slot updates a tool call declares
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotPatch {
    pub cities: Option<Vec<String>>,
    pub days: Option<u64>,
    pub people: Option<u64>,
    pub budget: Option<u64>,
    pub transport: Option<String>,
}

impl SlotPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

// ============================================================================
// Conversation State
// ============================================================================

/// Everything the planner knows about one conversation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationState {
    /// Full history; grows every turn and is never truncated
    pub messages: Vec<LlmMessage>,
    pub slots: TripSlots,
}

impl ConversationState {
    /// Text of the most recent message, if any
    pub fn last_text(&self) -> Option<String> {
        self.messages.last().map(LlmMessage::text)
    }
}

// ============================================================================
// Tool Call
// ============================================================================

/// A tool invocation requested by the decision step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub input: Value,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, input: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            input,
        }
    }
}

// ============================================================================
// Loop Phase
// ============================================================================

/// Phase of the decide/act loop within one turn
#[derive(Debug, Clone, PartialEq)]
pub enum LoopPhase {
    /// Waiting on the decision step. `cycle` counts completed act phases.
    Deciding { cycle: u32 },
    /// Executing the tool calls from the last decision, in order
    Acting { cycle: u32, pending: Vec<ToolCall> },
    /// Last decision carried no tool calls
    Terminated,
}

impl Default for LoopPhase {
    fn default() -> Self {
        LoopPhase::Deciding { cycle: 0 }
    }
}

impl LoopPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, LoopPhase::Terminated)
    }

    pub fn name(&self) -> &'static str {
        match self {
            LoopPhase::Deciding { .. } => "deciding",
            LoopPhase::Acting { .. } => "acting",
            LoopPhase::Terminated => "terminated",
        }
    }
}

/// Default bound on decide/act cycles per turn
pub const DEFAULT_MAX_CYCLES: u32 = 8;

/// Immutable configuration for one turn
#[derive(Debug, Clone)]
pub struct LoopContext {
    pub conversation_id: String,
    pub max_cycles: u32,
}

impl LoopContext {
    pub fn new(conversation_id: impl Into<String>, max_cycles: u32) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            max_cycles,
        }
    }
}
