//! Effects produced by loop transitions

use crate::llm::{ContentBlock, LlmMessage};
use crate::state_machine::state::ToolCall;

/// Effects to be executed, in order, after a transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Ask the owning tool which slots this call updates and merge them
    PatchSlots { call: ToolCall },

    /// Append a message to the conversation history
    AppendMessage { message: LlmMessage },

    /// Call the decision step with the current history
    RequestDecision,

    /// Run the tool calls one at a time, in order
    ExecuteTools { calls: Vec<ToolCall> },

    /// The turn is over; the last message is the reply
    Finish,
}

impl Effect {
    pub fn append_assistant(content: Vec<ContentBlock>) -> Self {
        Effect::AppendMessage {
            message: LlmMessage::assistant(content),
        }
    }

    pub fn append_tool_results(content: Vec<ContentBlock>) -> Self {
        Effect::AppendMessage {
            message: LlmMessage::tool_results(content),
        }
    }
}
