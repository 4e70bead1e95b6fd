//! Events that drive the decide/act loop

use crate::llm::ContentBlock;
use crate::state_machine::state::ToolCall;

/// Events that trigger loop transitions
#[derive(Debug, Clone)]
pub enum Event {
    /// The decision step answered
    DecisionReceived {
        content: Vec<ContentBlock>,
        /// Tool calls extracted from the content, in order
        tool_calls: Vec<ToolCall>,
    },
    /// Every pending tool call has produced a result
    ToolsCompleted { results: Vec<ToolResult> },
}

/// Output of one tool call, correlated by call id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolResult {
    pub tool_use_id: String,
    pub output: String,
    pub is_error: bool,
}

impl ToolResult {
    pub fn success(tool_use_id: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            tool_use_id: tool_use_id.into(),
            output: output.into(),
            is_error: false,
        }
    }

    pub fn error(tool_use_id: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            tool_use_id: tool_use_id.into(),
            output: output.into(),
            is_error: true,
        }
    }

    pub fn to_content_block(&self) -> ContentBlock {
        ContentBlock::tool_result(&self.tool_use_id, &self.output, self.is_error)
    }
}
