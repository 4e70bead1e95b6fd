//! Turn executor
//!
//! Runs one user turn through the decide/act loop: asks the decision step,
//! feeds its answer through the pure transition function, performs the
//! resulting effects, and repeats until the loop terminates.

use super::traits::{LlmClient, ToolExecutor};
use super::TurnError;
use crate::llm::LlmRequest;
use crate::state_machine::{
    transition, ConversationState, Effect, Event, LoopContext, LoopPhase, ToolCall, ToolResult,
};
use crate::system_prompt::build_system_prompt;
use std::sync::Arc;
use std::time::Duration;

/// Limits applied to every turn
#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub max_cycles: u32,
    pub decision_timeout: Duration,
    /// City names advertised in the system prompt
    pub known_cities: Vec<String>,
}

/// Generic turn runner that works with any decision step and tool executor
pub struct AgentLoop<L, T>
where
    L: LlmClient + 'static,
    T: ToolExecutor + 'static,
{
    llm_client: Arc<L>,
    tool_executor: Arc<T>,
    config: LoopConfig,
}

impl<L, T> AgentLoop<L, T>
where
    L: LlmClient + 'static,
    T: ToolExecutor + 'static,
{
    pub fn new(llm_client: L, tool_executor: T, config: LoopConfig) -> Self {
        Self {
            llm_client: Arc::new(llm_client),
            tool_executor: Arc::new(tool_executor),
            config,
        }
    }

    /// Run the loop until the decision step stops requesting tools.
    ///
    /// The caller must have appended the user's message already. Returns the
    /// updated state; on error the partially updated state is discarded.
    pub async fn run_turn(
        &self,
        conversation_id: &str,
        mut state: ConversationState,
    ) -> Result<ConversationState, TurnError> {
        let context = LoopContext::new(conversation_id, self.config.max_cycles);
        let mut phase = LoopPhase::default();

        tracing::debug!(
            conv_id = %conversation_id,
            model = %self.llm_client.model_id(),
            messages = state.messages.len(),
            "Starting turn"
        );

        let mut events_to_process = vec![self.request_decision(&context, &state).await?];

        while let Some(event) = events_to_process.pop() {
            let result = transition(&phase, &context, event)?;
            phase = result.new_phase;

            for effect in result.effects {
                if let Some(generated) = self.execute_effect(&context, &mut state, effect).await? {
                    events_to_process.push(generated);
                }
            }
        }

        if !phase.is_terminal() {
            return Err(TurnError::Transition(
                crate::state_machine::TransitionError::InvalidTransition(format!(
                    "loop stopped while {}",
                    phase.name()
                )),
            ));
        }

        Ok(state)
    }

    async fn execute_effect(
        &self,
        context: &LoopContext,
        state: &mut ConversationState,
        effect: Effect,
    ) -> Result<Option<Event>, TurnError> {
        match effect {
            Effect::PatchSlots { call } => {
                let patch = self.tool_executor.slot_patch(&call.name, &call.input);
                if !patch.is_empty() {
                    tracing::debug!(
                        conv_id = %context.conversation_id,
                        tool = %call.name,
                        patch = ?patch,
                        "Merging slot patch"
                    );
                    state.slots.apply(patch);
                }
                Ok(None)
            }

            Effect::AppendMessage { message } => {
                state.messages.push(message);
                Ok(None)
            }

            Effect::RequestDecision => Ok(Some(self.request_decision(context, state).await?)),

            Effect::ExecuteTools { calls } => {
                let results = self.execute_tools(context, calls).await;
                Ok(Some(Event::ToolsCompleted { results }))
            }

            Effect::Finish => {
                tracing::info!(
                    conv_id = %context.conversation_id,
                    messages = state.messages.len(),
                    "Turn complete"
                );
                Ok(None)
            }
        }
    }

    async fn request_decision(
        &self,
        context: &LoopContext,
        state: &ConversationState,
    ) -> Result<Event, TurnError> {
        let request = LlmRequest {
            system: Some(build_system_prompt(&self.config.known_cities, &state.slots)),
            messages: state.messages.clone(),
            tools: self.tool_executor.definitions(),
            max_tokens: None,
        };

        let response = tokio::time::timeout(
            self.config.decision_timeout,
            self.llm_client.complete(&request),
        )
        .await
        .map_err(|_| {
            tracing::warn!(
                conv_id = %context.conversation_id,
                timeout_ms = %self.config.decision_timeout.as_millis(),
                "Decision step timed out"
            );
            TurnError::DecisionTimeout(self.config.decision_timeout)
        })??;

        let tool_calls = response
            .tool_uses()
            .into_iter()
            .map(|(id, name, input)| ToolCall::new(id, name, input.clone()))
            .collect();

        Ok(Event::DecisionReceived {
            content: response.content,
            tool_calls,
        })
    }

    /// Run calls strictly one after another, in the order requested
    async fn execute_tools(&self, context: &LoopContext, calls: Vec<ToolCall>) -> Vec<ToolResult> {
        let mut results = Vec::with_capacity(calls.len());
        for call in calls {
            let start = std::time::Instant::now();
            let result = match self.tool_executor.execute(&call.name, call.input).await {
                Some(output) if output.success => ToolResult::success(&call.id, output.output),
                Some(output) => ToolResult::error(&call.id, output.output),
                None => {
                    tracing::warn!(
                        conv_id = %context.conversation_id,
                        tool = %call.name,
                        "Decision step requested an unknown tool"
                    );
                    ToolResult::error(&call.id, format!("Unknown tool: {}", call.name))
                }
            };
            tracing::info!(
                conv_id = %context.conversation_id,
                tool = %call.name,
                tool_use_id = %call.id,
                is_error = result.is_error,
                duration_ms = %start.elapsed().as_millis(),
                "Tool finished"
            );
            results.push(result);
        }
        results
    }
}
