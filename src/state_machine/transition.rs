//! Pure transition function for the decide/act loop
//!
//! Given the same phase, context and event this always produces the same
//! phase and effects. All I/O happens in the executor.

use super::{Effect, Event, LoopContext, LoopPhase, ToolResult};
use thiserror::Error;

/// Result of a transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_phase: LoopPhase,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(phase: LoopPhase) -> Self {
        Self {
            new_phase: phase,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Decision step kept requesting tools after {limit} cycles")]
    CycleLimitExceeded { limit: u32 },
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

pub fn transition(
    phase: &LoopPhase,
    context: &LoopContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (phase, event) {
        // Deciding + text-only decision -> Terminated
        (LoopPhase::Deciding { .. }, Event::DecisionReceived { content, tool_calls })
            if tool_calls.is_empty() =>
        {
            Ok(TransitionResult::new(LoopPhase::Terminated)
                .with_effect(Effect::append_assistant(content))
                .with_effect(Effect::Finish))
        }

        // Deciding + decision with tools, bound reached -> error
        (LoopPhase::Deciding { cycle }, Event::DecisionReceived { .. })
            if *cycle >= context.max_cycles =>
        {
            Err(TransitionError::CycleLimitExceeded {
                limit: context.max_cycles,
            })
        }

        // Deciding + decision with tools -> Acting
        (LoopPhase::Deciding { cycle }, Event::DecisionReceived { content, tool_calls }) => {
            let patches = tool_calls
                .iter()
                .cloned()
                .map(|call| Effect::PatchSlots { call });

            Ok(TransitionResult::new(LoopPhase::Acting {
                cycle: *cycle,
                pending: tool_calls.clone(),
            })
            .with_effects(patches)
            .with_effect(Effect::append_assistant(content))
            .with_effect(Effect::ExecuteTools { calls: tool_calls }))
        }

        // Acting + all results in -> Deciding (next cycle)
        (LoopPhase::Acting { cycle, pending }, Event::ToolsCompleted { results }) => {
            let unmatched: Vec<&str> = results
                .iter()
                .filter(|r| !pending.iter().any(|call| call.id == r.tool_use_id))
                .map(|r| r.tool_use_id.as_str())
                .collect();
            if !unmatched.is_empty() {
                return Err(TransitionError::InvalidTransition(format!(
                    "results for unknown tool calls: {}",
                    unmatched.join(", ")
                )));
            }

            let blocks = results.iter().map(ToolResult::to_content_block).collect();
            Ok(TransitionResult::new(LoopPhase::Deciding { cycle: cycle + 1 })
                .with_effect(Effect::append_tool_results(blocks))
                .with_effect(Effect::RequestDecision))
        }

        (phase, event) => Err(TransitionError::InvalidTransition(format!(
            "{} cannot handle {}",
            phase.name(),
            event_name(&event)
        ))),
    }
}

fn event_name(event: &Event) -> &'static str {
    match event {
        Event::DecisionReceived { .. } => "decision_received",
        Event::ToolsCompleted { .. } => "tools_completed",
    }
}
