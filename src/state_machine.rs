//! Decide/act loop state machine
//!
//! Pure transitions over loop phases; the runtime executor performs the
//! effects they return.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;


pub use effect::Effect;
pub use event::{Event, ToolResult};
pub use state::{
    ConversationState, LoopContext, LoopPhase, SlotPatch, ToolCall, TripSlots, DEFAULT_MAX_CYCLES,
};
pub use transition::{transition, TransitionError};
