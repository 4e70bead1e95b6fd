//! Information-gathering tool
//!
//! Checks which trip parameters are still missing and either asks for them
//! or confirms the trip details are complete. This is the only tool that
//! writes into the conversation's slots.

use super::args::TripArgs;
use super::{Tool, ToolOutput};
use crate::state_machine::SlotPatch;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};

pub const GATHER_TOOL_NAME: &str = "get_required_information";

/// Confirmed trip parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TripDetails {
    pub cities: Vec<String>,
    pub days: u64,
    pub people: u64,
    pub budget: u64,
    pub transport: Option<String>,
}

/// Result of checking the trip parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GatherOutcome {
    MissingInfo { prompt: String },
    Complete { details: TripDetails },
}

/// Decide whether the trip parameters are complete.
///
/// Zero counts and empty city lists are missing; transport is optional.
pub fn gather(args: &TripArgs) -> GatherOutcome {
    let cities = args.cities.as_ref().filter(|c| !c.is_empty());
    let days = args.days.filter(|&d| d > 0);
    let people = args.people.filter(|&p| p > 0);
    let budget = args.budget.filter(|&b| b > 0);

    let mut missing = Vec::new();
    if cities.is_none() {
        missing.push("which cities you are visiting");
    }
    if days.is_none() {
        missing.push("for how many days");
    }
    if people.is_none() {
        missing.push("how many people are traveling");
    }
    if budget.is_none() {
        missing.push("your approximate budget");
    }

    match (cities, days, people, budget) {
        (Some(cities), Some(days), Some(people), Some(budget)) => GatherOutcome::Complete {
            details: TripDetails {
                cities: cities.clone(),
                days,
                people,
                budget,
                transport: args.transport.clone(),
            },
        },
        _ => GatherOutcome::MissingInfo {
            prompt: format!(
                "I need a bit more info. Can you please tell me {}?",
                missing.join(", ")
            ),
        },
    }
}

/// Tool wrapper around [`gather`]
pub struct GatherInfoTool;

#[async_trait]
impl Tool for GatherInfoTool {
    fn name(&self) -> &'static str {
        GATHER_TOOL_NAME
    }

    fn description(&self) -> String {
        "Gathers and validates the trip details collected so far. Call this with every detail the user has given (cities, days, people, budget, and optionally transport). It reports which details are still missing, or confirms the trip is complete.".to_string()
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "cities": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Cities to visit, in travel order"
                },
                "days": {
                    "type": "integer",
                    "description": "Total trip length in days"
                },
                "people": {
                    "type": "integer",
                    "description": "Number of travelers"
                },
                "budget": {
                    "type": "integer",
                    "description": "Approximate total budget in rupees"
                },
                "transport": {
                    "type": "string",
                    "description": "Preferred way to travel between cities"
                }
            }
        })
    }

    /// Every readable argument is patched except zero counts and empty city
    /// lists. Unlike a plain non-null merge, a zero never overwrites a value
    /// collected on an earlier turn, so a set slot cannot drop back to missing.
    fn slot_patch(&self, input: &Value) -> SlotPatch {
        let args = TripArgs::from_value(input);
        SlotPatch {
            cities: args.cities.filter(|c| !c.is_empty()),
            days: args.days.filter(|&d| d > 0),
            people: args.people.filter(|&p| p > 0),
            budget: args.budget.filter(|&b| b > 0),
            transport: args.transport,
        }
    }

    async fn run(&self, input: Value) -> ToolOutput {
        let outcome = gather(&TripArgs::from_value(&input));
        match serde_json::to_string(&outcome) {
            Ok(text) => ToolOutput::success(text),
            Err(e) => ToolOutput::error(format!("Failed to encode result: {e}")),
        }
    }
}
