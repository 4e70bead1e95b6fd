//! System prompt construction
//!
//! Tells the decision step how to collect trip details, which cities the
//! knowledge base covers, and what has been collected so far.

use crate::state_machine::TripSlots;
use crate::tools::{GATHER_TOOL_NAME, ITINERARY_TOOL_NAME};
use std::fmt::Write;

/// Base system prompt establishing the planner's role
const BASE_PROMPT: &str = r"You are a friendly travel planner for trips in Jharkhand, India. Help the user plan a trip by collecting four details: which cities they will visit, how many days, how many people are traveling, and their approximate budget. A preferred mode of transport is optional.";

pub fn build_system_prompt(cities: &[String], slots: &TripSlots) -> String {
    let mut prompt = BASE_PROMPT.to_string();

    let _ = write!(
        prompt,
        "\n\nWhenever the user gives trip details, call {GATHER_TOOL_NAME} with everything known so far. If it reports missing information, ask the user for it using its prompt. Once it reports the details are complete, call {ITINERARY_TOOL_NAME} and show the itinerary to the user as-is."
    );

    if !cities.is_empty() {
        let _ = write!(prompt, "\n\nCities with local guides: {}.", cities.join(", "));
    }

    let known = known_details(slots);
    if !known.is_empty() {
        prompt.push_str("\n\nDetails collected so far:");
        for line in known {
            let _ = write!(prompt, "\n- {line}");
        }
    }

    prompt
}

fn known_details(slots: &TripSlots) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(cities) = &slots.cities {
        lines.push(format!("cities: {}", cities.join(", ")));
    }
    if let Some(days) = slots.days {
        lines.push(format!("days: {days}"));
    }
    if let Some(people) = slots.people {
        lines.push(format!("people: {people}"));
    }
    if let Some(budget) = slots.budget {
        lines.push(format!("budget: {budget}"));
    }
    if let Some(transport) = &slots.transport {
        lines.push(format!("transport: {transport}"));
    }
    lines
}
