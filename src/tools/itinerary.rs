//! Itinerary generator
//!
//! Splits the trip's days across cities in order and fills each day from the
//! city's attractions and restaurants, cycling through them. Travel between
//! cities uses the requested transport or a random pick from a fixed set.

use super::args::{parse_cities, parse_count, TripArgs};
use super::{Tool, ToolOutput};
use crate::knowledge::{KnowledgeBase, NOT_AVAILABLE};
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde_json::{json, Value};
use std::fmt::Write as _;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

pub const ITINERARY_TOOL_NAME: &str = "create_travel_itinerary";

/// Modes picked from when the traveler has no preference
/// Longest trip the tool will plan; the text grows linearly with days
pub const MAX_TRIP_DAYS: u64 = 365;

pub const TRANSPORT_OPTIONS: [&str; 3] = ["Car/Taxi", "Train", "Flight"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ItineraryError {
    #[error("Error: At least one city is required.")]
    InvalidInput,
}

/// Complete trip parameters for generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItineraryRequest {
    pub cities: Vec<String>,
    pub days: u64,
    pub people: u64,
    pub budget: u64,
    pub transport: Option<String>,
}

/// Days allotted to each city, in order.
///
/// Every city gets at least one day, so with fewer days than cities the
/// total exceeds the requested duration.
pub fn day_allocation(city_count: usize, days: u64) -> Vec<u64> {
    if city_count == 0 {
        return Vec::new();
    }
    let n = city_count as u64;
    let per_city = (days / n).max(1);
    let remainder = days % n;
    (0..n)
        .map(|i| if i < remainder { per_city + 1 } else { per_city })
        .collect()
}

/// Build the itinerary text, drawing unspecified transport from `rng`
pub fn build_itinerary<R: Rng + ?Sized>(
    kb: &KnowledgeBase,
    request: &ItineraryRequest,
    rng: &mut R,
) -> Result<String, ItineraryError> {
    let cities = &request.cities;
    if cities.is_empty() {
        return Err(ItineraryError::InvalidInput);
    }

    let mut out = String::new();
    let _ = write!(
        out,
        "✨ Trip Plan for {} ✨\nDuration: {} Days | Travelers: {} | Budget: ₹{}\n{}\n\n",
        cities.join(", "),
        request.days,
        request.people,
        format_thousands(request.budget),
        "=".repeat(50)
    );

    let mut day_counter = 1u64;
    for (idx, (city, city_days)) in cities
        .iter()
        .zip(day_allocation(cities.len(), request.days))
        .enumerate()
    {
        let guide = kb.lookup(city);
        for d in 0..city_days {
            let attraction1 = cycled(&guide.attractions, d);
            let attraction2 = second_pick(&guide.attractions, d);
            let lunch = cycled(&guide.restaurants, d);
            let dinner = second_pick(&guide.restaurants, d);

            let _ = write!(
                out,
                "🗓️ Day {day_counter}: Exploring {city}\n  - Visit: {attraction1} & {attraction2}\n  - Lunch: {lunch}\n  - Dinner: {dinner}\n"
            );

            if d == city_days - 1 {
                if let Some(next_city) = cities.get(idx + 1) {
                    let mode = match &request.transport {
                        Some(mode) => mode.as_str(),
                        None => TRANSPORT_OPTIONS.choose(rng).copied().unwrap_or(TRANSPORT_OPTIONS[0]),
                    };
                    let _ = writeln!(out, "  - Travel to {next_city} via {mode}");
                }
            }
            out.push('\n');
            day_counter += 1;
        }
    }

    out.push_str("Have a wonderful trip!\n");
    Ok(out)
}

#[allow(clippy::cast_possible_truncation)]
fn cycled(items: &[String], d: u64) -> &str {
    if items.is_empty() {
        return NOT_AVAILABLE;
    }
    &items[(d % items.len() as u64) as usize]
}

fn second_pick(items: &[String], d: u64) -> &str {
    if items.len() > 1 {
        cycled(items, d + 1)
    } else {
        NOT_AVAILABLE
    }
}

/// Group digits in threes: 25000 -> "25,000"
fn format_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Tool wrapper around [`build_itinerary`]
pub struct ItineraryTool {
    kb: Arc<KnowledgeBase>,
    rng: Mutex<StdRng>,
}

impl ItineraryTool {
    pub fn new(kb: Arc<KnowledgeBase>) -> Self {
        Self {
            kb,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Deterministic transport picks
    #[cfg(test)]
    pub fn with_seed(kb: Arc<KnowledgeBase>, seed: u64) -> Self {
        Self {
            kb,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn parse_request(input: &Value) -> Result<ItineraryRequest, String> {
        let args = TripArgs::from_value(input);
        let cities = input
            .get("cities")
            .and_then(parse_cities)
            .unwrap_or_default();
        let required = |key: &str| {
            input
                .get(key)
                .and_then(parse_count)
                .ok_or_else(|| format!("Error: '{key}' must be a non-negative whole number."))
        };
        let days = required("days")?;
        if days > MAX_TRIP_DAYS {
            return Err(format!("Error: 'days' must be at most {MAX_TRIP_DAYS}."));
        }
        Ok(ItineraryRequest {
            cities,
            days,
            people: required("people")?,
            budget: required("budget")?,
            transport: args.transport,
        })
    }
}

#[async_trait]
impl Tool for ItineraryTool {
    fn name(&self) -> &'static str {
        ITINERARY_TOOL_NAME
    }

    fn description(&self) -> String {
        "Creates a day-wise travel itinerary once all information is gathered. Only call this after get_required_information reports the trip details are complete.".to_string()
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["cities", "days", "people", "budget"],
            "properties": {
                "cities": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Cities to visit, in travel order"
                },
                "days": {
                    "type": "integer",
                    "maximum": MAX_TRIP_DAYS,
                    "description": "Total trip length in days"
                },
                "people": { "type": "integer", "description": "Number of travelers" },
                "budget": { "type": "integer", "description": "Approximate total budget in rupees" },
                "transport": {
                    "type": "string",
                    "description": "Preferred way to travel between cities"
                }
            }
        })
    }

    async fn run(&self, input: Value) -> ToolOutput {
        let request = match Self::parse_request(&input) {
            Ok(r) => r,
            Err(message) => return ToolOutput::error(message),
        };

        let result = {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            build_itinerary(&self.kb, &request, &mut *rng)
        };

        match result {
            Ok(itinerary) => ToolOutput::success(itinerary),
            Err(e) => ToolOutput::error(e.to_string()),
        }
    }
}
