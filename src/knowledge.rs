//! City knowledge base
//!
//! Static attraction and restaurant data used by the itinerary generator.
//! Lookups never fail: unknown cities resolve to a placeholder guide.

use serde::Deserialize;
use std::borrow::Cow;
use std::path::Path;
use thiserror::Error;

/// Placeholder used wherever data is unavailable
pub const NOT_AVAILABLE: &str = "N/A";

/// Attractions and restaurants for one city, in visiting order
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CityGuide {
    pub attractions: Vec<String>,
    pub restaurants: Vec<String>,
}

impl CityGuide {
    pub fn new(attractions: &[&str], restaurants: &[&str]) -> Self {
        Self {
            attractions: attractions.iter().map(ToString::to_string).collect(),
            restaurants: restaurants.iter().map(ToString::to_string).collect(),
        }
    }

    /// Guide returned for cities the knowledge base does not know
    pub fn unknown() -> Self {
        Self::new(&[NOT_AVAILABLE], &[NOT_AVAILABLE])
    }
}

#[derive(Debug, Clone, Deserialize)]
struct CityEntry {
    name: String,
    #[serde(flatten)]
    guide: CityGuide,
}

/// Errors loading a knowledge base file
#[derive(Debug, Error)]
pub enum KnowledgeError {
    #[error("failed to read knowledge base: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse knowledge base: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("city {city} has no {field}")]
    EmptyList { city: String, field: &'static str },
}

/// Read-only city lookup, ordered by insertion
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    entries: Vec<CityEntry>,
}

impl KnowledgeBase {
    /// The Jharkhand city set the planner ships with
    pub fn builtin() -> Self {
        let entries = vec![
            CityEntry {
                name: "Ranchi".to_string(),
                guide: CityGuide::new(
                    &["Dassam Falls", "Jagannath Temple", "Rock Garden"],
                    &[
                        "Kavery Restaurant",
                        "The Great Kebab Factory",
                        "Capitol Residency",
                    ],
                ),
            },
            CityEntry {
                name: "Jamshedpur".to_string(),
                guide: CityGuide::new(
                    &[
                        "Jubilee Park",
                        "Dalma Wildlife Sanctuary",
                        "Tata Steel Zoological Park",
                    ],
                    &["The Blue Diamond", "Equinox Restaurant", "Brubeck Bakery"],
                ),
            },
            CityEntry {
                name: "Bokaro".to_string(),
                guide: CityGuide::new(
                    &["Jawaharlal Nehru Biological Park", "City Park", "Garga Dam"],
                    &[
                        "Hotel Aryan Residency",
                        "Madhuban Restaurant",
                        "Kwality Restaurant",
                    ],
                ),
            },
            CityEntry {
                name: "Dhanbad".to_string(),
                guide: CityGuide::new(
                    &["Maithon Dam", "Panchet Dam", "Topchanchi Lake"],
                    &["Hotel Galaxy", "Bombay Restaurant", "Kwality Restaurant"],
                ),
            },
        ];
        Self { entries }
    }

    /// Load a knowledge base from a JSON array of
    /// `{"name", "attractions", "restaurants"}` objects.
    pub fn from_path(path: &Path) -> Result<Self, KnowledgeError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, KnowledgeError> {
        let entries: Vec<CityEntry> = serde_json::from_str(raw)?;
        for entry in &entries {
            if entry.guide.attractions.is_empty() {
                return Err(KnowledgeError::EmptyList {
                    city: entry.name.clone(),
                    field: "attractions",
                });
            }
            if entry.guide.restaurants.is_empty() {
                return Err(KnowledgeError::EmptyList {
                    city: entry.name.clone(),
                    field: "restaurants",
                });
            }
        }
        Ok(Self { entries })
    }

    /// Look up a city, falling back to the placeholder guide
    pub fn lookup(&self, city: &str) -> Cow<'_, CityGuide> {
        self.entries
            .iter()
            .find(|entry| entry.name == city)
            .map_or_else(|| Cow::Owned(CityGuide::unknown()), |entry| Cow::Borrowed(&entry.guide))
    }

    pub fn city_names(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.name.clone()).collect()
    }
}
