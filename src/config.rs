//! Process configuration read from the environment

use crate::llm::GeminiConfig;
use crate::runtime::LoopConfig;
use crate::state_machine::DEFAULT_MAX_CYCLES;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_PORT: u16 = 5004;
pub const DEFAULT_DECISION_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} is not a valid number: {value:?}")]
    InvalidNumber { name: &'static str, value: String },
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_key: String,
    pub model: String,
    pub port: u16,
    pub max_cycles: u32,
    pub decision_timeout: Duration,
    /// Replaces the built-in city guides when set
    pub knowledge_path: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the config from any variable source. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_key = var("GOOGLE_API_KEY").ok_or(ConfigError::Missing("GOOGLE_API_KEY"))?;
        let model = var("TRIP_PLANNER_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let port = parse_var(var("TRIP_PLANNER_PORT"), "TRIP_PLANNER_PORT", DEFAULT_PORT)?;
        let max_cycles = parse_var(
            var("TRIP_PLANNER_MAX_CYCLES"),
            "TRIP_PLANNER_MAX_CYCLES",
            DEFAULT_MAX_CYCLES,
        )?;
        if max_cycles == 0 {
            return Err(ConfigError::Zero("TRIP_PLANNER_MAX_CYCLES"));
        }
        let timeout_secs = parse_var(
            var("TRIP_PLANNER_DECISION_TIMEOUT_SECS"),
            "TRIP_PLANNER_DECISION_TIMEOUT_SECS",
            DEFAULT_DECISION_TIMEOUT_SECS,
        )?;
        if timeout_secs == 0 {
            return Err(ConfigError::Zero("TRIP_PLANNER_DECISION_TIMEOUT_SECS"));
        }

        Ok(Self {
            api_key,
            model,
            port,
            max_cycles,
            decision_timeout: Duration::from_secs(timeout_secs),
            knowledge_path: var("TRIP_PLANNER_KNOWLEDGE_PATH").map(PathBuf::from),
        })
    }

    pub fn gemini(&self) -> GeminiConfig {
        GeminiConfig {
            api_key: self.api_key.clone(),
            model: self.model.clone(),
            temperature: DEFAULT_TEMPERATURE,
            base_url: None,
            request_timeout: self.decision_timeout,
        }
    }

    pub fn loop_config(&self, known_cities: Vec<String>) -> LoopConfig {
        LoopConfig {
            max_cycles: self.max_cycles,
            decision_timeout: self.decision_timeout,
            known_cities,
        }
    }
}

fn parse_var<T: std::str::FromStr>(
    raw: Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { name, value }),
    }
}
