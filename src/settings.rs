/// User preferences: the filter window and the enabled flag
use std::fmt;
use std::num::NonZeroU64;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{DEFAULT_ENABLED, DEFAULT_FILTER_SECONDS};

/// Why a user-entered filter value was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no time value entered")]
    Empty,

    #[error("'{0}' is not a whole number of seconds")]
    NotANumber(String),

    #[error("time value must be at least one second")]
    NotPositive,

    #[error("time value is too large")]
    TooLarge,
}

/// Recency window in seconds; always positive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawSeconds", into = "String")]
pub struct FilterSeconds(NonZeroU64);

impl FilterSeconds {
    pub const DEFAULT: FilterSeconds = match NonZeroU64::new(DEFAULT_FILTER_SECONDS) {
        Some(n) => FilterSeconds(n),
        None => panic!("default filter window must be positive"),
    };

    pub fn new(seconds: u64) -> Option<FilterSeconds> {
        NonZeroU64::new(seconds).map(FilterSeconds)
    }

    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl Default for FilterSeconds {
    fn default() -> Self {
        FilterSeconds::DEFAULT
    }
}

impl fmt::Display for FilterSeconds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Strict parse of user input: surrounding whitespace is ignored, anything
/// other than ASCII digits is rejected
impl FromStr for FilterSeconds {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty);
        }

        if !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            let negative = trimmed
                .strip_prefix('-')
                .is_some_and(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()));
            return Err(if negative {
                ValidationError::NotPositive
            } else {
                ValidationError::NotANumber(trimmed.to_string())
            });
        }

        let seconds: u64 = trimmed.parse().map_err(|_| ValidationError::TooLarge)?;
        FilterSeconds::new(seconds).ok_or(ValidationError::NotPositive)
    }
}

impl From<FilterSeconds> for String {
    fn from(value: FilterSeconds) -> String {
        value.to_string()
    }
}

/// Stored values are digit strings, but older writers may have left numbers
#[derive(Deserialize)]
#[serde(untagged)]
enum RawSeconds {
    Text(String),
    Number(u64),
}

impl TryFrom<RawSeconds> for FilterSeconds {
    type Error = ValidationError;

    fn try_from(raw: RawSeconds) -> Result<Self, Self::Error> {
        match raw {
            RawSeconds::Text(text) => text.parse(),
            RawSeconds::Number(n) => FilterSeconds::new(n).ok_or(ValidationError::NotPositive),
        }
    }
}

/// Both persisted fields, with defaults applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    pub filter_seconds: FilterSeconds,
    pub enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            filter_seconds: FilterSeconds::DEFAULT,
            enabled: DEFAULT_ENABLED,
        }
    }
}

/// A named filter window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preset {
    pub value: FilterSeconds,
    pub label: &'static str,
}

/// Build presets from a (seconds, label) table, skipping zero entries
pub fn presets(table: &[(u64, &'static str)]) -> Vec<Preset> {
    table
        .iter()
        .filter_map(|&(seconds, label)| FilterSeconds::new(seconds).map(|value| Preset { value, label }))
        .collect()
}
