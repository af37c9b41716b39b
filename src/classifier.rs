//! Weather Classifier
//!
//! Decides the branch for an observation by matching its condition keyword
//! against a comma-separated list of "adverse" categories.

use crate::models::{BranchResult, WeatherObservation};

/// Category list used when a request does not configure one
pub const DEFAULT_ADVERSE_CONDITIONS: &str = "rain,snow,storm";

/// Category token to the provider condition keywords it covers
const CATEGORIES: &[(&str, &[&str])] = &[
    ("rain", &["rain", "drizzle"]),
    ("snow", &["snow"]),
    ("storm", &["thunderstorm"]),
    ("clear", &["clear"]),
    ("clouds", &["clouds"]),
];

/// Provider keywords covered by a known category token
#[must_use]
pub fn category_keywords(token: &str) -> Option<&'static [&'static str]> {
    CATEGORIES
        .iter()
        .find(|(category, _)| *category == token)
        .map(|(_, keywords)| *keywords)
}

/// Ordered category tokens; duplicates are kept
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdverseConditions {
    tokens: Vec<String>,
}

impl AdverseConditions {
    /// Split on `,`, trim and lowercase. Empty tokens are dropped since an
    /// empty substring would match every condition.
    #[must_use]
    pub fn parse(config: &str) -> Self {
        let tokens = config
            .split(',')
            .map(|token| token.trim().to_lowercase())
            .filter(|token| !token.is_empty())
            .collect();
        Self { tokens }
    }

    /// Request-level list if it has any tokens, otherwise the fallback
    #[must_use]
    pub fn from_request(requested: Option<&str>, fallback: &str) -> Self {
        requested
            .map(Self::parse)
            .filter(|conditions| !conditions.is_empty())
            .unwrap_or_else(|| Self::parse(fallback))
    }

    #[must_use]
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// First token matching `condition`, in configured order
    #[must_use]
    pub fn first_match(&self, condition: &str) -> Option<&str> {
        self.tokens
            .iter()
            .find(|token| match category_keywords(token) {
                Some(keywords) => keywords.contains(&condition),
                None => condition.contains(token.as_str()),
            })
            .map(String::as_str)
    }
}

impl Default for AdverseConditions {
    fn default() -> Self {
        Self::parse(DEFAULT_ADVERSE_CONDITIONS)
    }
}

/// Pure branch decision for one observation
#[must_use]
pub fn classify(observation: &WeatherObservation, conditions: &AdverseConditions) -> BranchResult {
    match conditions.first_match(&observation.condition_main) {
        Some(_) => BranchResult::AdverseWeather,
        None => BranchResult::GoodWeather,
    }
}
