use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

pub const DEFAULT_FOOD: &str = "Pizza";
pub const DEFAULT_LOCATION: &str = "Denver";

lazy_static! {
    // first "<food> in <location>" on any line; `.` stops at both \r and \n
    static ref INTENT_PATTERN: Regex = Regex::new(r"(?mR)(.*) in (.*)").unwrap();
}

/// What the sender asked for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryParams {
    pub food: String,
    pub location: String,
    /// Set when the text had no "<food> in <location>" request and the defaults were used.
    pub default_query: bool,
}

impl QueryParams {
    pub fn fallback() -> Self {
        Self {
            food: DEFAULT_FOOD.to_string(),
            location: DEFAULT_LOCATION.to_string(),
            default_query: true,
        }
    }
}

pub fn parse_intent(text: &str) -> QueryParams {
    match INTENT_PATTERN.captures(text) {
        Some(caps) => QueryParams {
            food: caps[1].to_string(),
            location: caps[2].to_string(),
            default_query: false,
        },
        None => QueryParams::fallback(),
    }
}
