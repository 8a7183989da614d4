// src/domain/unit.rs

use regex::Regex;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

static LEADING_COUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)\s*(br|bed|beds|bedroom|bedrooms|bhk)?\b").expect("valid unit regex")
});

/// Normalized unit vocabulary: `Studio`, `1BR`, `2BR`, ...
///
/// Ordering follows bedroom count, so `Studio < 1BR < 2BR`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UnitType {
    Studio,
    Bedrooms(u8),
}

impl UnitType {
    /// A bedroom count of zero is a studio.
    pub fn from_bedrooms(count: u32) -> Self {
        match count {
            0 => UnitType::Studio,
            n => UnitType::Bedrooms(u8::try_from(n).unwrap_or(u8::MAX)),
        }
    }

    /// Parses a dataset or request value such as `"2"`, `"2BR"`, `"2 beds"`,
    /// `"studio"` or `"0br"`. Case and surrounding whitespace are ignored.
    pub fn parse(raw: &str) -> Option<Self> {
        let s = raw.trim().to_lowercase();
        if s.is_empty() {
            return None;
        }
        if s.contains("studio") {
            return Some(UnitType::Studio);
        }

        let caps = LEADING_COUNT.captures(&s)?;
        let count: u32 = caps.get(1)?.as_str().parse().ok()?;
        Some(UnitType::from_bedrooms(count))
    }

    pub fn bedrooms(&self) -> u32 {
        match self {
            UnitType::Studio => 0,
            UnitType::Bedrooms(n) => u32::from(*n),
        }
    }

    /// The next smaller bedroom class, e.g. `2BR -> 1BR`, `1BR -> Studio`.
    pub fn one_down(&self) -> Option<Self> {
        match self {
            UnitType::Studio => None,
            UnitType::Bedrooms(n) => Some(UnitType::from_bedrooms(u32::from(*n) - 1)),
        }
    }

    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for UnitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitType::Studio => write!(f, "Studio"),
            UnitType::Bedrooms(n) => write!(f, "{n}BR"),
        }
    }
}

impl FromStr for UnitType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UnitType::parse(s).ok_or_else(|| format!("unrecognized unit type: {s}"))
    }
}

impl Serialize for UnitType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
