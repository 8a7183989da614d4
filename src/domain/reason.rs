use serde::Serialize;
use std::fmt;

/// Why a lookup did not produce economics (or why a selection fell through).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasonCode {
    NotSupported,
    InvalidInput,
    BuildingNotFound,
    UnitTypeInvalid,
    UnitTypeNotAvailable,
    InsufficientSample,
    NotFound,
    StaleData,
}

impl ReasonCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasonCode::NotSupported => "NOT_SUPPORTED",
            ReasonCode::InvalidInput => "INVALID_INPUT",
            ReasonCode::BuildingNotFound => "BUILDING_NOT_FOUND",
            ReasonCode::UnitTypeInvalid => "UNIT_TYPE_INVALID",
            ReasonCode::UnitTypeNotAvailable => "UNIT_TYPE_NOT_AVAILABLE",
            ReasonCode::InsufficientSample => "INSUFFICIENT_SAMPLE",
            ReasonCode::NotFound => "NOT_FOUND",
            ReasonCode::StaleData => "STALE_DATA",
        }
    }

    /// Message shown to the end user alongside a `no_data` result.
    pub fn user_message(&self) -> &'static str {
        match self {
            ReasonCode::NotSupported => {
                "We could not identify the building and unit type from this link"
            }
            ReasonCode::InvalidInput => "Both building name and unit type are required",
            ReasonCode::BuildingNotFound => "Building not found in dataset",
            ReasonCode::UnitTypeInvalid => "Unit type not recognized",
            ReasonCode::UnitTypeNotAvailable => {
                "No comparable listings exist for this unit type in this building"
            }
            ReasonCode::InsufficientSample => {
                "Not enough data for this building/unit combination"
            }
            ReasonCode::NotFound => "No comparable listings found",
            ReasonCode::StaleData => "The comparable dataset is out of date",
        }
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialized_form_matches_code() {
        for code in [
            ReasonCode::NotSupported,
            ReasonCode::InvalidInput,
            ReasonCode::BuildingNotFound,
            ReasonCode::UnitTypeInvalid,
            ReasonCode::UnitTypeNotAvailable,
            ReasonCode::InsufficientSample,
            ReasonCode::NotFound,
            ReasonCode::StaleData,
        ] {
            let json = serde_json::to_string(&code).unwrap();
            assert_eq!(json, format!("\"{}\"", code.as_str()));
            assert!(!code.user_message().is_empty());
        }
    }
}
