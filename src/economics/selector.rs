// src/economics/selector.rs
use crate::domain::UnitType;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::str::FromStr;

/// When a requested unit type is missing, whether stepping one bedroom class
/// down needs a detected maid's room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaidFallbackPolicy {
    RequireMaidSignal,
    Unconditional,
}

impl FromStr for MaidFallbackPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "require_maid_signal" | "maid" => Ok(MaidFallbackPolicy::RequireMaidSignal),
            "unconditional" | "always" => Ok(MaidFallbackPolicy::Unconditional),
            other => Err(format!(
                "expected 'require_maid_signal' or 'unconditional', got '{other}'"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SelectionReason {
    ExactMatch,
    MaidRoomFallback,
    LowerUnitFallback,
    MostCommonUnit,
    UnitTypeNotAvailable,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitSelection {
    pub building_name: String,
    pub unit_type_requested: Option<UnitType>,
    pub unit_type_chosen: Option<UnitType>,
    pub reason: SelectionReason,
    pub available_units: Vec<UnitType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_message: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct UnitSelector {
    policy: MaidFallbackPolicy,
}

impl UnitSelector {
    pub fn new(policy: MaidFallbackPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> MaidFallbackPolicy {
        self.policy
    }

    /// Picks the unit type to look up for `requested` in `building`.
    ///
    /// A chosen unit is always one of `available`.
    pub fn select(
        &self,
        building: &str,
        requested: UnitType,
        available: &[UnitType],
        has_maids_room: bool,
    ) -> UnitSelection {
        let available: Vec<UnitType> = available
            .iter()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let selection =
            |chosen: Option<UnitType>, reason: SelectionReason, message: Option<String>| {
                UnitSelection {
                    building_name: building.to_string(),
                    unit_type_requested: Some(requested),
                    unit_type_chosen: chosen,
                    reason,
                    available_units: available.clone(),
                    fallback_message: message,
                }
            };

        if available.contains(&requested) {
            return selection(Some(requested), SelectionReason::ExactMatch, None);
        }

        let lower = requested.one_down().filter(|u| available.contains(u));
        let fallback = match (lower, has_maids_room, self.policy) {
            (Some(lower), true, _) => Some((
                lower,
                SelectionReason::MaidRoomFallback,
                format!(
                    "{requested} includes a maid's room; showing {lower} comparables instead"
                ),
            )),
            (Some(lower), false, MaidFallbackPolicy::Unconditional) => Some((
                lower,
                SelectionReason::LowerUnitFallback,
                format!("No {requested} comparables in {building}; showing {lower} instead"),
            )),
            _ => None,
        };

        match fallback {
            Some((unit, reason, message)) => selection(Some(unit), reason, Some(message)),
            None => {
                let message = format!(
                    "{requested} is not available in {building}. Available: {}",
                    labels(&available)
                );
                selection(None, SelectionReason::UnitTypeNotAvailable, Some(message))
            }
        }
    }

    /// The building's most frequent unit type, for callers with no explicit
    /// request. Ties go to the alphabetically first label.
    pub fn most_common<I>(&self, building: &str, units: I) -> UnitSelection
    where
        I: IntoIterator<Item = UnitType>,
    {
        let mut counts: HashMap<UnitType, usize> = HashMap::new();
        for unit in units {
            *counts.entry(unit).or_default() += 1;
        }

        let chosen = counts
            .iter()
            .max_by(|(a, ca), (b, cb)| ca.cmp(cb).then_with(|| b.label().cmp(&a.label())))
            .map(|(unit, _)| *unit);

        let available: Vec<UnitType> = counts
            .keys()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        match chosen {
            Some(unit) => UnitSelection {
                building_name: building.to_string(),
                unit_type_requested: None,
                unit_type_chosen: Some(unit),
                reason: SelectionReason::MostCommonUnit,
                fallback_message: Some(format!(
                    "Unit type not identified; showing the most common unit type ({unit})"
                )),
                available_units: available,
            },
            None => UnitSelection {
                building_name: building.to_string(),
                unit_type_requested: None,
                unit_type_chosen: None,
                reason: SelectionReason::UnitTypeNotAvailable,
                fallback_message: None,
                available_units: available,
            },
        }
    }
}

fn labels(units: &[UnitType]) -> String {
    if units.is_empty() {
        return "none".to_string();
    }
    units
        .iter()
        .map(UnitType::label)
        .collect::<Vec<_>>()
        .join(", ")
}
