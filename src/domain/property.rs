// src/domain/property.rs

use crate::domain::UnitType;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingType {
    Rent,
    Sale,
}

/// Loose facts pulled from a listing page or URL.
/// Every field is optional; whichever strategy sets a field first owns it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PropertyFacts {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bedrooms: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bedrooms_without_maid: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_maids_room: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bathrooms: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_sqft: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yearly_rent: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchase_price: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listing_type: Option<ListingType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl PropertyFacts {
    pub fn with_source(source: &str) -> Self {
        Self {
            source: Some(source.to_string()),
            ..Self::default()
        }
    }

    /// Field-wise merge where `self` wins every collision.
    pub fn or(self, other: PropertyFacts) -> PropertyFacts {
        // Keeps each field from `self` and only falls back to `other` when unset.
        macro_rules! first_set {
            ($($field:ident),*) => {
                PropertyFacts { $($field: self.$field.or(other.$field),)* }
            };
        }

        first_set!(
            bedrooms,
            bedrooms_without_maid,
            has_maids_room,
            bathrooms,
            size,
            size_sqft,
            yearly_rent,
            purchase_price,
            listing_type,
            address,
            source
        )
    }
}

/// Output of a resolution call. Built once and handed back by value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedProperty {
    pub building_name: Option<String>,
    pub unit_type: Option<UnitType>,
    pub confidence: f64,
    pub facts: PropertyFacts,
}

impl ResolvedProperty {
    /// A result that identified nothing.
    pub fn empty(source: &str) -> Self {
        Self {
            building_name: None,
            unit_type: None,
            confidence: 0.0,
            facts: PropertyFacts::with_source(source),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.building_name.is_some() && self.unit_type.is_some()
    }

    /// Fills whatever `self` left unset from `fallback`. Confidence becomes the
    /// larger of the two.
    pub fn fill_from(self, fallback: ResolvedProperty) -> ResolvedProperty {
        ResolvedProperty {
            building_name: self.building_name.or(fallback.building_name),
            unit_type: self.unit_type.or(fallback.unit_type),
            confidence: self.confidence.max(fallback.confidence),
            facts: self.facts.or(fallback.facts),
        }
    }

    pub fn has_maids_room(&self) -> bool {
        self.facts.has_maids_room.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn facts_merge_keeps_first_writer() {
        let primary = PropertyFacts {
            bedrooms: Some(3),
            source: Some("page".into()),
            ..PropertyFacts::default()
        };
        let guess = PropertyFacts {
            bedrooms: Some(2),
            bathrooms: Some(2),
            source: Some("url_guess".into()),
            ..PropertyFacts::default()
        };

        let merged = primary.or(guess);

        assert_eq!(merged.bedrooms, Some(3));
        assert_eq!(merged.bathrooms, Some(2));
        assert_eq!(merged.source.as_deref(), Some("page"));
    }

    #[test]
    fn fill_from_takes_max_confidence() {
        let primary = ResolvedProperty {
            building_name: Some("Palm Tower".into()),
            unit_type: None,
            confidence: 0.7,
            facts: PropertyFacts::default(),
        };
        let guess = ResolvedProperty {
            building_name: Some("Palm Views".into()),
            unit_type: Some(UnitType::Bedrooms(1)),
            confidence: 1.0,
            facts: PropertyFacts::with_source("url_guess"),
        };

        let merged = primary.fill_from(guess);

        assert_eq!(merged.building_name.as_deref(), Some("Palm Tower"));
        assert_eq!(merged.unit_type, Some(UnitType::Bedrooms(1)));
        assert_eq!(merged.confidence, 1.0);
        assert!(merged.is_complete());
    }

    #[test]
    fn empty_facts_serialize_compactly() {
        let json = serde_json::to_value(PropertyFacts::with_source("url_guess")).unwrap();
        assert_eq!(json, serde_json::json!({ "source": "url_guess" }));
    }
}
