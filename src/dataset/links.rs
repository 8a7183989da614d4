// src/dataset/links.rs
//
// Comparable-listing links for a building/unit pair.

use crate::dataset::diagnostics::ListingsDebug;
use crate::dataset::listing::{airdna_url, ComparableListing};
use crate::dataset::snapshot::DatasetSnapshot;
use crate::domain::{ReasonCode, UnitType};
use crate::resolver::{AliasResolver, FuzzyMatcher};
use serde::Serialize;

pub const DEFAULT_LIMIT: usize = 6;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingLink {
    pub airbnb_id: String,
    pub airbnb_url: String,
    pub airdna_overview_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkStatus {
    Ok,
    NoData,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListingLinks {
    pub status: LinkStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason_code: Option<ReasonCode>,
    pub building_name: String,
    pub unit_type: String,
    /// Every matching row, not just the returned items.
    pub count: usize,
    pub items: Vec<ListingLink>,
    #[serde(rename = "_debug", skip_serializing_if = "Option::is_none")]
    pub debug: Option<ListingsDebug>,
}

impl ListingLinks {
    fn no_data(reason: ReasonCode, building: &str, unit: &str) -> Self {
        Self {
            status: LinkStatus::NoData,
            reason_code: Some(reason),
            building_name: building.to_string(),
            unit_type: unit.to_string(),
            count: 0,
            items: Vec::new(),
            debug: None,
        }
    }
}

pub fn link_for(row: &ComparableListing) -> ListingLink {
    ListingLink {
        airbnb_id: row.airbnb_id.clone(),
        airbnb_url: row.airbnb_url.clone(),
        airdna_overview_url: airdna_url(&row.airbnb_id),
    }
}

/// The first `limit` comparables for a building and unit, in dataset order.
pub fn comparable_links(
    snapshot: &DatasetSnapshot,
    aliases: &AliasResolver,
    matcher: &FuzzyMatcher,
    building: &str,
    unit: &str,
    limit: usize,
) -> ListingLinks {
    let Some(unit_type) = UnitType::parse(unit) else {
        return ListingLinks::no_data(ReasonCode::UnitTypeInvalid, building, unit);
    };
    let Some(matched) = snapshot.match_building(building, aliases, matcher) else {
        return ListingLinks::no_data(ReasonCode::NotFound, building, unit);
    };

    let rows: Vec<_> = snapshot
        .rows_for_building(&matched.name)
        .filter(|r| r.unit_type == Some(unit_type))
        .collect();

    if rows.is_empty() {
        return ListingLinks::no_data(ReasonCode::NotFound, &matched.name, &unit_type.label());
    }

    ListingLinks {
        status: LinkStatus::Ok,
        reason_code: None,
        building_name: matched.name,
        unit_type: unit_type.label(),
        count: rows.len(),
        items: rows.into_iter().take(limit).map(link_for).collect(),
        debug: None,
    }
}
