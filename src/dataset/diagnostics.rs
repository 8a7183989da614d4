// src/dataset/diagnostics.rs
//
// What the loaded dataset looks like, for checking why a lookup came back
// empty.

use crate::dataset::links::{link_for, ListingLink};
use crate::dataset::listing::ComparableListing;
use crate::dataset::snapshot::DatasetSnapshot;
use crate::domain::UnitType;
use crate::resolver::normalize::canonical;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;

const SHOWN_PAIRS: usize = 5;
const SAMPLE_ROWS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairCount {
    pub building: String,
    pub unit_type: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CanonicalQuery {
    pub building: Option<String>,
    pub unit: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DebugQuery {
    pub building: Option<String>,
    pub unit_type: Option<String>,
    pub canonical: CanonicalQuery,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingsDebug {
    pub csv_path: Option<String>,
    pub total_rows_loaded: usize,
    pub skipped_rows: usize,
    pub unique_pairs_count: usize,
    pub first_5_pairs: Vec<PairCount>,
    pub query: DebugQuery,
    pub query_sample: Vec<ListingLink>,
}

/// Recognized unit labels collapse to `Studio`/`NBR`; anything else keeps
/// its canonical text so it still shows up as its own pair.
fn canonical_unit(label: &str) -> String {
    UnitType::parse(label).map_or_else(|| canonical(label), |u| u.label())
}

fn row_unit(row: &ComparableListing) -> String {
    row.unit_type
        .map_or_else(|| canonical(&row.unit_label), |u| u.label())
}

/// Row counts per (building, unit) pair plus a sample for the query pair.
/// Blank query fields count as absent, and the sample is only taken when
/// both are present.
pub fn listings_debug(
    snapshot: &DatasetSnapshot,
    csv_path: Option<&Path>,
    building: Option<&str>,
    unit: Option<&str>,
) -> ListingsDebug {
    let building = building.map(str::trim).filter(|b| !b.is_empty());
    let unit = unit.map(str::trim).filter(|u| !u.is_empty());

    let mut pairs: Vec<PairCount> = Vec::new();
    let mut seen: HashMap<(String, String), usize> = HashMap::new();
    for row in snapshot.rows() {
        let key = (canonical(&row.building), row_unit(row));
        match seen.get(&key) {
            Some(&idx) => pairs[idx].count += 1,
            None => {
                seen.insert(key.clone(), pairs.len());
                pairs.push(PairCount {
                    building: key.0,
                    unit_type: key.1,
                    count: 1,
                });
            }
        }
    }

    let canonical_query = CanonicalQuery {
        building: building.map(canonical),
        unit: unit.map(canonical_unit),
    };

    let query_sample = match (&canonical_query.building, &canonical_query.unit) {
        (Some(b), Some(u)) => snapshot
            .rows()
            .iter()
            .filter(|r| canonical(&r.building) == *b && row_unit(r) == *u)
            .take(SAMPLE_ROWS)
            .map(link_for)
            .collect(),
        _ => Vec::new(),
    };

    ListingsDebug {
        csv_path: csv_path.map(|p| p.display().to_string()),
        total_rows_loaded: snapshot.rows().len(),
        skipped_rows: snapshot.skipped_rows(),
        unique_pairs_count: pairs.len(),
        first_5_pairs: pairs.into_iter().take(SHOWN_PAIRS).collect(),
        query: DebugQuery {
            building: building.map(str::to_string),
            unit_type: unit.map(str::to_string),
            canonical: canonical_query,
        },
        query_sample,
    }
}
