// src/dataset/snapshot.rs
use crate::dataset::listing::ComparableListing;
use crate::domain::UnitType;
use crate::resolver::normalize::canonical;
use crate::resolver::{AliasResolver, FuzzyMatcher};
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use std::time::SystemTime;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMethod {
    Exact,
    Alias,
    Fuzzy,
}

/// A dataset building chosen for a query string.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildingMatch {
    pub name: String,
    pub method: MatchMethod,
    pub score: f64,
}

/// Immutable view of the dataset at one point in time.
#[derive(Debug, Default)]
pub struct DatasetSnapshot {
    rows: Vec<ComparableListing>,
    buildings: Vec<String>,
    marker: Option<SystemTime>,
    skipped: usize,
}

impl DatasetSnapshot {
    pub fn new(rows: Vec<ComparableListing>, marker: Option<SystemTime>, skipped: usize) -> Self {
        let mut seen = HashSet::new();
        let buildings = rows
            .iter()
            .filter(|r| seen.insert(canonical(&r.building)))
            .map(|r| r.building.clone())
            .collect();

        Self {
            rows,
            buildings,
            marker,
            skipped,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[ComparableListing] {
        &self.rows
    }

    /// Distinct building names, in first-seen order.
    pub fn buildings(&self) -> &[String] {
        &self.buildings
    }

    pub fn marker(&self) -> Option<SystemTime> {
        self.marker
    }

    pub fn skipped_rows(&self) -> usize {
        self.skipped
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Finds the dataset building for `query`: exact canonical match first,
    /// then through the alias table, then by token overlap.
    pub fn match_building(
        &self,
        query: &str,
        aliases: &AliasResolver,
        matcher: &FuzzyMatcher,
    ) -> Option<BuildingMatch> {
        let wanted = canonical(query);
        if wanted.is_empty() {
            return None;
        }

        if let Some(name) = self.buildings.iter().find(|b| canonical(b) == wanted) {
            return Some(BuildingMatch {
                name: name.clone(),
                method: MatchMethod::Exact,
                score: 1.0,
            });
        }

        let aliased = canonical(&aliases.canonical_for(query));
        if let Some(name) = self
            .buildings
            .iter()
            .find(|b| canonical(&aliases.canonical_for(b)) == aliased)
        {
            return Some(BuildingMatch {
                name: name.clone(),
                method: MatchMethod::Alias,
                score: 1.0,
            });
        }

        matcher
            .best_match(query, self.buildings.iter().map(String::as_str))
            .map(|m| BuildingMatch {
                name: m.candidate.to_string(),
                method: MatchMethod::Fuzzy,
                score: m.score,
            })
    }

    pub fn rows_for_building<'a>(
        &'a self,
        building: &str,
    ) -> impl Iterator<Item = &'a ComparableListing> + 'a {
        let wanted = canonical(building);
        self.rows
            .iter()
            .filter(move |r| canonical(&r.building) == wanted)
    }

    /// Recognized unit types for a building, sorted `Studio < 1BR < ...`.
    pub fn available_units(&self, building: &str) -> Vec<UnitType> {
        self.rows_for_building(building)
            .filter_map(|r| r.unit_type)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
