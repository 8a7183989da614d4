// src/economics/aggregator.rs
use crate::dataset::{BuildingMatch, ComparableListing, DatasetSnapshot, MatchMethod};
use crate::domain::{ReasonCode, UnitType};
use crate::economics::correction::RevparCorrection;
use crate::economics::percentile::weighted_percentile;
use crate::economics::seasonality::{round_to, ProjectedListing, SeasonalityModel};
use crate::resolver::{AliasResolver, FuzzyMatcher};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

pub const METHOD_VERSION: &str = "6.3-weighted-seasonality";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EconomicsMetrics {
    pub adr_p50: f64,
    pub adr_p75: f64,
    pub occ_p50: f64,
    pub occ_p75: f64,
    pub rev_p50: f64,
    pub rev_p75: f64,
    pub building: String,
    pub match_method: MatchMethod,
    pub unit_type: UnitType,
    pub sample_n: usize,
    pub truth_count: usize,
    pub scaled_count: usize,
    pub min_days_filter: u32,
    pub min_listings_required: usize,
    pub method_version: &'static str,
    pub data_snapshot_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correction_factor: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EconomicsResult {
    Ok {
        metrics: EconomicsMetrics,
        listings: Vec<ProjectedListing>,
    },
    NoData {
        reason_code: ReasonCode,
        user_message: String,
        building_name: String,
        unit_type: String,
    },
}

impl EconomicsResult {
    pub fn no_data(reason: ReasonCode, building: &str, unit: &str) -> Self {
        Self::NoData {
            reason_code: reason,
            user_message: reason.user_message().to_string(),
            building_name: building.to_string(),
            unit_type: unit.to_string(),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, EconomicsResult::Ok { .. })
    }

    pub fn reason_code(&self) -> Option<ReasonCode> {
        match self {
            EconomicsResult::Ok { .. } => None,
            EconomicsResult::NoData { reason_code, .. } => Some(*reason_code),
        }
    }

    pub fn metrics(&self) -> Option<&EconomicsMetrics> {
        match self {
            EconomicsResult::Ok { metrics, .. } => Some(metrics),
            EconomicsResult::NoData { .. } => None,
        }
    }
}

/// A qualifying comparable with its raw figures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceComp {
    pub airbnb_id: String,
    pub airbnb_url: String,
    pub airdna_url: String,
    pub days_available: u32,
    pub raw_revenue: f64,
    pub raw_adr: f64,
    pub raw_occ: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EconomicsSources {
    pub building_name: Option<String>,
    pub unit_type: Option<UnitType>,
    pub count: usize,
    pub min_days: u32,
    pub comps: Vec<SourceComp>,
}

pub struct EconomicsAggregator {
    seasonality: SeasonalityModel,
    matcher: FuzzyMatcher,
    min_days: u32,
    min_listings: usize,
    correction: Option<RevparCorrection>,
}

impl EconomicsAggregator {
    pub fn new(
        seasonality: SeasonalityModel,
        matcher: FuzzyMatcher,
        min_days: u32,
        min_listings: usize,
    ) -> Self {
        Self {
            seasonality,
            matcher,
            min_days,
            min_listings,
            correction: None,
        }
    }

    pub fn with_correction(mut self, correction: RevparCorrection) -> Self {
        self.correction = Some(correction);
        self
    }

    pub fn matcher(&self) -> &FuzzyMatcher {
        &self.matcher
    }

    pub fn min_days(&self) -> u32 {
        self.min_days
    }

    pub fn min_listings(&self) -> usize {
        self.min_listings
    }

    /// Economics for a free-text building and unit label.
    pub fn lookup(
        &self,
        snapshot: &DatasetSnapshot,
        aliases: &AliasResolver,
        building: &str,
        unit: &str,
    ) -> EconomicsResult {
        let building = building.trim();
        if building.is_empty() {
            return EconomicsResult::no_data(ReasonCode::BuildingNotFound, building, unit);
        }
        let Some(unit_type) = UnitType::parse(unit) else {
            return EconomicsResult::no_data(ReasonCode::UnitTypeInvalid, building, unit.trim());
        };
        let Some(matched) = snapshot.match_building(building, aliases, &self.matcher) else {
            return EconomicsResult::no_data(
                ReasonCode::BuildingNotFound,
                building,
                &unit_type.label(),
            );
        };

        self.lookup_unit(snapshot, &matched, unit_type)
    }

    /// Economics for an already matched building and normalized unit.
    pub fn lookup_unit(
        &self,
        snapshot: &DatasetSnapshot,
        matched: &BuildingMatch,
        unit: UnitType,
    ) -> EconomicsResult {
        let candidates = self.qualifying(snapshot, &matched.name, unit);

        if candidates.len() < self.min_listings {
            debug!(
                building = %matched.name,
                unit = %unit,
                found = candidates.len(),
                required = self.min_listings,
                "insufficient comparables"
            );
            let reason = ReasonCode::InsufficientSample;
            return EconomicsResult::NoData {
                reason_code: reason,
                user_message: format!(
                    "{} (need at least {} comps with {}+ days)",
                    reason.user_message(),
                    self.min_listings,
                    self.min_days
                ),
                building_name: matched.name.clone(),
                unit_type: unit.label(),
            };
        }

        let listings: Vec<ProjectedListing> = candidates
            .iter()
            .map(|row| self.seasonality.project(row, unit))
            .collect();

        let metrics = self.metrics(&listings, matched, unit);
        EconomicsResult::Ok { metrics, listings }
    }

    /// Rows for the building and unit observed for at least `min_days`.
    pub fn qualifying<'a>(
        &self,
        snapshot: &'a DatasetSnapshot,
        building: &str,
        unit: UnitType,
    ) -> Vec<&'a ComparableListing> {
        snapshot
            .rows_for_building(building)
            .filter(|r| r.unit_type == Some(unit) && r.days_available >= self.min_days)
            .collect()
    }

    /// The comparables a lookup would use, with raw figures and AirDNA links.
    pub fn sources(
        &self,
        snapshot: &DatasetSnapshot,
        aliases: &AliasResolver,
        building: &str,
        unit: &str,
    ) -> EconomicsSources {
        let unit_type = UnitType::parse(unit);
        let matched = snapshot.match_building(building, aliases, &self.matcher);

        let comps: Vec<SourceComp> = match (&matched, unit_type) {
            (Some(m), Some(u)) => self
                .qualifying(snapshot, &m.name, u)
                .into_iter()
                .map(|r| SourceComp {
                    airbnb_id: r.airbnb_id.clone(),
                    airbnb_url: r.airbnb_url.clone(),
                    airdna_url: r.airdna_url(),
                    days_available: r.days_available,
                    raw_revenue: r.normalized_revenue(),
                    raw_adr: r.adr,
                    raw_occ: r.occupancy_percent(),
                })
                .collect(),
            _ => Vec::new(),
        };

        EconomicsSources {
            building_name: matched.map(|m| m.name),
            unit_type,
            count: comps.len(),
            min_days: self.min_days,
            comps,
        }
    }

    fn metrics(
        &self,
        listings: &[ProjectedListing],
        matched: &BuildingMatch,
        unit: UnitType,
    ) -> EconomicsMetrics {
        let series = |value: fn(&ProjectedListing) -> f64| -> Vec<(f64, f64)> {
            listings.iter().map(|l| (value(l), l.weight())).collect()
        };
        let adr = series(|l| l.projected_adr_365);
        let occ = series(|l| l.projected_occ_365);
        let rev = series(|l| l.projected_rev_365);

        let adr_p50 = weighted_percentile(&adr, 0.50);
        let occ_p50 = weighted_percentile(&occ, 0.50);
        let mut rev_p50 = weighted_percentile(&rev, 0.50);
        let mut rev_p75 = weighted_percentile(&rev, 0.75);

        let correction_factor = self
            .correction
            .filter(|c| c.applies_to(&matched.name, unit))
            .map(|c| c.factor(adr_p50, occ_p50));
        if let Some(factor) = correction_factor {
            rev_p50 *= factor;
            rev_p75 *= factor;
        }

        let truth_count = listings.iter().filter(|l| l.is_truth()).count();

        EconomicsMetrics {
            adr_p50: adr_p50.round(),
            adr_p75: weighted_percentile(&adr, 0.75).round(),
            occ_p50: round_to(occ_p50, 1),
            occ_p75: round_to(weighted_percentile(&occ, 0.75), 1),
            rev_p50: rev_p50.round(),
            rev_p75: rev_p75.round(),
            building: matched.name.clone(),
            match_method: matched.method,
            unit_type: unit,
            sample_n: listings.len(),
            truth_count,
            scaled_count: listings.len() - truth_count,
            min_days_filter: self.min_days,
            min_listings_required: self.min_listings,
            method_version: METHOD_VERSION,
            data_snapshot_date: self.seasonality.reference_date(),
            correction_factor: correction_factor.map(|f| round_to(f, 3)),
        }
    }
}
