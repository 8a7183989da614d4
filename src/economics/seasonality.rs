//! Monthly seasonality reference curves and partial-year projection.
//!
//! Each curve holds one reference year (Sep 2024 to Aug 2025) of Palm
//! Jumeirah market data per unit type. A listing observed for fewer than 365
//! days ending at the reference date is scaled up by the revenue share of the
//! days it did not cover, weighted by the curve rather than pro rata.

use crate::dataset::ComparableListing;
use crate::domain::UnitType;
use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

pub const WINDOW_DAYS: u32 = 365;
/// A month is reported as missing once this many of its days are unobserved.
pub const MATERIALLY_MISSING_DAYS: u32 = 25;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthStats {
    pub revenue: f64,
    pub occupancy: f64,
    pub adr: f64,
    pub revpar: f64,
}

const fn m(revenue: f64, occupancy: f64, adr: f64, revpar: f64) -> MonthStats {
    MonthStats {
        revenue,
        occupancy,
        adr,
        revpar,
    }
}

// January first.
const STUDIO: [MonthStats; 12] = [
    m(15632.0, 84.26, 664.0, 559.85),
    m(15455.0, 93.02, 629.0, 585.54),
    m(11288.0, 73.03, 544.0, 397.53),
    m(13655.0, 92.17, 558.0, 514.27),
    m(9591.0, 74.67, 456.0, 340.60),
    m(6188.0, 57.14, 384.0, 219.50),
    m(4955.0, 63.06, 278.0, 175.07),
    m(4986.0, 67.06, 287.0, 192.57),
    m(7530.0, 77.43, 383.0, 296.46),
    m(13765.0, 88.65, 576.0, 510.93),
    m(15980.0, 86.35, 669.0, 577.60),
    m(14131.0, 73.92, 712.0, 526.44),
];

const ONE_BED: [MonthStats; 12] = [
    m(18489.0, 81.00, 785.0, 636.20),
    m(17218.0, 88.95, 746.0, 663.24),
    m(14543.0, 76.09, 663.0, 504.78),
    m(17757.0, 93.11, 685.0, 637.51),
    m(12217.0, 77.37, 543.0, 420.26),
    m(8139.0, 60.17, 469.0, 282.10),
    m(6550.0, 60.72, 374.0, 226.87),
    m(7258.0, 69.14, 387.0, 267.78),
    m(9789.0, 77.05, 509.0, 392.22),
    m(16377.0, 86.22, 691.0, 595.93),
    m(18505.0, 86.39, 783.0, 676.61),
    m(17998.0, 74.51, 861.0, 641.58),
];

const TWO_BED: [MonthStats; 12] = [
    m(30203.0, 77.26, 1401.0, 1082.59),
    m(28208.0, 82.61, 1316.0, 1087.49),
    m(21738.0, 68.72, 1117.0, 767.99),
    m(30282.0, 90.21, 1240.0, 1118.58),
    m(18777.0, 70.49, 959.0, 676.28),
    m(14165.0, 60.88, 815.0, 496.09),
    m(12460.0, 65.32, 687.0, 448.57),
    m(13057.0, 67.35, 714.0, 480.67),
    m(13587.0, 62.51, 846.0, 528.72),
    m(29289.0, 83.05, 1277.0, 1060.47),
    m(31589.0, 80.76, 1425.0, 1150.60),
    m(31531.0, 70.78, 1556.0, 1101.45),
];

const THREE_BED: [MonthStats; 12] = [
    m(45500.0, 73.71, 2163.0, 1594.64),
    m(40794.0, 80.42, 2000.0, 1608.19),
    m(33094.0, 69.74, 1663.0, 1159.84),
    m(50162.0, 89.04, 1973.0, 1757.10),
    m(34424.0, 74.18, 1574.0, 1167.57),
    m(22366.0, 66.38, 1240.0, 823.29),
    m(20246.0, 71.84, 1123.0, 806.51),
    m(21189.0, 75.23, 1206.0, 907.17),
    m(25627.0, 64.74, 1586.0, 1026.72),
    m(46109.0, 81.99, 1999.0, 1638.67),
    m(44545.0, 71.71, 2273.0, 1629.69),
    m(49189.0, 70.08, 2451.0, 1717.88),
];

const FOUR_BED: [MonthStats; 12] = [
    m(61017.0, 85.22, 2477.0, 2110.64),
    m(54589.0, 78.83, 2481.0, 1955.95),
    m(43681.0, 72.21, 2010.0, 1451.63),
    m(58456.0, 87.23, 2296.0, 2003.17),
    m(38006.0, 75.00, 1720.0, 1290.32),
    m(35166.0, 71.56, 1689.0, 1208.83),
    m(31873.0, 79.54, 1323.0, 1051.92),
    m(26488.0, 75.45, 1394.0, 1051.88),
    m(33332.0, 68.08, 1695.0, 1153.81),
    m(47116.0, 78.42, 2161.0, 1694.81),
    m(55795.0, 72.82, 2728.0, 1986.24),
    m(56258.0, 72.20, 2738.0, 1977.13),
];

fn curve(unit: UnitType) -> Option<&'static [MonthStats; 12]> {
    match unit {
        UnitType::Studio => Some(&STUDIO),
        UnitType::Bedrooms(1) => Some(&ONE_BED),
        UnitType::Bedrooms(2) => Some(&TWO_BED),
        UnitType::Bedrooms(3) => Some(&THREE_BED),
        UnitType::Bedrooms(4) => Some(&FOUR_BED),
        UnitType::Bedrooms(_) => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionMode {
    Truth,
    SeasonalityScaled,
}

/// A comparable expanded to a 365-day equivalent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectedListing {
    pub airbnb_id: String,
    pub airbnb_url: String,
    pub days_available: u32,
    pub raw_revenue: f64,
    pub raw_adr: f64,
    pub raw_occ: f64,
    pub projected_adr_365: f64,
    pub projected_occ_365: f64,
    pub projected_rev_365: f64,
    pub projection_mode: ProjectionMode,
    pub adjustment_factor: f64,
    pub missing_months: Vec<u32>,
    pub missing_months_multiplier: f64,
}

impl ProjectedListing {
    pub fn is_truth(&self) -> bool {
        self.projection_mode == ProjectionMode::Truth
    }

    /// Percentile weight: a full year for truth rows, otherwise the days
    /// actually observed.
    pub fn weight(&self) -> f64 {
        if self.is_truth() {
            f64::from(WINDOW_DAYS)
        } else {
            f64::from(self.days_available)
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SeasonalityModel {
    reference_date: NaiveDate,
}

impl SeasonalityModel {
    pub fn new(reference_date: NaiveDate) -> Self {
        Self { reference_date }
    }

    pub fn reference_date(&self) -> NaiveDate {
        self.reference_date
    }

    pub fn month(&self, unit: UnitType, month: u32) -> Option<MonthStats> {
        let index = usize::try_from(month.checked_sub(1)?).ok()?;
        curve(unit)?.get(index).copied()
    }

    pub fn annual_revenue(&self, unit: UnitType) -> f64 {
        curve(unit).map_or(0.0, |c| c.iter().map(|m| m.revenue).sum())
    }

    /// Share of the annual reference revenue earned in `month` (1 = January).
    /// Falls back to an even 1/12 when there is no curve.
    pub fn monthly_revenue_share(&self, unit: UnitType, month: u32) -> f64 {
        let total = self.annual_revenue(unit);
        match self.month(unit, month) {
            Some(stats) if total > 0.0 => stats.revenue / total,
            _ => 1.0 / 12.0,
        }
    }

    /// Dates of the 365-day window ending at the reference date, newest
    /// first, with their distance from the reference date.
    fn window(&self) -> impl Iterator<Item = (u32, NaiveDate)> + '_ {
        (0..WINDOW_DAYS).filter_map(move |offset| {
            self.reference_date
                .checked_sub_days(Days::new(u64::from(offset)))
                .map(|date| (offset, date))
        })
    }

    /// Unobserved days per calendar month within the window. Months with
    /// nothing missing are omitted; a full year yields an empty map.
    pub fn missing_days_per_month(&self, days_available: u32) -> BTreeMap<u32, u32> {
        let mut missing = BTreeMap::new();
        if days_available >= WINDOW_DAYS {
            return missing;
        }

        for (offset, date) in self.window() {
            if offset >= days_available {
                *missing.entry(date.month()).or_insert(0) += 1;
            }
        }
        missing
    }

    /// Months with at least 25 unobserved days. Informational only.
    pub fn missing_months(&self, days_available: u32) -> Vec<u32> {
        self.missing_days_per_month(days_available)
            .into_iter()
            .filter(|(_, days)| *days >= MATERIALLY_MISSING_DAYS)
            .map(|(month, _)| month)
            .collect()
    }

    /// Missing reference revenue over covered reference revenue. Each
    /// unobserved day contributes its month's curve revenue divided by that
    /// month's calendar length. Zero for a full year, for unit types without
    /// a curve, and when nothing is covered.
    pub fn multiplier(&self, unit: UnitType, days_available: u32) -> f64 {
        let Some(curve) = curve(unit) else {
            return 0.0;
        };
        if days_available >= WINDOW_DAYS {
            return 0.0;
        }

        let missing_revenue: f64 = self
            .window()
            .filter(|(offset, _)| *offset >= days_available)
            .map(|(_, date)| {
                curve[date.month0() as usize].revenue / f64::from(days_in_month(date))
            })
            .sum();

        let covered = self.annual_revenue(unit) - missing_revenue;
        if covered <= 1e-6 {
            return 0.0;
        }
        missing_revenue / covered
    }

    pub fn project(&self, listing: &ComparableListing, unit: UnitType) -> ProjectedListing {
        let days = listing.days_available;
        let raw_revenue = listing.normalized_revenue();
        let raw_adr = listing.adr;
        let raw_occ = listing.occupancy_percent();

        if days >= WINDOW_DAYS {
            return ProjectedListing {
                airbnb_id: listing.airbnb_id.clone(),
                airbnb_url: listing.airbnb_url.clone(),
                days_available: days,
                raw_revenue,
                raw_adr,
                raw_occ,
                projected_adr_365: raw_adr,
                projected_occ_365: raw_occ,
                projected_rev_365: raw_revenue,
                projection_mode: ProjectionMode::Truth,
                adjustment_factor: 1.0,
                missing_months: Vec::new(),
                missing_months_multiplier: 0.0,
            };
        }

        let multiplier = self.multiplier(unit, days);
        let projected_revenue = raw_revenue * (1.0 + multiplier);
        let projected_occ = if raw_adr > 0.0 {
            projected_revenue / (raw_adr * f64::from(WINDOW_DAYS)) * 100.0
        } else {
            raw_occ
        };

        ProjectedListing {
            airbnb_id: listing.airbnb_id.clone(),
            airbnb_url: listing.airbnb_url.clone(),
            days_available: days,
            raw_revenue,
            raw_adr,
            raw_occ,
            projected_adr_365: raw_adr,
            projected_occ_365: projected_occ.clamp(0.0, 100.0),
            projected_rev_365: projected_revenue.round(),
            projection_mode: ProjectionMode::SeasonalityScaled,
            adjustment_factor: round_to(1.0 + multiplier, 2),
            missing_months: self.missing_months(days),
            missing_months_multiplier: round_to(multiplier, 3),
        }
    }
}

pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}

fn days_in_month(date: NaiveDate) -> u32 {
    let (year, month) = match date.month() {
        12 => (date.year() + 1, 1),
        m => (date.year(), m + 1),
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first| first.pred_opt())
        .map_or(31, |last| last.day())
}
