// src/economics/correction.rs
//
// RevPAR correction for Palm Jumeirah studios. Computed revenue percentiles
// are rescaled so that ADR x occupancy lines up with an independent market
// RevPAR series, within a fixed band.

use crate::domain::UnitType;
use csv::StringRecord;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

const VALUE_COLUMNS: &[&str] = &["value", "revpar", "RevPAR"];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RevparCorrection {
    mean_revpar: Option<f64>,
    min: f64,
    max: f64,
}

impl RevparCorrection {
    pub fn new(mean_revpar: Option<f64>, min: f64, max: f64) -> Self {
        Self {
            mean_revpar,
            min,
            max,
        }
    }

    /// Reads the reference series. A missing or unreadable file leaves the
    /// correction inert (factor 1.0).
    pub fn load(path: &Path, min: f64, max: f64) -> Self {
        let mean = match std::fs::File::open(path) {
            Ok(file) => match mean_from_reader(file) {
                Ok(mean) => mean,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "unreadable RevPAR series");
                    None
                }
            },
            Err(_) => {
                warn!(path = %path.display(), "RevPAR series not found, correction inactive");
                None
            }
        };

        if let Some(mean) = mean {
            info!(path = %path.display(), mean_revpar = mean, "loaded RevPAR reference");
        }
        Self::new(mean, min, max)
    }

    pub fn mean_revpar(&self) -> Option<f64> {
        self.mean_revpar
    }

    /// Studios in any building whose name mentions "palm".
    pub fn applies_to(&self, building: &str, unit: UnitType) -> bool {
        unit == UnitType::Studio && building.to_lowercase().contains("palm")
    }

    /// `clamp(mean_revpar / (adr * occupancy), min, max)`, with occupancy
    /// given as a percentage. 1.0 when any input is missing or non-positive.
    pub fn factor(&self, adr: f64, occupancy_percent: f64) -> f64 {
        let Some(mean) = self.mean_revpar.filter(|m| *m > 0.0) else {
            return 1.0;
        };
        let base = adr * occupancy_percent / 100.0;
        if adr <= 0.0 || occupancy_percent <= 0.0 || !base.is_finite() {
            return 1.0;
        }
        (mean / base).clamp(self.min, self.max)
    }
}

/// Mean of the positive numbers in the first matching value column.
pub fn mean_from_reader<R: Read>(source: R) -> Result<Option<f64>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers: StringRecord = reader.headers()?.clone();
    let Some(col) = VALUE_COLUMNS
        .iter()
        .find_map(|name| headers.iter().position(|h| h == *name))
    else {
        return Ok(None);
    };

    let mut sum = 0.0;
    let mut count = 0usize;
    for record in reader.records() {
        let record = record?;
        let value = record.get(col).and_then(|v| v.parse::<f64>().ok());
        if let Some(v) = value.filter(|v| *v > 0.0 && v.is_finite()) {
            sum += v;
            count += 1;
        }
    }

    Ok((count > 0).then(|| sum / count as f64))
}
