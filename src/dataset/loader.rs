// src/dataset/loader.rs
//
// CSV row source for comparable listings. Column names vary between dataset
// exports, so each logical field is looked up through an ordered alias list
// resolved once against the header row.

use crate::dataset::listing::{ComparableListing, ROOM_URL_TEMPLATE};
use crate::domain::UnitType;
use csv::StringRecord;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to open dataset {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read dataset CSV: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Id,
    Url,
    Building,
    Unit,
    Revenue,
    Occupancy,
    DaysAvailable,
    Adr,
}

impl Field {
    const ALL: [Field; 8] = [
        Field::Id,
        Field::Url,
        Field::Building,
        Field::Unit,
        Field::Revenue,
        Field::Occupancy,
        Field::DaysAvailable,
        Field::Adr,
    ];

    /// Accepted header names, most preferred first.
    fn aliases(self) -> &'static [&'static str] {
        match self {
            Field::Id => &["airbnb_id", "id", "listing_id"],
            Field::Url => &["link", "airbnb_url", "url"],
            Field::Building => &["building", "building_name", "bldg_name"],
            Field::Unit => &["unit_type", "unit", "bedrooms", "beds_label"],
            Field::Revenue => &["revenue", "annual_revenue"],
            Field::Occupancy => &["occupancy", "occ"],
            Field::DaysAvailable => &["days_available", "days"],
            Field::Adr => &["adr", "average_daily_rate"],
        }
    }
}

/// Column position of every logical field present in the header row,
/// indexed by `Field as usize`.
#[derive(Debug)]
struct HeaderIndex {
    columns: [Option<usize>; Field::ALL.len()],
}

impl HeaderIndex {
    fn build(headers: &StringRecord) -> Self {
        let by_name: HashMap<String, usize> = headers
            .iter()
            .enumerate()
            .map(|(idx, name)| (normalize_header(name), idx))
            .collect();

        let columns = Field::ALL.map(|field| {
            field
                .aliases()
                .iter()
                .find_map(|alias| by_name.get(*alias).copied())
        });

        Self { columns }
    }

    fn get<'r>(&self, record: &'r StringRecord, field: Field) -> Option<&'r str> {
        let col = self.columns[field as usize]?;
        record.get(col).map(str::trim).filter(|s| !s.is_empty())
    }

    fn has(&self, field: Field) -> bool {
        self.columns[field as usize].is_some()
    }
}

fn normalize_header(name: &str) -> String {
    name.trim().trim_start_matches('\u{feff}').to_lowercase()
}

#[derive(Debug, Default)]
pub struct LoadedRows {
    pub rows: Vec<ComparableListing>,
    pub skipped: usize,
}

pub fn load_listings(path: &Path) -> Result<LoadedRows, DatasetError> {
    let file = File::open(path).map_err(|source| DatasetError::Io {
        path: path.display().to_string(),
        source,
    })?;
    read_listings(file)
}

/// Reads every row it can. Rows without an id, building or unit label, and
/// rows the CSV reader rejects, are counted in `skipped`.
pub fn read_listings<R: Read>(source: R) -> Result<LoadedRows, DatasetError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader.headers()?.clone();
    let index = HeaderIndex::build(&headers);

    for field in [Field::Id, Field::Building, Field::Unit] {
        if !index.has(field) {
            debug!(?field, "dataset has no column for required field");
        }
    }

    let mut loaded = LoadedRows::default();

    for (idx, result) in reader.records().enumerate() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                debug!(line = idx + 2, error = %e, "skipping unreadable dataset row");
                loaded.skipped += 1;
                continue;
            }
        };

        match parse_row(&record, &index) {
            Some(row) => loaded.rows.push(row),
            None => loaded.skipped += 1,
        }
    }

    Ok(loaded)
}

fn parse_row(record: &StringRecord, index: &HeaderIndex) -> Option<ComparableListing> {
    let airbnb_id = index.get(record, Field::Id)?;
    let building = index.get(record, Field::Building)?;
    let unit_label = index.get(record, Field::Unit)?;

    let airbnb_url = index
        .get(record, Field::Url)
        .map(str::to_string)
        .unwrap_or_else(|| format!("{ROOM_URL_TEMPLATE}{airbnb_id}"));

    Some(ComparableListing {
        airbnb_id: airbnb_id.to_string(),
        airbnb_url,
        building: building.to_string(),
        unit_label: unit_label.to_string(),
        unit_type: UnitType::parse(unit_label),
        revenue: number(index.get(record, Field::Revenue)),
        occupancy: number(index.get(record, Field::Occupancy)),
        adr: number(index.get(record, Field::Adr)),
        days_available: days(index.get(record, Field::DaysAvailable)),
    })
}

/// Unparseable or missing numbers read as zero.
fn number(raw: Option<&str>) -> f64 {
    raw.map(|s| s.replace(',', ""))
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

fn days(raw: Option<&str>) -> u32 {
    let value = number(raw);
    if value <= 0.0 {
        0
    } else {
        value.min(f64::from(u32::MAX)).floor() as u32
    }
}
