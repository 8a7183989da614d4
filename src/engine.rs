// src/engine.rs
//
// Wires resolution, unit selection and economics together over one shared
// dataset store. Every public operation returns a serializable value; only
// construction and oversized batches fail.

use crate::config::EngineConfig;
use crate::dataset::diagnostics::{listings_debug, ListingsDebug};
use crate::dataset::links::{comparable_links, ListingLinks};
use crate::dataset::DatasetStore;
use crate::domain::{ReasonCode, ResolvedProperty};
use crate::economics::aggregator::METHOD_VERSION;
use crate::economics::{
    EconomicsAggregator, EconomicsResult, EconomicsSources, RevparCorrection, SeasonalityModel,
    UnitSelection, UnitSelector,
};
use crate::resolver::aliases::AliasError;
use crate::resolver::{
    AliasResolver, Dispatcher, FuzzyMatcher, HttpPageSource, PageSource, ResolveError,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::SystemTime;
use thiserror::Error;
use tracing::{debug, info};

const SECS_PER_DAY: u64 = 86_400;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Aliases(#[from] AliasError),

    #[error(transparent)]
    Fetcher(#[from] ResolveError),

    #[error("Batch of {count} items exceeds the limit of {max}")]
    TooManyItems { count: usize, max: usize },
}

/// Result of analysing a listing link end to end.
#[derive(Debug, Clone, Serialize)]
pub struct LinkAnalysis {
    pub resolver: ResolvedProperty,
    pub selection: Option<UnitSelection>,
    pub economics: EconomicsResult,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnrichItem {
    #[serde(default)]
    pub building_name: String,
    #[serde(default)]
    pub unit_type: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnrichedItem {
    pub index: usize,
    pub building_name: String,
    pub unit_type: String,
    pub economics: EconomicsResult,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Ok,
    Unhealthy,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason_code: Option<ReasonCode>,
    pub rows: usize,
    pub skipped_rows: usize,
    pub buildings: usize,
    pub aliases: usize,
    pub data_age_days: Option<u64>,
    pub max_age_days: u64,
    pub reference_date: NaiveDate,
    pub method_version: &'static str,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Ok
    }
}

pub struct Engine {
    config: EngineConfig,
    store: DatasetStore,
    aliases: Arc<AliasResolver>,
    dispatcher: Dispatcher,
    aggregator: EconomicsAggregator,
    selector: UnitSelector,
}

impl Engine {
    pub fn new(
        config: EngineConfig,
        store: DatasetStore,
        aliases: AliasResolver,
        pages: Box<dyn PageSource>,
    ) -> Self {
        let aliases = Arc::new(aliases);
        let matcher =
            FuzzyMatcher::new(config.match_threshold).with_basis(config.overlap_basis);

        let mut aggregator = EconomicsAggregator::new(
            SeasonalityModel::new(config.reference_date),
            matcher,
            config.min_days,
            config.min_listings,
        );
        if config.correction_enabled {
            aggregator = aggregator.with_correction(RevparCorrection::load(
                &config.revpar_path,
                config.correction_min,
                config.correction_max,
            ));
        }

        Self {
            dispatcher: Dispatcher::new(pages, Arc::clone(&aliases)),
            selector: UnitSelector::new(config.maid_policy),
            config,
            store,
            aliases,
            aggregator,
        }
    }

    /// Production wiring: dataset file, alias file and a live HTTP fetcher.
    pub fn from_config(config: EngineConfig) -> Result<Self, EngineError> {
        let aliases = AliasResolver::load(&config.aliases_path)?;
        let pages = HttpPageSource::new(config.fetch_timeout)?;
        let store = DatasetStore::open(config.dataset_path.clone());

        info!(
            dataset = %config.dataset_path.display(),
            min_days = config.min_days,
            min_listings = config.min_listings,
            reference_date = %config.reference_date,
            "engine ready"
        );
        Ok(Self::new(config, store, aliases, Box::new(pages)))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn resolve(&self, url: &str) -> ResolvedProperty {
        self.dispatcher.resolve(url)
    }

    pub fn economics(&self, building: &str, unit: &str) -> EconomicsResult {
        let snapshot = self.store.snapshot();
        self.aggregator.lookup(&snapshot, &self.aliases, building, unit)
    }

    pub fn sources(&self, building: &str, unit: &str) -> EconomicsSources {
        let snapshot = self.store.snapshot();
        self.aggregator.sources(&snapshot, &self.aliases, building, unit)
    }

    /// Resolves a listing URL, picks a unit type the dataset actually has
    /// for that building, and computes its economics.
    pub fn analyze_link(&self, url: &str) -> LinkAnalysis {
        let resolved = self.resolve(url);
        let unit_label = resolved
            .unit_type
            .map(|u| u.label())
            .unwrap_or_default();

        let Some(building) = resolved.building_name.clone() else {
            return LinkAnalysis {
                economics: EconomicsResult::no_data(ReasonCode::NotSupported, "", &unit_label),
                resolver: resolved,
                selection: None,
            };
        };

        let snapshot = self.store.snapshot();
        let Some(matched) =
            snapshot.match_building(&building, &self.aliases, self.aggregator.matcher())
        else {
            return LinkAnalysis {
                economics: EconomicsResult::no_data(
                    ReasonCode::BuildingNotFound,
                    &building,
                    &unit_label,
                ),
                resolver: resolved,
                selection: None,
            };
        };

        let selection = match resolved.unit_type {
            Some(requested) => self.selector.select(
                &matched.name,
                requested,
                &snapshot.available_units(&matched.name),
                resolved.has_maids_room(),
            ),
            None => self.selector.most_common(
                &matched.name,
                snapshot
                    .rows_for_building(&matched.name)
                    .filter_map(|r| r.unit_type),
            ),
        };
        debug!(
            url,
            building = %matched.name,
            reason = ?selection.reason,
            chosen = ?selection.unit_type_chosen,
            "unit selected"
        );

        let economics = match selection.unit_type_chosen {
            Some(unit) => self.aggregator.lookup_unit(&snapshot, &matched, unit),
            None => EconomicsResult::NoData {
                reason_code: ReasonCode::UnitTypeNotAvailable,
                user_message: selection
                    .fallback_message
                    .clone()
                    .unwrap_or_else(|| ReasonCode::UnitTypeNotAvailable.user_message().to_string()),
                building_name: matched.name.clone(),
                unit_type: unit_label,
            },
        };

        LinkAnalysis {
            resolver: resolved,
            selection: Some(selection),
            economics,
        }
    }

    pub fn links(&self, building: &str, unit: &str, limit: usize) -> ListingLinks {
        let snapshot = self.store.snapshot();
        comparable_links(
            &snapshot,
            &self.aliases,
            self.aggregator.matcher(),
            building,
            unit,
            limit,
        )
    }

    /// Row and pair counts for the loaded dataset, with a sample of the
    /// queried pair when both fields are given.
    pub fn listings_debug(&self, building: Option<&str>, unit: Option<&str>) -> ListingsDebug {
        let snapshot = self.store.snapshot();
        listings_debug(&snapshot, self.store.path(), building, unit)
    }

    /// Economics for each item of a batch, in order.
    pub fn enrich(&self, items: &[EnrichItem]) -> Result<Vec<EnrichedItem>, EngineError> {
        let max = self.config.enrich_max_items;
        if items.len() > max {
            return Err(EngineError::TooManyItems {
                count: items.len(),
                max,
            });
        }

        let snapshot = self.store.snapshot();
        Ok(items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let building = item.building_name.trim();
                let unit = item.unit_type.trim();
                let economics = if building.is_empty() || unit.is_empty() {
                    EconomicsResult::no_data(ReasonCode::InvalidInput, building, unit)
                } else {
                    self.aggregator.lookup(&snapshot, &self.aliases, building, unit)
                };
                EnrichedItem {
                    index,
                    building_name: item.building_name.clone(),
                    unit_type: item.unit_type.clone(),
                    economics,
                }
            })
            .collect())
    }

    pub fn health(&self) -> HealthReport {
        self.health_at(SystemTime::now())
    }

    fn health_at(&self, now: SystemTime) -> HealthReport {
        let snapshot = self.store.snapshot();
        let data_age_days = snapshot
            .marker()
            .and_then(|modified| now.duration_since(modified).ok())
            .map(|age| age.as_secs() / SECS_PER_DAY);

        let reason_code = if snapshot.is_empty() {
            Some(ReasonCode::NotFound)
        } else if data_age_days.is_some_and(|days| days > self.config.data_max_age_days) {
            Some(ReasonCode::StaleData)
        } else {
            None
        };

        HealthReport {
            status: if reason_code.is_none() {
                HealthStatus::Ok
            } else {
                HealthStatus::Unhealthy
            },
            reason_code,
            rows: snapshot.rows().len(),
            skipped_rows: snapshot.skipped_rows(),
            buildings: snapshot.buildings().len(),
            aliases: self.aliases.len(),
            data_age_days,
            max_age_days: self.config.data_max_age_days,
            reference_date: self.config.reference_date,
            method_version: METHOD_VERSION,
        }
    }
}
