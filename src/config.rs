// src/config.rs
use crate::economics::MaidFallbackPolicy;
use crate::resolver::OverlapBasis;
use chrono::NaiveDate;
use std::fmt::Display;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}' ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Runtime settings. Every field has a default and can be overridden from
/// the environment.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub bind_addr: SocketAddr,
    pub dataset_path: PathBuf,
    pub aliases_path: PathBuf,
    pub min_days: u32,
    pub min_listings: usize,
    pub match_threshold: f64,
    pub overlap_basis: OverlapBasis,
    pub maid_policy: MaidFallbackPolicy,
    pub reference_date: NaiveDate,
    pub correction_enabled: bool,
    pub correction_min: f64,
    pub correction_max: f64,
    pub revpar_path: PathBuf,
    pub fetch_timeout: Duration,
    pub enrich_max_items: usize,
    pub data_max_age_days: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            dataset_path: PathBuf::from("data/reference/palm_master_clean.csv"),
            aliases_path: PathBuf::from("data/reference/building_aliases.toml"),
            min_days: 270,
            min_listings: 2,
            match_threshold: 0.6,
            overlap_basis: OverlapBasis::Query,
            maid_policy: MaidFallbackPolicy::RequireMaidSignal,
            reference_date: NaiveDate::from_ymd_opt(2025, 9, 22).unwrap_or_default(),
            correction_enabled: true,
            correction_min: 0.70,
            correction_max: 1.30,
            revpar_path: PathBuf::from("data/reference/revpar_last_12_month.csv"),
            fetch_timeout: Duration::from_secs(15),
            enrich_max_items: 500,
            data_max_age_days: 120,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. Unset or blank keys keep
    /// their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let d = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let config = Self {
            bind_addr: parsed(&get, "BIND_ADDR", d.bind_addr)?,
            dataset_path: get("MASTER_SHEET_CSV").map_or(d.dataset_path, PathBuf::from),
            aliases_path: get("BUILDING_ALIASES_PATH").map_or(d.aliases_path, PathBuf::from),
            min_days: parsed(&get, "ECON_MIN_DAYS", d.min_days)?,
            min_listings: parsed(&get, "ECON_MIN_LISTINGS", d.min_listings)?,
            match_threshold: parsed(&get, "BUILDING_MATCH_THRESHOLD", d.match_threshold)?,
            overlap_basis: parsed(&get, "BUILDING_OVERLAP_BASIS", d.overlap_basis)?,
            maid_policy: parsed(&get, "MAID_FALLBACK_POLICY", d.maid_policy)?,
            reference_date: parsed(&get, "SEASONALITY_REFERENCE_DATE", d.reference_date)?,
            correction_enabled: flag(&get, "ECON_CORRECTION_PALM_STUDIOS", d.correction_enabled)?,
            correction_min: parsed(&get, "ECON_CORR_MIN", d.correction_min)?,
            correction_max: parsed(&get, "ECON_CORR_MAX", d.correction_max)?,
            revpar_path: get("ECON_CORR_PALM_STUDIOS_REVPAR").map_or(d.revpar_path, PathBuf::from),
            fetch_timeout: Duration::from_secs(parsed(
                &get,
                "FETCH_TIMEOUT_SECS",
                d.fetch_timeout.as_secs(),
            )?),
            enrich_max_items: parsed(&get, "ENRICH_MAX_ITEMS", d.enrich_max_items)?,
            data_max_age_days: parsed(&get, "DATA_MAX_AGE_DAYS", d.data_max_age_days)?,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.match_threshold > 0.0 && self.match_threshold <= 1.0) {
            return Err(invalid(
                "BUILDING_MATCH_THRESHOLD",
                self.match_threshold,
                "must be in (0, 1]",
            ));
        }
        if self.min_listings == 0 {
            return Err(invalid("ECON_MIN_LISTINGS", 0, "must be at least 1"));
        }
        if self.correction_min <= 0.0 || self.correction_min > self.correction_max {
            return Err(invalid(
                "ECON_CORR_MIN",
                self.correction_min,
                "must be positive and not above ECON_CORR_MAX",
            ));
        }
        Ok(())
    }
}

fn invalid(key: &'static str, value: impl Display, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parsed<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| invalid(key, &raw, &e.to_string())),
        None => Ok(default),
    }
}

fn flag<G>(get: &G, key: &'static str, default: bool) -> Result<bool, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    let Some(raw) = get(key) else {
        return Ok(default);
    };
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(key, &raw, "expected 1/0 or true/false")),
    }
}
