//! Building alias table.
//!
//! Maps alternative spellings of a building to its canonical display name.
//! Loaded once at startup from a TOML file and read-only afterwards:
//!
//! ```toml
//! [buildings]
//! "Seven Palm Jumeirah" = ["7 Palm", "Seven Palm Residences"]
//! "Five Palm Jumeirah" = ["Viceroy Palm"]
//! ```

use crate::resolver::normalize::canonical;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum AliasError {
    #[error("failed to read alias file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse alias TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("alias '{alias}' maps to both '{first}' and '{second}'")]
    Conflict {
        alias: String,
        first: String,
        second: String,
    },
}

#[derive(Deserialize, Debug, Default)]
struct AliasFile {
    #[serde(default)]
    buildings: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct AliasResolver {
    // canonical(alias or name) -> display name
    index: HashMap<String, String>,
    names: usize,
}

impl AliasResolver {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_toml_str(content: &str) -> Result<Self, AliasError> {
        let file: AliasFile = toml::from_str(content)?;
        Self::from_pairs(file.buildings)
    }

    /// Builds the table from `(canonical name, aliases)` pairs.
    /// One alias may only ever point at one canonical name.
    pub fn from_pairs<I, A>(pairs: I) -> Result<Self, AliasError>
    where
        I: IntoIterator<Item = (String, A)>,
        A: IntoIterator<Item = String>,
    {
        let mut resolver = Self::empty();

        for (name, aliases) in pairs {
            let name = name.trim().to_string();
            resolver.insert(&name, &name)?;
            for alias in aliases {
                resolver.insert(&alias, &name)?;
            }
            resolver.names += 1;
        }

        Ok(resolver)
    }

    /// Loads the alias file. A missing file yields an empty table.
    pub fn load(path: &Path) -> Result<Self, AliasError> {
        if !path.exists() {
            warn!(path = %path.display(), "alias file not found, continuing without aliases");
            return Ok(Self::empty());
        }

        let content = std::fs::read_to_string(path).map_err(|source| AliasError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let resolver = Self::from_toml_str(&content)?;

        info!(
            path = %path.display(),
            buildings = resolver.names,
            aliases = resolver.index.len(),
            "loaded building aliases"
        );
        Ok(resolver)
    }

    fn insert(&mut self, alias: &str, name: &str) -> Result<(), AliasError> {
        let key = canonical(alias);
        if key.is_empty() {
            return Ok(());
        }
        match self.index.get(&key) {
            Some(existing) if existing != name => Err(AliasError::Conflict {
                alias: alias.to_string(),
                first: existing.clone(),
                second: name.to_string(),
            }),
            Some(_) => Ok(()),
            None => {
                self.index.insert(key, name.to_string());
                Ok(())
            }
        }
    }

    /// Canonical display name for `name`, or `name` unchanged when it is not
    /// a known alias. Exact (case/space-insensitive) lookup only.
    pub fn canonical_for(&self, name: &str) -> String {
        self.index
            .get(&canonical(name))
            .cloned()
            .unwrap_or_else(|| name.to_string())
    }

    /// Number of canonical building names in the table.
    pub fn len(&self) -> usize {
        self.names
    }

    pub fn is_empty(&self) -> bool {
        self.names == 0
    }
}
