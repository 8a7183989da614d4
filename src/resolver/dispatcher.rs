// src/resolver/dispatcher.rs
use crate::domain::ResolvedProperty;
use crate::resolver::aliases::AliasResolver;
use crate::resolver::facts::FactExtractor;
use crate::resolver::fetcher::PageSource;
use crate::resolver::url_guesser::UrlGuesser;
use crate::resolver::ResolveError;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

/// Listing portals with a page extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingSite {
    PropertyFinder,
    Bayut,
}

impl ListingSite {
    pub fn from_url(url: &str) -> Result<Self, ResolveError> {
        let parsed = Url::parse(url).map_err(|e| ResolveError::InvalidUrl(e.to_string()))?;
        let host = parsed.host_str().unwrap_or_default().to_lowercase();

        if host.contains("propertyfinder.") {
            Ok(ListingSite::PropertyFinder)
        } else if host.contains("bayut.") {
            Ok(ListingSite::Bayut)
        } else {
            Err(ResolveError::UnsupportedDomain(host))
        }
    }

    pub fn source(&self) -> &'static str {
        match self {
            ListingSite::PropertyFinder => "propertyfinder",
            ListingSite::Bayut => "bayut",
        }
    }
}

pub struct Dispatcher {
    pages: Box<dyn PageSource>,
    aliases: Arc<AliasResolver>,
}

impl Dispatcher {
    pub fn new(pages: Box<dyn PageSource>, aliases: Arc<AliasResolver>) -> Self {
        Self { pages, aliases }
    }

    /// Identifies the building and unit behind a listing URL.
    ///
    /// Page extraction runs first; whatever it leaves unset is filled from
    /// the URL guess. Never fails: the worst case is an empty guess.
    pub fn resolve(&self, url: &str) -> ResolvedProperty {
        let primary = match self.extract(url) {
            Ok(resolved) => resolved,
            Err(e) => {
                warn!(url, error = %e, "primary extraction failed, guessing from url");
                return UrlGuesser::new(&self.aliases).guess(url);
            }
        };

        if primary.is_complete() {
            return primary;
        }

        debug!(
            url,
            building = ?primary.building_name,
            unit = ?primary.unit_type,
            "primary extraction incomplete, filling from url guess"
        );
        primary.fill_from(UrlGuesser::new(&self.aliases).guess(url))
    }

    fn extract(&self, url: &str) -> Result<ResolvedProperty, ResolveError> {
        let site = ListingSite::from_url(url)?;
        let page = self.pages.fetch(url)?;

        Ok(FactExtractor::new(&self.aliases).extract(url, page.as_ref(), site.source()))
    }
}
