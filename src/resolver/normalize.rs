// src/resolver/normalize.rs
//
// Text canonicalization plus the free-text rules that turn page titles,
// descriptions and raw building strings into normalized values.

use crate::domain::UnitType;
use regex::Regex;
use std::borrow::Cow;
use std::collections::HashSet;
use std::sync::LazyLock;

/// Buildings we recognise by substring. Longer names come before their
/// shorter forms so "Seven Palm Jumeirah" wins over "Seven Palm".
pub const KNOWN_BUILDINGS: &[&str] = &[
    "Shoreline Apartments",
    "Seven Palm Jumeirah",
    "Seven Palm",
    "The Palm Tower",
    "Palm Tower",
    "Five Palm Jumeirah",
    "Five Palm",
    "Fairmont Palm Residences",
    "Palm Views",
    "Marina Residences",
    "Azure Residences",
    "Tiara Residences",
    "Oceana Residences",
    "The Royal Amwaj",
    "Royal Amwaj",
    "Th8",
    "Balqis Residence",
    "Grandeur Residences",
    "Jumeirah Zabeel Saray",
    "Azizi Mina",
    "Sarai Apartments",
    "Rixos Hotel",
    "Club Vista Mare",
];

static BEDS_WITH_MAID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{1,2})\s*-?\s*(?:bed|br|bhk)\w*.*maid").expect("valid regex")
});
static MAID_SERVICE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bmaid['’]?s?\s+services?\b").expect("valid regex")
});
static BEDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2})\s*-?\s*(?:bed|br|bhk)").expect("valid regex"));

static LEADING_LISTING_PHRASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(rent in|for rent in|for sale in|buy in|apartment (for )?(rent|sale) in)\s+")
        .expect("valid regex")
});
static TITLE_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*[|:]\s*").expect("valid regex"));
static SITE_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s*[|-]\s*property\s*finder\s*$").expect("valid regex")
});
static PROPERTY_KIND_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(apartment|villa|townhouse|penthouse)\s+(in\s+)?").expect("valid regex")
});
static GENERIC_LOCATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(dubai|palm jumeirah|jumeirah)$").expect("valid regex"));

/// Lowercase, trim, and collapse internal whitespace runs to one space.
pub fn canonical(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Canonical tokens of at least two characters, as a set.
pub fn tokenize(s: &str) -> HashSet<String> {
    canonical(s)
        .split(' ')
        .filter(|t| t.chars().count() >= 2)
        .map(str::to_string)
        .collect()
}

/// Classifies listing text into a unit type.
///
/// "2 bed + maid" style phrases count the maid's room as a bedroom.
pub fn unit_type_from_text(text: &str) -> Option<UnitType> {
    let t = text.to_lowercase();
    if t.contains("studio") {
        return Some(UnitType::Studio);
    }

    if let Some(caps) = BEDS_WITH_MAID.captures(&strip_maid_service(&t)) {
        if let Ok(n) = caps[1].parse::<u32>() {
            return Some(UnitType::from_bedrooms(n + 1));
        }
    }

    BEDS.captures(&t)
        .and_then(|caps| caps[1].parse::<u32>().ok())
        .map(UnitType::from_bedrooms)
}

/// Removes "maid service" mentions, which describe housekeeping rather than
/// a room.
pub fn strip_maid_service(text: &str) -> Cow<'_, str> {
    MAID_SERVICE.replace_all(text, "")
}

/// Turns a raw building candidate (page title, JSON-LD name) into a building
/// name. Known buildings are matched by containment in the raw text first,
/// then in the URL; otherwise listing-site boilerplate is stripped.
pub fn normalize_building(raw: Option<&str>, url: Option<&str>) -> Option<String> {
    if let Some(raw) = raw {
        let lower = raw.to_lowercase();
        if let Some(known) = KNOWN_BUILDINGS
            .iter()
            .find(|b| lower.contains(&b.to_lowercase()))
        {
            return Some(known.to_string());
        }
    }

    if let Some(url) = url {
        let lower = url.to_lowercase();
        let found = KNOWN_BUILDINGS.iter().find(|b| {
            let name = canonical(b);
            lower.contains(&name.replace(' ', "-")) || lower.contains(&name.replace(' ', ""))
        });
        if let Some(known) = found {
            return Some(known.to_string());
        }
    }

    strip_listing_boilerplate(raw?)
}

fn strip_listing_boilerplate(raw: &str) -> Option<String> {
    let s = raw.trim();
    let s = LEADING_LISTING_PHRASE.replace(s, "");
    let s = TITLE_SEPARATOR.split(&s).next().unwrap_or_default().to_string();
    let s = SITE_SUFFIX.replace(&s, "");
    let s = PROPERTY_KIND_PREFIX.replace(&s, "");
    let s = s.split_whitespace().collect::<Vec<_>>().join(" ");

    if s.chars().count() < 3 || GENERIC_LOCATION.is_match(&s.to_lowercase()) {
        return None;
    }
    Some(s)
}
