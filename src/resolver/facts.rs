//! Listing-page fact extraction.
//!
//! Each strategy reads the page (and what earlier strategies found) and
//! returns the facts it can see. Strategies run in a fixed order and the
//! results are folded left: the first strategy to set a field owns it.

use crate::domain::{ListingType, PropertyFacts, ResolvedProperty, UnitType};
use crate::resolver::aliases::AliasResolver;
use crate::resolver::models::{value_to_u64, LdListing};
use crate::resolver::normalize::{normalize_building, strip_maid_service, unit_type_from_text};
use crate::resolver::page::{PageSnapshot, Section};
use regex::Regex;
use std::collections::HashMap;
use std::ops::RangeInclusive;
use std::sync::LazyLock;

const RENT_RANGE: RangeInclusive<u64> = 10_000..=10_000_000;
const SALE_RANGE: RangeInclusive<u64> = 100_000..=100_000_000;
const SQM_TO_SQFT: f64 = 10.764;
const PRICE_META_KEYS: &[&str] = &["product:price:amount", "og:price:amount"];

static URL_RENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)/(rent|for-rent)/").expect("valid regex"));
static URL_SALE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)/(buy|for-sale|sale)/").expect("valid regex"));
static TITLE_RENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(for rent|rent|rental)\b").expect("valid regex"));
static TITLE_SALE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(for sale|sale|buy)\b").expect("valid regex"));

static BEDROOMS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bbedrooms\s*:?\s*(\d{1,2})\b").expect("valid regex"));
static BATHROOMS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bbathrooms?\s*:?\s*(\d{1,2})\b").expect("valid regex"));
static PROPERTY_SIZE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)property\s*size\s*:?\s*([\d,]+)\s*(sqft|sqm)").expect("valid regex")
});

static MAID_ROOM: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\bmaid['’]?s?\s+room\b",
        r"\+\s*maid\s+(room|bed)",
        r"with\s+maid['’]?s?\s+room",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid regex"))
    .collect()
});

static RENT_PRICE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)AED\s*([\d,]+)\s*(?:/\s*)?(?:per\s+)?year",
        r"(?i)AED\s*([\d,]+)\s*yearly",
        r"(?i)([\d,]+)\s*AED\s*(?:/\s*)?(?:per\s+)?year",
        r"(?i)([\d,]+)\s*AED\s*yearly",
        r"(?i)Price.*?AED\s*([\d,]+)",
        r"(?i)Rent.*?AED\s*([\d,]+)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid regex"))
    .collect()
});

static SALE_PRICE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)Price.*?AED\s*([\d,]+)",
        r"(?i)AED\s*([\d,]+)",
        r"(?i)([\d,]+)\s*AED",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid regex"))
    .collect()
});

static NODE_PRICE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [r"(?i)AED\s*([\d,]+)", r"(?i)([\d,]+)\s*AED"]
        .iter()
        .map(|p| Regex::new(p).expect("valid regex"))
        .collect()
});

/// Partial result threaded through the strategies.
#[derive(Debug, Default)]
struct Draft {
    building: Option<String>,
    unit_type: Option<UnitType>,
    facts: PropertyFacts,
}

impl Draft {
    fn or(self, later: Draft) -> Draft {
        Draft {
            building: self.building.or(later.building),
            unit_type: self.unit_type.or(later.unit_type),
            facts: self.facts.or(later.facts),
        }
    }

    fn listing_type(&self) -> Option<ListingType> {
        self.facts.listing_type
    }

    /// The listing type still waiting for a price, if any.
    fn awaiting_price(&self) -> Option<ListingType> {
        match self.listing_type()? {
            ListingType::Rent if self.facts.yearly_rent.is_none() => Some(ListingType::Rent),
            ListingType::Sale if self.facts.purchase_price.is_none() => Some(ListingType::Sale),
            _ => None,
        }
    }
}

struct Context<'p> {
    url: &'p str,
    page: &'p dyn PageSnapshot,
    full_text: String,
}

impl Context<'_> {
    fn title_candidate(&self) -> Option<String> {
        self.page.meta("og:title").or_else(|| self.page.title())
    }
}

type Strategy = fn(&Context<'_>, &Draft) -> Draft;

const STRATEGIES: &[Strategy] = &[
    listing_type_from_url,
    listing_type_from_title,
    structured_data,
    title_text,
    bedrooms_and_maid_room,
    bathrooms,
    property_size,
    price_from_text,
    price_from_meta,
    price_from_nodes,
    unit_from_meta_description,
    unit_from_url_text,
    reconcile_bedrooms,
];

pub struct FactExtractor<'a> {
    aliases: &'a AliasResolver,
}

impl<'a> FactExtractor<'a> {
    pub fn new(aliases: &'a AliasResolver) -> Self {
        Self { aliases }
    }

    /// Never fails: anything the page does not reveal is left unset.
    pub fn extract(&self, url: &str, page: &dyn PageSnapshot, source: &str) -> ResolvedProperty {
        let ctx = Context {
            url,
            page,
            full_text: page.full_text(),
        };

        let draft = STRATEGIES.iter().fold(Draft::default(), |acc, strategy| {
            let found = strategy(&ctx, &acc);
            acc.or(found)
        });

        let building_name = normalize_building(draft.building.as_deref(), Some(url))
            .map(|name| self.aliases.canonical_for(&name));

        let mut confidence: f64 = 0.5;
        if building_name.is_some() {
            confidence += 0.2;
        }
        if draft.unit_type.is_some() {
            confidence += 0.3;
        }

        ResolvedProperty {
            building_name,
            unit_type: draft.unit_type,
            confidence: confidence.clamp(0.0, 1.0),
            facts: draft.facts.or(PropertyFacts::with_source(source)),
        }
    }
}

fn with_facts(facts: PropertyFacts) -> Draft {
    Draft {
        facts,
        ..Draft::default()
    }
}

fn listing_type_from_url(ctx: &Context<'_>, _acc: &Draft) -> Draft {
    let listing_type = if URL_RENT.is_match(ctx.url) {
        Some(ListingType::Rent)
    } else if URL_SALE.is_match(ctx.url) {
        Some(ListingType::Sale)
    } else {
        None
    };

    with_facts(PropertyFacts {
        listing_type,
        ..PropertyFacts::default()
    })
}

fn listing_type_from_title(ctx: &Context<'_>, acc: &Draft) -> Draft {
    if acc.listing_type().is_some() {
        return Draft::default();
    }
    let Some(title) = ctx.title_candidate() else {
        return Draft::default();
    };

    let listing_type = if TITLE_RENT.is_match(&title) {
        Some(ListingType::Rent)
    } else if TITLE_SALE.is_match(&title) {
        Some(ListingType::Sale)
    } else {
        None
    };

    with_facts(PropertyFacts {
        listing_type,
        ..PropertyFacts::default()
    })
}

fn structured_data(ctx: &Context<'_>, acc: &Draft) -> Draft {
    let listing_type = acc.listing_type();
    let mut found = Draft::default();

    for block in ctx.page.structured_data() {
        for ld in LdListing::from_block(&block) {
            let name = ld.name().map(str::to_string);
            let text = format!(
                "{} {}",
                ld.name().unwrap_or_default(),
                ld.description().unwrap_or_default()
            );

            let price = ld
                .offer_price()
                .zip(listing_type)
                .and_then(|(value, lt)| price_facts(lt, value));

            let mut facts = PropertyFacts {
                address: ld.address.clone(),
                bathrooms: ld.bathrooms(),
                ..PropertyFacts::default()
            };
            if let Some(price) = price {
                facts = facts.or(price);
            }

            found = found.or(Draft {
                building: name,
                unit_type: unit_type_from_text(&text),
                facts,
            });
        }
    }

    found
}

fn title_text(ctx: &Context<'_>, _acc: &Draft) -> Draft {
    let Some(title) = ctx.title_candidate() else {
        return Draft::default();
    };

    Draft {
        unit_type: unit_type_from_text(&title),
        building: Some(title),
        facts: PropertyFacts::default(),
    }
}

fn bedrooms_and_maid_room(ctx: &Context<'_>, _acc: &Draft) -> Draft {
    let Some(bedrooms) = BEDROOMS
        .captures(&ctx.full_text)
        .and_then(|caps| caps[1].parse::<u32>().ok())
    else {
        return Draft::default();
    };

    // Only description-like sections: amenity lists elsewhere on the page
    // mention maids for unrelated reasons.
    let sections = ctx.page.section_texts(Section::Description).join(" ");

    if detect_maids_room(&sections, bedrooms) {
        let effective = bedrooms + 1;
        Draft {
            building: None,
            unit_type: Some(UnitType::from_bedrooms(effective)),
            facts: PropertyFacts {
                bedrooms: Some(effective),
                bedrooms_without_maid: Some(bedrooms),
                has_maids_room: Some(true),
                ..PropertyFacts::default()
            },
        }
    } else {
        Draft {
            building: None,
            unit_type: Some(UnitType::from_bedrooms(bedrooms)),
            facts: PropertyFacts {
                bedrooms: Some(bedrooms),
                has_maids_room: Some(false),
                ..PropertyFacts::default()
            },
        }
    }
}

pub(crate) fn detect_maids_room(section_text: &str, bedrooms: u32) -> bool {
    let lower = section_text.to_lowercase();
    let cleaned = strip_maid_service(&lower);

    let with_count = Regex::new(&format!(r"\b{bedrooms}\s*(?:bed|br)\w*.*?\+.*?maid"))
        .map(|re| re.is_match(&cleaned))
        .unwrap_or(false);

    with_count || MAID_ROOM.iter().any(|re| re.is_match(&cleaned))
}

fn bathrooms(ctx: &Context<'_>, acc: &Draft) -> Draft {
    if acc.facts.bathrooms.is_some() {
        return Draft::default();
    }

    let in_sections: Vec<u32> = ctx
        .page
        .section_texts(Section::Details)
        .iter()
        .flat_map(|text| numbers_for(&BATHROOMS, text))
        .collect();

    let bathrooms = most_frequent(&in_sections)
        .or_else(|| numbers_for(&BATHROOMS, &ctx.full_text).last().copied());

    with_facts(PropertyFacts {
        bathrooms,
        ..PropertyFacts::default()
    })
}

fn property_size(ctx: &Context<'_>, _acc: &Draft) -> Draft {
    let Some(caps) = PROPERTY_SIZE.captures(&ctx.full_text) else {
        return Draft::default();
    };
    let Some(value) = parse_amount(&caps[1]) else {
        return Draft::default();
    };
    let unit = caps[2].to_lowercase();

    let sqft = if unit == "sqft" {
        value as f64
    } else {
        (value as f64 * SQM_TO_SQFT).round()
    };

    with_facts(PropertyFacts {
        size: Some(format!("{value} {unit}")),
        size_sqft: u32::try_from(sqft as u64).ok(),
        ..PropertyFacts::default()
    })
}

fn price_from_text(ctx: &Context<'_>, acc: &Draft) -> Draft {
    let Some(listing_type) = acc.awaiting_price() else {
        return Draft::default();
    };
    let patterns = match listing_type {
        ListingType::Rent => &*RENT_PRICE,
        ListingType::Sale => &*SALE_PRICE,
    };

    patterns
        .iter()
        .filter_map(|re| re.captures(&ctx.full_text))
        .filter_map(|caps| parse_amount(&caps[1]))
        .find_map(|value| price_facts(listing_type, value))
        .map(with_facts)
        .unwrap_or_default()
}

fn price_from_meta(ctx: &Context<'_>, acc: &Draft) -> Draft {
    let Some(listing_type) = acc.awaiting_price() else {
        return Draft::default();
    };

    PRICE_META_KEYS
        .iter()
        .find_map(|key| ctx.page.meta(key))
        .and_then(|content| value_to_u64(&serde_json::Value::String(content)))
        .and_then(|value| price_facts(listing_type, value))
        .map(with_facts)
        .unwrap_or_default()
}

fn price_from_nodes(ctx: &Context<'_>, acc: &Draft) -> Draft {
    let Some(listing_type) = acc.awaiting_price() else {
        return Draft::default();
    };

    ctx.page
        .section_texts(Section::Price)
        .iter()
        .filter_map(|text| NODE_PRICE.iter().find_map(|re| re.captures(text)))
        .filter_map(|caps| parse_amount(&caps[1]))
        .find_map(|value| price_facts(listing_type, value))
        .map(with_facts)
        .unwrap_or_default()
}

fn unit_from_meta_description(ctx: &Context<'_>, _acc: &Draft) -> Draft {
    Draft {
        unit_type: ctx
            .page
            .meta("description")
            .and_then(|d| unit_type_from_text(&d)),
        ..Draft::default()
    }
}

fn unit_from_url_text(ctx: &Context<'_>, _acc: &Draft) -> Draft {
    Draft {
        unit_type: unit_type_from_text(ctx.url),
        ..Draft::default()
    }
}

fn reconcile_bedrooms(_ctx: &Context<'_>, acc: &Draft) -> Draft {
    Draft {
        unit_type: acc.facts.bedrooms.map(UnitType::from_bedrooms),
        facts: PropertyFacts {
            bedrooms: acc.unit_type.map(|u| u.bedrooms()),
            ..PropertyFacts::default()
        },
        building: None,
    }
}

/// Price fact for the listing type, if the value is plausible for it.
fn price_facts(listing_type: ListingType, value: u64) -> Option<PropertyFacts> {
    match listing_type {
        ListingType::Rent if RENT_RANGE.contains(&value) => Some(PropertyFacts {
            yearly_rent: Some(value),
            ..PropertyFacts::default()
        }),
        ListingType::Sale if SALE_RANGE.contains(&value) => Some(PropertyFacts {
            purchase_price: Some(value),
            ..PropertyFacts::default()
        }),
        _ => None,
    }
}

fn parse_amount(raw: &str) -> Option<u64> {
    raw.replace(',', "").parse().ok()
}

fn numbers_for(re: &Regex, text: &str) -> Vec<u32> {
    re.captures_iter(text)
        .filter_map(|caps| caps[1].parse().ok())
        .collect()
}

/// Most common value; the one seen first wins a tie.
fn most_frequent(values: &[u32]) -> Option<u32> {
    let mut counts: HashMap<u32, usize> = HashMap::new();
    for v in values {
        *counts.entry(*v).or_default() += 1;
    }

    let mut best: Option<(u32, usize)> = None;
    for v in values {
        let count = counts[v];
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((*v, count));
        }
    }
    best.map(|(v, _)| v)
}
