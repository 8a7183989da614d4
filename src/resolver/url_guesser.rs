// src/resolver/url_guesser.rs
//
// Last-resort identification from the URL path alone.

use crate::domain::{ResolvedProperty, UnitType};
use crate::resolver::aliases::AliasResolver;
use regex::{Captures, Regex};
use std::sync::LazyLock;
use tracing::debug;
use url::Url;

pub const SOURCE: &str = "url_guess";
pub const ERROR_SOURCE: &str = "url_guess_error";

type Namer = fn(&Captures<'_>) -> String;

static BUILDING_RULES: LazyLock<Vec<(Regex, Namer)>> = LazyLock::new(|| {
    let rules: [(&str, Namer); 4] = [
        (r"palm[-_ ]?views", |_| "Palm Views".into()),
        (r"palm[-_ ]?tower", |_| "Palm Tower".into()),
        (r"seven[-_ ]?palm", |_| "Seven Palm".into()),
        (r"shoreline.*?\b(\d{1,2})\b", |caps| {
            format!("Shoreline Bldg {}", &caps[1])
        }),
    ];
    rules
        .into_iter()
        .map(|(pattern, namer)| (Regex::new(pattern).expect("valid regex"), namer))
        .collect()
});

static NUMERIC_BEDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)(?:bed(?:room)?s?|br|bhk)$").expect("valid regex"));
static BED_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:bed(?:room)?s?|br|bhk)$").expect("valid regex"));

pub struct UrlGuesser<'a> {
    aliases: &'a AliasResolver,
}

impl<'a> UrlGuesser<'a> {
    pub fn new(aliases: &'a AliasResolver) -> Self {
        Self { aliases }
    }

    pub fn guess(&self, url: &str) -> ResolvedProperty {
        let path = match Url::parse(url) {
            Ok(parsed) => parsed.path().to_lowercase(),
            Err(e) => {
                debug!(url, error = %e, "url guess could not parse url");
                return ResolvedProperty::empty(ERROR_SOURCE);
            }
        };

        let tokens = path_tokens(&path);
        let building_name =
            building_from_tokens(&tokens).map(|b| self.aliases.canonical_for(&b));
        let unit_type = unit_from_tokens(&tokens);

        let mut confidence: f64 = 0.4;
        if building_name.is_some() {
            confidence += 0.3;
        }
        if unit_type.is_some() {
            confidence += 0.3;
        }

        ResolvedProperty {
            building_name,
            unit_type,
            confidence: confidence.clamp(0.0, 1.0),
            ..ResolvedProperty::empty(SOURCE)
        }
    }
}

/// Path split on every non-alphanumeric character.
fn path_tokens(path: &str) -> Vec<&str> {
    path.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect()
}

fn building_from_tokens(tokens: &[&str]) -> Option<String> {
    let joined = tokens.join(" ");
    BUILDING_RULES
        .iter()
        .find_map(|(re, namer)| re.captures(&joined).map(|caps| namer(&caps)))
}

/// An explicit bedroom count anywhere in the path beats the `studio`
/// keyword, which also shows up in area and project names.
fn unit_from_tokens(tokens: &[&str]) -> Option<UnitType> {
    let bedrooms = tokens.iter().enumerate().find_map(|(i, token)| {
        if let Some(caps) = NUMERIC_BEDS.captures(token) {
            return caps[1].parse::<u32>().ok();
        }
        let next = tokens.get(i + 1)?;
        if !BED_WORD.is_match(next) {
            return None;
        }
        token.parse::<u32>().ok().or_else(|| spelled_count(token))
    });

    match bedrooms {
        Some(n) => Some(UnitType::from_bedrooms(n)),
        None => tokens
            .iter()
            .any(|t| matches!(*t, "studio" | "studios"))
            .then_some(UnitType::Studio),
    }
}

fn spelled_count(word: &str) -> Option<u32> {
    match word {
        "one" => Some(1),
        "two" => Some(2),
        "three" => Some(3),
        "four" => Some(4),
        _ => None,
    }
}
