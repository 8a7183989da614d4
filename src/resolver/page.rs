// src/resolver/page.rs
//
// Read-only view over an already-fetched listing page.

use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use tracing::debug;

/// Families of page regions the extractor asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    /// Property description / details blocks. Used for maid's-room checks.
    Description,
    /// Broader property/feature/detail blocks. Used for bathroom counts.
    Details,
    /// Price-styled elements.
    Price,
}

impl Section {
    fn selector(&self) -> &'static str {
        match self {
            Section::Description => {
                r#"[class*="property-description"], [class*="property-detail"], [class*="PropertyDetail"], [data-testid*="description"], main, [role="main"]"#
            }
            Section::Details => {
                r#"[class*="property"], [class*="feature"], [class*="detail"], main, [role="main"]"#
            }
            Section::Price => r#"[class*="price"], [class*="amount"], [data-testid*="price"]"#,
        }
    }
}

pub trait PageSnapshot {
    /// Every embedded JSON-LD block that parsed. Malformed blocks are omitted.
    fn structured_data(&self) -> Vec<Value>;

    /// `content` of the first `<meta property=key>` or `<meta name=key>`.
    fn meta(&self, key: &str) -> Option<String>;

    fn title(&self) -> Option<String>;

    /// Visible text of each element matching the section family, in
    /// document order.
    fn section_texts(&self, section: Section) -> Vec<String>;

    /// Visible text of the whole document.
    fn full_text(&self) -> String;
}

pub struct HtmlPage {
    document: Html,
}

impl HtmlPage {
    pub fn parse(body: &str) -> Self {
        Self {
            document: Html::parse_document(body),
        }
    }

    fn select(&self, css: &str) -> Vec<ElementRef<'_>> {
        match Selector::parse(css) {
            Ok(selector) => self.document.select(&selector).collect(),
            Err(e) => {
                debug!(css, error = %e, "skipping invalid selector");
                Vec::new()
            }
        }
    }
}

impl PageSnapshot for HtmlPage {
    fn structured_data(&self) -> Vec<Value> {
        self.select(r#"script[type="application/ld+json"]"#)
            .into_iter()
            .filter_map(|node| {
                let raw: String = node.text().collect();
                match serde_json::from_str::<Value>(raw.trim()) {
                    Ok(value) => Some(value),
                    Err(e) => {
                        debug!(error = %e, "skipping malformed JSON-LD block");
                        None
                    }
                }
            })
            .collect()
    }

    fn meta(&self, key: &str) -> Option<String> {
        let css = format!(r#"meta[property="{key}"], meta[name="{key}"]"#);
        self.select(&css)
            .into_iter()
            .find_map(|node| node.value().attr("content").map(str::to_string))
    }

    fn title(&self) -> Option<String> {
        self.select("title")
            .into_iter()
            .next()
            .map(|node| node.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty())
    }

    fn section_texts(&self, section: Section) -> Vec<String> {
        self.select(section.selector())
            .into_iter()
            .map(visible_text)
            .collect()
    }

    fn full_text(&self) -> String {
        visible_text(self.document.root_element())
    }
}

/// Text nodes under `root`, skipping script/style content, joined by spaces.
fn visible_text(root: ElementRef<'_>) -> String {
    let mut parts = Vec::new();

    for node in root.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node
            .parent()
            .and_then(|p| p.value().as_element().map(|e| e.name()))
            .is_some_and(|name| matches!(name, "script" | "style" | "noscript"));
        let trimmed = text.trim();
        if !hidden && !trimmed.is_empty() {
            parts.push(trimmed);
        }
    }

    parts.join(" ")
}
