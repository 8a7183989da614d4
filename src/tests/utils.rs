use crate::config::EngineConfig;
use crate::dataset::DatasetStore;
use crate::engine::Engine;
use crate::errors::ServerError;
use crate::resolver::page::{HtmlPage, PageSnapshot};
use crate::resolver::{AliasResolver, PageSource, ResolveError};
use crate::responses::ResultResp;
use astra::{Body, Request, Response};
use http::Method;
use std::io::Read;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

/// Seven Palm Jumeirah covers the sample-size scenarios: three 1BR rows at
/// 300/310/365 days and a single 2BR row at 280 days.
pub const SCENARIO_CSV: &str = "\
airbnb_id,airbnb_url,building,unit_type,revenue,occupancy,adr,days_available
1,,Seven Palm Jumeirah,1BR,98000,0.72,520,300
2,,Seven Palm Jumeirah,1BR,104000,0.75,540,310
3,,Seven Palm Jumeirah,1BR,135000,0.78,560,365
4,,Seven Palm Jumeirah,2BR,210000,0.70,900,280
5,,Palm Views East,2BR,180000,0.71,700,365
6,,Palm Views East,2BR,150000,0.66,690,320
7,,Palm Views East,Studio,80000,0.74,300,365
8,,Palm Tower,Studio,95000,0.80,330,365
9,,Palm Tower,Studio,101000,0.82,340,350
";

/// Listing page for a 2 bed + maid unit in Seven Palm.
pub const SEVEN_PALM_MAID_PAGE: &str = r#"<html><head><title>Seven Palm | Property Finder</title></head>
    <body>
      <div class="property-details">Bedrooms 2 Bathrooms 3</div>
      <div class="property-description">Stunning 2 Bed + Maid with sea view</div>
    </body></html>"#;

/// Every fetch fails, so resolution falls back to the URL guess.
pub struct OfflinePages;

impl PageSource for OfflinePages {
    fn fetch(&self, url: &str) -> Result<Box<dyn PageSnapshot>, ResolveError> {
        Err(ResolveError::Fetch(format!("offline: {url}")))
    }
}

/// Serves the same HTML for every URL.
pub struct StaticPages(pub &'static str);

impl PageSource for StaticPages {
    fn fetch(&self, _url: &str) -> Result<Box<dyn PageSnapshot>, ResolveError> {
        Ok(Box::new(HtmlPage::parse(self.0)))
    }
}

pub fn temp_path(tag: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("str_economics_{tag}_{nanos}.csv"))
}

/// Defaults with the correction stage off so figures stay raw.
pub fn test_config() -> EngineConfig {
    EngineConfig {
        correction_enabled: false,
        ..EngineConfig::default()
    }
}

/// Engine over `csv` written to a fresh temp file. The caller removes the
/// returned path when done.
pub fn engine_with(csv: &str, pages: Box<dyn PageSource>) -> (Engine, PathBuf) {
    engine_with_config(csv, pages, test_config())
}

pub fn engine_with_config(
    csv: &str,
    pages: Box<dyn PageSource>,
    config: EngineConfig,
) -> (Engine, PathBuf) {
    let path = temp_path("engine");
    std::fs::write(&path, csv).unwrap_or_else(|e| panic!("writing fixture failed: {e}"));

    let store = DatasetStore::open(&path);
    let engine = Engine::new(config, store, AliasResolver::empty(), pages);
    (engine, path)
}

pub fn get(uri: &str) -> Request {
    let mut req = Request::new(Body::empty());
    *req.method_mut() = Method::GET;
    *req.uri_mut() = uri.parse().unwrap();
    req
}

pub fn post_json(uri: &str, body: &str) -> Request {
    let mut req = Request::new(Body::from(body.to_string()));
    *req.method_mut() = Method::POST;
    *req.uri_mut() = uri.parse().unwrap();
    req
}

pub fn body_json(resp: Response) -> serde_json::Value {
    let mut buf = Vec::new();
    resp.into_body()
        .reader()
        .read_to_end(&mut buf)
        .unwrap_or_else(|e| panic!("reading body failed: {e}"));
    serde_json::from_slice(&buf).unwrap_or_else(|e| panic!("body is not JSON: {e}"))
}

/// The error from a handler call that should have failed.
pub fn expect_err(result: ResultResp) -> ServerError {
    match result {
        Ok(resp) => panic!("expected an error, got status {}", resp.status()),
        Err(err) => err,
    }
}
