// fetcher.rs
use crate::resolver::page::{HtmlPage, PageSnapshot};
use crate::resolver::ResolveError;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, USER_AGENT as USER_AGENT_HEADER};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Anything that can turn a listing URL into a page snapshot.
pub trait PageSource: Send + Sync {
    fn fetch(&self, url: &str) -> Result<Box<dyn PageSnapshot>, ResolveError>;
}

pub struct HttpPageSource {
    client: Client,
}

impl HttpPageSource {
    pub fn new(timeout: Duration) -> Result<Self, ResolveError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| ResolveError::Fetch(e.to_string()))?;

        Ok(Self { client })
    }

    pub fn fetch_html(&self, url: &str) -> Result<String, ResolveError> {
        let start = Instant::now();

        let resp = self
            .client
            .get(url)
            .header(USER_AGENT_HEADER, USER_AGENT)
            .header(ACCEPT, "text/html")
            .send()
            .map_err(|e| ResolveError::Fetch(e.to_string()))?;

        let status = resp.status();

        let text = resp
            .text()
            .map_err(|e| ResolveError::Fetch(e.to_string()))?;

        // Blocked or missing pages still get parsed; the URL-guess fallback
        // covers whatever the body lacks.
        if !status.is_success() {
            warn!(url, %status, "non-success status fetching listing page");
        }

        debug!(url, bytes = text.len(), elapsed = ?start.elapsed(), "fetched listing page");
        Ok(text)
    }
}

impl PageSource for HttpPageSource {
    fn fetch(&self, url: &str) -> Result<Box<dyn PageSnapshot>, ResolveError> {
        let html = self.fetch_html(url)?;
        Ok(Box::new(HtmlPage::parse(&html)))
    }
}
