use thiserror::Error;

/// Failures inside the resolver. None of these escape the dispatcher; they
/// only decide whether the URL-guess fallback runs.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Unsupported domain: {0}")]
    UnsupportedDomain(String),
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Fetch failed: {0}")]
    Fetch(String),
    #[error("HTML parse error: {0}")]
    HtmlParse(String),
}
