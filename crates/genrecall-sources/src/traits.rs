use async_trait::async_trait;
use crate::error::SourceError;

/// A fetched page, ready to be handed to the parser
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedDocument {
    pub url: String,
    pub body: String,
}

impl FetchedDocument {
    pub fn new(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            body: body.into(),
        }
    }
}

/// One GET against the catalog site
///
/// Implementations own transport concerns (session cookie, headers, timeouts).
/// Callers are responsible for rate limiting.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    async fn fetch_document(&self, url: &str) -> Result<FetchedDocument, SourceError>;
}
