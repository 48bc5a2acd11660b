use crate::error::SourceError;
use crate::traits::{DocumentFetcher, FetchedDocument};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use genrecall_config::{CatalogConfig, SessionCookie};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE, COOKIE};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

/// HTTP access to the catalog site
///
/// Every request carries the session cookie (when there is one) and an
/// English `Accept-Language` so titles come back untranslated.
#[derive(Clone)]
pub struct ImdbClient {
    client: Client,
}

impl ImdbClient {
    pub fn new(catalog: &CatalogConfig, cookie: &SessionCookie) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_str(&catalog.accept_language)
                .map_err(|e| anyhow!("Invalid Accept-Language '{}': {}", catalog.accept_language, e))?,
        );

        if cookie.is_empty() {
            warn!("No session cookie, fetching unauthenticated");
        } else {
            let mut value = HeaderValue::from_str(cookie.as_str())
                .map_err(|e| anyhow!("Session cookie is not a valid header value: {}", e))?;
            value.set_sensitive(true);
            headers.insert(COOKIE, value);
        }

        let client = Client::builder()
            .user_agent(catalog.user_agent.clone())
            .default_headers(headers)
            .timeout(Duration::from_secs(catalog.request_timeout_secs))
            .build()
            .map_err(|e| anyhow!("Failed to build HTTP client: {}", e))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl DocumentFetcher for ImdbClient {
    async fn fetch_document(&self, url: &str) -> Result<FetchedDocument, SourceError> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SourceError::Fetch {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| SourceError::Fetch {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        debug!("Fetched {} ({} bytes)", url, body.len());

        Ok(FetchedDocument::new(url, body))
    }
}
