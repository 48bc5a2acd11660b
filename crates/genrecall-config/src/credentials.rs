use std::path::Path;
use tracing::{info, warn};

/// Pre-obtained session cookie for the catalog site
///
/// Loaded once at startup and never written back. A missing or unreadable
/// file yields an empty cookie; requests then go out unauthenticated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionCookie(String);

impl SessionCookie {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            warn!("Cookie file {:?} not found, requests will be unauthenticated", path);
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cookie = Self(Self::decode(&content));
                info!("Cookie loaded");
                cookie
            }
            Err(e) => {
                warn!("Failed to read cookie file {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    /// The file holds either a JSON string or the raw header value
    fn decode(content: &str) -> String {
        let trimmed = content.trim();
        serde_json::from_str::<String>(trimmed).unwrap_or_else(|_| trimmed.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
