use genrecall_sources::SourceError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolveError {
    /// Bad run parameters, detected before any network activity
    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("malformed title '{title}': no parenthesized year")]
    MalformedTitle { title: String },

    #[error("no search result from {year} for '{title}'")]
    NoCandidate { title: String, year: String },

    /// Fetch, HTTP status, parse and section count failures
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("cache error: {0}")]
    Cache(#[from] anyhow::Error),
}

impl ResolveError {
    pub fn is_section_count(&self) -> bool {
        matches!(self, Self::Source(SourceError::SectionCount { .. }))
    }
}
