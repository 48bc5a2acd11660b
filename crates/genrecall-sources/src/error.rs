use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    /// Transport failure: DNS, connect, TLS, timeout, body read
    #[error("request to {url} failed: {message}")]
    Fetch { url: String, message: String },

    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("failed to parse {context}: {message}")]
    Parse { context: String, message: String },

    /// The page layout did not contain exactly one expected section
    #[error("found {found} '{section}' sections, expected exactly one")]
    SectionCount { section: String, found: usize },
}

impl SourceError {
    pub fn parse(context: impl Into<String>, message: impl ToString) -> Self {
        Self::Parse {
            context: context.into(),
            message: message.to_string(),
        }
    }
}
