use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum TitleListError {
    #[error("title list {path:?} not found")]
    NotFound { path: PathBuf },
    #[error("failed to read title list {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("title list {path:?} is not a JSON array of strings: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Load the ranked list of raw titles, best ranked first
pub fn load_titles(path: &Path) -> Result<Vec<String>, TitleListError> {
    debug!("Loading file at {:?}", path);
    if !path.exists() {
        return Err(TitleListError::NotFound { path: path.to_path_buf() });
    }

    let content = std::fs::read_to_string(path).map_err(|source| TitleListError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let titles: Vec<String> = serde_json::from_str(&content).map_err(|source| TitleListError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    info!("{} titles loaded", titles.len());
    Ok(titles)
}
