use anyhow::Result;
use std::path::PathBuf;

/// Get the container base path from environment variable, defaulting to "/app"
pub fn container_base_path() -> PathBuf {
    std::env::var("GENRECALL_BASE_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/app"))
}

pub struct PathManager {
    config_dir: PathBuf,
    data_dir: PathBuf,
    log_dir: PathBuf,
}

impl PathManager {
    pub fn new() -> Result<Self> {
        let base_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
            .join("genrecall");

        Ok(Self::from_base(base_dir))
    }

    pub fn from_docker_env() -> Self {
        Self::from_base(container_base_path())
    }

    /// Config at the base level, cached data and logs in subdirectories
    pub fn from_base(base: PathBuf) -> Self {
        Self {
            config_dir: base.clone(),
            data_dir: base.join("data"),
            log_dir: base.join("logs"),
        }
    }

    /// Point the data directory somewhere else (the `--cache-dir` flag)
    pub fn with_data_dir(mut self, data_dir: PathBuf) -> Self {
        self.data_dir = data_dir;
        self
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.data_dir.join("cache")
    }

    /// Resolved records, title -> record
    pub fn cache_file(&self) -> PathBuf {
        self.cache_dir().join("info.json")
    }

    /// Ranked list of raw titles
    pub fn titles_file(&self) -> PathBuf {
        self.cache_dir().join("titles.json")
    }

    /// Pre-obtained session cookie for the catalog site
    pub fn cookie_file(&self) -> PathBuf {
        self.cache_dir().join("cookie")
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    pub fn log_file(&self) -> PathBuf {
        self.log_dir.join("genrecall.log")
    }

    pub fn ensure_directories(&self) -> Result<()> {
        std::fs::create_dir_all(&self.config_dir)?;
        std::fs::create_dir_all(&self.data_dir)?;
        std::fs::create_dir_all(&self.log_dir)?;
        std::fs::create_dir_all(self.cache_dir())?;
        Ok(())
    }
}

impl Default for PathManager {
    fn default() -> Self {
        // The container base directory only exists inside the image
        let base = container_base_path();
        if base.exists() {
            return Self::from_docker_env();
        }

        Self::new().unwrap_or_else(|_| Self::from_docker_env())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_under_base() {
        let paths = PathManager::from_base(PathBuf::from("/tmp/genrecall"));
        assert_eq!(paths.config_file(), PathBuf::from("/tmp/genrecall/config.toml"));
        assert_eq!(paths.cache_file(), PathBuf::from("/tmp/genrecall/data/cache/info.json"));
        assert_eq!(paths.titles_file(), PathBuf::from("/tmp/genrecall/data/cache/titles.json"));
        assert_eq!(paths.cookie_file(), PathBuf::from("/tmp/genrecall/data/cache/cookie"));
    }

    #[test]
    fn test_with_data_dir_moves_cache_only() {
        let paths = PathManager::from_base(PathBuf::from("/tmp/genrecall"))
            .with_data_dir(PathBuf::from("/srv/movies"));
        assert_eq!(paths.cache_file(), PathBuf::from("/srv/movies/cache/info.json"));
        assert_eq!(paths.config_file(), PathBuf::from("/tmp/genrecall/config.toml"));
        assert_eq!(paths.log_file(), PathBuf::from("/tmp/genrecall/logs/genrecall.log"));
    }

    #[test]
    fn test_ensure_directories_creates_cache_dir() {
        let base = tempfile::TempDir::new().unwrap();
        let paths = PathManager::from_base(base.path().to_path_buf());
        paths.ensure_directories().unwrap();
        assert!(paths.cache_dir().is_dir());
        assert!(base.path().join("logs").is_dir());
    }
}
