use anyhow::{anyhow, Result};
use genrecall_models::MovieRecord;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Title-keyed store of movie records, written through to disk on every change
///
/// The file is one JSON object mapping each raw title to its record. Records
/// keep their insertion order both in memory and on disk.
pub struct MovieCache {
    path: PathBuf,
    records: Vec<MovieRecord>,
    index: HashMap<String, usize>,
}

impl MovieCache {
    /// Empty cache bound to `path`; nothing is written until the first change
    pub fn empty(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            records: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Load the cache file
    ///
    /// A missing file gives an empty cache. An unreadable or corrupt file is
    /// backed up next to the cache file and also gives an empty cache.
    pub fn load(path: &Path) -> Self {
        let mut cache = Self::empty(path);

        if !path.exists() {
            debug!("Cache file {:?} does not exist, starting empty", path);
            return cache;
        }

        let entries = match std::fs::read_to_string(path)
            .map_err(|e| anyhow!(e))
            .and_then(|content| serde_json::from_str::<Map<String, Value>>(&content).map_err(|e| anyhow!(e)))
        {
            Ok(entries) => entries,
            Err(e) => {
                cache.backup_unreadable(&e);
                return cache;
            }
        };

        for (title, value) in entries {
            match serde_json::from_value::<MovieRecord>(value) {
                Ok(mut record) => {
                    record.title = title;
                    cache.insert(record);
                }
                Err(e) => warn!("Dropping unreadable cache entry '{}': {}", title, e),
            }
        }

        info!("{} items loaded from cache", cache.len());
        cache
    }

    fn backup_unreadable(&self, error: &anyhow::Error) {
        let backup_path = self.path.with_extension("json.bak");
        match std::fs::copy(&self.path, &backup_path) {
            Ok(_) => warn!(
                "Cache file unreadable ({}). Backed up to {:?} and starting with an empty cache.",
                error, backup_path
            ),
            Err(backup_err) => warn!(
                "Cache file unreadable ({}) and backup failed: {}. Starting with an empty cache.",
                error, backup_err
            ),
        }
    }

    fn insert(&mut self, record: MovieRecord) {
        match self.index.get(&record.title) {
            Some(&position) => self.records[position] = record,
            None => {
                self.index.insert(record.title.clone(), self.records.len());
                self.records.push(record);
            }
        }
    }

    /// Insert or replace a record, then flush
    pub fn upsert(&mut self, record: MovieRecord) -> Result<()> {
        self.insert(record);
        self.save()
    }

    /// Drop every record and flush the now empty cache
    pub fn reset(&mut self) -> Result<()> {
        info!("Resetting cache");
        self.records.clear();
        self.index.clear();
        self.save()
    }

    /// Write the whole cache: temp file first, then rename over the old one
    pub fn save(&self) -> Result<()> {
        debug!("Saving cache");
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut entries = Map::new();
        for record in &self.records {
            entries.insert(record.title.clone(), serde_json::to_value(record)?);
        }
        let json = serde_json::to_string_pretty(&entries)?;

        let temp_path = self.path.with_extension("json.tmp");
        std::fs::write(&temp_path, json)
            .map_err(|e| anyhow!("Failed to write cache file {:?}: {}", temp_path, e))?;
        std::fs::rename(&temp_path, &self.path)
            .map_err(|e| anyhow!("Failed to replace cache file {:?}: {}", self.path, e))?;
        Ok(())
    }

    pub fn get(&self, title: &str) -> Option<&MovieRecord> {
        self.index.get(title).map(|&position| &self.records[position])
    }

    pub fn records(&self) -> impl Iterator<Item = &MovieRecord> {
        self.records.iter()
    }

    /// Records sorted by rank, for display
    pub fn ranked(&self) -> Vec<&MovieRecord> {
        let mut ranked: Vec<&MovieRecord> = self.records.iter().collect();
        ranked.sort_by_key(|record| record.rank);
        ranked
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Most recent request time recorded by any record
    pub fn latest_request_time(&self) -> Option<i64> {
        self.records.iter().filter_map(|record| record.request_time).max()
    }

    /// Turn empty genre lists back into unresolved ones so the next run retries them
    pub fn clear_empty_genres(&mut self) -> Result<usize> {
        let mut cleared = 0;
        for record in &mut self.records {
            if record.genres.as_ref().map(|g| g.is_empty()).unwrap_or(false) {
                record.genres = None;
                cleared += 1;
            }
        }
        if cleared > 0 {
            self.save()?;
        }
        Ok(cleared)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolved(title: &str, rank: usize) -> MovieRecord {
        let mut record = MovieRecord::new(title, rank);
        record.catalog_id = Some(format!("https://www.imdb.com/title/tt{:07}/", rank));
        record.distance = Some(0);
        record.request_time = Some(1_000 * rank as i64);
        record
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let cache = MovieCache::load(&dir.path().join("info.json"));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_upsert_writes_through() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache").join("info.json");

        let mut cache = MovieCache::empty(&path);
        cache.upsert(resolved("Alpha (1990)", 1)).unwrap();
        cache.upsert(resolved("Beta (1991)", 2)).unwrap();

        let reloaded = MovieCache::load(&path);
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.get("Beta (1991)").unwrap().rank, 2);
        let titles: Vec<&str> = reloaded.records().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Alpha (1990)", "Beta (1991)"]);
    }

    #[test]
    fn test_upsert_replaces_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("info.json");

        let mut cache = MovieCache::empty(&path);
        cache.upsert(resolved("Alpha (1990)", 1)).unwrap();
        cache.upsert(resolved("Beta (1991)", 2)).unwrap();

        let mut alpha = cache.get("Alpha (1990)").unwrap().clone();
        alpha.genres = Some(vec!["Drama".to_string()]);
        cache.upsert(alpha).unwrap();

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.records().next().unwrap().title, "Alpha (1990)");
        assert!(MovieCache::load(&path).get("Alpha (1990)").unwrap().has_genres());
    }

    #[test]
    fn test_corrupt_file_is_backed_up() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("info.json");
        std::fs::write(&path, "{ not json").unwrap();

        let cache = MovieCache::load(&path);
        assert!(cache.is_empty());
        assert_eq!(
            std::fs::read_to_string(dir.path().join("info.json.bak")).unwrap(),
            "{ not json"
        );
    }

    #[test]
    fn test_reset_clears_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("info.json");

        let mut cache = MovieCache::empty(&path);
        cache.upsert(resolved("Alpha (1990)", 1)).unwrap();
        cache.reset().unwrap();

        assert!(cache.is_empty());
        assert!(MovieCache::load(&path).is_empty());
    }

    #[test]
    fn test_latest_request_time() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = MovieCache::empty(&dir.path().join("info.json"));
        assert_eq!(cache.latest_request_time(), None);

        cache.upsert(resolved("Beta (1991)", 2)).unwrap();
        cache.upsert(resolved("Alpha (1990)", 1)).unwrap();
        cache.upsert(MovieRecord::new("Gamma (1992)", 3)).unwrap();
        assert_eq!(cache.latest_request_time(), Some(2_000));
    }

    #[test]
    fn test_clear_empty_genres() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("info.json");
        let mut cache = MovieCache::empty(&path);

        let mut alpha = resolved("Alpha (1990)", 1);
        alpha.genres = Some(Vec::new());
        let mut beta = resolved("Beta (1991)", 2);
        beta.genres = Some(vec!["Drama".to_string()]);
        cache.upsert(alpha).unwrap();
        cache.upsert(beta).unwrap();

        assert_eq!(cache.clear_empty_genres().unwrap(), 1);
        let reloaded = MovieCache::load(&path);
        assert!(!reloaded.get("Alpha (1990)").unwrap().has_genres());
        assert!(reloaded.get("Beta (1991)").unwrap().has_genres());
    }
}
