use crate::output::Output;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use genrecall_config::PathManager;
use genrecall_core::MovieCache;
use std::fs;

pub fn run_clear(paths: &PathManager, cache: bool, retry_empty_genres: bool, output: &Output) -> Result<()> {
    if cache {
        clear_cache(paths, output)?;
    } else if retry_empty_genres {
        clear_empty_genres(paths, output)?;
    } else {
        output.warn("No clear option specified. Use --cache or --retry-empty-genres");
        output.println("\nExample: genrecall clear --cache");
    }
    Ok(())
}

fn clear_cache(paths: &PathManager, output: &Output) -> Result<()> {
    let cache_file = paths.cache_file();

    if cache_file.exists() {
        fs::remove_file(&cache_file)
            .map_err(|e| eyre!("Failed to remove cache at {}: {}", cache_file.display(), e))?;
        output.success(format!("Cleared cache: {}", cache_file.display()));
    } else {
        output.info("No cache found to clear");
    }
    Ok(())
}

fn clear_empty_genres(paths: &PathManager, output: &Output) -> Result<()> {
    let mut cache = MovieCache::load(&paths.cache_file());
    let cleared = cache
        .clear_empty_genres()
        .map_err(|e| eyre!("Failed to update cache: {}", e))?;

    if cleared == 0 {
        output.info("No titles with empty genre lists");
    } else {
        output.success(format!("{} titles will have their genres fetched again", cleared));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;
    use genrecall_models::MovieRecord;
    use tempfile::TempDir;

    fn paths(dir: &TempDir) -> PathManager {
        PathManager::from_base(dir.path().to_path_buf())
    }

    #[test]
    fn test_clear_cache_removes_file() {
        let dir = TempDir::new().unwrap();
        let paths = paths(&dir);
        fs::create_dir_all(paths.cache_dir()).unwrap();
        let mut cache = MovieCache::empty(&paths.cache_file());
        cache.upsert(MovieRecord::new("Alpha (1990)", 1)).unwrap();
        assert!(paths.cache_file().exists());

        let output = Output::new(OutputFormat::Human, true);
        run_clear(&paths, true, false, &output).unwrap();
        assert!(!paths.cache_file().exists());

        // Clearing again is not an error
        run_clear(&paths, true, false, &output).unwrap();
    }

    #[test]
    fn test_retry_empty_genres_keeps_other_records() {
        let dir = TempDir::new().unwrap();
        let paths = paths(&dir);
        fs::create_dir_all(paths.cache_dir()).unwrap();

        let mut cache = MovieCache::empty(&paths.cache_file());
        let mut empty = MovieRecord::new("Alpha (1990)", 1);
        empty.genres = Some(vec![]);
        let mut known = MovieRecord::new("Beta (1991)", 2);
        known.genres = Some(vec!["Drama".to_string()]);
        cache.upsert(empty).unwrap();
        cache.upsert(known).unwrap();

        let output = Output::new(OutputFormat::Json, true);
        run_clear(&paths, false, true, &output).unwrap();

        let reloaded = MovieCache::load(&paths.cache_file());
        assert_eq!(reloaded.get("Alpha (1990)").unwrap().genres, None);
        assert_eq!(
            reloaded.get("Beta (1991)").unwrap().genres,
            Some(vec!["Drama".to_string()])
        );
    }
}
