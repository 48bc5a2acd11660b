pub mod clear;
pub mod list;
pub mod resolve;

use genrecall_config::PathManager;
use std::path::PathBuf;

/// Default paths, with the data directory moved when `--cache-dir` is given
pub fn path_manager(cache_dir: Option<PathBuf>) -> PathManager {
    let paths = PathManager::default();
    match cache_dir {
        Some(dir) => paths.with_data_dir(dir),
        None => paths,
    }
}
