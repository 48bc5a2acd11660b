use crate::output::{Output, OutputFormat};
use color_eyre::eyre::{eyre, Context};
use color_eyre::Result;
use genrecall_config::{load_titles, Config, PathManager, SessionCookie};
use genrecall_core::{select_titles, MovieCache, Pipeline, PipelineSettings, RunSummary, SystemClock};
use genrecall_sources::ImdbClient;
use serde_json::json;

pub async fn run_resolve(paths: &PathManager, count: Option<usize>, reset: bool, output: &Output) -> Result<()> {
    tracing::debug!("Resolve command started");

    let config_file = paths.config_file();
    let config = Config::load_or_default(&config_file)
        .map_err(|e| eyre!("Failed to load config from {}: {}", config_file.display(), e))?;
    config
        .validate()
        .map_err(|e| eyre!("Configuration validation failed: {}", e))?;

    let all_titles = load_titles(&paths.titles_file()).wrap_err("Failed to load the title list")?;
    let titles = select_titles(&all_titles, count).map_err(|e| eyre!("{}", e))?;

    paths
        .ensure_directories()
        .map_err(|e| eyre!("Failed to create data directories: {}", e))?;
    let cookie = SessionCookie::load(&paths.cookie_file());
    let client = ImdbClient::new(&config.catalog, &cookie).map_err(|e| eyre!("{}", e))?;

    // Loading is pointless when the cache is about to be reset
    let cache = if reset {
        MovieCache::empty(&paths.cache_file())
    } else {
        MovieCache::load(&paths.cache_file())
    };

    let mut pipeline = Pipeline::new(client, SystemClock, cache, PipelineSettings::from_config(&config));
    let cache = pipeline
        .ensure_resolved(titles, reset)
        .await
        .map_err(|e| eyre!("Resolution aborted: {}", e))?;
    let total = cache.len();
    let summary = pipeline.last_summary().clone();

    report(&summary, total, output);
    Ok(())
}

fn report(summary: &RunSummary, cached: usize, output: &Output) {
    match output.format() {
        OutputFormat::Human => {
            output.success(format!(
                "Processed {} titles: {} ids and {} genre lists resolved, {} already complete",
                summary.processed, summary.ids_resolved, summary.genres_resolved, summary.cache_hits
            ));
            if summary.mismatches > 0 {
                output.warn(format!(
                    "{} titles matched inexactly, check them with `genrecall list`",
                    summary.mismatches
                ));
            }
            if summary.failures > 0 {
                output.error(format!(
                    "{} steps failed, run again later to retry them",
                    summary.failures
                ));
            }
            output.info(format!("{} titles in cache", cached));
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            output.json(&json!({
                "type": "summary",
                "processed": summary.processed,
                "cache_hits": summary.cache_hits,
                "ids_resolved": summary.ids_resolved,
                "genres_resolved": summary.genres_resolved,
                "mismatches": summary.mismatches,
                "failures": summary.failures,
                "cached": cached,
            }));
        }
    }
}
