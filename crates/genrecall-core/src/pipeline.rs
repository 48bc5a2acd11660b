use crate::cache::MovieCache;
use crate::error::ResolveError;
use crate::genres::GenreExtractor;
use crate::matching::CandidateMatcher;
use crate::normalize::normalize;
use crate::rate_limit::{Clock, RateLimiter};
use genrecall_config::Config;
use genrecall_models::MovieRecord;
use genrecall_sources::DocumentFetcher;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{error, info, warn};

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub base_url: String,
    pub section_label: String,
    pub min_interval: Duration,
}

impl PipelineSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            base_url: config.catalog.base_url.trim_end_matches('/').to_string(),
            section_label: config.catalog.section_label.clone(),
            min_interval: Duration::from_millis(config.rate_limit.min_interval_ms),
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// What one run did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub processed: usize,
    /// Titles that were already fully resolved before the run
    pub cache_hits: usize,
    pub ids_resolved: usize,
    pub genres_resolved: usize,
    /// Titles matched during this run with a non-zero distance
    pub mismatches: usize,
    pub failures: usize,
}

/// First `count` titles of the ranked list, all of them by default
pub fn select_titles(titles: &[String], count: Option<usize>) -> Result<&[String], ResolveError> {
    match count {
        None => Ok(titles),
        Some(0) => Err(ResolveError::Configuration(
            "title count must be at least 1".to_string(),
        )),
        Some(count) if count > titles.len() => Err(ResolveError::Configuration(format!(
            "requested {} titles but only {} are loaded",
            count,
            titles.len()
        ))),
        Some(count) => Ok(&titles[..count]),
    }
}

/// Drives normalization, matching and genre extraction over a ranked title list
///
/// Requests go out one at a time, spaced by the rate limiter. The cache is
/// flushed after every step that changed a record, so an interrupted run
/// resumes where it stopped.
pub struct Pipeline<F: DocumentFetcher, C: Clock> {
    fetcher: F,
    cache: MovieCache,
    limiter: RateLimiter<C>,
    settings: PipelineSettings,
    last_summary: RunSummary,
}

impl<F: DocumentFetcher, C: Clock> Pipeline<F, C> {
    pub fn new(fetcher: F, clock: C, cache: MovieCache, settings: PipelineSettings) -> Self {
        let mut limiter = RateLimiter::new(clock, settings.min_interval);
        if let Some(latest) = cache.latest_request_time() {
            limiter.observe(latest);
        }
        Self {
            fetcher,
            cache,
            limiter,
            settings,
            last_summary: RunSummary::default(),
        }
    }

    pub fn cache(&self) -> &MovieCache {
        &self.cache
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn last_summary(&self) -> &RunSummary {
        &self.last_summary
    }

    /// Resolve every title not yet resolved and return the whole cache
    ///
    /// Safe to call repeatedly: fully resolved records cause no network access.
    pub async fn ensure_resolved(&mut self, titles: &[String], reset: bool) -> Result<&MovieCache, ResolveError> {
        if reset {
            self.cache.reset()?;
        }
        self.last_summary = self.run(titles).await?;
        Ok(&self.cache)
    }

    /// Run every title in rank order; per-title failures are logged and skipped
    pub async fn run(&mut self, titles: &[String]) -> Result<RunSummary, ResolveError> {
        let mut summary = RunSummary::default();
        let mut seen = HashSet::new();
        let width = titles.len().to_string().len();

        for (index, title) in titles.iter().enumerate() {
            let rank = index + 1;
            let progress = format!("[{:0width$}/{}]", rank, titles.len(), width = width);
            info!("{} Processing {}", progress, title);

            if !seen.insert(title.as_str()) {
                warn!("Duplicate title '{}' at rank {}, skipping", title, rank);
                continue;
            }
            summary.processed += 1;
            self.process(title, rank, &mut summary).await?;
        }

        info!(
            processed = summary.processed,
            cache_hits = summary.cache_hits,
            ids_resolved = summary.ids_resolved,
            genres_resolved = summary.genres_resolved,
            mismatches = summary.mismatches,
            failures = summary.failures,
            "Done !"
        );
        Ok(summary)
    }

    /// Only cache flush failures escape; everything else is counted and logged
    async fn process(&mut self, title: &str, rank: usize, summary: &mut RunSummary) -> Result<(), ResolveError> {
        let cached = self.cache.get(title).cloned();
        let initial = match &cached {
            Some(cached) => {
                let mut record = cached.clone();
                record.rank = rank;
                record
            }
            None => MovieRecord::new(title, rank),
        };

        let mut record = match normalize(initial) {
            Ok(record) => record,
            Err(e) => {
                error!("[{}, normalize] Got error: {}", title, e);
                summary.failures += 1;
                return Ok(());
            }
        };
        // A reordered title list only moves the rank
        if cached.as_ref() != Some(&record) {
            self.cache.upsert(record.clone())?;
        }

        if record.is_fully_resolved() {
            summary.cache_hits += 1;
            return Ok(());
        }

        if !record.is_matched() {
            let matcher = CandidateMatcher::new(&self.fetcher, &self.settings.base_url, &self.settings.section_label);
            match matcher.resolve(record.clone(), &mut self.limiter).await {
                Ok(matched) => {
                    record = matched;
                    summary.ids_resolved += 1;
                    if record.is_mismatch() {
                        summary.mismatches += 1;
                    }
                    self.cache.upsert(record.clone())?;
                }
                Err(e) => {
                    error!("[{}, catalog id] Got error: {}", title, e);
                    summary.failures += 1;
                    self.record_attempt(record)?;
                    return Ok(());
                }
            }
        }

        let extractor = GenreExtractor::new(&self.fetcher);
        match extractor.resolve_genres(record.clone(), &mut self.limiter).await {
            Ok(with_genres) => {
                if with_genres != record {
                    summary.genres_resolved += 1;
                    self.cache.upsert(with_genres)?;
                }
            }
            Err(e) => {
                error!("[{}, genres] Got error: {}", title, e);
                summary.failures += 1;
                record.genres = Some(Vec::new());
                self.record_attempt(record)?;
            }
        }

        Ok(())
    }

    /// Keep the request time of a failed step so the spacing survives a restart
    fn record_attempt(&mut self, mut record: MovieRecord) -> Result<(), ResolveError> {
        if let Some(last) = self.limiter.last_request() {
            if record.request_time.map(|t| t < last).unwrap_or(true) {
                record.request_time = Some(last);
            }
        }
        self.cache.upsert(record)?;
        Ok(())
    }
}
