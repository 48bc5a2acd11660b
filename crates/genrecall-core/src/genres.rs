use crate::error::ResolveError;
use crate::rate_limit::{Clock, RateLimiter};
use genrecall_models::MovieRecord;
use genrecall_sources::imdb::parse_genres;
use genrecall_sources::DocumentFetcher;
use tracing::{debug, info};

/// Reads the genre list from a matched title's detail page
pub struct GenreExtractor<'a, F: DocumentFetcher> {
    fetcher: &'a F,
}

impl<'a, F: DocumentFetcher> GenreExtractor<'a, F> {
    pub fn new(fetcher: &'a F) -> Self {
        Self { fetcher }
    }

    /// Set `genres`; no network access when they are already known or the record is unmatched
    pub async fn resolve_genres<C: Clock>(
        &self,
        mut record: MovieRecord,
        limiter: &mut RateLimiter<C>,
    ) -> Result<MovieRecord, ResolveError> {
        if record.has_genres() {
            debug!("{}, genres in cache, skipping", record.title);
            return Ok(record);
        }
        let Some(catalog_id) = record.catalog_id.clone() else {
            debug!("{} has no catalog id, skipping genres", record.title);
            return Ok(record);
        };

        record.request_time = Some(limiter.acquire().await);
        info!("Getting genres for {}", record.title);

        let document = self.fetcher.fetch_document(&catalog_id).await?;
        debug!("Parsing genres from {}", document.url);
        let genres = parse_genres(&document.body)?;
        info!("{} genres: {}", record.title, genres.join(", "));
        record.genres = Some(genres);

        Ok(record)
    }
}
