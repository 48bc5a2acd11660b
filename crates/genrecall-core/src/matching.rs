use crate::diff::word_diff_length;
use crate::error::ResolveError;
use crate::rate_limit::{Clock, RateLimiter};
use genrecall_models::MovieRecord;
use genrecall_sources::imdb::{canonical_title_url, parse_search_results, search_url, SearchResult};
use genrecall_sources::DocumentFetcher;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;
use tracing::{debug, info, warn};

static PAREN_GROUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\(([^)]*)\)").expect("parenthesized group pattern is valid")
});

/// A search result that passed the year filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub short_title: String,
    pub found_title: String,
    pub href: String,
    /// Annotations following the year, e.g. `TV Movie` or `Video`
    pub flags: BTreeSet<String>,
    pub distance: usize,
}

/// Annotations after `short_title` in `found_title`, or `None` if `year` never shows up
///
/// Groups are scanned left to right. A group only becomes a flag when the
/// year group has already been passed, so the year itself and anything
/// before it are left out.
pub fn scan_flags(found_title: &str, short_title: &str, year: &str) -> Option<BTreeSet<String>> {
    let rest = found_title
        .strip_prefix(short_title)
        .or_else(|| found_title.strip_prefix(short_title.trim()))
        .or_else(|| found_title.get(short_title.len()..))
        .unwrap_or("");
    debug!("Scanning annotations in '{}'", rest);

    let mut flags = BTreeSet::new();
    let mut year_found = false;
    for group in PAREN_GROUP.captures_iter(rest) {
        let content = &group[1];
        if year_found {
            flags.insert(content.to_string());
        }
        if content == year {
            year_found = true;
        }
    }

    year_found.then_some(flags)
}

/// `|query flags Δ candidate flags|` plus the word diff length of the short titles
pub fn match_distance(
    query_short_title: &str,
    query_flags: &BTreeSet<String>,
    candidate_short_title: &str,
    candidate_flags: &BTreeSet<String>,
) -> usize {
    let flag_asymmetry = query_flags.symmetric_difference(candidate_flags).count();
    flag_asymmetry + word_diff_length(query_short_title, candidate_short_title)
}

impl Candidate {
    /// Keep a search result only if it is from `year`
    pub fn from_result(result: SearchResult, year: &str) -> Option<Self> {
        let flags = scan_flags(&result.found_title, &result.short_title, year)?;
        Some(Self {
            short_title: result.short_title,
            found_title: result.found_title,
            href: result.href,
            flags,
            distance: 0,
        })
    }

    pub fn scored(mut self, query_short_title: &str, query_flags: &BTreeSet<String>) -> Self {
        self.distance = match_distance(query_short_title, query_flags, &self.short_title, &self.flags);
        self
    }
}

/// Lowest distance wins; on a tie the earlier candidate is kept
pub fn select_best(candidates: impl IntoIterator<Item = Candidate>) -> Option<Candidate> {
    candidates.into_iter().fold(None, |best, candidate| match best {
        Some(best) if best.distance <= candidate.distance => Some(best),
        _ => Some(candidate),
    })
}

/// Finds the catalog entry for a ranked title through the site search
pub struct CandidateMatcher<'a, F: DocumentFetcher> {
    fetcher: &'a F,
    base_url: &'a str,
    section_label: &'a str,
}

impl<'a, F: DocumentFetcher> CandidateMatcher<'a, F> {
    pub fn new(fetcher: &'a F, base_url: &'a str, section_label: &'a str) -> Self {
        Self {
            fetcher,
            base_url,
            section_label,
        }
    }

    /// Score every same-year search result against the record and keep the closest
    pub fn pick(&self, record: &MovieRecord, results: Vec<SearchResult>) -> Result<Candidate, ResolveError> {
        let (short_title, year) = match (&record.short_title, &record.year) {
            (Some(short_title), Some(year)) => (short_title.as_str(), year.as_str()),
            _ => {
                return Err(ResolveError::MalformedTitle {
                    title: record.title.clone(),
                })
            }
        };

        let total = results.len();
        let eligible: Vec<Candidate> = results
            .into_iter()
            .filter_map(|result| Candidate::from_result(result, year))
            .collect();
        debug!("{} of {} results from {} for {}", eligible.len(), total, year, record.title);

        // The query never carries annotations, so every candidate flag counts against it
        let query_flags = BTreeSet::new();
        select_best(
            eligible
                .into_iter()
                .map(|candidate| candidate.scored(short_title, &query_flags)),
        )
        .ok_or_else(|| ResolveError::NoCandidate {
            title: record.title.clone(),
            year: year.to_string(),
        })
    }

    /// Set `found_title`, `catalog_id` and `distance`; no network access when already matched
    pub async fn resolve<C: Clock>(
        &self,
        mut record: MovieRecord,
        limiter: &mut RateLimiter<C>,
    ) -> Result<MovieRecord, ResolveError> {
        if record.is_matched() {
            debug!("{} in cache, skipping", record.title);
            return Ok(record);
        }

        let url = search_url(self.base_url, &record.title)?;
        record.request_time = Some(limiter.acquire().await);
        info!("Getting catalog id for {}", record.title);

        let document = self.fetcher.fetch_document(&url).await?;
        debug!("Parsing search results from {}", document.url);
        let results = parse_search_results(&document.body, self.section_label)?;
        let best = self.pick(&record, results)?;

        record.catalog_id = Some(canonical_title_url(self.base_url, &best.href)?);
        record.distance = Some(best.distance);
        if best.distance > 0 {
            warn!(
                expected = %record.title,
                found = %best.found_title,
                distance = best.distance,
                "Got {} but expected {} (diff {})",
                best.found_title,
                record.title,
                best.distance
            );
        } else {
            info!("Got {}", best.found_title);
        }
        record.found_title = Some(best.found_title);

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rate_limit::ManualClock;
    use async_trait::async_trait;
    use genrecall_sources::{FetchedDocument, SourceError};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn result(short_title: &str, found_title: &str, href: &str) -> SearchResult {
        SearchResult {
            short_title: short_title.to_string(),
            found_title: found_title.to_string(),
            href: href.to_string(),
        }
    }

    fn record(title: &str) -> MovieRecord {
        crate::normalize::normalize(MovieRecord::new(title, 1)).unwrap()
    }

    struct PageFetcher {
        body: String,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl DocumentFetcher for PageFetcher {
        async fn fetch_document(&self, url: &str) -> Result<FetchedDocument, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(FetchedDocument::new(url, self.body.clone()))
        }
    }

    #[test]
    fn test_scan_flags_after_year() {
        let flags = scan_flags("Jean de Florette (1986) (France) (Director's cut)", "Jean de Florette", "1986");
        assert_eq!(
            flags,
            Some(BTreeSet::from(["Director's cut".to_string(), "France".to_string()]))
        );
    }

    #[test]
    fn test_scan_flags_ignores_groups_before_year() {
        let flags = scan_flags("Alpha (I) (1990) (TV Movie)", "Alpha", "1990");
        assert_eq!(flags, Some(BTreeSet::from(["TV Movie".to_string()])));
    }

    #[test]
    fn test_scan_flags_other_year() {
        assert_eq!(scan_flags("Alpha (1991)", "Alpha", "1990"), None);
        assert_eq!(scan_flags("Alpha", "Alpha", "1990"), None);
    }

    #[test]
    fn test_identical_candidate_scores_zero() {
        let flags = BTreeSet::new();
        assert_eq!(match_distance("Inception", &flags, "Inception", &flags), 0);
    }

    #[test]
    fn test_candidate_flags_add_to_distance() {
        let none = BTreeSet::new();
        let video = BTreeSet::from(["Video".to_string()]);
        assert_eq!(match_distance("Inception", &none, "Inception", &video), 1);
        assert_eq!(match_distance("Inception", &video, "Inception", &video), 0);
    }

    #[test]
    fn test_year_filter_keeps_one_of_three() {
        let results = vec![
            result("Alpha", "Alpha (1989)", "/title/tt1/"),
            result("Alpha", "Alpha (1990)", "/title/tt2/"),
            result("Alpha Returns", "Alpha Returns (2004)", "/title/tt3/"),
        ];

        let eligible: Vec<Candidate> = results
            .into_iter()
            .filter_map(|r| Candidate::from_result(r, "1990"))
            .collect();
        assert_eq!(eligible.len(), 1);
        assert_eq!(eligible[0].href, "/title/tt2/");
    }

    #[test]
    fn test_tie_keeps_first_candidate() {
        let fetcher = PageFetcher { body: String::new(), calls: AtomicUsize::new(0) };
        let matcher = CandidateMatcher::new(&fetcher, "https://www.imdb.com", "Titles");
        let results = vec![
            result("Alpha", "Alpha (1990)", "/title/tt1/"),
            result("Alpha", "Alpha (1990)", "/title/tt2/"),
        ];

        let best = matcher.pick(&record("Alpha (1990)"), results).unwrap();
        assert_eq!(best.href, "/title/tt1/");
        assert_eq!(best.distance, 0);
    }

    #[test]
    fn test_closer_later_candidate_wins() {
        let fetcher = PageFetcher { body: String::new(), calls: AtomicUsize::new(0) };
        let matcher = CandidateMatcher::new(&fetcher, "https://www.imdb.com", "Titles");
        let results = vec![
            result("Alpha", "Alpha (1990) (Video)", "/title/tt1/"),
            result("Alpha", "Alpha (1990)", "/title/tt2/"),
        ];

        let best = matcher.pick(&record("Alpha (1990)"), results).unwrap();
        assert_eq!(best.href, "/title/tt2/");
    }

    #[test]
    fn test_annotated_title_prefers_plain_candidate() {
        let fetcher = PageFetcher { body: String::new(), calls: AtomicUsize::new(0) };
        let matcher = CandidateMatcher::new(&fetcher, "https://www.imdb.com", "Titles");
        let query = record("Jean de Florette (1986) (France)");
        let results = vec![
            result("Jean de Florette", "Jean de Florette (1986)", "/title/tt1/"),
            result("Jean de Florette", "Jean de Florette (1986) (France)", "/title/tt2/"),
        ];

        let best = matcher.pick(&query, results).unwrap();
        assert_eq!(best.href, "/title/tt1/");
        assert_eq!(best.distance, 0);

        let flagged = matcher
            .pick(
                &query,
                vec![result("Jean de Florette", "Jean de Florette (1986) (France)", "/title/tt2/")],
            )
            .unwrap();
        assert_eq!(flagged.distance, 1);
    }

    #[test]
    fn test_no_candidate_after_year_filter() {
        let fetcher = PageFetcher { body: String::new(), calls: AtomicUsize::new(0) };
        let matcher = CandidateMatcher::new(&fetcher, "https://www.imdb.com", "Titles");
        let results = vec![result("Alpha", "Alpha (1991)", "/title/tt1/")];

        let err = matcher.pick(&record("Alpha (1990)"), results).unwrap_err();
        assert!(matches!(err, ResolveError::NoCandidate { ref year, .. } if year == "1990"));
    }

    #[tokio::test]
    async fn test_resolve_sets_catalog_id() {
        let body = r#"<html><body><div class="findSection"><h3 class="findSectionHeader">Titles</h3>
            <table class="findList"><tr class="findResult odd"><td class="result_text"> <a href="/title/tt0000002/?ref_=fn_al_tt_1">The Alpha</a> (1990) </td></tr></table>
            </div></body></html>"#;
        let fetcher = PageFetcher { body: body.to_string(), calls: AtomicUsize::new(0) };
        let matcher = CandidateMatcher::new(&fetcher, "https://www.imdb.com", "Titles");
        let mut limiter = RateLimiter::new(ManualClock::starting_at(42), Duration::from_millis(2000));

        let resolved = matcher.resolve(record("Alpha (1990)"), &mut limiter).await.unwrap();
        assert_eq!(resolved.catalog_id.as_deref(), Some("https://www.imdb.com/title/tt0000002/"));
        assert_eq!(resolved.found_title.as_deref(), Some("The Alpha (1990)"));
        assert_eq!(resolved.distance, Some(4));
        assert_eq!(resolved.request_time, Some(42));
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_resolve_skips_matched_record() {
        let fetcher = PageFetcher { body: String::new(), calls: AtomicUsize::new(0) };
        let matcher = CandidateMatcher::new(&fetcher, "https://www.imdb.com", "Titles");
        let mut limiter = RateLimiter::new(ManualClock::default(), Duration::from_millis(2000));

        let mut matched = record("Alpha (1990)");
        matched.catalog_id = Some("https://www.imdb.com/title/tt0000001/".to_string());

        let resolved = matcher.resolve(matched.clone(), &mut limiter).await.unwrap();
        assert_eq!(resolved, matched);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
        assert_eq!(limiter.last_request(), None);
    }
}
