use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One entry of the ranked title list, resolved step by step against the catalog
///
/// Fields are filled progressively: `year`/`short_title` by normalization,
/// `found_title`/`catalog_id`/`distance` by matching, `genres` by genre extraction.
/// The serialized form uses camelCase keys so cache files stay readable by older tooling.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MovieRecord {
    /// Raw ranked-list string, unique cache key
    pub title: String,
    /// 1-based position in the ranked list
    pub rank: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_title: Option<String>,
    /// Secondary annotations; search queries are always built with none
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub flags: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub found_title: Option<String>,
    #[serde(default, alias = "imdb", skip_serializing_if = "Option::is_none")]
    pub catalog_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genres: Option<Vec<String>>,
    /// Epoch milliseconds of the latest outbound request made for this record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_time: Option<i64>,
}

impl MovieRecord {
    pub fn new(title: impl Into<String>, rank: usize) -> Self {
        Self {
            title: title.into(),
            rank,
            year: None,
            short_title: None,
            flags: BTreeSet::new(),
            found_title: None,
            catalog_id: None,
            distance: None,
            genres: None,
            request_time: None,
        }
    }

    pub fn is_matched(&self) -> bool {
        self.catalog_id.is_some()
    }

    pub fn has_genres(&self) -> bool {
        self.genres.is_some()
    }

    /// Both the catalog id and the genre list are known; nothing left to fetch
    pub fn is_fully_resolved(&self) -> bool {
        self.is_matched() && self.has_genres()
    }

    /// Matched, but not an exact match
    pub fn is_mismatch(&self) -> bool {
        self.is_matched() && self.distance.unwrap_or(0) > 0
    }

    pub fn has_genre(&self, genre: &str) -> bool {
        self.genres
            .as_ref()
            .map(|genres| genres.iter().any(|g| g == genre))
            .unwrap_or(false)
    }
}
