pub mod client;
pub mod parser;
pub mod urls;

pub use client::ImdbClient;
pub use parser::{parse_genres, parse_search_results, SearchResult};
pub use urls::{canonical_title_url, search_url};
