pub mod traits;
pub mod imdb;
pub mod error;

pub use traits::{DocumentFetcher, FetchedDocument};
pub use error::SourceError;
pub use imdb::ImdbClient;
