pub mod cache;
pub mod diff;
pub mod error;
pub mod genres;
pub mod matching;
pub mod normalize;
pub mod pipeline;
pub mod rate_limit;

pub use cache::MovieCache;
pub use error::ResolveError;
pub use genres::GenreExtractor;
pub use matching::{Candidate, CandidateMatcher};
pub use pipeline::{select_titles, Pipeline, PipelineSettings, RunSummary};
pub use rate_limit::{Clock, ManualClock, RateLimiter, SystemClock};
