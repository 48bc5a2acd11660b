pub mod config;
pub mod credentials;
pub mod paths;
pub mod titles;

pub use config::{CatalogConfig, Config, RateLimitConfig};
pub use credentials::SessionCookie;
pub use paths::{PathManager, container_base_path};
pub use titles::{load_titles, TitleListError};
