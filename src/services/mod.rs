// Service exports
pub mod cache;
pub mod catalog;
pub mod congestion;
pub mod rate_limit;

pub use cache::ReadingCache;
pub use catalog::{Catalog, CatalogError};
pub use congestion::{CongestionClient, ProviderError};
pub use rate_limit::{client_id, RateDecision, RateLimiter};
