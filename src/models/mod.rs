// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    Analysis, AverageLevel, CatalogEntry, ComparisonRow, ComparisonStats, CrowdLevel,
    ExtremeEntry, LevelDistribution, MatchOutcome, Reading, Recommendation,
    READING_UNAVAILABLE_MESSAGE,
};
pub use requests::{CompareOptions, CompareRequest, ResolveRequest, SortBy};
pub use responses::{
    CompareResponse, ComparisonData, DependencyStatus, ErrorResponse, HealthResponse,
    InfoResponse, ResolveResponse,
};
