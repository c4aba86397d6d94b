use serde::{Deserialize, Serialize};
use validator::Validate;

/// Sort order for comparison rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortBy {
    #[serde(rename = "crowdLevel")]
    CrowdLevel,
    #[serde(rename = "location")]
    Location,
}

/// Request to compare crowd levels across several places
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CompareRequest {
    #[validate(length(min = 1, max = 10, message = "between 1 and 10 locations are required"))]
    pub locations: Vec<String>,
    #[serde(default)]
    pub options: Option<CompareOptions>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompareOptions {
    #[serde(alias = "sort_by", rename = "sortBy", default)]
    pub sort_by: Option<SortBy>,
}

impl CompareRequest {
    pub fn sort_by(&self) -> Option<SortBy> {
        self.options.as_ref().and_then(|o| o.sort_by)
    }
}

/// Request to resolve a free-text place query against the catalog
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ResolveRequest {
    #[validate(length(min = 1))]
    pub query: String,
}
