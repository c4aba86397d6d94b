// Core algorithm exports
pub mod analysis;
pub mod matcher;
pub mod recommend;
pub mod similarity;
pub mod tokens;

pub use analysis::{analyze, build_comparisons, sort_comparisons};
pub use matcher::{Matcher, DEFAULT_MIN_SCORE};
pub use recommend::{analyze_trend, best_choice, Diversity, Pattern, TrendAnalysis};
pub use similarity::{levenshtein, levenshtein_similarity, score_candidate};
pub use tokens::extract_tokens;
