use crate::core::similarity::{native_exact, score_candidate};
use crate::core::tokens::extract_tokens;
use crate::models::MatchOutcome;
use crate::services::Catalog;

/// Candidate threshold below which a (token, entry) pair is noise
pub const DEFAULT_MIN_SCORE: f64 = 0.3;

#[derive(Debug)]
struct Candidate<'a> {
    code: &'a str,
    matched_name: &'a str,
    token: &'a str,
    score: f64,
}

/// Resolves free-text place queries to catalog entries.
///
/// # Pipeline
/// 1. Token extraction from the raw query
/// 2. Per (token, entry) scoring across the strategy table
/// 3. Threshold filter, score-descending sort, dedup by entry code
#[derive(Debug, Clone)]
pub struct Matcher {
    min_score: f64,
}

impl Matcher {
    pub fn new(min_score: f64) -> Self {
        Self { min_score }
    }

    pub fn with_default_threshold() -> Self {
        Self {
            min_score: DEFAULT_MIN_SCORE,
        }
    }

    /// Resolve a query to the single best catalog entry.
    ///
    /// Returns the no-match outcome (confidence 0, empty name) when
    /// nothing clears the threshold; that is a regular result, never an
    /// error. Ties are broken by encounter order: tokens in extraction
    /// order, entries in catalog order.
    pub fn resolve(&self, query: &str, catalog: &Catalog) -> MatchOutcome {
        let tokens = extract_tokens(query);
        if tokens.is_empty() {
            return MatchOutcome::no_match(query, String::new());
        }
        let first_token = tokens[0].clone();

        let mut candidates: Vec<Candidate> = Vec::new();

        // exact alias hits come straight from the inverted index; the
        // scoring loop rediscovers them, dedup keeps the first
        for token in &tokens {
            for entry in catalog.alias_owners(token) {
                candidates.push(Candidate {
                    code: &entry.code,
                    matched_name: &entry.native_name,
                    token,
                    score: 0.95,
                });
            }
        }

        for token in &tokens {
            for entry in catalog.entries() {
                // an exact native-name hit is definitive
                if native_exact(token, entry) == 1.0 {
                    tracing::debug!(
                        query,
                        matched = %entry.native_name,
                        token = %token,
                        "resolved by exact name"
                    );
                    return MatchOutcome {
                        original_query: query.to_string(),
                        extracted_token: token.clone(),
                        matched_name: entry.native_name.clone(),
                        confidence: 1.0,
                    };
                }

                let score = score_candidate(token, entry);
                if score > self.min_score {
                    candidates.push(Candidate {
                        code: &entry.code,
                        matched_name: &entry.native_name,
                        token,
                        score,
                    });
                }
            }
        }

        // stable sort keeps encounter order for equal scores
        candidates.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut seen_codes: std::collections::HashSet<&str> = std::collections::HashSet::new();
        let best = candidates
            .iter()
            .find(|candidate| seen_codes.insert(candidate.code));

        match best {
            Some(candidate) => {
                tracing::debug!(
                    query,
                    matched = candidate.matched_name,
                    token = candidate.token,
                    confidence = candidate.score,
                    "resolved"
                );
                MatchOutcome {
                    original_query: query.to_string(),
                    extracted_token: candidate.token.to_string(),
                    matched_name: candidate.matched_name.to_string(),
                    confidence: candidate.score,
                }
            }
            None => {
                tracing::debug!(query, "no catalog match");
                MatchOutcome::no_match(query, first_token)
            }
        }
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_default_threshold()
    }
}
