use crate::models::CatalogEntry;

/// One named matching signal.
///
/// Each strategy returns an independent score in [0, 1]; the aggregate
/// candidate score is the maximum across the table, so signals can be
/// tuned and tested in isolation.
pub struct Strategy {
    pub name: &'static str,
    pub score: fn(&str, &CatalogEntry) -> f64,
}

/// Matching signals in priority order
pub const STRATEGIES: &[Strategy] = &[
    Strategy { name: "native-exact", score: native_exact },
    Strategy { name: "alias-match", score: alias_match },
    Strategy { name: "native-substring", score: native_substring },
    Strategy { name: "translated-substring", score: translated_substring },
    Strategy { name: "edit-distance", score: edit_distance },
];

/// Maximum score across all strategies, clamped to 1.0
pub fn score_candidate(token: &str, entry: &CatalogEntry) -> f64 {
    STRATEGIES
        .iter()
        .map(|strategy| (strategy.score)(token, entry))
        .fold(0.0_f64, f64::max)
        .min(1.0)
}

/// Token equals the native name exactly; the definitive match
pub fn native_exact(token: &str, entry: &CatalogEntry) -> f64 {
    if entry.native_name.to_lowercase() == token.to_lowercase() {
        1.0
    } else {
        0.0
    }
}

/// Token is a substring of the native name
fn native_substring(token: &str, entry: &CatalogEntry) -> f64 {
    if entry
        .native_name
        .to_lowercase()
        .contains(&token.to_lowercase())
    {
        0.9
    } else {
        0.0
    }
}

/// Token is a substring of the English name
fn translated_substring(token: &str, entry: &CatalogEntry) -> f64 {
    if !entry.translated_name.is_empty()
        && entry
            .translated_name
            .to_lowercase()
            .contains(&token.to_lowercase())
    {
        0.8
    } else {
        0.0
    }
}

/// Token equals (0.95) or is contained in (0.85) one of the entry aliases
fn alias_match(token: &str, entry: &CatalogEntry) -> f64 {
    let token = token.to_lowercase();
    let mut best = 0.0_f64;
    for alias in &entry.aliases {
        let alias = alias.to_lowercase();
        if alias == token {
            best = best.max(0.95);
        } else if alias.contains(&token) {
            best = best.max(0.85);
        }
    }
    best
}

/// Normalized edit-distance similarity against the native name, damped
/// so fuzzy hits never outrank substring or alias hits
fn edit_distance(token: &str, entry: &CatalogEntry) -> f64 {
    levenshtein_similarity(token, &entry.native_name) * 0.6
}

/// `1 - distance / max_len`, on lowercased char sequences
pub fn levenshtein_similarity(a: &str, b: &str) -> f64 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    if a == b {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let distance = levenshtein(&a, &b) as f64;
    let max_len = a.chars().count().max(b.chars().count()) as f64;
    1.0 - distance / max_len
}

/// Classic two-row Levenshtein over chars (not bytes, the catalog is Korean)
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr: Vec<usize> = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = if ca == cb { 0 } else { 1 };
            curr[j + 1] = (prev[j] + substitution)
                .min(prev[j + 1] + 1)
                .min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(native: &str, eng: &str, aliases: &[&str]) -> CatalogEntry {
        CatalogEntry {
            code: "POI000".to_string(),
            native_name: native.to_string(),
            display_name: format!("{} 일대", native),
            translated_name: eng.to_string(),
            category: "관광특구".to_string(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
        }
    }

    #[test]
    fn test_levenshtein_basic() {
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("같다", "같다"), 0);
        assert_eq!(levenshtein("강남역", "강남대로"), 2);
    }

    #[test]
    fn test_levenshtein_similarity_range() {
        assert_eq!(levenshtein_similarity("홍대", "홍대"), 1.0);
        assert_eq!(levenshtein_similarity("", "홍대"), 0.0);
        let sim = levenshtein_similarity("홍대입구", "홍대");
        assert!(sim > 0.0 && sim < 1.0);
    }

    #[test]
    fn test_exact_native_name_scores_one() {
        let e = entry("홍대 관광특구", "Hongdae Special Tourist Zone", &["홍대"]);
        assert_eq!(score_candidate("홍대 관광특구", &e), 1.0);
    }

    #[test]
    fn test_alias_exact_beats_substring() {
        let e = entry("홍대 관광특구", "Hongdae Special Tourist Zone", &["홍대"]);
        // "홍대" is both an exact alias (0.95) and a native substring (0.9)
        assert_eq!(score_candidate("홍대", &e), 0.95);
    }

    #[test]
    fn test_native_substring_scores() {
        let e = entry("강남역", "Gangnam Station", &[]);
        assert_eq!(score_candidate("강남", &e), 0.9);
    }

    #[test]
    fn test_translated_substring_scores() {
        let e = entry("강남역", "Gangnam Station", &[]);
        assert_eq!(score_candidate("gangnam", &e), 0.8);
    }

    #[test]
    fn test_unrelated_token_scores_low() {
        let e = entry("강남역", "Gangnam Station", &["강남"]);
        assert!(score_candidate("제주도", &e) < 0.3);
    }

    #[test]
    fn test_case_insensitive_translated_match() {
        let e = entry("강남역", "Gangnam Station", &[]);
        assert_eq!(score_candidate("GANGNAM", &e), 0.8);
    }
}
