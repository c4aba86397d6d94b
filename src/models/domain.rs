use serde::{Deserialize, Serialize};

/// A known place from the Seoul catalog, used as a matching target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    #[serde(rename = "areaCode")]
    pub code: String,
    #[serde(rename = "areaName")]
    pub native_name: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
    #[serde(rename = "engName", default)]
    pub translated_name: String,
    pub category: String,
    #[serde(rename = "keywords", default)]
    pub aliases: Vec<String>,
}

/// Crowd level reported by the congestion provider.
///
/// The provider speaks Korean labels on the wire; the enum keeps the
/// severity order explicit so comparisons and bucketing stay exhaustive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CrowdLevel {
    #[serde(rename = "여유")]
    Relaxed,
    #[serde(rename = "보통")]
    Normal,
    #[serde(rename = "약간 붐빔")]
    SlightlyCrowded,
    #[serde(rename = "붐빔")]
    Crowded,
    #[serde(rename = "정보없음")]
    Unknown,
}

impl CrowdLevel {
    /// All levels from least to most crowded, Unknown last
    pub const SEVERITY_ASC: [CrowdLevel; 5] = [
        CrowdLevel::Relaxed,
        CrowdLevel::Normal,
        CrowdLevel::SlightlyCrowded,
        CrowdLevel::Crowded,
        CrowdLevel::Unknown,
    ];

    /// Ordering rank used for sorting (1 = least crowded, Unknown sorts last)
    pub fn severity(&self) -> u8 {
        match self {
            CrowdLevel::Relaxed => 1,
            CrowdLevel::Normal => 2,
            CrowdLevel::SlightlyCrowded => 3,
            CrowdLevel::Crowded => 4,
            CrowdLevel::Unknown => 5,
        }
    }

    /// Numeric score used for averaging; Unknown counts as a neutral midpoint
    pub fn score(&self) -> f64 {
        match self {
            CrowdLevel::Relaxed => 1.0,
            CrowdLevel::Normal => 2.0,
            CrowdLevel::SlightlyCrowded => 3.0,
            CrowdLevel::Crowded => 4.0,
            CrowdLevel::Unknown => 2.5,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, CrowdLevel::Unknown)
    }

    /// The provider-facing Korean label
    pub fn label(&self) -> &'static str {
        match self {
            CrowdLevel::Relaxed => "여유",
            CrowdLevel::Normal => "보통",
            CrowdLevel::SlightlyCrowded => "약간 붐빔",
            CrowdLevel::Crowded => "붐빔",
            CrowdLevel::Unknown => "정보없음",
        }
    }

    /// Normalize a raw provider label, folding the legacy variants the
    /// upstream API still emits for some areas
    pub fn from_label(raw: &str) -> CrowdLevel {
        match raw.trim() {
            "여유" | "한산함" => CrowdLevel::Relaxed,
            "보통" => CrowdLevel::Normal,
            "약간 붐빔" | "조금붐빔" => CrowdLevel::SlightlyCrowded,
            "붐빔" | "매우붐빔" => CrowdLevel::Crowded,
            _ => CrowdLevel::Unknown,
        }
    }

    /// Map an average score back to a discrete level
    pub fn from_average(score: f64) -> CrowdLevel {
        if score <= 1.5 {
            CrowdLevel::Relaxed
        } else if score <= 2.5 {
            CrowdLevel::Normal
        } else if score <= 3.5 {
            CrowdLevel::SlightlyCrowded
        } else {
            CrowdLevel::Crowded
        }
    }
}

/// Fallback message attached to degraded readings
pub const READING_UNAVAILABLE_MESSAGE: &str = "혼잡도 정보를 가져올 수 없습니다.";

/// One crowd-level observation for a single location.
///
/// A failed fetch still produces a Reading (`success: false`, level
/// Unknown) so a single bad upstream call never aborts a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reading {
    pub location: String,
    pub level: CrowdLevel,
    pub message: String,
    #[serde(rename = "observedAt")]
    pub observed_at: chrono::DateTime<chrono::Utc>,
    pub success: bool,
}

impl Reading {
    /// Degraded reading for a location the provider could not answer for
    pub fn unavailable(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            level: CrowdLevel::Unknown,
            message: READING_UNAVAILABLE_MESSAGE.to_string(),
            observed_at: chrono::Utc::now(),
            success: false,
        }
    }
}

/// Result of resolving a free-text place query against the catalog.
///
/// Confidence 0 with an empty `matched_name` is the regular "no match"
/// outcome, not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchOutcome {
    #[serde(rename = "originalQuery")]
    pub original_query: String,
    #[serde(rename = "extractedToken")]
    pub extracted_token: String,
    #[serde(rename = "matchedName")]
    pub matched_name: String,
    pub confidence: f64,
}

impl MatchOutcome {
    pub fn no_match(query: &str, extracted_token: String) -> Self {
        Self {
            original_query: query.to_string(),
            extracted_token,
            matched_name: String::new(),
            confidence: 0.0,
        }
    }

    pub fn is_match(&self) -> bool {
        !self.matched_name.is_empty()
    }
}

/// One ranked row of a comparison response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub location: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
    #[serde(rename = "crowdLevel")]
    pub level: CrowdLevel,
    pub message: String,
    #[serde(rename = "timestamp")]
    pub observed_at: chrono::DateTime<chrono::Utc>,
    pub rank: usize,
}

/// Location + level pair used for the most/least crowded fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtremeEntry {
    pub location: String,
    #[serde(rename = "crowdLevel")]
    pub level: CrowdLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AverageLevel {
    pub level: CrowdLevel,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(rename = "bestChoice")]
    pub best_choice: String,
    pub reason: String,
    #[serde(rename = "alternativeOptions")]
    pub alternatives: Vec<String>,
}

/// Counts per visible level; Unknown readings are not a named bucket
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelDistribution {
    #[serde(rename = "여유")]
    pub relaxed: usize,
    #[serde(rename = "보통")]
    pub normal: usize,
    #[serde(rename = "약간붐빔")]
    pub slightly_crowded: usize,
    #[serde(rename = "붐빔")]
    pub crowded: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonStats {
    #[serde(rename = "totalLocations")]
    pub total_locations: usize,
    #[serde(rename = "crowdLevelDistribution")]
    pub distribution: LevelDistribution,
}

/// Full analysis over one batch of readings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    #[serde(rename = "mostCrowded")]
    pub most_crowded: ExtremeEntry,
    #[serde(rename = "leastCrowded")]
    pub least_crowded: ExtremeEntry,
    #[serde(rename = "averageCrowdLevel")]
    pub average_level: AverageLevel,
    pub recommendation: Recommendation,
    pub statistics: ComparisonStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_order_is_total() {
        let ranks: Vec<u8> = CrowdLevel::SEVERITY_ASC
            .iter()
            .map(|l| l.severity())
            .collect();
        assert_eq!(ranks, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_label_round_trip() {
        for level in CrowdLevel::SEVERITY_ASC {
            assert_eq!(CrowdLevel::from_label(level.label()), level);
        }
    }

    #[test]
    fn test_legacy_labels_normalized() {
        assert_eq!(CrowdLevel::from_label("매우붐빔"), CrowdLevel::Crowded);
        assert_eq!(CrowdLevel::from_label("조금붐빔"), CrowdLevel::SlightlyCrowded);
        assert_eq!(CrowdLevel::from_label("한산함"), CrowdLevel::Relaxed);
        assert_eq!(CrowdLevel::from_label(""), CrowdLevel::Unknown);
        assert_eq!(CrowdLevel::from_label("???"), CrowdLevel::Unknown);
    }

    #[test]
    fn test_average_thresholds() {
        assert_eq!(CrowdLevel::from_average(1.0), CrowdLevel::Relaxed);
        assert_eq!(CrowdLevel::from_average(1.5), CrowdLevel::Relaxed);
        assert_eq!(CrowdLevel::from_average(2.5), CrowdLevel::Normal);
        assert_eq!(CrowdLevel::from_average(3.5), CrowdLevel::SlightlyCrowded);
        assert_eq!(CrowdLevel::from_average(3.6), CrowdLevel::Crowded);
    }

    #[test]
    fn test_wire_format_uses_korean_labels() {
        let json = serde_json::to_string(&CrowdLevel::SlightlyCrowded).unwrap();
        assert_eq!(json, "\"약간 붐빔\"");
        let level: CrowdLevel = serde_json::from_str("\"여유\"").unwrap();
        assert_eq!(level, CrowdLevel::Relaxed);
    }
}
