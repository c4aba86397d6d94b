use chrono::{DateTime, Local};

use crate::core::recommend;
use crate::models::{
    Analysis, AverageLevel, ComparisonRow, ComparisonStats, CrowdLevel, ExtremeEntry,
    LevelDistribution, Reading, Recommendation, SortBy,
};

/// Sentinel label for fields that have no data to point at
pub const UNKNOWN_LOCATION: &str = "알 수 없음";

/// Analyze a batch of readings: distribution statistics, extremes,
/// weighted average and the tiered recommendation with its narrative.
///
/// `now` drives the time-of-day clauses of the narrative only; it never
/// changes which location is recommended. An empty batch yields the
/// fully populated "no data" analysis rather than an error.
pub fn analyze(readings: &[Reading], now: DateTime<Local>) -> Analysis {
    if readings.is_empty() {
        return empty_analysis();
    }

    let (average_score, average) = average_level(readings);
    let choice = recommend::best_choice(readings);
    let alternatives = recommend::alternative_options(readings, &choice.location);
    let trend = recommend::analyze_trend(readings);
    let reason = recommend::detailed_reason(&choice, readings, &trend, now);

    tracing::debug!(
        locations = readings.len(),
        average = average_score,
        best = %choice.location,
        "analysis completed"
    );

    Analysis {
        most_crowded: most_crowded(readings),
        least_crowded: least_crowded(readings),
        average_level: AverageLevel {
            level: average,
            score: (average_score * 10.0).round() / 10.0,
        },
        recommendation: Recommendation {
            best_choice: choice.location,
            reason,
            alternatives,
        },
        statistics: ComparisonStats {
            total_locations: readings.len(),
            distribution: distribution(readings),
        },
    }
}

/// Average severity score and its discrete level.
///
/// Unknown readings are excluded whenever at least one known reading
/// exists; an all-Unknown batch averages the neutral midpoints instead.
fn average_level(readings: &[Reading]) -> (f64, CrowdLevel) {
    let known: Vec<&Reading> = readings.iter().filter(|r| r.level.is_known()).collect();
    let pool: Vec<&Reading> = if known.is_empty() {
        readings.iter().collect()
    } else {
        known
    };

    let total: f64 = pool.iter().map(|r| r.level.score()).sum();
    let average = total / pool.len() as f64;
    (average, CrowdLevel::from_average(average))
}

/// First reading encountered scanning most-crowded-first
fn most_crowded(readings: &[Reading]) -> ExtremeEntry {
    scan_by_priority(readings, CrowdLevel::SEVERITY_ASC.iter().rev())
}

/// First reading encountered scanning least-crowded-first
fn least_crowded(readings: &[Reading]) -> ExtremeEntry {
    scan_by_priority(readings, CrowdLevel::SEVERITY_ASC.iter())
}

fn scan_by_priority<'a>(
    readings: &[Reading],
    priority: impl Iterator<Item = &'a CrowdLevel>,
) -> ExtremeEntry {
    for level in priority {
        if let Some(reading) = readings.iter().find(|r| r.level == *level) {
            return ExtremeEntry {
                location: reading.location.clone(),
                level: reading.level,
            };
        }
    }
    ExtremeEntry {
        location: UNKNOWN_LOCATION.to_string(),
        level: CrowdLevel::Unknown,
    }
}

fn distribution(readings: &[Reading]) -> LevelDistribution {
    let mut counts = LevelDistribution::default();
    for reading in readings {
        match reading.level {
            CrowdLevel::Relaxed => counts.relaxed += 1,
            CrowdLevel::Normal => counts.normal += 1,
            CrowdLevel::SlightlyCrowded => counts.slightly_crowded += 1,
            CrowdLevel::Crowded => counts.crowded += 1,
            CrowdLevel::Unknown => {}
        }
    }
    counts
}

fn empty_analysis() -> Analysis {
    let unknown = ExtremeEntry {
        location: UNKNOWN_LOCATION.to_string(),
        level: CrowdLevel::Unknown,
    };
    Analysis {
        most_crowded: unknown.clone(),
        least_crowded: unknown,
        average_level: AverageLevel {
            level: CrowdLevel::Unknown,
            score: 0.0,
        },
        recommendation: Recommendation {
            best_choice: UNKNOWN_LOCATION.to_string(),
            reason: "비교할 장소가 없습니다".to_string(),
            alternatives: Vec::new(),
        },
        statistics: ComparisonStats {
            total_locations: 0,
            distribution: LevelDistribution::default(),
        },
    }
}

/// Build provisional comparison rows in input order; ranks are
/// finalized by `sort_comparisons`
pub fn build_comparisons(readings: &[Reading]) -> Vec<ComparisonRow> {
    readings
        .iter()
        .enumerate()
        .map(|(index, reading)| ComparisonRow {
            location: reading.location.clone(),
            display_name: format!("{} 일대", reading.location),
            level: reading.level,
            message: reading.message.clone(),
            observed_at: reading.observed_at,
            rank: index + 1,
        })
        .collect()
}

/// Sort comparison rows and reassign 1-based contiguous ranks.
///
/// `CrowdLevel` orders by severity with the location label as tie
/// breaker (code-point order, which is dictionary order for Hangul);
/// `Location` orders by label alone; no sort key keeps input order for
/// equal severities.
pub fn sort_comparisons(
    mut comparisons: Vec<ComparisonRow>,
    sort_by: Option<SortBy>,
) -> Vec<ComparisonRow> {
    match sort_by {
        Some(SortBy::CrowdLevel) => {
            comparisons.sort_by(|a, b| {
                a.level
                    .severity()
                    .cmp(&b.level.severity())
                    .then_with(|| a.location.cmp(&b.location))
            });
        }
        Some(SortBy::Location) => {
            comparisons.sort_by(|a, b| a.location.cmp(&b.location));
        }
        None => {
            comparisons.sort_by(|a, b| a.level.severity().cmp(&b.level.severity()));
        }
    }

    for (index, row) in comparisons.iter_mut().enumerate() {
        row.rank = index + 1;
    }
    comparisons
}
