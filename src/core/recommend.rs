use chrono::{DateTime, Datelike, Local, Timelike, Weekday};

use crate::models::{CrowdLevel, Reading};

/// The recommended location before narrative enrichment
#[derive(Debug, Clone)]
pub struct Choice {
    pub location: String,
    pub level: CrowdLevel,
    pub reason: String,
}

/// How spread out the levels of a batch are
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Diversity {
    Uniform,
    Mixed,
    Diverse,
}

/// Aggregate shape of a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    AllClear,
    AllCrowded,
    MostlyCrowded,
    MostlyClear,
    Normal,
}

#[derive(Debug, Clone, Copy)]
pub struct TrendAnalysis {
    pub diversity: Diversity,
    pub pattern: Pattern,
}

/// Pick the best location.
///
/// Tier A: any Relaxed or Normal reading exists; the least crowded of
/// those wins with a positive reason. Tier B: everything is crowded or
/// unknown; the least bad reading wins with a caveated reason that
/// suggests alternate timing. Ties keep input order.
pub fn best_choice(readings: &[Reading]) -> Choice {
    let ideal = readings
        .iter()
        .filter(|r| matches!(r.level, CrowdLevel::Relaxed | CrowdLevel::Normal))
        .min_by_key(|r| r.level.severity());

    if let Some(reading) = ideal {
        tracing::debug!(best = %reading.location, level = reading.level.label(), "ideal option available");
        return Choice {
            location: reading.location.clone(),
            level: reading.level,
            reason: basic_reason(reading.level).to_string(),
        };
    }

    // every reading is SlightlyCrowded, Crowded or Unknown
    let least_bad = readings.iter().min_by_key(|r| r.level.severity());
    match least_bad {
        Some(reading) => {
            tracing::debug!(best = %reading.location, level = reading.level.label(), "no ideal option, caveated pick");
            Choice {
                location: reading.location.clone(),
                level: reading.level,
                reason: caveated_reason(reading.level).to_string(),
            }
        }
        None => Choice {
            location: super::analysis::UNKNOWN_LOCATION.to_string(),
            level: CrowdLevel::Unknown,
            reason: caveated_reason(CrowdLevel::Unknown).to_string(),
        },
    }
}

fn basic_reason(level: CrowdLevel) -> &'static str {
    match level {
        CrowdLevel::Relaxed => "현재 가장 여유로워서 편안하게 이용할 수 있습니다",
        CrowdLevel::Normal => "적당한 혼잡도로 무난하게 이용할 수 있습니다",
        _ => "이용하기 좋은 상태입니다",
    }
}

fn caveated_reason(level: CrowdLevel) -> &'static str {
    match level {
        CrowdLevel::SlightlyCrowded => {
            "⚠️ 모든 곳이 붐비는 상황입니다. 이 곳이 상대적으로 덜 붐비지만, 시간을 바꿔서 방문하는 것을 권장합니다"
        }
        CrowdLevel::Crowded => {
            "⚠️ 모든 곳이 매우 붐비는 상황입니다. 가능하면 다른 시간대에 방문하시기 바랍니다"
        }
        CrowdLevel::Unknown => {
            "⚠️ 혼잡도 정보가 부족한 상황입니다. 방문 전 현장 상황을 확인해보세요"
        }
        _ => "⚠️ 현재 모든 곳이 붐비는 상황입니다",
    }
}

/// Alternatives to the chosen location, least crowded first.
///
/// Preference cascade: Relaxed/Normal readings, else anything not
/// outright Crowded, else whatever remains. Capped at
/// `min(2, ceil(N * 0.4))` of the full batch size.
pub fn alternative_options(readings: &[Reading], best_location: &str) -> Vec<String> {
    let remaining: Vec<&Reading> = readings
        .iter()
        .filter(|r| r.location != best_location)
        .collect();
    if remaining.is_empty() {
        return Vec::new();
    }

    let good: Vec<&Reading> = remaining
        .iter()
        .copied()
        .filter(|r| matches!(r.level, CrowdLevel::Relaxed | CrowdLevel::Normal))
        .collect();

    let mut pool = if !good.is_empty() {
        good
    } else {
        let not_crowded: Vec<&Reading> = remaining
            .iter()
            .copied()
            .filter(|r| r.level != CrowdLevel::Crowded)
            .collect();
        if not_crowded.is_empty() {
            remaining
        } else {
            not_crowded
        }
    };

    pool.sort_by(|a, b| {
        a.level
            .score()
            .partial_cmp(&b.level.score())
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let cap = 2.min((readings.len() as f64 * 0.4).ceil() as usize);
    pool.into_iter()
        .take(cap)
        .map(|r| r.location.clone())
        .collect()
}

/// Classify how the batch's levels spread and cluster
pub fn analyze_trend(readings: &[Reading]) -> TrendAnalysis {
    let unique: std::collections::HashSet<CrowdLevel> =
        readings.iter().map(|r| r.level).collect();

    let diversity = match unique.len() {
        0 | 1 => Diversity::Uniform,
        2 => Diversity::Mixed,
        _ => Diversity::Diverse,
    };

    let total = readings.len();
    let relaxed = count_level(readings, CrowdLevel::Relaxed);
    let crowded = count_level(readings, CrowdLevel::Crowded);

    let pattern = if total > 0 && relaxed == total {
        Pattern::AllClear
    } else if total > 0 && crowded == total {
        Pattern::AllCrowded
    } else if crowded * 2 > total {
        Pattern::MostlyCrowded
    } else if relaxed * 2 > total {
        Pattern::MostlyClear
    } else {
        Pattern::Normal
    };

    TrendAnalysis { diversity, pattern }
}

fn count_level(readings: &[Reading], level: CrowdLevel) -> usize {
    readings.iter().filter(|r| r.level == level).count()
}

/// Expand the base reason with context drawn from the batch shape and
/// the time of day. Purely additive: the chosen best and alternatives
/// are fixed before this runs.
pub fn detailed_reason(
    choice: &Choice,
    readings: &[Reading],
    trend: &TrendAnalysis,
    now: DateTime<Local>,
) -> String {
    let mut reason = choice.reason.clone();

    // shared-level count is only worth mentioning for larger batches
    if readings.len() >= 3 {
        let same_level = count_level(readings, choice.level);
        if same_level > 1 {
            reason.push_str(&format!(" ({}개 장소가 동일한 혼잡도)", same_level));
        }
    }

    match trend.diversity {
        Diversity::Uniform if choice.level == CrowdLevel::Relaxed => {
            reason.push_str(" 전체적으로 여유로운 시간대입니다.");
        }
        Diversity::Mixed => {
            reason.push_str(" 장소별로 혼잡도 차이가 있어 선택의 여지가 있습니다.");
        }
        Diversity::Diverse => {
            reason.push_str(" 다양한 혼잡도 옵션이 있어 취향에 맞게 선택할 수 있습니다.");
        }
        _ => {}
    }

    match trend.pattern {
        Pattern::AllClear => {
            reason.push_str(" 모든 곳이 여유로워 어디든 편안하게 이용 가능합니다.");
        }
        Pattern::MostlyCrowded => {
            reason.push_str(" 대부분 붐비는 상황에서 상대적으로 나은 선택입니다.");
        }
        _ => {}
    }

    if let Some(insight) = time_insight(now) {
        reason.push(' ');
        reason.push_str(insight);
    }

    let advice = context_advice(readings, trend);
    if !advice.is_empty() {
        reason.push(' ');
        reason.push_str(&advice);
    }

    reason
}

/// Deterministic time-of-day / day-of-week remark
pub fn time_insight(now: DateTime<Local>) -> Option<&'static str> {
    let hour = now.hour();
    let weekend = matches!(now.weekday(), Weekday::Sat | Weekday::Sun);

    if (11..=13).contains(&hour) {
        Some("점심시간대로 평소보다 혼잡할 수 있습니다.")
    } else if (18..=20).contains(&hour) {
        Some("저녁시간대로 사람들이 많을 수 있습니다.")
    } else if (21..=23).contains(&hour) && weekend {
        Some("주말 밤시간으로 특히 번화가는 붐빌 수 있습니다.")
    } else if (9..=11).contains(&hour) {
        Some("오전시간대로 비교적 여유로울 수 있습니다.")
    } else if weekend {
        Some("주말이라 평일보다 혼잡할 수 있습니다.")
    } else if (14..=17).contains(&hour) {
        Some("평일 오후시간으로 상대적으로 한적할 수 있습니다.")
    } else {
        None
    }
}

/// Confidence-toned advice from the level spread of the batch
fn context_advice(readings: &[Reading], trend: &TrendAnalysis) -> String {
    let unique: std::collections::HashSet<CrowdLevel> =
        readings.iter().map(|r| r.level).collect();

    let mut advice = String::new();
    if unique.len() == 1 {
        match readings.first().map(|r| r.level) {
            Some(CrowdLevel::Relaxed) => advice.push_str("지금이 방문하기 좋은 시간입니다."),
            Some(CrowdLevel::Crowded) => advice.push_str("가능하면 다른 시간대를 고려해보세요."),
            _ => {}
        }
    } else if unique.len() >= 3 {
        advice.push_str("선택의 폭이 넓어 개인 취향에 맞게 선택하세요.");
    }

    match trend.pattern {
        Pattern::MostlyClear => advice.push_str(" 전반적으로 좋은 상황입니다."),
        Pattern::MostlyCrowded => advice.push_str(" 혼잡한 시간대이니 여유를 두고 방문하세요."),
        _ => {}
    }

    advice.trim_start().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn reading(location: &str, level: CrowdLevel) -> Reading {
        Reading {
            location: location.to_string(),
            level,
            message: level.label().to_string(),
            observed_at: chrono::Utc::now(),
            success: level.is_known(),
        }
    }

    #[test]
    fn test_tier_a_prefers_relaxed() {
        let readings = vec![
            reading("붐비는곳", CrowdLevel::Crowded),
            reading("보통인곳", CrowdLevel::Normal),
            reading("여유로운곳", CrowdLevel::Relaxed),
        ];
        let choice = best_choice(&readings);
        assert_eq!(choice.location, "여유로운곳");
        assert!(!choice.reason.starts_with('⚠'));
    }

    #[test]
    fn test_tier_a_ties_keep_input_order() {
        let readings = vec![
            reading("먼저", CrowdLevel::Normal),
            reading("나중", CrowdLevel::Normal),
        ];
        let choice = best_choice(&readings);
        assert_eq!(choice.location, "먼저");
    }

    #[test]
    fn test_tier_b_when_everything_is_crowded() {
        let readings = vec![
            reading("가", CrowdLevel::Crowded),
            reading("나", CrowdLevel::SlightlyCrowded),
            reading("다", CrowdLevel::Crowded),
        ];
        let choice = best_choice(&readings);
        assert_eq!(choice.location, "나");
        assert!(choice.reason.contains("⚠️"));
        assert!(choice.reason.contains("시간"));
    }

    #[test]
    fn test_tier_b_all_unknown() {
        let readings = vec![
            reading("가", CrowdLevel::Unknown),
            reading("나", CrowdLevel::Unknown),
        ];
        let choice = best_choice(&readings);
        assert_eq!(choice.location, "가");
        assert!(choice.reason.contains("정보가 부족"));
    }

    #[test]
    fn test_alternatives_prefer_good_options() {
        let readings = vec![
            reading("최선", CrowdLevel::Relaxed),
            reading("보통인곳", CrowdLevel::Normal),
            reading("붐비는곳", CrowdLevel::Crowded),
            reading("여유인곳", CrowdLevel::Relaxed),
        ];
        let alternatives = alternative_options(&readings, "최선");
        assert_eq!(alternatives, vec!["여유인곳", "보통인곳"]);
    }

    #[test]
    fn test_alternatives_fall_back_to_not_crowded() {
        let readings = vec![
            reading("최선", CrowdLevel::SlightlyCrowded),
            reading("약간", CrowdLevel::SlightlyCrowded),
            reading("붐빔", CrowdLevel::Crowded),
        ];
        let alternatives = alternative_options(&readings, "최선");
        assert_eq!(alternatives, vec!["약간"]);
    }

    #[test]
    fn test_alternatives_use_all_when_everything_crowded() {
        let readings = vec![
            reading("최선", CrowdLevel::Crowded),
            reading("가", CrowdLevel::Crowded),
            reading("나", CrowdLevel::Crowded),
        ];
        let alternatives = alternative_options(&readings, "최선");
        // min(2, ceil(3 * 0.4)) = 2
        assert_eq!(alternatives.len(), 2);
        assert!(alternatives.contains(&"가".to_string()));
        assert!(alternatives.contains(&"나".to_string()));
    }

    #[test]
    fn test_alternatives_cap_scales_with_batch() {
        let readings = vec![
            reading("최선", CrowdLevel::Relaxed),
            reading("가", CrowdLevel::Normal),
            reading("나", CrowdLevel::Normal),
        ];
        // min(2, ceil(3 * 0.4)) = 2
        assert_eq!(alternative_options(&readings, "최선").len(), 2);

        let pair = vec![
            reading("최선", CrowdLevel::Relaxed),
            reading("가", CrowdLevel::Normal),
        ];
        // min(2, ceil(2 * 0.4)) = 1
        assert_eq!(alternative_options(&pair, "최선").len(), 1);
    }

    #[test]
    fn test_trend_diversity_classification() {
        let uniform = vec![reading("가", CrowdLevel::Relaxed), reading("나", CrowdLevel::Relaxed)];
        assert_eq!(analyze_trend(&uniform).diversity, Diversity::Uniform);

        let mixed = vec![reading("가", CrowdLevel::Relaxed), reading("나", CrowdLevel::Crowded)];
        assert_eq!(analyze_trend(&mixed).diversity, Diversity::Mixed);

        let diverse = vec![
            reading("가", CrowdLevel::Relaxed),
            reading("나", CrowdLevel::Normal),
            reading("다", CrowdLevel::Crowded),
        ];
        assert_eq!(analyze_trend(&diverse).diversity, Diversity::Diverse);
    }

    #[test]
    fn test_trend_pattern_classification() {
        let all_clear = vec![reading("가", CrowdLevel::Relaxed), reading("나", CrowdLevel::Relaxed)];
        assert_eq!(analyze_trend(&all_clear).pattern, Pattern::AllClear);

        let all_crowded = vec![reading("가", CrowdLevel::Crowded), reading("나", CrowdLevel::Crowded)];
        assert_eq!(analyze_trend(&all_crowded).pattern, Pattern::AllCrowded);

        let mostly_crowded = vec![
            reading("가", CrowdLevel::Crowded),
            reading("나", CrowdLevel::Crowded),
            reading("다", CrowdLevel::Relaxed),
        ];
        assert_eq!(analyze_trend(&mostly_crowded).pattern, Pattern::MostlyCrowded);

        let normal = vec![
            reading("가", CrowdLevel::Normal),
            reading("나", CrowdLevel::SlightlyCrowded),
        ];
        assert_eq!(analyze_trend(&normal).pattern, Pattern::Normal);
    }

    #[test]
    fn test_time_insight_windows() {
        let lunch = Local.with_ymd_and_hms(2025, 8, 19, 12, 0, 0).unwrap(); // Tuesday
        assert_eq!(time_insight(lunch), Some("점심시간대로 평소보다 혼잡할 수 있습니다."));

        let evening = Local.with_ymd_and_hms(2025, 8, 19, 19, 0, 0).unwrap();
        assert_eq!(time_insight(evening), Some("저녁시간대로 사람들이 많을 수 있습니다."));

        let weekend_night = Local.with_ymd_and_hms(2025, 8, 23, 22, 0, 0).unwrap(); // Saturday
        assert_eq!(
            time_insight(weekend_night),
            Some("주말 밤시간으로 특히 번화가는 붐빌 수 있습니다.")
        );

        let weekday_afternoon = Local.with_ymd_and_hms(2025, 8, 19, 15, 0, 0).unwrap();
        assert_eq!(
            time_insight(weekday_afternoon),
            Some("평일 오후시간으로 상대적으로 한적할 수 있습니다.")
        );

        let late_night = Local.with_ymd_and_hms(2025, 8, 19, 2, 0, 0).unwrap();
        assert_eq!(time_insight(late_night), None);
    }

    #[test]
    fn test_detailed_reason_never_changes_choice() {
        let readings = vec![
            reading("여유로운곳", CrowdLevel::Relaxed),
            reading("보통인곳", CrowdLevel::Normal),
            reading("붐비는곳", CrowdLevel::Crowded),
        ];
        let choice = best_choice(&readings);
        let trend = analyze_trend(&readings);
        let now = Local.with_ymd_and_hms(2025, 8, 19, 12, 0, 0).unwrap();
        let reason = detailed_reason(&choice, &readings, &trend, now);

        assert!(reason.starts_with(&choice.reason));
        assert_eq!(best_choice(&readings).location, choice.location);
    }

    #[test]
    fn test_detailed_reason_mentions_shared_level() {
        let readings = vec![
            reading("가", CrowdLevel::Relaxed),
            reading("나", CrowdLevel::Relaxed),
            reading("다", CrowdLevel::Crowded),
        ];
        let choice = best_choice(&readings);
        let trend = analyze_trend(&readings);
        let now = Local.with_ymd_and_hms(2025, 8, 19, 3, 0, 0).unwrap();
        let reason = detailed_reason(&choice, &readings, &trend, now);
        assert!(reason.contains("2개 장소가 동일한 혼잡도"));
    }
}
