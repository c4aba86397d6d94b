// Integration tests for Crowd Compare

use chrono::{Local, TimeZone};
use crowd_compare::core::{analysis, Matcher};
use crowd_compare::models::{CrowdLevel, Reading, SortBy};
use crowd_compare::services::Catalog;

fn reading(location: &str, level: CrowdLevel) -> Reading {
    Reading {
        location: location.to_string(),
        level,
        message: format!("{} 상태입니다.", level.label()),
        observed_at: chrono::Utc::now(),
        success: level.is_known(),
    }
}

fn fixed_now() -> chrono::DateTime<Local> {
    Local.with_ymd_and_hms(2025, 8, 19, 15, 0, 0).unwrap()
}

#[test]
fn test_shipped_catalog_loads_and_resolves() {
    let catalog = Catalog::load_from_path("data/seoul_places.json").expect("catalog should load");
    assert!(!catalog.is_empty());

    let matcher = Matcher::with_default_threshold();

    let outcome = matcher.resolve("홍대", &catalog);
    assert_eq!(outcome.matched_name, "홍대 관광특구");
    assert!(outcome.confidence > 0.8);

    let outcome = matcher.resolve("코엑스 근처 혼잡도 알려줘", &catalog);
    assert_eq!(outcome.matched_name, "강남 MICE 관광특구");

    let outcome = matcher.resolve("테헤란로", &catalog);
    assert_eq!(outcome.matched_name, "강남역");
}

#[test]
fn test_end_to_end_comparison_pipeline() {
    let catalog = Catalog::load_from_path("data/seoul_places.json").expect("catalog should load");
    let matcher = Matcher::with_default_threshold();

    // resolve free-text inputs the way the compare endpoint does
    let inputs = ["홍대", "강남역", "명동"];
    let targets: Vec<String> = inputs
        .iter()
        .map(|input| {
            let outcome = matcher.resolve(input, &catalog);
            assert!(outcome.is_match(), "{} should resolve", input);
            outcome.matched_name
        })
        .collect();

    // simulate the provider answers for the resolved names
    let levels = [CrowdLevel::Relaxed, CrowdLevel::Crowded, CrowdLevel::Normal];
    let readings: Vec<Reading> = targets
        .iter()
        .zip(levels)
        .map(|(target, level)| reading(target, level))
        .collect();

    let result = analysis::analyze(&readings, fixed_now());
    let sorted =
        analysis::sort_comparisons(analysis::build_comparisons(&readings), Some(SortBy::CrowdLevel));

    assert_eq!(result.recommendation.best_choice, "홍대 관광특구");
    assert_eq!(result.least_crowded.location, "홍대 관광특구");
    assert_eq!(result.most_crowded.location, "강남역");

    assert_eq!(sorted[0].location, "홍대 관광특구");
    assert_eq!(sorted[2].location, "강남역");
}

#[test]
fn test_ranks_form_permutation_for_all_batch_sizes() {
    for n in 1..=10usize {
        let readings: Vec<Reading> = (0..n)
            .map(|i| reading(&format!("장소{}", i), CrowdLevel::SEVERITY_ASC[i % 5]))
            .collect();

        for sort_by in [None, Some(SortBy::CrowdLevel), Some(SortBy::Location)] {
            let sorted =
                analysis::sort_comparisons(analysis::build_comparisons(&readings), sort_by);
            assert_eq!(sorted.len(), n);

            let mut ranks: Vec<usize> = sorted.iter().map(|c| c.rank).collect();
            ranks.sort_unstable();
            assert_eq!(ranks, (1..=n).collect::<Vec<usize>>());
        }
    }
}

#[test]
fn test_all_crowded_batch_gets_caveated_recommendation() {
    let readings = vec![
        reading("가", CrowdLevel::Crowded),
        reading("나", CrowdLevel::Crowded),
        reading("다", CrowdLevel::Crowded),
    ];

    let result = analysis::analyze(&readings, fixed_now());

    assert!(result.recommendation.reason.contains("⚠️"));
    // min(2, ceil(3 * 0.4)) = 2 of the two remaining locations
    assert_eq!(result.recommendation.alternatives.len(), 2);
    assert!(!result
        .recommendation
        .alternatives
        .contains(&result.recommendation.best_choice));
}

#[test]
fn test_degraded_readings_never_abort_analysis() {
    let readings = vec![
        Reading::unavailable("홍대 관광특구"),
        reading("강남역", CrowdLevel::Relaxed),
        Reading::unavailable("명동 관광특구"),
    ];

    let result = analysis::analyze(&readings, fixed_now());

    // the one healthy reading drives both the average and the pick
    assert_eq!(result.average_level.score, 1.0);
    assert_eq!(result.average_level.level, CrowdLevel::Relaxed);
    assert_eq!(result.recommendation.best_choice, "강남역");
    assert_eq!(result.statistics.distribution.relaxed, 1);
    assert_eq!(result.statistics.total_locations, 3);
}

#[test]
fn test_mixed_batch_statistics() {
    let readings = vec![
        reading("여유1", CrowdLevel::Relaxed),
        reading("여유2", CrowdLevel::Relaxed),
        reading("보통1", CrowdLevel::Normal),
        reading("붐빔1", CrowdLevel::Crowded),
    ];

    let result = analysis::analyze(&readings, fixed_now());

    // (1 + 1 + 2 + 4) / 4 = 2.0
    assert_eq!(result.average_level.score, 2.0);
    assert_eq!(result.average_level.level, CrowdLevel::Normal);

    let dist = result.statistics.distribution;
    assert_eq!(
        (dist.relaxed, dist.normal, dist.slightly_crowded, dist.crowded),
        (2, 1, 0, 1)
    );
}
