use actix_web::{web, HttpRequest, HttpResponse, HttpResponseBuilder, Responder};
use chrono::Local;
use std::sync::Arc;
use validator::Validate;

use crate::core::{analysis, Matcher};
use crate::models::{
    CompareRequest, CompareResponse, ComparisonData, CrowdLevel, DependencyStatus, ErrorResponse,
    HealthResponse, InfoResponse, Reading, ResolveRequest, ResolveResponse,
};
use crate::services::{client_id, Catalog, CongestionClient, RateDecision, RateLimiter, ReadingCache};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub congestion: Arc<CongestionClient>,
    pub cache: Arc<ReadingCache>,
    pub limiter: Arc<RateLimiter>,
    pub matcher: Matcher,
}

/// Configure all comparison routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/info", web::get().to(service_info))
        .route("/compare", web::post().to(compare))
        .route("/test", web::post().to(test_compare))
        .route("/resolve", web::post().to(resolve))
        .route("/cache/clear", web::post().to(clear_cache));
}

fn rate_limited(state: &AppState, req: &HttpRequest) -> Result<RateDecision, HttpResponse> {
    let decision = state.limiter.check(&client_id(req));
    if decision.allowed {
        return Ok(decision);
    }

    let mut builder = HttpResponse::TooManyRequests();
    apply_rate_headers(&mut builder, &decision);
    Err(builder.json(serde_json::json!({
        "success": false,
        "error": "Too Many Requests",
        "message": format!(
            "Rate limit exceeded. Try again in {} seconds.",
            decision.reset_secs
        ),
        "retryAfter": decision.reset_secs,
    })))
}

fn apply_rate_headers(builder: &mut HttpResponseBuilder, decision: &RateDecision) {
    builder
        .insert_header(("X-RateLimit-Limit", decision.limit.to_string()))
        .insert_header(("X-RateLimit-Remaining", decision.remaining.to_string()))
        .insert_header(("X-RateLimit-Reset", decision.reset_secs.to_string()));
}

/// Trim, reject blanks and drop duplicates while keeping input order
fn normalize_locations(raw: &[String]) -> Result<Vec<String>, ErrorResponse> {
    let mut locations: Vec<String> = Vec::with_capacity(raw.len());
    for location in raw {
        let trimmed = location.trim();
        if trimmed.is_empty() {
            return Err(ErrorResponse {
                error: "Validation Error".to_string(),
                message: "모든 장소명은 비어있지 않은 문자열이어야 합니다".to_string(),
                status_code: 400,
            });
        }
        if !locations.iter().any(|existing| existing == trimmed) {
            locations.push(trimmed.to_string());
        }
    }
    Ok(locations)
}

/// Compare crowd levels across several places
///
/// POST /api/comparison/compare
///
/// Request body:
/// ```json
/// {
///   "locations": ["홍대", "강남역", "명동"],
///   "options": { "sortBy": "crowdLevel" }
/// }
/// ```
async fn compare(
    state: web::Data<AppState>,
    req: web::Json<CompareRequest>,
    http_req: HttpRequest,
) -> impl Responder {
    let decision = match rate_limited(&state, &http_req) {
        Ok(decision) => decision,
        Err(rejection) => return rejection,
    };

    if let Err(errors) = req.validate() {
        tracing::info!(error = %errors, "validation failed for compare request");
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation Error".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let locations = match normalize_locations(&req.locations) {
        Ok(locations) => locations,
        Err(error) => return HttpResponse::BadRequest().json(error),
    };

    tracing::info!(locations = locations.len(), "comparison request received");

    // resolve each input through the catalog; unmatched inputs go to the
    // provider verbatim, which answers or degrades per location
    let targets: Vec<String> = locations
        .iter()
        .map(|location| {
            let outcome = state.matcher.resolve(location, &state.catalog);
            if outcome.is_match() {
                outcome.matched_name
            } else {
                location.clone()
            }
        })
        .collect();

    let readings = state.congestion.fetch_all(&targets).await;

    let comparisons = analysis::build_comparisons(&readings);
    let result = analysis::analyze(&readings, Local::now());
    let sorted = analysis::sort_comparisons(comparisons, req.sort_by());

    tracing::info!(
        locations = sorted.len(),
        best = %result.recommendation.best_choice,
        "comparison completed"
    );

    let mut builder = HttpResponse::Ok();
    apply_rate_headers(&mut builder, &decision);
    builder.json(CompareResponse::ok(ComparisonData {
        comparisons: sorted,
        analysis: result,
        timestamp: chrono::Utc::now(),
    }))
}

/// Simulated comparison used to exercise the analysis path without the
/// upstream provider
///
/// POST /api/comparison/test
async fn test_compare(
    state: web::Data<AppState>,
    req: web::Json<CompareRequest>,
    http_req: HttpRequest,
) -> impl Responder {
    let decision = match rate_limited(&state, &http_req) {
        Ok(decision) => decision,
        Err(rejection) => return rejection,
    };

    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation Error".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let locations = match normalize_locations(&req.locations) {
        Ok(locations) => locations,
        Err(error) => return HttpResponse::BadRequest().json(error),
    };

    const TEST_LEVELS: [CrowdLevel; 4] = [
        CrowdLevel::SlightlyCrowded,
        CrowdLevel::Relaxed,
        CrowdLevel::Normal,
        CrowdLevel::Crowded,
    ];

    let readings: Vec<Reading> = locations
        .iter()
        .enumerate()
        .map(|(index, location)| {
            let level = TEST_LEVELS[index % TEST_LEVELS.len()];
            Reading {
                location: location.clone(),
                level,
                message: format!("테스트 데이터: {} 상태입니다.", level.label()),
                observed_at: chrono::Utc::now(),
                success: true,
            }
        })
        .collect();

    let comparisons = analysis::build_comparisons(&readings);
    let result = analysis::analyze(&readings, Local::now());
    let sorted = analysis::sort_comparisons(comparisons, req.sort_by());

    let mut builder = HttpResponse::Ok();
    apply_rate_headers(&mut builder, &decision);
    builder.json(CompareResponse::ok(ComparisonData {
        comparisons: sorted,
        analysis: result,
        timestamp: chrono::Utc::now(),
    }))
}

/// Resolve a free-text place query against the catalog
///
/// POST /api/comparison/resolve
async fn resolve(
    state: web::Data<AppState>,
    req: web::Json<ResolveRequest>,
    http_req: HttpRequest,
) -> impl Responder {
    let decision = match rate_limited(&state, &http_req) {
        Ok(decision) => decision,
        Err(rejection) => return rejection,
    };

    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation Error".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let outcome = state.matcher.resolve(&req.query, &state.catalog);

    let mut builder = HttpResponse::Ok();
    apply_rate_headers(&mut builder, &decision);
    builder.json(ResolveResponse {
        success: true,
        data: outcome,
    })
}

/// Drop all cached readings (development helper)
///
/// POST /api/comparison/cache/clear
async fn clear_cache(state: web::Data<AppState>) -> impl Responder {
    state.cache.invalidate_all().await;
    tracing::info!("reading cache cleared");

    HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Cache cleared successfully",
        "timestamp": chrono::Utc::now(),
    }))
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let upstream_healthy = state.congestion.check_status().await;
    let status = if upstream_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
        dependencies: DependencyStatus {
            upstream: if upstream_healthy {
                "healthy".to_string()
            } else {
                "unhealthy".to_string()
            },
            cache: format!("healthy ({} entries)", state.cache.entry_count()),
        },
    })
}

/// Service metadata endpoint
async fn service_info() -> impl Responder {
    HttpResponse::Ok().json(InfoResponse {
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        description: env!("CARGO_PKG_DESCRIPTION").to_string(),
        endpoints: vec![
            "GET /api/comparison/health".to_string(),
            "GET /api/comparison/info".to_string(),
            "POST /api/comparison/compare".to_string(),
            "POST /api/comparison/test".to_string(),
            "POST /api/comparison/resolve".to_string(),
            "POST /api/comparison/cache/clear".to_string(),
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_locations_trims_and_dedupes() {
        let raw = vec![
            " 홍대 ".to_string(),
            "강남역".to_string(),
            "홍대".to_string(),
        ];
        let locations = normalize_locations(&raw).unwrap();
        assert_eq!(locations, vec!["홍대", "강남역"]);
    }

    #[test]
    fn test_normalize_locations_rejects_blank() {
        let raw = vec!["홍대".to_string(), "   ".to_string()];
        let error = normalize_locations(&raw).unwrap_err();
        assert_eq!(error.status_code, 400);
    }
}
