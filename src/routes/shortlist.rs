use crate::core::{to_csv, ExplanationGenerator, MatchOutcome, Matcher, PostalCodeLookup};
use crate::error::MatchError;
use crate::models::{ErrorResponse, HealthResponse, ShortlistRequest, ShortlistResponse};
use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;
use validator::Validate;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub matcher: Matcher,
    pub explainer: Arc<dyn ExplanationGenerator>,
}

/// Configure all shortlist-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/shortlist", web::post().to(create_shortlist))
        .route("/shortlist/export", web::post().to(export_shortlist));
}

/// Health check endpoint
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

fn bad_request(error: &str, message: String) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: error.to_string(),
        message,
        status_code: 400,
    })
}

/// Validate the request and run the pipeline
///
/// Structural input errors become a 400 naming the offending input.
async fn run(state: &AppState, req: &ShortlistRequest) -> Result<MatchOutcome, HttpResponse> {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for shortlist request: {:?}", errors);
        return Err(bad_request("Validation failed", errors.to_string()));
    }

    let matcher = match req.top_n {
        Some(n) => state.matcher.with_top_n(n),
        None => state.matcher.clone(),
    };
    let lookup = PostalCodeLookup::new(req.postal_codes.clone());

    matcher
        .find_matches_json(
            &req.preferences,
            &req.communities,
            &lookup,
            state.explainer.as_ref(),
        )
        .await
        .map_err(|e: MatchError| {
            tracing::warn!("Rejected shortlist input: {}", e);
            bad_request("Invalid input", e.to_string())
        })
}

/// Build a shortlist
///
/// POST /api/v1/shortlist
///
/// Request body:
/// ```json
/// {
///   "preferences": { "care_level": "assisted", "max_budget": 5000 },
///   "communities": [ { "id": "maple", "Type of Service": "Assisted Living" } ],
///   "topN": 5,
///   "postalCodes": { "14618": { "latitude": 43.12, "longitude": -77.56 } }
/// }
/// ```
async fn create_shortlist(
    state: web::Data<AppState>,
    req: web::Json<ShortlistRequest>,
) -> impl Responder {
    let outcome = match run(&state, &req).await {
        Ok(outcome) => outcome,
        Err(response) => return response,
    };

    let response = ShortlistResponse {
        run_id: uuid::Uuid::new_v4().to_string(),
        shortlist: outcome.shortlist,
        total_candidates: outcome.total_candidates,
        eligible_count: outcome.eligible_count,
    };

    tracing::info!(
        "Run {}: returning {} communities (from {} candidates)",
        response.run_id,
        response.shortlist.len(),
        response.total_candidates
    );

    HttpResponse::Ok().json(response)
}

/// Export a shortlist as CSV
///
/// POST /api/v1/shortlist/export
///
/// Same body as `/shortlist`; responds with `text/csv`.
async fn export_shortlist(
    state: web::Data<AppState>,
    req: web::Json<ShortlistRequest>,
) -> impl Responder {
    let outcome = match run(&state, &req).await {
        Ok(outcome) => outcome,
        Err(response) => return response,
    };

    match to_csv(&outcome.shortlist) {
        Ok(body) => HttpResponse::Ok()
            .content_type("text/csv")
            .insert_header(("Content-Disposition", "attachment; filename=\"shortlist.csv\""))
            .body(body),
        Err(e) => {
            tracing::error!("Failed to render shortlist CSV: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to export shortlist".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::DisabledExplainer;
    use actix_web::{http::StatusCode, test, App};
    use serde_json::{json, Value};

    fn app_state() -> AppState {
        AppState {
            matcher: Matcher::with_default_config(),
            explainer: Arc::new(DisabledExplainer),
        }
    }

    #[actix_web::test]
    async fn test_health_check() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(app_state()))
                .configure(crate::routes::configure_routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/v1/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["status"], "healthy");
    }

    #[actix_web::test]
    async fn test_shortlist_endpoint() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(app_state()))
                .configure(crate::routes::configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/shortlist")
            .set_json(json!({
                "preferences": {"care_level": "Assisted Living", "max_budget": "$5,000"},
                "communities": [
                    {"id": "a", "Type of Service": "Assisted Living", "Monthly Fee": 4000},
                    {"id": "b", "Type of Service": "Memory Care", "Monthly Fee": 4000},
                ],
            }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["totalCandidates"], 2);
        assert_eq!(body["eligibleCount"], 1);
        assert_eq!(body["shortlist"][0]["community"]["id"], "a");
        assert_eq!(body["shortlist"][0]["explanation"], "explanation unavailable");
    }

    #[actix_web::test]
    async fn test_structural_error_is_bad_request() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(app_state()))
                .configure(crate::routes::configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/shortlist")
            .set_json(json!({"preferences": {}, "communities": {"not": "a list"}}))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_top_n_out_of_range() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(app_state()))
                .configure(crate::routes::configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/shortlist")
            .set_json(json!({"preferences": {}, "communities": [], "topN": 0}))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_top_n_clamped_to_configured_max() {
        let mut config = crate::core::MatcherConfig::default();
        config.shortlist.max_top_n = 2;
        let state = AppState {
            matcher: Matcher::new(config),
            explainer: Arc::new(DisabledExplainer),
        };
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(crate::routes::configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/shortlist")
            .set_json(json!({
                "preferences": {},
                "communities": [{"id": "a"}, {"id": "b"}, {"id": "c"}, {"id": "d"}],
                "topN": 10,
            }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["eligibleCount"], 4);
        assert_eq!(body["shortlist"].as_array().map(Vec::len), Some(2));
    }

    #[actix_web::test]
    async fn test_export_csv() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(app_state()))
                .configure(crate::routes::configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/shortlist/export")
            .set_json(json!({
                "preferences": {},
                "communities": [{"id": "a", "Monthly Fee": 3000}],
            }))
            .to_request();
        let body = test::call_and_read_body(&app, req).await;
        let text = String::from_utf8(body.to_vec()).unwrap();

        assert!(text.starts_with("identifier,score,distance,fee,waitlist,explanation"));
        assert!(text.contains("explanation unavailable"));
    }
}
