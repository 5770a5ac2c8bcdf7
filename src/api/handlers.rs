//! REST API handlers for delivery price analytics
//!
//! These handlers use the shared AnalyticsService.

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::service::{AnalyticsService, Breakdown, Comparison, RangeMatches};
use crate::error::AnalyticsError;
use crate::models::{
    CostProfile, Grouping, PriceRecord, TaggedRecord, DEFAULT_PRICE_WINDOW,
};

// ============================================================================
// Response Types (JSON-serializable versions)
// ============================================================================

#[derive(Serialize)]
pub struct StatsResponse {
    pub total_records: usize,
    pub skipped_rows: usize,
    pub total_cities: usize,
    pub total_dishes: usize,
    pub total_apps: usize,
}

#[derive(Serialize)]
pub struct OptionsResponse {
    pub cities: Vec<String>,
    pub dishes: Vec<String>,
    pub apps: Vec<String>,
}

#[derive(Serialize)]
pub struct ComparisonResponse {
    pub city: String,
    pub dish: String,
    pub rows: Vec<TaggedRecord>,
    pub profiles: Vec<CostProfile>,
}

impl From<Comparison> for ComparisonResponse {
    fn from(c: Comparison) -> Self {
        Self {
            city: c.city,
            dish: c.dish,
            rows: c.rows,
            profiles: c.profiles,
        }
    }
}

#[derive(Serialize)]
pub struct BreakdownResponse {
    pub app: String,
    pub delivery_fee: f64,
    pub packaging_fee: f64,
    pub platform_fee: f64,
    pub delivery_share: f64,
    pub packaging_share: f64,
    pub platform_share: f64,
}

impl From<Breakdown> for BreakdownResponse {
    fn from(b: Breakdown) -> Self {
        let [delivery_share, packaging_share, platform_share] = b.shares;
        Self {
            app: b.app,
            delivery_fee: b.fees.delivery_fee,
            packaging_fee: b.fees.packaging_fee,
            platform_fee: b.fees.platform_fee,
            delivery_share: (delivery_share * 10.0).round() / 10.0,
            packaging_share: (packaging_share * 10.0).round() / 10.0,
            platform_share: (platform_share * 10.0).round() / 10.0,
        }
    }
}

#[derive(Serialize)]
pub struct RangeResponse {
    pub min: f64,
    pub max: f64,
    pub total_matches: usize,
    pub records: Vec<PriceRecord>,
}

impl From<RangeMatches> for RangeResponse {
    fn from(m: RangeMatches) -> Self {
        Self {
            min: m.min,
            max: m.max,
            total_matches: m.total_matches,
            records: m.preview,
        }
    }
}

#[derive(Serialize)]
pub struct AverageResponse {
    pub city: Option<String>,
    pub app: String,
    pub average_final_price: f64,
    pub records: usize,
}

#[derive(Serialize)]
pub struct CheapestResponse {
    pub city: Option<String>,
    pub app: String,
    pub average_final_price: f64,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ============================================================================
// Query Parameters
// ============================================================================

#[derive(Deserialize)]
pub struct SelectionQuery {
    pub city: String,
    pub dish: String,
}

#[derive(Deserialize)]
pub struct BreakdownQuery {
    pub city: String,
    pub dish: String,
    pub app: String,
}

#[derive(Deserialize)]
pub struct RangeQuery {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub limit: Option<usize>,
}

#[derive(Deserialize)]
pub struct AveragesQuery {
    pub group: Option<Grouping>,
}

// ============================================================================
// Handlers
// ============================================================================

pub type AppState = Arc<AnalyticsService>;

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(e: AnalyticsError) -> ApiError {
    let status = match &e {
        AnalyticsError::InvalidRange { .. } => StatusCode::BAD_REQUEST,
        AnalyticsError::RecordNotFound { .. } => StatusCode::NOT_FOUND,
        AnalyticsError::EmptyDataset(_) | AnalyticsError::Io(_) | AnalyticsError::Csv(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, Json(ErrorResponse { error: e.to_string() }))
}

/// GET /api/v1/health
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

/// GET /api/v1/stats
pub async fn get_stats(State(service): State<AppState>) -> Json<StatsResponse> {
    let stats = service.stats();
    Json(StatsResponse {
        total_records: stats.total_records,
        skipped_rows: stats.skipped_rows,
        total_cities: stats.total_cities,
        total_dishes: stats.total_dishes,
        total_apps: stats.total_apps,
    })
}

/// GET /api/v1/options
pub async fn get_options(State(service): State<AppState>) -> Json<OptionsResponse> {
    let options = service.options();
    Json(OptionsResponse {
        cities: options.cities,
        dishes: options.dishes,
        apps: options.apps,
    })
}

/// GET /api/v1/comparison?city=X&dish=Y
pub async fn get_comparison(
    State(service): State<AppState>,
    Query(params): Query<SelectionQuery>,
) -> Json<ComparisonResponse> {
    Json(service.comparison(&params.city, &params.dish).into())
}

/// GET /api/v1/breakdown?city=X&dish=Y&app=Z
pub async fn get_breakdown(
    State(service): State<AppState>,
    Query(params): Query<BreakdownQuery>,
) -> Result<Json<BreakdownResponse>, ApiError> {
    service
        .fee_breakdown(&params.city, &params.dish, &params.app)
        .map(|b| Json(b.into()))
        .map_err(api_error)
}

/// GET /api/v1/records?min=N&max=N&limit=N
pub async fn get_records(
    State(service): State<AppState>,
    Query(params): Query<RangeQuery>,
) -> Result<Json<RangeResponse>, ApiError> {
    let (default_min, default_max) = DEFAULT_PRICE_WINDOW;
    let min = params.min.unwrap_or(default_min);
    let max = params.max.unwrap_or(default_max);
    let limit = params.limit.unwrap_or(10);
    service
        .price_range(min, max, limit)
        .map(|m| Json(m.into()))
        .map_err(api_error)
}

/// GET /api/v1/averages?group=city_app|app
pub async fn get_averages(
    State(service): State<AppState>,
    Query(params): Query<AveragesQuery>,
) -> Json<Vec<AverageResponse>> {
    let grouping = params.group.unwrap_or(Grouping::CityApp);
    let response = service
        .averages(grouping)
        .into_iter()
        .map(|(key, group)| AverageResponse {
            city: key.city,
            app: key.app,
            average_final_price: (group.average * 100.0).round() / 100.0,
            records: group.count,
        })
        .collect();
    Json(response)
}

/// GET /api/v1/cheapest/cities
pub async fn get_cheapest_per_city(State(service): State<AppState>) -> Json<Vec<CheapestResponse>> {
    let response = service
        .cheapest_per_city()
        .into_iter()
        .map(|(city, best)| CheapestResponse {
            city: Some(city),
            app: best.app,
            average_final_price: (best.average * 100.0).round() / 100.0,
        })
        .collect();
    Json(response)
}

/// GET /api/v1/cheapest/overall
pub async fn get_overall_cheapest(
    State(service): State<AppState>,
) -> Result<Json<CheapestResponse>, ApiError> {
    service
        .overall_cheapest()
        .map(|best| {
            Json(CheapestResponse {
                city: None,
                app: best.app,
                average_final_price: (best.average * 100.0).round() / 100.0,
            })
        })
        .map_err(api_error)
}

/// GET /api/v1/export?city=X&dish=Y
pub async fn export_csv(
    State(service): State<AppState>,
    Query(params): Query<SelectionQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let export = service
        .export_csv(&params.city, &params.dish)
        .map_err(api_error)?;
    let disposition = format!("attachment; filename=\"{}\"", export.file_name);
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        export.body,
    ))
}

#[cfg(test)]
mod tests {
    use super::super::create_rest_router;
    use super::*;
    use crate::dataset::Dataset;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn app() -> axum::Router {
        let records = vec![
            PriceRecord::new("Pune", "Pizza", "Zomato", 150.0, 30.0, 10.0, 10.0, 200.0),
            PriceRecord::new("Pune", "Pizza", "Swiggy", 150.0, 20.0, 5.0, 5.0, 180.0),
            PriceRecord::new("Delhi", "Biryani", "Zomato", 180.0, 20.0, 10.0, 10.0, 220.0),
            PriceRecord::new("Delhi", "Biryani", "Swiggy", 160.0, 20.0, 10.0, 10.0, 200.0),
        ];
        let service = AnalyticsService::new(Dataset::from_records(records).unwrap());
        create_rest_router(Arc::new(service))
    }

    async fn get(uri: &str) -> (StatusCode, String) {
        let response = app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = get("/api/v1/health").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("ok"));
    }

    #[tokio::test]
    async fn test_comparison_tags() {
        let (status, body) = get("/api/v1/comparison?city=Pune&dish=Pizza").await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        let rows = json["rows"].as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1]["app"], "Swiggy");
        assert_eq!(rows[1]["tag"], "Cheaper");
        assert_eq!(rows[0]["tag"], "Costly");
    }

    #[tokio::test]
    async fn test_inverted_range_is_bad_request() {
        let (status, body) = get("/api/v1/records?min=300&max=100").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("invalid price range"));
    }

    #[tokio::test]
    async fn test_default_window() {
        let (status, body) = get("/api/v1/records").await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["min"], 100.0);
        assert_eq!(json["max"], 300.0);
        assert_eq!(json["total_matches"], 4);
    }

    #[tokio::test]
    async fn test_missing_breakdown_is_not_found() {
        let (status, _) = get("/api/v1/breakdown?city=Pune&dish=Biryani&app=Zomato").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = get("/api/v1/breakdown?city=Pune&dish=Pizza&app=Zomato").await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["delivery_share"], 60.0);
    }

    #[tokio::test]
    async fn test_averages_by_app() {
        let (_, body) = get("/api/v1/averages?group=app").await;
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        let groups = json.as_array().unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0]["app"], "Swiggy");
        assert_eq!(groups[0]["average_final_price"], 190.0);
        assert!(groups[0]["city"].is_null());
    }

    #[tokio::test]
    async fn test_cheapest_endpoints() {
        let (_, body) = get("/api/v1/cheapest/overall").await;
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["app"], "Swiggy");

        let (_, body) = get("/api/v1/cheapest/cities").await;
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json.as_array().unwrap().len(), 2);
        assert_eq!(json[0]["city"], "Delhi");
    }

    #[tokio::test]
    async fn test_export_attachment() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/export?city=Pune&dish=Pizza")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let disposition = response.headers()[header::CONTENT_DISPOSITION].to_str().unwrap();
        assert!(disposition.contains("Pune_Pizza_price_comparison.csv"));
    }
}
