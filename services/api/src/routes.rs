use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{header, Method};
use axum::routing::get;
use axum::{Json, Router};
use insights::{analyze, filter_by_rating, AnalysisResult};
use review_core::{normalize_batch, Review};
use review_source::{fetch_app_or_placeholder, fetch_reviews, FetchQuery, ReviewSource, SortMode, SourceError};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::AppConfig;
use crate::error::ApiError;

const ANALYSE_DEFAULT_COUNT: usize = 200;
const REVIEWS_DEFAULT_COUNT: usize = 40;
const REVIEWS_MAX_COUNT: usize = 200;

pub struct AppState<S> {
    pub source: Arc<S>,
    pub config: Arc<AppConfig>,
}

impl<S> AppState<S> {
    pub fn new(source: S, config: AppConfig) -> Self {
        Self { source: Arc::new(source), config: Arc::new(config) }
    }
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self { Self { source: self.source.clone(), config: self.config.clone() } }
}

/// Query string shared by both endpoints. Values are parsed leniently: anything
/// unparsable falls back to the default.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewQuery {
    pub app_id: Option<String>,
    pub count: Option<String>,
    pub rating: Option<String>,
    pub sort: Option<String>,
}

impl ReviewQuery {
    fn app_id(&self) -> Result<String, ApiError> {
        self.app_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .ok_or(ApiError::MissingAppId)
    }

    fn count(&self, default: usize, cap: usize) -> usize {
        self.count
            .as_deref()
            .and_then(|c| c.trim().parse::<usize>().ok())
            .filter(|c| *c > 0)
            .unwrap_or(default)
            .min(cap)
    }

    /// 0 means every rating
    fn rating(&self) -> u8 {
        self.rating
            .as_deref()
            .and_then(|r| r.trim().parse::<u8>().ok())
            .filter(|r| (1..=5).contains(r))
            .unwrap_or(0)
    }

    fn sort(&self) -> SortMode {
        self.sort.as_deref().and_then(|s| s.parse().ok()).unwrap_or_default()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewsResponse {
    pub app_id: String,
    pub app_name: String,
    pub app_icon: Option<String>,
    pub app_rating: Option<f64>,
    pub total_reviews: Option<u64>,
    pub fetched_count: usize,
    pub reviews: Vec<Review>,
}

pub fn router<S: ReviewSource + 'static>(state: AppState<S>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/analyse", get(analyse::<S>))
        .route("/api/reviews", get(reviews::<S>))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// GET /api/analyse?appId=..&count=..&rating=..&sort=..
async fn analyse<S: ReviewSource>(
    State(state): State<AppState<S>>,
    Query(q): Query<ReviewQuery>,
) -> Result<Json<AnalysisResult>, ApiError> {
    let app_id = q.app_id()?;
    let count = q.count(ANALYSE_DEFAULT_COUNT, state.config.source.max_reviews);
    info!("GET /api/analyse appId={} count={} rating={}", app_id, count, q.rating());

    let locale = state.config.locale();
    let app = fetch_app_or_placeholder(state.source.as_ref(), &app_id, &locale).await;

    let query = FetchQuery {
        locale,
        sort: q.sort(),
        page_size: state.config.source.page_size,
        ..FetchQuery::new(app_id.clone(), count)
    };
    let raw = fetch_reviews(state.source.as_ref(), &query).await.map_err(|e| {
        error!("Review fetch failed for {}: {}", app_id, e);
        ApiError::Upstream(e.to_string())
    })?;

    let reviews = filter_by_rating(normalize_batch(raw), q.rating());
    if reviews.is_empty() {
        return Err(ApiError::NoReviews(app_id));
    }

    Ok(Json(analyze(&app_id, &app, reviews, &state.config.analysis)))
}

/// GET /api/reviews?appId=..&count=..&rating=..&sort=.. (raw batch, no analysis)
async fn reviews<S: ReviewSource>(
    State(state): State<AppState<S>>,
    Query(q): Query<ReviewQuery>,
) -> Result<Json<ReviewsResponse>, ApiError> {
    let app_id = q.app_id()?;
    let count = q.count(REVIEWS_DEFAULT_COUNT, REVIEWS_MAX_COUNT);
    info!("GET /api/reviews appId={} count={}", app_id, count);

    let locale = state.config.locale();
    let app = fetch_app_or_placeholder(state.source.as_ref(), &app_id, &locale).await;

    let rating = q.rating();
    let query = FetchQuery {
        locale,
        sort: q.sort(),
        rating: (rating > 0).then_some(rating),
        ..FetchQuery::new(app_id.clone(), count)
    };
    let raw = fetch_reviews(state.source.as_ref(), &query).await.map_err(|e| {
        error!("[reviews] error: {}", e);
        match e {
            SourceError::AppNotFound(_) => ApiError::AppNotFound(app_id.clone()),
            SourceError::RateLimited => ApiError::RateLimited,
            other => ApiError::Upstream(format!("Failed to fetch reviews. {}", other)),
        }
    })?;
    let reviews = normalize_batch(raw);

    Ok(Json(ReviewsResponse {
        app_name: app.title.unwrap_or_else(|| app_id.clone()),
        app_icon: app.icon,
        app_rating: app.score,
        total_reviews: app.ratings_count,
        fetched_count: reviews.len(),
        reviews,
        app_id,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use review_core::{AppInfo, RawReview, RawTimestamp};
    use review_source::MemorySource;
    use tower::ServiceExt;

    fn raw(score: i64, text: &str) -> RawReview {
        RawReview {
            score,
            content: Some(text.to_string()),
            at: Some(RawTimestamp::Text("2026-10-01T10:00:00Z".into())),
            ..Default::default()
        }
    }

    fn app(source: MemorySource) -> Router { router(AppState::new(source, AppConfig::default())) }

    async fn get_json(router: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let resp = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null))
    }

    #[tokio::test]
    async fn test_health() {
        let resp = app(MemorySource::default())
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_app_id_is_bad_request() {
        let (status, body) = get_json(app(MemorySource::default()), "/api/analyse").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "appId is required");
        let (status, _) = get_json(app(MemorySource::default()), "/api/analyse?appId=%20").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_no_reviews_is_not_found() {
        let (status, body) = get_json(app(MemorySource::default()), "/api/analyse?appId=com.example").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "No reviews found for com.example");
    }

    #[tokio::test]
    async fn test_fetch_failure_is_server_error() {
        let source = MemorySource::new(vec![raw(5, "fine")]).failing("connection reset");
        let (status, body) = get_json(app(source), "/api/analyse?appId=com.example").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("connection reset"));
    }

    #[tokio::test]
    async fn test_analyse_with_placeholder_metadata() {
        let source = MemorySource::new(vec![
            raw(1, "Payment failed, terrible experience, please fix the payment issue"),
            raw(5, "Smooth and fast checkout every single time"),
            raw(5, "Love it"),
        ]);
        let (status, body) = get_json(app(source), "/api/analyse?appId=com.example&count=abc").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["appName"], "com.example");
        assert!(body["appIcon"].is_null());
        assert_eq!(body["analysed"], 3);
        assert_eq!(body["sentiment"], "positive");
        assert_eq!(body["topIssues"][0]["phrase"], "payment");
        assert!(body["themeBreakdown"]["payments"]["negative"].as_u64().unwrap() >= 1);
        assert_eq!(body["reviews"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_rating_filter_applies_before_analysis() {
        let source = MemorySource::new(vec![raw(1, "bad"), raw(5, "good"), raw(5, "good")])
            .with_app(AppInfo { title: Some("Example".into()), ..Default::default() });
        let (status, body) = get_json(app(source), "/api/analyse?appId=com.example&rating=5").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["appName"], "Example");
        assert_eq!(body["analysed"], 2);
        assert_eq!(body["negative"], 0);

        let source = MemorySource::new(vec![raw(1, "bad")]);
        let (status, _) = get_json(app(source), "/api/analyse?appId=com.example&rating=4").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_count_caps_batch() {
        let batch: Vec<RawReview> = (0..30).map(|i| raw(i % 5 + 1, "")).collect();
        let (_, body) = get_json(app(MemorySource::new(batch.clone())), "/api/analyse?appId=x&count=12").await;
        assert_eq!(body["analysed"], 12);
        let (_, body) = get_json(app(MemorySource::new(batch)), "/api/reviews?appId=x").await;
        assert_eq!(body["fetchedCount"], 30);
    }

    #[tokio::test]
    async fn test_reviews_passthrough() {
        let source = MemorySource::new(vec![raw(2, "slow"), raw(4, "nice")]);
        let (status, body) = get_json(app(source), "/api/reviews?appId=com.example&rating=4").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["fetchedCount"], 1);
        assert_eq!(body["reviews"][0]["score"], 4);
        assert_eq!(body["reviews"][0]["date"], "2026-10-01T10:00:00.000Z");
    }

    #[tokio::test]
    async fn test_reviews_unknown_app_is_not_found() {
        let source = MemorySource::new(vec![raw(5, "fine")]).app_not_found();
        let (status, body) = get_json(app(source), "/api/reviews?appId=com.missing").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "App \"com.missing\" not found on Google Play.");
    }

    #[tokio::test]
    async fn test_reviews_rate_limit_is_too_many_requests() {
        let source = MemorySource::new(vec![raw(5, "fine")]).rate_limited();
        let (status, body) = get_json(app(source), "/api/reviews?appId=com.example").await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body["error"], "Google Play rate limit hit. Please wait a moment and try again.");

        let source = MemorySource::new(vec![raw(5, "fine")]).failing("socket closed");
        let (status, body) = get_json(app(source), "/api/reviews?appId=com.example").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to fetch reviews. Review source unavailable: socket closed");
    }

    #[tokio::test]
    async fn test_analyse_reports_provider_errors_as_server_error() {
        let source = MemorySource::new(vec![raw(5, "fine")]).rate_limited();
        let (status, body) = get_json(app(source), "/api/analyse?appId=com.example").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Review source rate limit hit");
    }

    #[test]
    fn test_query_parsing() {
        let q = ReviewQuery {
            app_id: Some(" com.example ".into()),
            count: Some("999999".into()),
            rating: Some("7".into()),
            sort: Some("rating".into()),
        };
        assert_eq!(q.app_id().unwrap(), "com.example");
        assert_eq!(q.count(200, 200_000), 200_000);
        assert_eq!(q.rating(), 0);
        assert_eq!(q.sort(), SortMode::Rating);
        assert_eq!(ReviewQuery::default().count(40, 200), 40);
        assert_eq!(ReviewQuery::default().sort(), SortMode::Newest);
    }
}
