use crate::error::RecError;
use crate::models::{Product, RecommendationSource, SalesSummary, UserId};
use crate::services::training::TrainingStatus;
use crate::utils::validation::parse_count;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub const NO_RECOMMENDATIONS: &str = "No recommendations found for this user.";

#[derive(Debug, Deserialize)]
pub struct CountQuery {
    n: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: String,
}

impl<T> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self::with_message(data, "Success")
    }

    fn with_message(data: T, message: &str) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: message.to_string(),
        }
    }

    fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecommendationPayload {
    pub user_id: UserId,
    pub source: RecommendationSource,
    pub recommendations: Vec<Product>,
}

type ApiError = (StatusCode, Json<ApiResponse<()>>);
type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

fn status_for(err: &RecError) -> StatusCode {
    match err {
        RecError::InvalidRequestParameter { .. } => StatusCode::BAD_REQUEST,
        RecError::DataUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        RecError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn api_error(err: RecError) -> ApiError {
    (status_for(&err), Json(ApiResponse::error(err.to_string())))
}

async fn health_check(State(state): State<AppState>) -> Json<ApiResponse<HashMap<String, String>>> {
    let mut status = HashMap::new();
    status.insert("status".to_string(), "healthy".to_string());
    status.insert("service".to_string(), "shoprec".to_string());
    status.insert("version".to_string(), env!("CARGO_PKG_VERSION").to_string());
    status.insert(
        "model".to_string(),
        if state.training_service.current().is_trained() {
            "trained".to_string()
        } else {
            "untrained".to_string()
        },
    );

    Json(ApiResponse::success(status))
}

async fn get_recommendations(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Query(params): Query<CountQuery>,
) -> ApiResult<RecommendationPayload> {
    let n = parse_count(params.n.as_deref(), state.config.recommendation.default_count)
        .map_err(api_error)?;

    let recommendations = state
        .serving_service
        .serve_recommendations(UserId(user_id), n)
        .await
        .map_err(api_error)?;

    let message = if recommendations.is_empty() {
        NO_RECOMMENDATIONS
    } else {
        "Success"
    };

    Ok(Json(ApiResponse::with_message(
        RecommendationPayload {
            user_id: recommendations.user_id,
            source: recommendations.source,
            recommendations: recommendations.products,
        },
        message,
    )))
}

async fn get_popular(
    State(state): State<AppState>,
    Query(params): Query<CountQuery>,
) -> ApiResult<Vec<Product>> {
    let n = parse_count(params.n.as_deref(), state.config.recommendation.default_count)
        .map_err(api_error)?;

    let products = state.serving_service.serve_popular(n).await.map_err(api_error)?;
    Ok(Json(ApiResponse::success(products)))
}

async fn retrain(State(state): State<AppState>) -> ApiResult<TrainingStatus> {
    let status = state.training_service.retrain().await.map_err(api_error)?;
    Ok(Json(ApiResponse::success(status)))
}

async fn get_training_status(State(state): State<AppState>) -> Json<ApiResponse<TrainingStatus>> {
    Json(ApiResponse::success(state.training_service.status()))
}

async fn get_sales_summary(State(state): State<AppState>) -> ApiResult<Vec<SalesSummary>> {
    let summaries = state.sales_store.sales_summaries().await.map_err(api_error)?;
    Ok(Json(ApiResponse::success(summaries)))
}

async fn get_stats(State(state): State<AppState>) -> Json<ApiResponse<HashMap<String, u64>>> {
    Json(ApiResponse::success(state.serving_service.get_serving_stats()))
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/recommendations/:user_id", get(get_recommendations))
        .route("/popular", get(get_popular))
        .route("/admin/retrain", post(retrain))
        .route("/admin/status", get(get_training_status))
        .route("/sales/summary", get(get_sales_summary))
        .route("/stats", get(get_stats))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
