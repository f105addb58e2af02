//! HTTP surface: request/response types and the three route handlers.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::classify::{Classification, SentenceClassifier};
use crate::enhance::{EnhancedCategoryReport, ReportEnhancer};
use crate::report::{CategoryAggregator, CategoryReport};

pub struct AppState {
    pub classifier: Arc<SentenceClassifier>,
    pub aggregator: CategoryAggregator,
    pub enhancer: ReportEnhancer,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ClassifyRequest {
    #[serde(default)]
    pub sentence: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub sentences: Vec<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct FullReportRequest {
    #[serde(default)]
    pub feedback: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AnalyzeResponse {
    pub report: BTreeMap<String, CategoryReport>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FullReportResponse {
    pub report: BTreeMap<String, EnhancedCategoryReport>,
}

/// JSON error body with a status code; internal detail is limited to the
/// error's display message.
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.to_string(),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

#[utoipa::path(
    post,
    path = "/classify",
    request_body = ClassifyRequest,
    responses(
        (status = 200, description = "Sentiment, topic and category for one sentence", body = Classification),
        (status = 400, description = "Empty or missing sentence")
    ),
    tag = "feedback"
)]
pub async fn classify(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ClassifyRequest>,
) -> Result<Json<Classification>, ApiError> {
    if req.sentence.is_empty() {
        return Err(ApiError::bad_request("No sentence provided"));
    }
    let result = state.classifier.classify(&req.sentence).await?;
    Ok(Json(result))
}

#[utoipa::path(
    post,
    path = "/analyze",
    request_body = AnalyzeRequest,
    responses(
        (status = 200, description = "Category-wise sentiment report", body = AnalyzeResponse),
        (status = 400, description = "Empty or missing sentence list")
    ),
    tag = "feedback"
)]
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    if req.sentences.is_empty() {
        return Err(ApiError::bad_request("No sentences provided"));
    }
    let report = state.aggregator.generate(&req.sentences).await?;
    Ok(Json(AnalyzeResponse { report }))
}

#[utoipa::path(
    post,
    path = "/generate-full-report",
    request_body = FullReportRequest,
    responses(
        (status = 200, description = "Chat-model-polished category report", body = FullReportResponse),
        (status = 400, description = "Empty or missing feedback list"),
        (status = 500, description = "Report generation failed")
    ),
    tag = "feedback"
)]
pub async fn generate_full_report(
    State(state): State<Arc<AppState>>,
    Json(req): Json<FullReportRequest>,
) -> Result<Json<FullReportResponse>, ApiError> {
    if req.feedback.is_empty() {
        return Err(ApiError::bad_request("No feedback provided"));
    }
    let report = state.aggregator.generate(&req.feedback).await?;
    let enhanced = state.enhancer.enhance(&report).await;
    Ok(Json(FullReportResponse { report: enhanced }))
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/classify", post(classify))
        .route("/analyze", post(analyze))
        .route("/generate-full-report", post(generate_full_report))
        .with_state(state)
}
