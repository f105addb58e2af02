mod api;
mod categories;
mod classify;
mod enhance;
mod report;
mod services;
mod summarize;

use std::env;
use std::sync::Arc;

use dotenv::dotenv;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::classify::SentenceClassifier;
use crate::enhance::ReportEnhancer;
use crate::report::CategoryAggregator;
use crate::services::{ModelSidecar, OpenRouterClient, Summarizer};

#[derive(OpenApi)]
#[openapi(
    paths(api::classify, api::analyze, api::generate_full_report),
    components(
        schemas(
            api::ClassifyRequest,
            api::AnalyzeRequest,
            api::FullReportRequest,
            api::AnalyzeResponse,
            api::FullReportResponse,
            crate::classify::Classification,
            crate::report::CategoryReport,
            crate::enhance::EnhancedCategoryReport
        )
    ),
    tags(
        (name = "feedback", description = "Citizen feedback classification and reporting API")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let sidecar_url =
        env::var("MODEL_SIDECAR_URL").unwrap_or_else(|_| "http://localhost:8000".to_string());
    let openrouter_url = env::var("OPENROUTER_BASE_URL")
        .unwrap_or_else(|_| "https://openrouter.ai/api/v1".to_string());
    let api_key = env::var("OPENROUTER_API_KEY").unwrap_or_else(|_| {
        warn!("OPENROUTER_API_KEY not set, full-report enhancement will use fallbacks");
        String::new()
    });
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(5000);

    let sidecar = Arc::new(ModelSidecar::new(sidecar_url)?);
    let summarizer: Arc<dyn Summarizer> = sidecar.clone();
    let classifier = Arc::new(SentenceClassifier::new(sidecar.clone(), summarizer.clone()));
    let chat = Arc::new(OpenRouterClient::new(openrouter_url, api_key)?);

    let state = Arc::new(api::AppState {
        classifier: classifier.clone(),
        aggregator: CategoryAggregator::new(classifier, summarizer),
        enhancer: ReportEnhancer::new(chat),
    });

    let app = api::router(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
