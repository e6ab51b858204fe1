//! Frame Solver HTTP Server

use anyhow::Context;
use axum::{
    extract::Json,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};

use frame_solver::prelude::*;

const DEFAULT_ADDR: &str = "0.0.0.0:8086";

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

#[derive(Debug, Deserialize)]
struct AnalysisRequest {
    model: Model,
    /// Combinations to analyze; all (after the tag filter) when omitted
    #[serde(default)]
    combinations: Option<Vec<String>>,
    #[serde(default)]
    options: Option<AnalysisOptions>,
}

#[derive(Debug, Deserialize)]
struct ValidateRequest {
    model: Model,
}

#[derive(Debug, Serialize)]
struct ValidateResponse {
    valid: bool,
    errors: Vec<ValidationError>,
}

#[derive(Debug, Serialize)]
struct AnalysisResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    validation_errors: Vec<ValidationError>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    results: Vec<AnalysisResult>,
}

impl AnalysisResponse {
    fn failure(error: impl ToString, validation_errors: Vec<ValidationError>) -> Self {
        Self {
            success: false,
            error: Some(error.to_string()),
            validation_errors,
            results: Vec::new(),
        }
    }
}

async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn validate(Json(request): Json<ValidateRequest>) -> impl IntoResponse {
    let errors = request.model.validate().err().unwrap_or_default();
    Json(ValidateResponse {
        valid: errors.is_empty(),
        errors,
    })
}

async fn analyze(Json(request): Json<AnalysisRequest>) -> impl IntoResponse {
    // Solving is CPU bound; keep it off the async workers
    match tokio::task::spawn_blocking(move || run_analysis(request)).await {
        Ok(Ok(results)) => (
            StatusCode::OK,
            Json(AnalysisResponse {
                success: results.iter().all(|r| r.success),
                error: None,
                validation_errors: Vec::new(),
                results,
            }),
        ),
        Ok(Err(FrameError::InvalidModel(errors))) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(AnalysisResponse::failure(
                format!("model failed validation with {} error(s)", errors.len()),
                errors,
            )),
        ),
        Ok(Err(e)) => (
            StatusCode::BAD_REQUEST,
            Json(AnalysisResponse::failure(e, Vec::new())),
        ),
        Err(e) => {
            error!("analysis task failed: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(AnalysisResponse::failure(e, Vec::new())),
            )
        }
    }
}

fn run_analysis(request: AnalysisRequest) -> FrameResult<Vec<AnalysisResult>> {
    let model = request.model;
    let options = request.options.unwrap_or_default();
    let analyzer = Analyzer::new(&model, options)?;

    let results = match request.combinations {
        Some(names) => names.iter().map(|name| analyzer.analyze(name)).collect(),
        None => analyzer.analyze_all(),
    };

    info!(
        "analyzed {} combination(s) on {} nodes / {} members",
        results.len(),
        model.nodes.len(),
        model.members.len()
    );

    Ok(results)
}

fn app() -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/api/v1/validate", post(validate))
        .route("/api/v1/analyze", post(analyze))
        .layer(cors)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let addr: SocketAddr = std::env::var("FRAME_SERVER_ADDR")
        .unwrap_or_else(|_| DEFAULT_ADDR.to_string())
        .parse()
        .context("FRAME_SERVER_ADDR must be a socket address like 0.0.0.0:8086")?;

    info!("Frame Solver Server listening on http://{addr}");
    info!("  Health check: GET  /health");
    info!("  Validation:   POST /api/v1/validate");
    info!("  Analysis:     POST /api/v1/analyze");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    axum::serve(listener, app()).await?;

    Ok(())
}
