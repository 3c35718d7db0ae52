//! HTTP surface: the upload form, a JSON variant of it, and a health check.

pub mod render;
pub mod upload;

use crate::adapters::LocalStorage;
use crate::core::etl::VerificationEngine;
use crate::core::pipeline::DocumentPipeline;
use crate::domain::model::VerificationReport;
use crate::utils::error::{ErrorCategory, Result, VerifyError};
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use std::sync::Arc;
use tokio::net::TcpListener;
use upload::UploadForm;

pub type SharedEngine = Arc<VerificationEngine<LocalStorage, DocumentPipeline>>;

#[derive(Clone)]
pub struct AppState {
    engine: SharedEngine,
    max_upload_bytes: usize,
}

impl AppState {
    pub fn new(engine: SharedEngine) -> Self {
        Self {
            engine,
            max_upload_bytes: 0,
        }
    }

    pub fn engine(&self) -> &SharedEngine {
        &self.engine
    }
}

pub fn router(mut state: AppState, max_upload_bytes: usize) -> Router {
    state.max_upload_bytes = max_upload_bytes;
    Router::new()
        .route("/", get(show_form).post(submit_form))
        .route("/api/verify", post(verify_json))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}

/// Serves until Ctrl-C.
pub async fn serve(listener: TcpListener, app: Router) -> Result<()> {
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("❌ Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("🛑 Shutdown signal received");
}

pub fn status_for(error: &VerifyError) -> StatusCode {
    if let VerifyError::UploadTooLargeError { .. } = error {
        return StatusCode::PAYLOAD_TOO_LARGE;
    }
    match error.category() {
        ErrorCategory::UserInput => StatusCode::BAD_REQUEST,
        ErrorCategory::Extraction => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorCategory::Configuration | ErrorCategory::System => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

async fn run_verification(state: &AppState, multipart: Multipart) -> Result<VerificationReport> {
    let form = UploadForm::from_multipart(multipart)
        .await
        .map_err(|e| match e {
            VerifyError::UploadError(inner) if inner.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                VerifyError::UploadTooLargeError {
                    limit_bytes: state.max_upload_bytes,
                }
            }
            other => other,
        })?;
    state.engine.run(form.into_batch()?).await
}

async fn show_form() -> Html<String> {
    Html(render::page(None, None))
}

async fn submit_form(State(state): State<AppState>, multipart: Multipart) -> Response {
    match run_verification(&state, multipart).await {
        Ok(report) => Html(render::page(Some(&report), None)).into_response(),
        Err(e) => {
            if e.category() == ErrorCategory::UserInput {
                tracing::info!("📝 Rejected upload: {}", e);
            } else {
                tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
            }
            let message = e.user_friendly_message();
            (status_for(&e), Html(render::page(None, Some(&message)))).into_response()
        }
    }
}

async fn verify_json(State(state): State<AppState>, multipart: Multipart) -> Response {
    match run_verification(&state, multipart).await {
        Ok(report) => Json(report).into_response(),
        Err(e) => {
            let body = json!({
                "error": e.user_friendly_message(),
                "category": format!("{:?}", e.category()),
            });
            (status_for(&e), Json(body)).into_response()
        }
    }
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let ocr = state.engine.pipeline().extractor().ocr_engine();
    Json(json!({
        "status": "ok",
        "ocr_engine": ocr.name(),
    }))
}
