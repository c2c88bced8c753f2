//! Relay HTTP backend for CloudCraft.
//!
//! Sits between the browser front end and the managed services:
//! `POST /invoke-agent` forwards a prompt to the hosted agent and returns
//! the collected completion, `POST /upload-files` copies a multipart batch
//! into a bucket. `POST /dispatch` runs an action-group event against the
//! local dispatcher for debugging without the agent platform.
//!
//! Built on Axum.

use axum::extract::multipart::MultipartError;
use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, Multipart};
use axum::{
    Router,
    extract::State,
    http::{HeaderValue, Method, StatusCode, header},
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{error, info, warn};

use cloudcraft_actions::Dispatcher;
use cloudcraft_config::AppConfig;
use cloudcraft_core::cloud::{AgentInvocation, collect_completion};
use cloudcraft_core::upload::{UploadBatch, UploadFile, upload_batch};
use cloudcraft_core::{ActionRequest, AgentRuntime, ObjectStore, ResponseEnvelope};

/// Shared application state for the relay.
pub struct RelayState {
    pub config: AppConfig,
    pub runtime: Arc<dyn AgentRuntime>,
    pub storage: Arc<dyn ObjectStore>,
    pub dispatcher: Dispatcher,
}

pub type SharedState = Arc<RelayState>;

/// Build the Axum router with all relay routes.
///
/// Layers applied:
/// - CORS (permissive unless `relay.cors_origins` lists origins)
/// - request body limit of `relay.max_upload_bytes`
/// - HTTP trace logging
pub fn build_router(state: SharedState) -> Router {
    let cors = cors_layer(&state.config.relay.cors_origins);
    let body_limit = state.config.relay.max_upload_bytes;

    Router::new()
        .route("/health", get(health_handler))
        .route("/invoke-agent", post(invoke_agent_handler))
        .route("/upload-files", post(upload_files_handler))
        .route("/dispatch", post(dispatch_handler))
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(3600))
}

/// Start the relay HTTP server and serve until the process exits.
pub async fn start(state: RelayState) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", state.config.relay.host, state.config.relay.port);
    let app = build_router(Arc::new(state));

    info!(addr = %addr, "Relay starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

fn bad_request(message: &str) -> ApiError {
    api_error(StatusCode::BAD_REQUEST, message)
}

/// Keeps axum's status, e.g. 413 once the body limit is hit.
fn multipart_error(err: MultipartError) -> ApiError {
    api_error(err.status(), err.body_text())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvokeAgentRequest {
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InvokeAgentResponse {
    pub response: String,
}

/// `POST /invoke-agent`: send one prompt to the configured agent alias.
async fn invoke_agent_handler(
    State(state): State<SharedState>,
    payload: Result<Json<InvokeAgentRequest>, JsonRejection>,
) -> Result<Json<InvokeAgentResponse>, ApiError> {
    let Json(req) = payload.map_err(|rejection| bad_request(&rejection.body_text()))?;
    let prompt = match req.prompt {
        Some(prompt) if !prompt.is_empty() => prompt,
        _ => return Err(bad_request("Prompt is required")),
    };

    let agent = &state.config.agent;
    let invocation = AgentInvocation {
        agent_id: agent.agent_id.clone(),
        agent_alias_id: agent.agent_alias_id.clone(),
        session_id: req
            .session_id
            .unwrap_or_else(|| agent.default_session_id.clone()),
        input_text: prompt,
    };

    info!(
        session_id = %invocation.session_id,
        prompt_len = invocation.input_text.len(),
        "Invoking agent"
    );

    let completion = match state.runtime.invoke_agent(&invocation).await {
        Ok(stream) => collect_completion(stream).await,
        Err(e) => Err(e),
    };

    match completion {
        Ok(response) => Ok(Json(InvokeAgentResponse { response })),
        Err(e) => {
            error!(session_id = %invocation.session_id, error = %e, "Agent invocation failed");
            Err(api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to get response from agent: {e}"),
            ))
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

/// `POST /upload-files`: multipart `files` (repeated) plus `bucketName`.
async fn upload_files_handler(
    State(state): State<SharedState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError> {
    let mut bucket_name: Option<String> = None;
    let mut files: Vec<UploadFile> = Vec::new();
    let mut saw_files_part = false;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(multipart_error)?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("files") => {
                saw_files_part = true;
                let filename = field.file_name().unwrap_or_default().to_string();
                let body = field.bytes().await.map_err(multipart_error)?;
                files.push(UploadFile::new(filename, body.to_vec()));
            }
            Some("bucketName") => {
                bucket_name = Some(field.text().await.map_err(multipart_error)?);
            }
            _ => {}
        }
    }

    if !saw_files_part {
        return Err(bad_request("No files part in the request"));
    }
    let bucket = match bucket_name {
        Some(bucket) if !bucket.is_empty() => bucket,
        _ => return Err(bad_request("Bucket name is required")),
    };
    if files.first().is_none_or(|f| f.filename.is_empty()) {
        return Err(bad_request("No selected files"));
    }

    info!(bucket = %bucket, files = files.len(), "Uploading files");
    let report = upload_batch(
        state.storage.as_ref(),
        UploadBatch {
            bucket: bucket.clone(),
            files,
        },
    )
    .await;

    if report.is_complete() {
        Ok((
            StatusCode::OK,
            Json(UploadResponse {
                message: format!(
                    "Successfully uploaded {} files to {bucket}.",
                    report.uploaded
                ),
                errors: Vec::new(),
            }),
        ))
    } else {
        error!(bucket = %bucket, failed = report.errors.len(), "Upload completed with errors");
        Ok((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(UploadResponse {
                message: format!("Completed with errors. Uploaded {} files.", report.uploaded),
                errors: report.errors,
            }),
        ))
    }
}

/// `POST /dispatch`: run one action-group event locally.
async fn dispatch_handler(
    State(state): State<SharedState>,
    Json(request): Json<ActionRequest>,
) -> Json<ResponseEnvelope> {
    Json(state.dispatcher.dispatch(&request).await)
}
