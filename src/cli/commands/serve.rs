//! HTTP API server exposing the tools to other systems.

use crate::cli::Output;
use crate::error::KlippError;
use crate::tools::{definitions, find_definition, ToolRegistry};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

/// Shared application state.
struct AppState {
    registry: ToolRegistry,
}

/// Run the HTTP API server.
pub async fn run_serve(host: &str, port: u16, registry: ToolRegistry) -> anyhow::Result<()> {
    let app = router(registry);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("HTTP API listening on {}", addr);

    Output::header("Klipp API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("List tools", "GET  /tools");
    Output::kv("Describe tool", "GET  /tools/{name}");
    Output::kv("Call tool", "POST /tools/{name}");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the API router.
fn router(registry: ToolRegistry) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/tools", get(list_tools))
        .route("/tools/{name}", get(describe_tool).post(call_tool))
        .layer(cors)
        .with_state(Arc::new(AppState { registry }))
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Serialize)]
struct CallResponse {
    tool: String,
    summary: String,
    result: Value,
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(ErrorResponse { error: message })).into_response()
}

/// HTTP status for a failed tool call.
fn status_for(err: &KlippError) -> StatusCode {
    match err {
        KlippError::UnknownTool(_) | KlippError::ModelNotFound(_) => StatusCode::NOT_FOUND,
        e if e.is_client_error() => StatusCode::BAD_REQUEST,
        KlippError::Provider(_) | KlippError::Api { .. } | KlippError::Http(_) => {
            StatusCode::BAD_GATEWAY
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn list_tools() -> impl IntoResponse {
    Json(serde_json::json!({ "tools": definitions() }))
}

async fn describe_tool(Path(name): Path<String>) -> Response {
    match find_definition(&name) {
        Some(def) => Json(def).into_response(),
        None => error_response(StatusCode::NOT_FOUND, format!("Unknown tool: {}", name)),
    }
}

async fn call_tool(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    body: Option<Json<Value>>,
) -> Response {
    let arguments = body.map(|Json(value)| value);
    match state.registry.call(&name, arguments).await {
        Ok(output) => Json(CallResponse {
            tool: name,
            summary: output.summary,
            result: output.structured,
        })
        .into_response(),
        Err(e) => {
            let status = status_for(&e);
            if status.is_server_error() {
                warn!("Tool {} failed: {}", name, e);
            }
            error_response(status, e.to_string())
        }
    }
}
