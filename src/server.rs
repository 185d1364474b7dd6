//! The HTTP surface: one `GET /extract` route behind an API-key gate.

use crate::config::AppConfig;
use crate::extract_and_enrich;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use log::{error, info, warn};
use reqwest::Client;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

/// Shared per-process state: configuration plus the outbound HTTP client.
pub struct AppState {
    pub config: AppConfig,
    pub client: Client,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/extract", get(extract_handler))
        .with_state(state)
}

/// Why the gate rejected a request, mapped to a status code and a
/// caller-safe message.
#[derive(Debug)]
enum GateRejection {
    MissingServerKey,
    BadApiKey,
    MissingUrl,
}

impl GateRejection {
    fn status(&self) -> StatusCode {
        match self {
            GateRejection::MissingServerKey => StatusCode::INTERNAL_SERVER_ERROR,
            GateRejection::BadApiKey => StatusCode::UNAUTHORIZED,
            GateRejection::MissingUrl => StatusCode::BAD_REQUEST,
        }
    }

    fn message(&self) -> &'static str {
        match self {
            GateRejection::MissingServerKey => "Server configuration error: API key missing.",
            GateRejection::BadApiKey => "Unauthorized: Invalid or missing API key.",
            GateRejection::MissingUrl => "URL is required",
        }
    }
}

/// Validate the request before any expensive work happens.
///
/// Checks run in order: server key configured, caller key matches,
/// `url` parameter present. The first failure short-circuits.
fn gate(
    config: &AppConfig,
    headers: &HeaderMap,
    params: &HashMap<String, String>,
) -> Result<String, GateRejection> {
    let requested_url = params.get("url").map(String::as_str).unwrap_or("");

    let Some(expected_key) = config.api_key.as_deref() else {
        error!("API key not configured on the server; rejecting request for {:?}", requested_url);
        return Err(GateRejection::MissingServerKey);
    };

    let caller_key = headers
        .get("x-api-key")
        .and_then(|value| value.to_str().ok());
    if caller_key != Some(expected_key) {
        warn!(
            "Unauthorized access attempt for {:?} with key {:?}",
            requested_url, caller_key
        );
        return Err(GateRejection::BadApiKey);
    }

    if requested_url.is_empty() {
        warn!("Request with no url parameter");
        return Err(GateRejection::MissingUrl);
    }

    Ok(requested_url.to_string())
}

fn error_body(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({"success": false, "error": message}))).into_response()
}

async fn extract_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let url = match gate(&state.config, &headers, &params) {
        Ok(url) => url,
        Err(rejection) => return error_body(rejection.status(), rejection.message()),
    };

    info!("Extracting recipe from {}", url);
    match extract_and_enrich(&state.client, &state.config, &url).await {
        Ok(recipe) => (StatusCode::OK, Json(recipe)).into_response(),
        Err(e) => {
            error!("Extraction failed for {}: {}", url, e);
            error_body(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
        }
    }
}
