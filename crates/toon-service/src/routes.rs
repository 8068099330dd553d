//! HTTP routes: health check and the two conversion endpoints.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use toon_core::{Codec, ToonError};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::ServiceError;
use crate::v1;

const MISSING_JSON: &str = "Missing JSON data in body";
const MISSING_TOON: &str = "Missing 'toon' data in body";

/// Shared, immutable request state.
#[derive(Clone)]
pub struct AppState {
    pub codec: Arc<dyn Codec>,
    /// Listening port, reported by `/api/v1/health`.
    pub port: u16,
}

impl AppState {
    pub fn new(codec: impl Codec + 'static) -> Self {
        Self {
            codec: Arc::new(codec),
            port: 0,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }
}

pub fn router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/convert/json-to-toon", post(json_to_toon))
        .route("/convert/toon-to-json", post(toon_to_json))
        .nest("/api/v1", v1::routes())
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "message": "Toon microservice running" }))
}

async fn json_to_toon(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, ServiceError> {
    let value = json_body(&body)?;
    let toon = encode(&state, &value)?;
    Ok(([(header::CONTENT_TYPE, state.codec.content_type())], toon).into_response())
}

async fn toon_to_json(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, ServiceError> {
    let value = if is_json_content(&headers) {
        decode(&state, &toon_field(&body)?)?
    } else {
        if is_blank(&body) {
            return Err(ServiceError::MissingInput(MISSING_TOON));
        }
        let text = std::str::from_utf8(&body)
            .map_err(|err| ServiceError::decode_failed(utf8_error(&body, err)))?;
        decode(&state, text)?
    };
    Ok(Json(value))
}

/// A JSON request body destined for the encoder.
///
/// Non-finite numbers are a codec failure, not malformed JSON.
pub(crate) fn json_body(body: &[u8]) -> Result<Value, ServiceError> {
    let text = match std::str::from_utf8(body) {
        Ok(text) if text.trim().is_empty() => {
            return Err(ServiceError::MissingInput(MISSING_JSON));
        }
        Ok(text) => text,
        Err(_) => return Ok(serde_json::from_slice(body)?),
    };
    toon_core::parse_json(text).map_err(|err| match err {
        ToonError::Json(err) => ServiceError::InvalidJson(err),
        other => ServiceError::encode_failed(other),
    })
}

/// The non-empty `toon` string of a `{"toon": "..."}` request body.
pub(crate) fn toon_field(body: &[u8]) -> Result<String, ServiceError> {
    if is_blank(body) {
        return Err(ServiceError::MissingInput(MISSING_TOON));
    }
    let mut envelope: Value = serde_json::from_slice(body)?;
    match envelope.get_mut("toon").map(Value::take) {
        Some(Value::String(text)) if !text.is_empty() => Ok(text),
        _ => Err(ServiceError::MissingInput(MISSING_TOON)),
    }
}

pub(crate) fn encode(state: &AppState, value: &Value) -> Result<String, ServiceError> {
    let toon = state
        .codec
        .encode(value)
        .map_err(ServiceError::encode_failed)?;
    tracing::debug!(codec = state.codec.name(), bytes = toon.len(), "encoded");
    Ok(toon)
}

pub(crate) fn decode(state: &AppState, text: &str) -> Result<Value, ServiceError> {
    let value = state
        .codec
        .decode(text)
        .map_err(ServiceError::decode_failed)?;
    tracing::debug!(codec = state.codec.name(), bytes = text.len(), "decoded");
    Ok(value)
}

fn is_blank(body: &[u8]) -> bool {
    body.iter().all(u8::is_ascii_whitespace)
}

/// `application/json` or any `+json` media type.
fn is_json_content(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
    else {
        return false;
    };
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json" || essence.ends_with("+json")
}

/// A raw TOON body that is not UTF-8, reported at the first bad byte.
fn utf8_error(body: &[u8], err: std::str::Utf8Error) -> ToonError {
    let valid = &body[..err.valid_up_to()];
    let line_start = valid.iter().rposition(|b| *b == b'\n').map_or(0, |i| i + 1);
    let column = String::from_utf8_lossy(&valid[line_start..]).chars().count() + 1;
    ToonError::Syntax {
        line: valid.iter().filter(|b| **b == b'\n').count() + 1,
        column,
        offset: err.valid_up_to(),
        message: "invalid UTF-8".to_string(),
    }
}
