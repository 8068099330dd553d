//! `/api/v1` gateway routes.
//!
//! Every response is a JSON envelope: `{"status": "success", ...}` on success
//! and `{"status": "error", "message": ...}` on failure, with the same status
//! codes as the `/convert` routes. The TOON routes share the `/convert` codec.
//!
//! | Method | Path | Body | Success fields |
//! |---|---|---|---|
//! | GET | `/api/v1/health` | none | `status: "UP"`, `timestamp`, `port`, `service` |
//! | POST | `/api/v1/toon/json-to-toon` | JSON value | `toon` |
//! | POST | `/api/v1/toon/toon-to-json` | `{"toon": "..."}` | `json` |
//! | POST | `/api/v1/base64/encode-text` | `{"text": "..."}` | `message`, `data` |
//! | POST | `/api/v1/base64/decode-text` | `{"base64": "..."}` | `message`, `data` |
//! | POST | `/api/v1/base64/encode-file` | multipart, `file` part | `message`, `filename`, `data` |
//! | POST | `/api/v1/base64/decode-file` | `{"base64": "...", "filename"?: "..."}` | raw bytes |

use axum::body::Bytes;
use axum::extract::{Multipart, State};
use axum::http::{header, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::{ApiError, ServiceError};
use crate::routes::{decode, encode, json_body, toon_field, AppState};

pub const SERVICE_NAME: &str = "toon-service";

const DEFAULT_FILENAME: &str = "decoded.bin";
const MISSING_TEXT: &str = "Missing 'text' in body";
const MISSING_BASE64: &str = "Missing 'base64' in body";
const MISSING_FILE: &str = "Missing 'file' part in body";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/toon/json-to-toon", post(json_to_toon))
        .route("/toon/toon-to-json", post(toon_to_json))
        .route("/base64/encode-text", post(encode_text))
        .route("/base64/decode-text", post(decode_text))
        .route("/base64/encode-file", post(encode_file))
        .route("/base64/decode-file", post(decode_file))
}

#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
    timestamp: String,
    port: u16,
    service: &'static str,
}

async fn health(State(state): State<AppState>) -> Json<Health> {
    Json(Health {
        status: "UP",
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        port: state.port,
        service: SERVICE_NAME,
    })
}

// ============================================================================
// TOON
// ============================================================================

async fn json_to_toon(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let toon = encode(&state, &json_body(&body)?)?;
    Ok(Json(json!({ "status": "success", "toon": toon })))
}

async fn toon_to_json(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let value = decode(&state, &toon_field(&body)?)?;
    Ok(Json(json!({ "status": "success", "json": value })))
}

// ============================================================================
// Base64
// ============================================================================

/// Success envelope shared by the Base64 routes.
#[derive(Debug, Serialize)]
struct Encoded {
    status: &'static str,
    message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    filename: Option<String>,
    data: String,
}

impl Encoded {
    fn new(message: &'static str, data: String) -> Self {
        Self {
            status: "success",
            message,
            filename: None,
            data,
        }
    }
}

async fn encode_text(body: Bytes) -> Result<Json<Encoded>, ApiError> {
    let text = string_field(&body, "text")?.ok_or(ServiceError::MissingInput(MISSING_TEXT))?;
    Ok(Json(Encoded::new("Encoded text to Base64", STANDARD.encode(text))))
}

async fn decode_text(body: Bytes) -> Result<Json<Encoded>, ApiError> {
    let encoded =
        string_field(&body, "base64")?.ok_or(ServiceError::MissingInput(MISSING_BASE64))?;
    let text = String::from_utf8(STANDARD.decode(encoded)?)?;
    Ok(Json(Encoded::new("Decoded Base64 to text", text)))
}

async fn encode_file(mut multipart: Multipart) -> Result<Json<Encoded>, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().map(str::to_string);
        let bytes = field.bytes().await?;
        tracing::debug!(filename = ?filename, bytes = bytes.len(), "encoding upload");
        return Ok(Json(Encoded {
            filename,
            ..Encoded::new("Encoded file to Base64", STANDARD.encode(&bytes))
        }));
    }
    Err(ServiceError::MissingInput(MISSING_FILE).into())
}

async fn decode_file(body: Bytes) -> Result<Response, ApiError> {
    let mut envelope = request_object(&body)?;
    let encoded = take_string(&mut envelope, "base64")
        .ok_or(ServiceError::MissingInput(MISSING_BASE64))?;
    let filename = take_string(&mut envelope, "filename");
    let bytes = STANDARD.decode(encoded)?;
    Ok((
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/octet-stream"),
            ),
            (
                header::CONTENT_DISPOSITION,
                content_disposition(filename.as_deref()),
            ),
        ],
        bytes,
    )
        .into_response())
}

fn request_object(body: &[u8]) -> Result<Value, ServiceError> {
    Ok(serde_json::from_slice(body)?)
}

/// String field `name` of a JSON request body; `None` when absent or not a string.
fn string_field(body: &[u8], name: &str) -> Result<Option<String>, ServiceError> {
    Ok(take_string(&mut request_object(body)?, name))
}

fn take_string(envelope: &mut Value, name: &str) -> Option<String> {
    match envelope.get_mut(name).map(Value::take) {
        Some(Value::String(value)) => Some(value),
        _ => None,
    }
}

/// `attachment; filename="..."`, keeping only printable ASCII that needs no
/// escaping inside the quoted string.
fn content_disposition(filename: Option<&str>) -> HeaderValue {
    let safe: String = filename
        .unwrap_or(DEFAULT_FILENAME)
        .chars()
        .filter(|c| (c.is_ascii_graphic() || *c == ' ') && *c != '"' && *c != '\\')
        .collect();
    let safe = if safe.trim().is_empty() {
        DEFAULT_FILENAME
    } else {
        safe.as_str()
    };
    HeaderValue::from_str(&format!("attachment; filename=\"{safe}\""))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}
