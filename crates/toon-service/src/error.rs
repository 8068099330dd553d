//! Service error taxonomy and its HTTP mapping.
//!
//! Request errors (`MissingInput`, `InvalidJson`, bad Base64) are the caller's
//! fault and map to 400. Codec failures map to 500 and carry the codec's error
//! kind, message and position so the caller can see exactly what was rejected.
//!
//! The same errors render two ways: [`ServiceError`] itself as the
//! `{error, kind, details, line, column}` envelope of the `/convert` routes,
//! and [`ApiError`] as the `{status: "error", message}` envelope of `/api/v1`.

use std::net::SocketAddr;

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use toon_core::ToonError;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request body (or its `toon` field) was absent or empty.
    #[error("{0}")]
    MissingInput(&'static str),

    /// The request body should have been JSON and was not.
    #[error("invalid JSON in request body: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Invalid Base64 input: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("Decoded Base64 is not valid UTF-8 text")]
    NotUtf8(#[from] std::string::FromUtf8Error),

    /// A multipart upload could not be read.
    #[error("Failed to read upload: {0}")]
    Upload(#[from] MultipartError),

    /// The codec rejected the input. `context` names the conversion.
    #[error("{context}: {source}")]
    Codec {
        context: &'static str,
        #[source]
        source: ToonError,
    },

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("server failed: {0}")]
    Serve(#[source] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ServiceError {
    pub const ENCODE_FAILED: &'static str = "Failed to convert JSON to TOON";
    pub const DECODE_FAILED: &'static str = "Failed to convert TOON to JSON";

    pub fn encode_failed(source: ToonError) -> Self {
        ServiceError::Codec {
            context: Self::ENCODE_FAILED,
            source,
        }
    }

    pub fn decode_failed(source: ToonError) -> Self {
        ServiceError::Codec {
            context: Self::DECODE_FAILED,
            source,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::MissingInput(_)
            | ServiceError::InvalidJson(_)
            | ServiceError::InvalidBase64(_)
            | ServiceError::NotUtf8(_) => StatusCode::BAD_REQUEST,
            ServiceError::Upload(err) => err.status(),
            ServiceError::Codec { .. }
            | ServiceError::Bind { .. }
            | ServiceError::Serve(_)
            | ServiceError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> ErrorBody {
        match self {
            ServiceError::MissingInput(message) => ErrorBody::message(message),
            ServiceError::InvalidJson(err) => ErrorBody {
                error: "Invalid JSON in request body".to_string(),
                kind: Some("InvalidJson"),
                details: Some(err.to_string()),
                line: (err.line() > 0).then(|| err.line()),
                column: (err.line() > 0).then(|| err.column()),
            },
            ServiceError::Codec { context, source } => {
                let position = source.position();
                ErrorBody {
                    error: (*context).to_string(),
                    kind: Some(source.kind().as_str()),
                    details: Some(source.detail()),
                    line: position.map(|(line, _)| line),
                    column: position.map(|(_, column)| column),
                }
            }
            other => ErrorBody::message(&other.to_string()),
        }
    }
}

/// JSON error envelope: `{error, kind?, details?, line?, column?}`.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    column: Option<usize>,
}

impl ErrorBody {
    fn message(message: &str) -> Self {
        ErrorBody {
            error: message.to_string(),
            kind: None,
            details: None,
            line: None,
            column: None,
        }
    }
}

impl ServiceError {
    fn log(&self) {
        match self {
            ServiceError::Codec { context, source } => {
                tracing::warn!(kind = %source.kind(), error = %source, "{context}");
            }
            ServiceError::InvalidJson(err) => {
                tracing::warn!(kind = "InvalidJson", error = %err, "rejected request body");
            }
            ServiceError::InvalidBase64(_) | ServiceError::NotUtf8(_) | ServiceError::Upload(_) => {
                tracing::warn!(error = %self, "rejected request body");
            }
            ServiceError::MissingInput(message) => {
                tracing::debug!("{message}");
            }
            other => tracing::error!(error = %other, "request failed"),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        self.log();
        (self.status(), Json(self.body())).into_response()
    }
}

/// A [`ServiceError`] rendered as `{"status": "error", "message": ...}`.
#[derive(Debug)]
pub struct ApiError(pub ServiceError);

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        ApiError(err)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError(err.into())
    }
}

impl From<base64::DecodeError> for ApiError {
    fn from(err: base64::DecodeError) -> Self {
        ApiError(err.into())
    }
}

impl From<std::string::FromUtf8Error> for ApiError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        ApiError(err.into())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError(err.into())
    }
}

#[derive(Debug, Serialize)]
struct ApiErrorBody {
    status: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.0.log();
        let body = ApiErrorBody {
            status: "error",
            message: self.0.to_string(),
        };
        (self.0.status(), Json(body)).into_response()
    }
}
