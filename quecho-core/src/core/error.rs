use std::fmt;

use hyper::StatusCode;
use serde::Serialize;

use crate::core::http::Response;
use crate::IntoResponse;

#[derive(Debug, Serialize)]
pub struct QuechoError {
    pub status: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl QuechoError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status: status.as_u16(),
            message: message.into(),
            error: None,
        }
    }

    pub fn with_error(status: StatusCode, message: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            status: status.as_u16(),
            message: message.into(),
            error: Some(error.into()),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn payload_too_large(message: impl Into<String>) -> Self {
        Self::new(StatusCode::PAYLOAD_TOO_LARGE, message)
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl fmt::Display for QuechoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error {
            Some(error) => write!(f, "QuechoError {{ status: {}, message: {}, error: {} }}", self.status, self.message, error),
            None => write!(f, "QuechoError {{ status: {}, message: {} }}", self.status, self.message),
        }
    }
}

impl std::error::Error for QuechoError {}

impl IntoResponse for QuechoError {
    fn into_response(self) -> Response {
        Response::new(self.status).json(self)
    }
}

impl From<serde_json::Error> for QuechoError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_error(StatusCode::INTERNAL_SERVER_ERROR, "JSON encoding failed", err.to_string())
    }
}

impl From<std::io::Error> for QuechoError {
    fn from(err: std::io::Error) -> Self {
        Self::with_error(StatusCode::INTERNAL_SERVER_ERROR, "I/O error", err.to_string())
    }
}
