use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const TIMEOUT_CODE: &str = "ECONNABORTED";
pub const SOCKET_TIMEOUT_CODE: &str = "ETIMEDOUT";
pub const NETWORK_CODE: &str = "ERR_NETWORK";

const TIMEOUT_MESSAGE: &str = "Request timeout - server is not responding";
const UNREACHABLE_MESSAGE: &str = "Unable to connect to the server";
const BAD_REQUEST_MESSAGE: &str = "Invalid request";
const NOT_FOUND_MESSAGE: &str = "Resource not found";
const SERVER_ERROR_MESSAGE: &str = "Server error";
const UNKNOWN_FALLBACK: &str = "Unknown error";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Timeout,
    NetworkUnreachable,
    BadRequest,
    NotFound,
    ServerError,
    Unknown,
}

/// Response part of a failed request, when the server answered at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedResponse {
    pub status: u16,
    #[serde(default)]
    pub status_text: String,
}

/// Raw failure reported by a page source before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportFailure {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<FailedResponse>,
}

impl TransportFailure {
    pub fn timeout() -> Self {
        Self {
            code: Some(TIMEOUT_CODE.to_string()),
            response: None,
        }
    }

    pub fn unreachable() -> Self {
        Self {
            code: Some(NETWORK_CODE.to_string()),
            response: None,
        }
    }

    pub fn status(status: u16, status_text: impl Into<String>) -> Self {
        Self {
            code: None,
            response: Some(FailedResponse {
                status,
                status_text: status_text.into(),
            }),
        }
    }

    fn is_timeout(&self) -> bool {
        matches!(
            self.code.as_deref(),
            Some(TIMEOUT_CODE) | Some(SOCKET_TIMEOUT_CODE)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "camelCase")]
#[error("{message}")]
pub struct NormalizedError {
    kind: ErrorKind,
    message: String,
    http_status: Option<u16>,
}

impl NormalizedError {
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn http_status(&self) -> Option<u16> {
        self.http_status
    }
}

/// Maps every transport failure onto exactly one [`NormalizedError`].
pub fn normalize(failure: &TransportFailure) -> NormalizedError {
    let http_status = failure.response.as_ref().map(|response| response.status);
    let (kind, message) = if failure.is_timeout() {
        (ErrorKind::Timeout, TIMEOUT_MESSAGE.to_string())
    } else if let Some(response) = &failure.response {
        match response.status {
            400 => (ErrorKind::BadRequest, BAD_REQUEST_MESSAGE.to_string()),
            404 => (ErrorKind::NotFound, NOT_FOUND_MESSAGE.to_string()),
            500 => (ErrorKind::ServerError, SERVER_ERROR_MESSAGE.to_string()),
            _ => {
                let status_text = response.status_text.trim();
                let detail = if status_text.is_empty() {
                    UNKNOWN_FALLBACK
                } else {
                    status_text
                };
                (ErrorKind::Unknown, format!("Error: {detail}"))
            }
        }
    } else {
        (ErrorKind::NetworkUnreachable, UNREACHABLE_MESSAGE.to_string())
    };

    NormalizedError {
        kind,
        message,
        http_status,
    }
}

impl From<TransportFailure> for NormalizedError {
    fn from(value: TransportFailure) -> Self {
        normalize(&value)
    }
}
