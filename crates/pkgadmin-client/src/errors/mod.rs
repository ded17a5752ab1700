//! Error mapping.
//!
//! Every failure (a non-2xx response, a transport error, a filesystem error,
//! a malformed package name) is turned into an [`AdminError`] here before it
//! reaches a `PendingOperation`.

use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;

use pkgadmin_core::{AdminError, PackageNameError};

use crate::auth::AuthError;
use crate::transport::{RawResponse, TransportError};

/// Error body returned by the admin service
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorBody {
    Data { reason: String },
    Text(String),
}

/// Map a non-successful response, reading its body for the server message
pub(crate) async fn from_response(response: RawResponse) -> AdminError {
    let status = response.status();
    match response.bytes().await {
        Ok(body) => server(status, &body),
        Err(e) => {
            debug!(status = status.as_u16(), error = %e, "failed to read error response body");
            server(status, &[])
        }
    }
}

/// Server error carrying the status and the message found in `body`
pub(crate) fn server(status: StatusCode, body: &[u8]) -> AdminError {
    AdminError::Server {
        status: status.as_u16(),
        message: server_message(status, body),
    }
}

/// Extract the human readable message from an error body.
///
/// Prefers the `reason` field of a JSON error document, then a JSON string,
/// then the raw text, then the canonical reason of the status.
fn server_message(status: StatusCode, body: &[u8]) -> String {
    match serde_json::from_slice::<ErrorBody>(body) {
        Ok(ErrorBody::Data { reason }) | Ok(ErrorBody::Text(reason)) if !reason.trim().is_empty() => {
            return reason;
        }
        _ => {}
    }

    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if !text.is_empty() {
        return text.to_string();
    }

    status
        .canonical_reason()
        .unwrap_or("Unknown error")
        .to_string()
}

pub(crate) fn transport(error: TransportError) -> AdminError {
    match error {
        TransportError::Network { message, source } => AdminError::Transport { message, source },
        TransportError::LocalFile { path, source } => AdminError::LocalIo {
            message: format!("Failed to read {}", path.display()),
            source,
        },
        TransportError::Cancelled => interrupted("request cancelled by the executor"),
    }
}

pub(crate) fn client_setup(message: &str, source: reqwest::Error) -> AdminError {
    AdminError::Transport {
        message: message.to_string(),
        source: Some(Box::new(source)),
    }
}

/// Download stopped before or after the announced length
pub(crate) fn truncated(expected: u64, received: u64) -> AdminError {
    AdminError::Transport {
        message: format!(
            "Download truncated: expected {} bytes, received {}",
            expected, received
        ),
        source: None,
    }
}

pub(crate) fn malformed(error: PackageNameError) -> AdminError {
    AdminError::MalformedIdentifier {
        input: error.input().to_string(),
        reason: error.to_string(),
    }
}

pub(crate) fn local_io(message: impl Into<String>, source: std::io::Error) -> AdminError {
    AdminError::LocalIo {
        message: message.into(),
        source,
    }
}

pub(crate) fn decode(status: StatusCode, error: serde_json::Error) -> AdminError {
    AdminError::InvalidResponse {
        status: status.as_u16(),
        message: format!("Failed to decode response body: {}", error),
    }
}

pub(crate) fn invalid_request(message: impl Into<String>) -> AdminError {
    AdminError::InvalidRequest {
        message: message.into(),
    }
}

pub(crate) fn authentication(error: AuthError) -> AdminError {
    AdminError::Authentication {
        message: error.to_string(),
    }
}

pub(crate) fn interrupted(reason: impl Into<String>) -> AdminError {
    AdminError::Interrupted {
        reason: reason.into(),
    }
}
