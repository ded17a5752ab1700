//! Error types and result aliases for package administration operations.
//!
//! Every failure a caller can observe, whether it came from the network, the
//! server, the local filesystem or a malformed package name, is one of the
//! `AdminError` variants below.

use thiserror::Error;

/// Unified error type for all package administration operations
#[derive(Error, Debug)]
pub enum AdminError {
    // Client-side input errors
    #[error("Invalid package name '{input}': {reason}")]
    MalformedIdentifier { input: String, reason: String },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // Server errors
    #[error("Server returned {status}: {message}")]
    Server { status: u16, message: String },

    #[error("Invalid response (status {status}): {message}")]
    InvalidResponse { status: u16, message: String },

    // Transport errors
    #[error("Transport error: {message}")]
    Transport {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // IO errors
    #[error("IO error: {message}")]
    LocalIo {
        message: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Operation interrupted: {reason}")]
    Interrupted { reason: String },
}

/// Result type alias for package administration operations
pub type AdminResult<T> = Result<T, AdminError>;

/// Classification of a server-side failure by HTTP status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerErrorKind {
    NotAuthorized,
    NotFound,
    NotAllowed,
    Conflict,
    PreconditionFailed,
    ServiceUnavailable,
    ServerSide,
    Other,
}

impl ServerErrorKind {
    /// Classify an HTTP status code
    pub fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => Self::NotAuthorized,
            404 => Self::NotFound,
            405 => Self::NotAllowed,
            409 => Self::Conflict,
            412 => Self::PreconditionFailed,
            503 => Self::ServiceUnavailable,
            500..=599 => Self::ServerSide,
            _ => Self::Other,
        }
    }
}

impl AdminError {
    /// HTTP status carried by this error, if it came from a response
    pub fn status(&self) -> Option<u16> {
        match self {
            AdminError::Server { status, .. } | AdminError::InvalidResponse { status, .. } => {
                Some(*status)
            },
            _ => None,
        }
    }

    /// Server-side classification, `None` for client or transport failures
    pub fn kind(&self) -> Option<ServerErrorKind> {
        match self {
            AdminError::Server { status, .. } => Some(ServerErrorKind::from_status(*status)),
            _ => None,
        }
    }

    /// Check if the server reported the resource as missing
    pub fn is_not_found(&self) -> bool {
        self.kind() == Some(ServerErrorKind::NotFound)
    }

    /// Check if this error is recoverable by trying again later
    pub fn is_recoverable(&self) -> bool {
        match self {
            AdminError::Transport { .. } | AdminError::Interrupted { .. } => true,
            AdminError::Server { status, .. } => {
                matches!(
                    ServerErrorKind::from_status(*status),
                    ServerErrorKind::ServiceUnavailable | ServerErrorKind::ServerSide
                )
            },
            _ => false,
        }
    }

    /// Get a user-friendly suggestion for fixing this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            AdminError::MalformedIdentifier { .. } => {
                Some("Package names look like 'function://tenant/namespace/name@version'")
            },
            AdminError::Authentication { .. } => {
                Some("Check the configured token or username and password")
            },
            AdminError::Transport { .. } => {
                Some("Check that the admin service URL is reachable and try again")
            },
            AdminError::LocalIo { .. } => Some("Check the local path and its permissions"),
            AdminError::Server { status, .. } => match ServerErrorKind::from_status(*status) {
                ServerErrorKind::NotAuthorized => {
                    Some("The configured credentials are not allowed to perform this operation")
                },
                ServerErrorKind::NotFound => {
                    Some("Check the package name and version, or list the available versions")
                },
                ServerErrorKind::Conflict => Some("The package version already exists"),
                ServerErrorKind::ServiceUnavailable => Some("The service is unavailable, try again later"),
                _ => None,
            },
            _ => None,
        }
    }
}
