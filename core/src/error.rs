//! Error taxonomy shared by every service.
//!
//! # Design
//! Callers never inspect raw status codes. Every failure, local or remote,
//! lands in exactly one `ApiError` variant, and `interpret_response` is the
//! only place that maps HTTP statuses onto them.

use thiserror::Error;

pub const MSG_SESSION_EXPIRED: &str = "Session expired. Please login again.";
pub const MSG_FORBIDDEN: &str = "Access denied. Admin privileges required.";
pub const MSG_NOT_FOUND: &str = "Resource not found.";
pub const MSG_CONFLICT: &str = "Resource already exists.";
pub const MSG_INVALID_REQUEST: &str = "Invalid request.";
pub const MSG_FORMAT_MISMATCH: &str = "Invalid response format from server.";

/// Errors returned by `ApiClient` and the services built on it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// An authenticated call was attempted with no stored token. Raised
    /// before any network traffic.
    #[error("No authentication token found")]
    Unauthenticated,

    /// The transport failed before an HTTP response was received.
    #[error("Network error. Please check your connection. ({0})")]
    Network(String),

    /// HTTP 401. The token store has already been cleared.
    #[error("{0}")]
    SessionExpired(String),

    /// HTTP 403.
    #[error("{0}")]
    Forbidden(String),

    /// HTTP 404.
    #[error("{0}")]
    NotFound(String),

    /// HTTP 409, e.g. a duplicate email.
    #[error("{0}")]
    Conflict(String),

    /// HTTP 400, server-side validation failure.
    #[error("{0}")]
    InvalidRequest(String),

    /// Any other non-2xx status.
    #[error("{message} (HTTP {status})")]
    Server { status: u16, message: String },

    /// 2xx response whose envelope reports failure or lacks required data.
    #[error("{0}")]
    FormatMismatch(String),

    /// The response body was not valid JSON.
    #[error("failed to parse response body: {0}")]
    Parse(String),

    /// Client-side pre-flight check failed; nothing was sent.
    #[error("{0}")]
    Validation(String),

    /// The request payload could not be encoded.
    #[error("failed to serialize request: {0}")]
    Serialization(String),

    /// The token store could not be read or written.
    #[error("token storage failed: {0}")]
    Storage(String),
}

impl ApiError {
    /// Map a non-2xx status to its variant, preferring the server message.
    pub fn from_status(status: u16, message: Option<String>) -> Self {
        let message = message.filter(|m| !m.trim().is_empty());
        let or = |fallback: &str| message.clone().unwrap_or_else(|| fallback.to_string());
        match status {
            400 => ApiError::InvalidRequest(or(MSG_INVALID_REQUEST)),
            401 => ApiError::SessionExpired(or(MSG_SESSION_EXPIRED)),
            403 => ApiError::Forbidden(or(MSG_FORBIDDEN)),
            404 => ApiError::NotFound(or(MSG_NOT_FOUND)),
            409 => ApiError::Conflict(or(MSG_CONFLICT)),
            _ => ApiError::Server {
                status,
                message: or(&format!("Request failed with status {status}")),
            },
        }
    }

    /// True when the caller should send the user back to the login screen.
    pub fn requires_login(&self) -> bool {
        matches!(self, ApiError::Unauthenticated | ApiError::SessionExpired(_))
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));
        let message = fields
            .iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{field} is invalid"))
                })
            })
            .collect::<Vec<_>>()
            .join(", ");
        ApiError::Validation(message)
    }
}
