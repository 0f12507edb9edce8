// Client-side error types for the backend API and the tenancy core
use thiserror::Error;

/// Failure reported by the backend API collaborator, classified by HTTP status
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    // 400 Bad Request
    #[error("bad request: {0}")]
    BadRequest(String),

    // 401 Unauthorized
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    // 403 Forbidden
    #[error("forbidden: {0}")]
    Forbidden(String),

    // 404 Not Found
    #[error("not found: {0}")]
    NotFound(String),

    // 409 Conflict
    #[error("conflict: {0}")]
    Conflict(String),

    // 429 Too Many Requests
    #[error("too many requests: {0}")]
    TooManyRequests(String),

    // 500 Internal Server Error
    #[error("internal server error: {0}")]
    InternalServerError(String),

    // 502 Bad Gateway
    #[error("bad gateway: {0}")]
    BadGateway(String),

    // 503 Service Unavailable
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    // Any other non-success status
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    // Connection refused, timeout, TLS failure...
    #[error("request failed: {0}")]
    Transport(String),

    // Body did not match the expected shape
    #[error("invalid response body: {0}")]
    Decode(String),
}

impl ApiError {
    /// Classify a non-success HTTP status
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            400 => ApiError::BadRequest(message),
            401 => ApiError::Unauthorized(message),
            403 => ApiError::Forbidden(message),
            404 => ApiError::NotFound(message),
            409 => ApiError::Conflict(message),
            429 => ApiError::TooManyRequests(message),
            500 => ApiError::InternalServerError(message),
            502 => ApiError::BadGateway(message),
            503 => ApiError::ServiceUnavailable(message),
            _ => ApiError::Status { status, message },
        }
    }

    /// HTTP status code, if the failure came from a response
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::BadRequest(_) => Some(400),
            ApiError::Unauthorized(_) => Some(401),
            ApiError::Forbidden(_) => Some(403),
            ApiError::NotFound(_) => Some(404),
            ApiError::Conflict(_) => Some(409),
            ApiError::TooManyRequests(_) => Some(429),
            ApiError::InternalServerError(_) => Some(500),
            ApiError::BadGateway(_) => Some(502),
            ApiError::ServiceUnavailable(_) => Some(503),
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(_) | ApiError::Decode(_) => None,
        }
    }

    /// Error code for machine-readable output
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::TooManyRequests(_) => "TOO_MANY_REQUESTS",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::BadGateway(_) => "BAD_GATEWAY",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            ApiError::Status { .. } => "HTTP_ERROR",
            ApiError::Transport(_) => "TRANSPORT_ERROR",
            ApiError::Decode(_) => "DECODE_ERROR",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound(_))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            ApiError::from_status(status.as_u16(), err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

/// Errors surfaced by the tenancy core to the rest of the console.
///
/// Only [`TenancyError::NoTenant`] and [`TenancyError::TenantFetchFailed`] are
/// ever stored in a resolution state. `NotInitialized` is returned to callers
/// that ask for a handle outside an active provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TenancyError {
    #[error("no organization associated with this identity")]
    NoTenant,

    #[error("failed to load organization '{organization_id}': {message}")]
    TenantFetchFailed {
        organization_id: String,
        message: String,
    },

    #[error("tenancy provider not initialized: start a TenancyProvider before requesting a handle")]
    NotInitialized,
}

impl TenancyError {
    /// Build a fetch failure from the organization lookup error
    pub fn fetch_failed(organization_id: &str, err: &ApiError) -> Self {
        let message = match err {
            ApiError::NotFound(_) => "organization was not found".to_string(),
            other => other.to_string(),
        };
        TenancyError::TenantFetchFailed {
            organization_id: organization_id.to_string(),
            message,
        }
    }

    /// Whether the user can recover by waiting for an organization to be assigned
    pub fn is_awaiting_organization(&self) -> bool {
        matches!(self, TenancyError::NoTenant)
    }
}
