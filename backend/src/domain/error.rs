//! Domain-level error payload.
//!
//! These errors are transport agnostic. Inbound adapters map them to HTTP
//! responses; CRM port failures are translated here once so every handler
//! reports them the same way.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::TraceId;
use super::ports::CrmError;

/// Stable machine-readable error code describing the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The request is malformed or fails validation.
    InvalidRequest,
    /// The CRM rejected our credentials.
    Unauthorized,
    /// The requested record or CRM object does not exist.
    NotFound,
    /// The CRM is unreachable or the session is not connected.
    ServiceUnavailable,
    /// The CRM answered with a non-success status.
    UpstreamRejected,
    /// An unexpected error occurred inside the service.
    InternalError,
}

/// API error payload.
///
/// # Examples
/// ```
/// use nightdesk::domain::{Error, ErrorCode};
///
/// let err = Error::not_found("guest G1 not found");
/// assert_eq!(err.code(), ErrorCode::NotFound);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub struct Error {
    code: ErrorCode,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(alias = "trace_id")]
    trace_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
    #[serde(skip)]
    upstream_status: Option<u16>,
}

impl Error {
    /// Create a new error, capturing the trace identifier in scope.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            trace_id: TraceId::current().map(|id| id.to_string()),
            details: None,
            upstream_status: None,
        }
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Correlation identifier, if one was captured.
    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    /// Supplementary error details.
    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// HTTP status the CRM answered with, when the error originated there.
    pub fn upstream_status(&self) -> Option<u16> {
        self.upstream_status
    }

    /// Attach a trace identifier to the error.
    ///
    /// # Examples
    /// ```
    /// use nightdesk::domain::Error;
    ///
    /// let err = Error::internal("boom").with_trace_id("abc");
    /// assert_eq!(err.trace_id(), Some("abc"));
    /// ```
    pub fn with_trace_id(mut self, id: impl Into<String>) -> Self {
        self.trace_id = Some(id.into());
        self
    }

    /// Attach structured details to the error.
    ///
    /// # Examples
    /// ```
    /// use nightdesk::domain::Error;
    /// use serde_json::json;
    ///
    /// let err = Error::invalid_request("bad").with_details(json!({ "field": "status" }));
    /// assert!(err.details().is_some());
    /// ```
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Convenience constructor for [`ErrorCode::InvalidRequest`].
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// Convenience constructor for [`ErrorCode::Unauthorized`].
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    /// Convenience constructor for [`ErrorCode::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Convenience constructor for [`ErrorCode::ServiceUnavailable`].
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }

    /// Error mirroring a non-success CRM response status.
    ///
    /// # Examples
    /// ```
    /// use nightdesk::domain::{Error, ErrorCode};
    ///
    /// let err = Error::upstream(400, "MALFORMED_QUERY: unexpected token");
    /// assert_eq!(err.code(), ErrorCode::UpstreamRejected);
    /// assert_eq!(err.upstream_status(), Some(400));
    /// ```
    pub fn upstream(status: u16, message: impl Into<String>) -> Self {
        let mut error = Self::new(ErrorCode::UpstreamRejected, message);
        error.upstream_status = Some(status);
        error
    }

    /// Convenience constructor for [`ErrorCode::InternalError`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

impl From<CrmError> for Error {
    fn from(err: CrmError) -> Self {
        match err {
            CrmError::Authentication { status, message } => {
                let mut mapped = Self::new(
                    ErrorCode::Unauthorized,
                    format!("CRM authentication failed: {message}"),
                )
                .with_details(json!({ "upstreamStatus": status }));
                mapped.upstream_status = Some(status);
                mapped
            }
            CrmError::SessionExpired { message } => {
                Self::service_unavailable(format!("not connected to CRM: {message}"))
            }
            CrmError::MissingObject { message } => Self::not_found(message),
            CrmError::Rejected {
                status,
                error_code,
                message,
            } => Self::upstream(status, format!("{error_code}: {message}"))
                .with_details(json!({ "errorCode": error_code, "upstreamStatus": status })),
            CrmError::Transport { message } | CrmError::Timeout { message } => {
                Self::service_unavailable(format!("CRM unreachable: {message}"))
            }
            CrmError::InvalidRequest { message } => Self::invalid_request(message),
            CrmError::Decode { message } => {
                Self::internal(format!("CRM response decode failed: {message}"))
            }
        }
    }
}
