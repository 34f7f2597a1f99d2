//! Error contract shared by every CRM-facing port.

use super::define_port_error;

define_port_error! {
    /// Errors surfaced while talking to the CRM.
    pub enum CrmError {
        /// Network transport failed before a response arrived.
        Transport { message: String } =>
            "CRM transport failed: {message}",
        /// The CRM call exceeded the client timeout.
        Timeout { message: String } =>
            "CRM request timed out: {message}",
        /// The token endpoint refused the credential exchange.
        Authentication { status: u16, message: String } =>
            "CRM authentication failed with status {status}: {message}",
        /// The bearer token was rejected; the session must be re-established.
        SessionExpired { message: String } =>
            "CRM session expired: {message}",
        /// The queried object type is not provisioned in the org.
        MissingObject { message: String } =>
            "CRM object missing: {message}",
        /// The CRM answered a data call with a non-success status.
        Rejected { status: u16, error_code: String, message: String } =>
            "CRM rejected request with status {status} ({error_code}): {message}",
        /// A success response could not be decoded.
        Decode { message: String } =>
            "CRM response decode failed: {message}",
        /// The request was rejected locally before any I/O.
        InvalidRequest { message: String } =>
            "CRM request invalid: {message}",
    }
}

impl CrmError {
    /// Whether the cached bearer token should be discarded after this error.
    pub fn invalidates_session(&self) -> bool {
        matches!(self, Self::SessionExpired { .. })
    }

    /// Whether this error means the object type is absent from the org.
    pub fn is_missing_object(&self) -> bool {
        matches!(self, Self::MissingObject { .. })
    }

    /// Whether the CRM could not be reached at all.
    pub fn is_unreachable(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. }
                | Self::Timeout { .. }
                | Self::Authentication { .. }
                | Self::SessionExpired { .. }
        )
    }
}
