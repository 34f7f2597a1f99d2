//! HTTP adapter mapping for domain errors.
//!
//! Purpose: keep the domain error type HTTP-agnostic while allowing Actix
//! handlers to turn domain failures into consistent JSON responses and status
//! codes. Errors that mirror a CRM response keep the CRM's status code.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use tracing::error;

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::UpstreamRejected => StatusCode::BAD_GATEWAY,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn upstream_status(error: &Error) -> Option<StatusCode> {
    error
        .upstream_status()
        .and_then(|status| StatusCode::from_u16(status).ok())
        .filter(|status| status.is_client_error() || status.is_server_error())
}

fn redact_if_internal(error: &Error) -> Error {
    if matches!(error.code(), ErrorCode::InternalError) {
        let mut redacted = Error::internal("Internal server error");
        if let Some(id) = error.trace_id() {
            redacted = redacted.with_trace_id(id.to_owned());
        }
        redacted
    } else {
        error.clone()
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        upstream_status(self).unwrap_or_else(|| status_for(self.code()))
    }

    fn error_response(&self) -> HttpResponse {
        if matches!(self.code(), ErrorCode::InternalError) {
            error!(error = %self, "request failed with internal error");
        }
        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }

        builder.json(redact_if_internal(self))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        // Do not leak implementation details to clients.
        error!(error = %err, "actix error promoted to domain error");
        Error::internal("Internal server error")
    }
}

#[cfg(test)]
mod tests {
    //! Tests for HTTP error mapping.

    use super::*;
    use crate::domain::ports::CrmError;
    use actix_web::body::to_bytes;
    use rstest::rstest;
    use serde_json::{Value, json};

    const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

    async fn body_json(response: HttpResponse) -> Value {
        let bytes = to_bytes(response.into_body()).await.expect("body bytes");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[rstest]
    #[case(Error::invalid_request("bad"), StatusCode::BAD_REQUEST)]
    #[case(Error::unauthorized("no auth"), StatusCode::UNAUTHORIZED)]
    #[case(Error::not_found("missing"), StatusCode::NOT_FOUND)]
    #[case(Error::service_unavailable("down"), StatusCode::SERVICE_UNAVAILABLE)]
    #[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
    fn status_code_matches_error_code(#[case] error: Error, #[case] status: StatusCode) {
        assert_eq!(ResponseError::status_code(&error), status);
    }

    #[rstest]
    #[case::rejected(CrmError::rejected(400_u16, "MALFORMED_QUERY", "bad soql"), StatusCode::BAD_REQUEST)]
    #[case::forbidden(
        CrmError::rejected(403_u16, "INSUFFICIENT_ACCESS", "no access"),
        StatusCode::FORBIDDEN
    )]
    #[case::token_endpoint(CrmError::authentication(400_u16, "invalid_grant"), StatusCode::BAD_REQUEST)]
    #[case::not_an_error_status(CrmError::rejected(200_u16, "CREATE_FAILED", "[]"), StatusCode::BAD_GATEWAY)]
    fn crm_errors_keep_the_upstream_status(#[case] source: CrmError, #[case] status: StatusCode) {
        let error = Error::from(source);
        assert_eq!(ResponseError::status_code(&error), status);
    }

    #[actix_web::test]
    async fn internal_errors_are_redacted() {
        let error = Error::internal("pool exhausted")
            .with_trace_id(TRACE_ID)
            .with_details(json!({ "secret": "x" }));

        let response = ResponseError::error_response(&error);

        assert_eq!(
            response
                .headers()
                .get(TRACE_ID_HEADER)
                .and_then(|value| value.to_str().ok()),
            Some(TRACE_ID)
        );
        let body = body_json(response).await;
        assert_eq!(body["message"], "Internal server error");
        assert_eq!(body["traceId"], TRACE_ID);
        assert!(body.get("details").is_none());
    }

    #[actix_web::test]
    async fn client_errors_keep_details() {
        let error = Error::invalid_request("bad").with_details(json!({ "field": "soql" }));

        let body = body_json(ResponseError::error_response(&error)).await;

        assert_eq!(body["code"], "invalid_request");
        assert_eq!(body["details"]["field"], "soql");
        assert!(body.get("traceId").is_none());
    }
}
