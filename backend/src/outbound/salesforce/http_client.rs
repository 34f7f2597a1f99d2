//! Reqwest-backed CRM adapter.
//!
//! This adapter owns transport details only: URL construction, bearer
//! authentication, result paging, HTTP error mapping, and JSON decoding into
//! port types. Token caching and retries live in the domain session.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use super::dto::{
    ApiErrorDto, CreateResponseDto, DescribeDto, DescribeGlobalDto, QueryPageDto,
    TokenErrorDto, TokenResponseDto,
};
use crate::crm_config::CrmCredentials;
use crate::domain::ports::{
    AccessGrant, CrmApi, CrmAuthenticator, CrmError, CrmRecord, ObjectDescription,
    ObjectSummary,
};
use crate::domain::{ObjectName, RecordId};

const INVALID_SESSION_ID: &str = "INVALID_SESSION_ID";
const INVALID_TYPE: &str = "INVALID_TYPE";
/// Upper bound on followed `nextRecordsUrl` pages for one query.
pub const MAX_QUERY_PAGES: usize = 50;

/// CRM adapter performing the OAuth password grant and REST calls.
pub struct SalesforceHttpClient {
    client: Client,
    credentials: CrmCredentials,
}

impl SalesforceHttpClient {
    /// Build an adapter using a reqwest client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(credentials: CrmCredentials, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            credentials,
        })
    }

    fn data_url(&self, grant: &AccessGrant, segments: &[&str]) -> Result<Url, CrmError> {
        let mut path = vec!["services", "data", self.credentials.api_version.as_str()];
        path.extend_from_slice(segments);
        extend_path(grant.instance_url(), &path)
    }

    async fn send(&self, request: RequestBuilder, grant: &AccessGrant) -> Result<Vec<u8>, CrmError> {
        let response = request
            .bearer_auth(grant.access_token())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_api_error(status, body.as_ref()));
        }
        Ok(body.to_vec())
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        grant: &AccessGrant,
        body: Option<&Value>,
    ) -> Result<T, CrmError> {
        let mut request = self.client.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let body = self.send(request, grant).await?;
        decode(&body)
    }

    async fn create_at(
        &self,
        url: Url,
        grant: &AccessGrant,
        body: &Value,
    ) -> Result<RecordId, CrmError> {
        let created: CreateResponseDto = self.fetch(Method::POST, url, grant, Some(body)).await?;
        if !created.success {
            return Err(CrmError::rejected(
                StatusCode::OK.as_u16(),
                "CREATE_FAILED",
                Value::Array(created.errors).to_string(),
            ));
        }
        RecordId::new(created.id).map_err(|error| CrmError::decode(error.to_string()))
    }
}

#[async_trait]
impl CrmAuthenticator for SalesforceHttpClient {
    async fn authenticate(&self) -> Result<AccessGrant, CrmError> {
        let url = extend_path(&self.credentials.login_url, &["services", "oauth2", "token"])?;
        let password = self.credentials.grant_password();
        let form = [
            ("grant_type", "password"),
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("username", self.credentials.username.as_str()),
            ("password", password.as_str()),
        ];
        let response = self
            .client
            .post(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&form)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_token_error(status, body.as_ref()));
        }

        let token: TokenResponseDto = decode(body.as_ref())?;
        let instance_url = Url::parse(&token.instance_url).map_err(|error| {
            CrmError::decode(format!("invalid instance_url '{}': {error}", token.instance_url))
        })?;
        debug!(instance_url = %instance_url, "CRM token issued");
        Ok(AccessGrant::new(token.access_token, instance_url))
    }
}

#[async_trait]
impl CrmApi for SalesforceHttpClient {
    async fn query(&self, grant: &AccessGrant, soql: &str) -> Result<Vec<CrmRecord>, CrmError> {
        let mut url = self.data_url(grant, &["query"])?;
        url.query_pairs_mut().append_pair("q", soql);

        let mut records = Vec::new();
        let mut next = Some(url);
        let mut pages = 0_usize;
        while let Some(url) = next.take() {
            let page: QueryPageDto = self.fetch(Method::GET, url, grant, None).await?;
            pages += 1;
            let next_records_url = page.next_records_url.clone();
            let done = page.done;
            records.extend(page.into_records());

            if done {
                break;
            }
            if pages >= MAX_QUERY_PAGES {
                warn!(
                    soql,
                    max_pages = MAX_QUERY_PAGES,
                    rows = records.len(),
                    "SOQL result truncated at the page cap"
                );
                break;
            }
            if let Some(path) = next_records_url {
                next = Some(grant.instance_url().join(&path).map_err(|error| {
                    CrmError::decode(format!("invalid nextRecordsUrl '{path}': {error}"))
                })?);
            }
        }
        debug!(pages, rows = records.len(), "SOQL query finished");
        Ok(records)
    }

    async fn create(
        &self,
        grant: &AccessGrant,
        object: &ObjectName,
        fields: &CrmRecord,
    ) -> Result<RecordId, CrmError> {
        let url = self.data_url(grant, &["sobjects", object.as_str()])?;
        self.create_at(url, grant, &Value::Object(fields.clone()))
            .await
    }

    async fn update(
        &self,
        grant: &AccessGrant,
        object: &ObjectName,
        id: &RecordId,
        fields: &CrmRecord,
    ) -> Result<(), CrmError> {
        let url = self.data_url(grant, &["sobjects", object.as_str(), id.as_str()])?;
        let request = self.client.patch(url).json(fields);
        self.send(request, grant).await?;
        Ok(())
    }

    async fn describe(
        &self,
        grant: &AccessGrant,
        object: &ObjectName,
    ) -> Result<ObjectDescription, CrmError> {
        let url = self.data_url(grant, &["sobjects", object.as_str(), "describe"])?;
        let description: DescribeDto = self.fetch(Method::GET, url, grant, None).await?;
        Ok(description.into())
    }

    async fn describe_global(&self, grant: &AccessGrant) -> Result<Vec<ObjectSummary>, CrmError> {
        let url = self.data_url(grant, &["sobjects"])?;
        let listing: DescribeGlobalDto = self.fetch(Method::GET, url, grant, None).await?;
        Ok(listing.sobjects.into_iter().map(Into::into).collect())
    }

    async fn tooling_create(
        &self,
        grant: &AccessGrant,
        metadata_type: &ObjectName,
        body: &Value,
    ) -> Result<RecordId, CrmError> {
        let url = self.data_url(grant, &["tooling", "sobjects", metadata_type.as_str()])?;
        self.create_at(url, grant, body).await
    }
}

fn extend_path(base: &Url, segments: &[&str]) -> Result<Url, CrmError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| CrmError::invalid_request(format!("'{base}' cannot carry a path")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, CrmError> {
    serde_json::from_slice(body).map_err(|error| {
        CrmError::decode(format!("invalid CRM JSON payload: {error}; body: {}", body_preview(body)))
    })
}

fn map_transport_error(error: reqwest::Error) -> CrmError {
    if error.is_timeout() {
        CrmError::timeout(error.to_string())
    } else {
        CrmError::transport(error.to_string())
    }
}

fn map_token_error(status: StatusCode, body: &[u8]) -> CrmError {
    let message = match serde_json::from_slice::<TokenErrorDto>(body) {
        Ok(TokenErrorDto {
            error,
            error_description: Some(description),
        }) => format!("{error}: {description}"),
        Ok(TokenErrorDto { error, .. }) => error,
        Err(_) => fallback_message(status, body),
    };
    CrmError::authentication(status.as_u16(), message)
}

fn map_api_error(status: StatusCode, body: &[u8]) -> CrmError {
    let first = serde_json::from_slice::<Vec<ApiErrorDto>>(body)
        .ok()
        .and_then(|errors| errors.into_iter().next());
    let (error_code, message) = match first {
        Some(ApiErrorDto {
            error_code,
            message,
        }) => (error_code, message),
        None => (
            status
                .canonical_reason()
                .unwrap_or("UNKNOWN")
                .to_ascii_uppercase()
                .replace(' ', "_"),
            fallback_message(status, body),
        ),
    };

    if status == StatusCode::UNAUTHORIZED || error_code == INVALID_SESSION_ID {
        CrmError::session_expired(message)
    } else if error_code == INVALID_TYPE {
        CrmError::missing_object(message)
    } else {
        CrmError::rejected(status.as_u16(), error_code, message)
    }
}

fn fallback_message(status: StatusCode, body: &[u8]) -> String {
    let body_preview = body_preview(body);
    if body_preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), body_preview)
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for non-network CRM mapping helpers.

    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::expired_token(
        StatusCode::UNAUTHORIZED,
        r#"[{"message":"Session expired or invalid","errorCode":"INVALID_SESSION_ID"}]"#,
        "SessionExpired"
    )]
    #[case::bare_unauthorised(StatusCode::UNAUTHORIZED, "", "SessionExpired")]
    #[case::unknown_object(
        StatusCode::BAD_REQUEST,
        r#"[{"message":"sObject type 'Linen_Stock__c' is not supported.","errorCode":"INVALID_TYPE"}]"#,
        "MissingObject"
    )]
    #[case::malformed_query(
        StatusCode::BAD_REQUEST,
        r#"[{"message":"unexpected token: FORM","errorCode":"MALFORMED_QUERY"}]"#,
        "Rejected"
    )]
    #[case::server_error(StatusCode::INTERNAL_SERVER_ERROR, "<html>oops</html>", "Rejected")]
    fn maps_api_statuses_to_expected_domain_errors(
        #[case] status: StatusCode,
        #[case] body: &str,
        #[case] expected: &str,
    ) {
        let error = map_api_error(status, body.as_bytes());
        match expected {
            "SessionExpired" => assert!(
                matches!(error, CrmError::SessionExpired { .. }),
                "401 and INVALID_SESSION_ID should map to SessionExpired, got {error:?}",
            ),
            "MissingObject" => assert!(
                matches!(error, CrmError::MissingObject { .. }),
                "INVALID_TYPE should map to MissingObject, got {error:?}",
            ),
            "Rejected" => assert!(
                matches!(error, CrmError::Rejected { .. }),
                "other failures should map to Rejected, got {error:?}",
            ),
            _ => panic!("unsupported test expectation: {expected}"),
        }
    }

    #[test]
    fn rejected_errors_keep_status_and_error_code() {
        let error = map_api_error(
            StatusCode::BAD_REQUEST,
            br#"[{"message":"bad value for restricted picklist field: Lost","errorCode":"INVALID_OR_NULL_FOR_RESTRICTED_PICKLIST"}]"#,
        );

        assert_eq!(
            error,
            CrmError::rejected(
                400_u16,
                "INVALID_OR_NULL_FOR_RESTRICTED_PICKLIST",
                "bad value for restricted picklist field: Lost",
            )
        );
    }

    #[test]
    fn unparseable_error_body_falls_back_to_reason_and_preview() {
        let error = map_api_error(StatusCode::SERVICE_UNAVAILABLE, b"  down   for\nmaintenance ");

        assert_eq!(
            error,
            CrmError::rejected(
                503_u16,
                "SERVICE_UNAVAILABLE",
                "status 503: down for maintenance"
            )
        );
    }

    #[rstest]
    #[case::with_description(
        r#"{"error":"invalid_grant","error_description":"authentication failure"}"#,
        "invalid_grant: authentication failure"
    )]
    #[case::without_description(r#"{"error":"invalid_client_id"}"#, "invalid_client_id")]
    #[case::not_json("Bad Request", "status 400: Bad Request")]
    fn token_errors_carry_status_and_oauth_reason(#[case] body: &str, #[case] message: &str) {
        let error = map_token_error(StatusCode::BAD_REQUEST, body.as_bytes());

        assert_eq!(error, CrmError::authentication(400_u16, message));
    }

    #[test]
    fn extend_path_appends_segments_without_double_slashes() {
        let base = Url::parse("https://nightdesk.my.salesforce.com/").expect("url");

        let url = extend_path(&base, &["services", "data", "v58.0", "sobjects", "Guest__c"])
            .expect("url");

        assert_eq!(
            url.as_str(),
            "https://nightdesk.my.salesforce.com/services/data/v58.0/sobjects/Guest__c"
        );
    }

    #[test]
    fn query_pages_drop_the_attributes_envelope() {
        let body = br#"{
            "totalSize": 1,
            "done": false,
            "nextRecordsUrl": "/services/data/v58.0/query/01gxx-2000",
            "records": [
                {
                    "attributes": { "type": "Guest__c", "url": "/services/data/v58.0/sobjects/Guest__c/a0G" },
                    "Id": "a0G5g000001AbCdEAA",
                    "Name": "Ada Lovelace"
                }
            ]
        }"#;

        let page: QueryPageDto = decode(body).expect("page");
        assert!(!page.done);
        assert_eq!(
            page.next_records_url.as_deref(),
            Some("/services/data/v58.0/query/01gxx-2000")
        );
        let records = page.into_records();
        assert_eq!(records.len(), 1);
        assert!(!records[0].contains_key("attributes"));
        assert_eq!(records[0]["Name"], "Ada Lovelace");
    }

    #[test]
    fn undecodable_success_body_maps_to_decode() {
        let error = decode::<QueryPageDto>(b"not json").expect_err("decode should fail");

        assert!(matches!(error, CrmError::Decode { .. }));
    }
}
