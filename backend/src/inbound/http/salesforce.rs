//! CRM pass-through HTTP handlers.
//!
//! ```text
//! POST /api/salesforce                 {action: test | query | create | update}
//! POST /api/salesforce/auth
//! GET  /api/salesforce/query?q=
//! POST /api/salesforce/query           {soql}
//! GET  /api/salesforce/describe[?object=]
//! GET  /api/salesforce/diagnostics
//! GET  /api/salesforce/setup
//! POST /api/salesforce/setup-objects
//! ```
//!
//! These routes talk to the CRM through the token-managed gateway; the
//! bearer token itself never leaves the process.

use actix_web::{HttpResponse, get, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::ports::{ConnectionInfo, CrmRecord};
use crate::domain::{DiagnosticsReport, Error, ProvisionReport, SchemaStatus};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{
    DiagnosticsReportSchema, ErrorSchema, ObjectDescriptionSchema, ProvisionReportSchema,
    SchemaStatusSchema,
};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, missing_field_error, parse_object_name, parse_record_id, require_text,
};

/// Request payload for the action dispatcher.
///
/// `objectType`, `id` and `fields` are read only by the actions that need
/// them.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalesforceActionBody {
    #[schema(example = "query")]
    pub action: Option<String>,
    #[schema(example = "SELECT Id, Name FROM Guest__c")]
    pub soql: Option<String>,
    #[schema(example = "Guest__c")]
    pub object_type: Option<String>,
    pub id: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub fields: Option<CrmRecord>,
}

/// Request payload for `POST /api/salesforce/query`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QueryBody {
    #[schema(example = "SELECT Id, Name FROM Room__c")]
    pub soql: Option<String>,
}

/// Query string for `GET /api/salesforce/query`.
#[derive(Debug, Default, Deserialize)]
pub struct QueryParams {
    pub q: Option<String>,
}

/// Query string for `GET /api/salesforce/describe`.
#[derive(Debug, Default, Deserialize)]
pub struct DescribeParams {
    pub object: Option<String>,
}

/// Connection test outcome.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionResponseBody {
    pub connected: bool,
    pub instance_url: String,
    #[schema(value_type = String, format = DateTime)]
    pub expires_at: DateTime<Utc>,
}

impl From<ConnectionInfo> for ConnectionResponseBody {
    fn from(value: ConnectionInfo) -> Self {
        Self {
            connected: true,
            instance_url: value.instance_url,
            expires_at: value.expires_at,
        }
    }
}

/// SOQL result rows, with the CRM `attributes` envelope removed.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponseBody {
    pub total_size: usize,
    #[schema(value_type = Vec<Object>)]
    pub records: Vec<CrmRecord>,
}

impl From<Vec<CrmRecord>> for QueryResponseBody {
    fn from(records: Vec<CrmRecord>) -> Self {
        Self {
            total_size: records.len(),
            records,
        }
    }
}

/// Id of a created record.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CreatedResponseBody {
    #[schema(example = "a0G5g000001AbCdEAA")]
    pub id: String,
}

/// Acknowledgement of an update.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UpdatedResponseBody {
    pub success: bool,
}

/// Response of the action dispatcher; its shape depends on the action.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(untagged)]
pub enum SalesforceActionResponse {
    Connection(ConnectionResponseBody),
    Query(QueryResponseBody),
    Created(CreatedResponseBody),
    Updated(UpdatedResponseBody),
}

fn require_fields(value: Option<CrmRecord>) -> Result<CrmRecord, Error> {
    value
        .filter(|fields| !fields.is_empty())
        .ok_or_else(|| missing_field_error(FieldName::new("fields")))
}

async fn dispatch(
    state: &HttpState,
    body: SalesforceActionBody,
) -> Result<SalesforceActionResponse, Error> {
    let action = require_text(body.action, FieldName::new("action"))?;
    match action.as_str() {
        "test" => {
            let info = state.crm.connect().await?;
            Ok(SalesforceActionResponse::Connection(info.into()))
        }
        "query" => {
            let soql = require_text(body.soql, FieldName::new("soql"))?;
            let records = state.crm.query(&soql).await?;
            Ok(SalesforceActionResponse::Query(records.into()))
        }
        "create" => {
            let object = parse_object_name(body.object_type, FieldName::new("objectType"))?;
            let fields = require_fields(body.fields)?;
            let id = state.crm.create(&object, &fields).await?;
            Ok(SalesforceActionResponse::Created(CreatedResponseBody {
                id: id.into_inner(),
            }))
        }
        "update" => {
            let object = parse_object_name(body.object_type, FieldName::new("objectType"))?;
            let id = parse_record_id(body.id, FieldName::new("id"))?;
            let fields = require_fields(body.fields)?;
            state.crm.update(&object, &id, &fields).await?;
            Ok(SalesforceActionResponse::Updated(UpdatedResponseBody {
                success: true,
            }))
        }
        other => Err(
            Error::invalid_request("action must be one of test, query, create, update")
                .with_details(json!({
                    "field": "action",
                    "value": other,
                    "code": "invalid_action",
                })),
        ),
    }
}

/// Dispatch a connection test, query, create or update.
#[utoipa::path(
    post,
    path = "/api/salesforce",
    request_body = SalesforceActionBody,
    responses(
        (status = 200, description = "Action result", body = SalesforceActionResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "CRM credentials rejected", body = ErrorSchema),
        (status = 404, description = "CRM object missing", body = ErrorSchema),
        (status = 503, description = "CRM unavailable", body = ErrorSchema)
    ),
    tags = ["salesforce"],
    operation_id = "salesforceAction"
)]
#[post("/salesforce")]
pub async fn salesforce_action(
    state: web::Data<HttpState>,
    payload: web::Json<SalesforceActionBody>,
) -> ApiResult<web::Json<SalesforceActionResponse>> {
    Ok(web::Json(dispatch(&state, payload.into_inner()).await?))
}

/// Authenticate now, reusing a cached token when one is still valid.
#[utoipa::path(
    post,
    path = "/api/salesforce/auth",
    responses(
        (status = 200, description = "Connected", body = ConnectionResponseBody),
        (status = 401, description = "CRM credentials rejected", body = ErrorSchema),
        (status = 503, description = "CRM unavailable", body = ErrorSchema)
    ),
    tags = ["salesforce"],
    operation_id = "salesforceAuth"
)]
#[post("/salesforce/auth")]
pub async fn authenticate(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<ConnectionResponseBody>> {
    let info = state.crm.connect().await?;
    Ok(web::Json(info.into()))
}

/// Run a SOQL query given in the `q` parameter.
#[utoipa::path(
    get,
    path = "/api/salesforce/query",
    params(("q" = String, Query, description = "SOQL statement")),
    responses(
        (status = 200, description = "Query rows", body = QueryResponseBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "CRM object missing", body = ErrorSchema),
        (status = 503, description = "CRM unavailable", body = ErrorSchema)
    ),
    tags = ["salesforce"],
    operation_id = "salesforceQueryGet"
)]
#[get("/salesforce/query")]
pub async fn query_get(
    state: web::Data<HttpState>,
    params: web::Query<QueryParams>,
) -> ApiResult<web::Json<QueryResponseBody>> {
    let soql = require_text(params.into_inner().q, FieldName::new("q"))?;
    Ok(web::Json(state.crm.query(&soql).await?.into()))
}

/// Run a SOQL query given in the request body.
#[utoipa::path(
    post,
    path = "/api/salesforce/query",
    request_body = QueryBody,
    responses(
        (status = 200, description = "Query rows", body = QueryResponseBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "CRM object missing", body = ErrorSchema),
        (status = 503, description = "CRM unavailable", body = ErrorSchema)
    ),
    tags = ["salesforce"],
    operation_id = "salesforceQueryPost"
)]
#[post("/salesforce/query")]
pub async fn query_post(
    state: web::Data<HttpState>,
    payload: web::Json<QueryBody>,
) -> ApiResult<web::Json<QueryResponseBody>> {
    let soql = require_text(payload.into_inner().soql, FieldName::new("soql"))?;
    Ok(web::Json(state.crm.query(&soql).await?.into()))
}

/// Describe one object, or list every object as `{sobjects: [...]}` when
/// `object` is absent.
#[utoipa::path(
    get,
    path = "/api/salesforce/describe",
    params(("object" = Option<String>, Query, description = "Object API name")),
    responses(
        (status = 200, description = "Object metadata", body = ObjectDescriptionSchema),
        (status = 400, description = "Invalid object name", body = ErrorSchema),
        (status = 404, description = "CRM object missing", body = ErrorSchema),
        (status = 503, description = "CRM unavailable", body = ErrorSchema)
    ),
    tags = ["salesforce"],
    operation_id = "salesforceDescribe"
)]
#[get("/salesforce/describe")]
pub async fn describe(
    state: web::Data<HttpState>,
    params: web::Query<DescribeParams>,
) -> ApiResult<HttpResponse> {
    match params.into_inner().object {
        Some(raw) => {
            let object = parse_object_name(Some(raw), FieldName::new("object"))?;
            let description = state.crm.describe(&object).await?;
            Ok(HttpResponse::Ok().json(description))
        }
        None => {
            let sobjects = state.crm.describe_global().await?;
            Ok(HttpResponse::Ok().json(json!({ "sobjects": sobjects })))
        }
    }
}

/// Credential profile, authentication result and per-object probes.
#[utoipa::path(
    get,
    path = "/api/salesforce/diagnostics",
    responses((status = 200, description = "Diagnostics", body = DiagnosticsReportSchema)),
    tags = ["salesforce"],
    operation_id = "salesforceDiagnostics"
)]
#[get("/salesforce/diagnostics")]
pub async fn diagnostics(state: web::Data<HttpState>) -> ApiResult<web::Json<DiagnosticsReport>> {
    Ok(web::Json(state.diagnostics.run().await))
}

/// Which dashboard objects and fields exist in the org.
#[utoipa::path(
    get,
    path = "/api/salesforce/setup",
    responses(
        (status = 200, description = "Schema status", body = SchemaStatusSchema),
        (status = 503, description = "CRM unavailable", body = ErrorSchema)
    ),
    tags = ["salesforce"],
    operation_id = "salesforceSetupStatus"
)]
#[get("/salesforce/setup")]
pub async fn setup_status(state: web::Data<HttpState>) -> ApiResult<web::Json<SchemaStatus>> {
    Ok(web::Json(state.provisioner.status().await?))
}

/// Create missing dashboard objects and fields through the Tooling API.
#[utoipa::path(
    post,
    path = "/api/salesforce/setup-objects",
    responses(
        (status = 200, description = "Provisioning outcome", body = ProvisionReportSchema),
        (status = 503, description = "CRM unavailable", body = ErrorSchema)
    ),
    tags = ["salesforce"],
    operation_id = "salesforceSetupObjects"
)]
#[post("/salesforce/setup-objects")]
pub async fn setup_objects(state: web::Data<HttpState>) -> ApiResult<web::Json<ProvisionReport>> {
    Ok(web::Json(state.provisioner.provision().await?))
}
