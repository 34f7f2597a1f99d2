//! Linen stock HTTP handlers.
//!
//! ```text
//! GET   /api/linen
//! POST  /api/linen
//! PATCH /api/linen/{id}
//! ```

use actix_web::{get, patch, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::Error;
use crate::domain::records::{LinenPatch, LinenStock, NewLinen};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, LinenStockSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, optional_text, parse_optional_date, parse_optional_picklist, require_text,
};

/// Request payload for issuing a linen item.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewLinenBody {
    #[schema(example = "Bath towel")]
    pub linen_type: Option<String>,
    pub room_id: Option<String>,
    /// Defaults to `Issued`.
    pub status: Option<String>,
    /// Defaults to today.
    #[schema(format = "date")]
    pub issued_on: Option<String>,
}

/// Partial linen update. Marking an item `Returned` stamps today's date
/// unless `returnedOn` is given.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LinenPatchBody {
    #[schema(example = "Returned")]
    pub status: Option<String>,
    pub room_id: Option<String>,
    #[schema(format = "date")]
    pub returned_on: Option<String>,
}

fn parse_new_linen(body: NewLinenBody) -> Result<NewLinen, Error> {
    Ok(NewLinen {
        linen_type: require_text(body.linen_type, FieldName::new("linenType"))?,
        room_id: optional_text(body.room_id),
        status: parse_optional_picklist(body.status, FieldName::new("status"))?,
        issued_on: parse_optional_date(body.issued_on, FieldName::new("issuedOn"))?,
    })
}

fn parse_linen_patch(body: LinenPatchBody) -> Result<LinenPatch, Error> {
    Ok(LinenPatch {
        status: parse_optional_picklist(body.status, FieldName::new("status"))?,
        room_id: optional_text(body.room_id),
        returned_on: parse_optional_date(body.returned_on, FieldName::new("returnedOn"))?,
    })
}

/// Every linen item, most recently issued first.
#[utoipa::path(
    get,
    path = "/api/linen",
    responses((status = 200, description = "Linen stock", body = Vec<LinenStockSchema>)),
    tags = ["linen"],
    operation_id = "listLinen"
)]
#[get("/linen")]
pub async fn list_linen(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<LinenStock>>> {
    Ok(web::Json(state.dashboard.read(|snapshot| snapshot.linen.clone())))
}

/// Issue a linen item to a room.
#[utoipa::path(
    post,
    path = "/api/linen",
    request_body = NewLinenBody,
    responses(
        (status = 200, description = "Linen issued", body = LinenStockSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 503, description = "CRM unavailable", body = ErrorSchema)
    ),
    tags = ["linen"],
    operation_id = "createLinen"
)]
#[post("/linen")]
pub async fn create_linen(
    state: web::Data<HttpState>,
    payload: web::Json<NewLinenBody>,
) -> ApiResult<web::Json<LinenStock>> {
    let draft = parse_new_linen(payload.into_inner())?;
    Ok(web::Json(state.dashboard.add_linen(draft).await?))
}

/// Return, reassign or write off a linen item.
#[utoipa::path(
    patch,
    path = "/api/linen/{id}",
    params(("id" = String, Path, description = "Linen record id")),
    request_body = LinenPatchBody,
    responses(
        (status = 200, description = "Linen updated", body = LinenStockSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Unknown linen item", body = ErrorSchema),
        (status = 503, description = "CRM unavailable", body = ErrorSchema)
    ),
    tags = ["linen"],
    operation_id = "updateLinen"
)]
#[patch("/linen/{id}")]
pub async fn update_linen(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<LinenPatchBody>,
) -> ApiResult<web::Json<LinenStock>> {
    let patch = parse_linen_patch(payload.into_inner())?;
    Ok(web::Json(
        state.dashboard.update_linen(&path.into_inner(), patch).await?,
    ))
}
