//! Guest HTTP handlers.
//!
//! ```text
//! GET   /api/guests
//! POST  /api/guests
//! PATCH /api/guests/{id}
//! ```

use actix_web::{get, patch, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::Error;
use crate::domain::records::{Guest, GuestPatch, NewGuest};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, GuestSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, optional_text, parse_optional_picklist, require_text,
};

/// Request payload for checking a guest in.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewGuestBody {
    #[schema(example = "Ada Lovelace")]
    pub name: Option<String>,
    #[schema(example = "204")]
    pub room_number: Option<String>,
    /// Defaults to `checked-in`.
    #[schema(example = "checked-in")]
    pub status: Option<String>,
}

/// Partial guest update; absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GuestPatchBody {
    pub name: Option<String>,
    pub room_number: Option<String>,
    #[schema(example = "checked-out")]
    pub status: Option<String>,
}

fn parse_new_guest(body: NewGuestBody) -> Result<NewGuest, Error> {
    Ok(NewGuest {
        name: require_text(body.name, FieldName::new("name"))?,
        room_number: optional_text(body.room_number),
        status: parse_optional_picklist(body.status, FieldName::new("status"))?,
    })
}

fn parse_guest_patch(body: GuestPatchBody) -> Result<GuestPatch, Error> {
    let name = match body.name {
        Some(raw) => Some(require_text(Some(raw), FieldName::new("name"))?),
        None => None,
    };
    Ok(GuestPatch {
        name,
        room_number: body.room_number.map(|raw| raw.trim().to_owned()),
        status: parse_optional_picklist(body.status, FieldName::new("status"))?,
    })
}

/// Every guest, ordered by name.
#[utoipa::path(
    get,
    path = "/api/guests",
    responses((status = 200, description = "Guests", body = Vec<GuestSchema>)),
    tags = ["guests"],
    operation_id = "listGuests"
)]
#[get("/guests")]
pub async fn list_guests(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<Guest>>> {
    Ok(web::Json(state.dashboard.read(|snapshot| snapshot.guests.clone())))
}

/// Check a guest in.
///
/// The guest appears in the dashboard immediately under a local id; on
/// success the response carries the CRM id, on failure the insert is
/// rolled back.
#[utoipa::path(
    post,
    path = "/api/guests",
    request_body = NewGuestBody,
    responses(
        (status = 200, description = "Guest created", body = GuestSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "CRM credentials rejected", body = ErrorSchema),
        (status = 503, description = "CRM unavailable", body = ErrorSchema)
    ),
    tags = ["guests"],
    operation_id = "createGuest"
)]
#[post("/guests")]
pub async fn create_guest(
    state: web::Data<HttpState>,
    payload: web::Json<NewGuestBody>,
) -> ApiResult<web::Json<Guest>> {
    let draft = parse_new_guest(payload.into_inner())?;
    let guest = state.dashboard.add_guest(draft).await?;
    Ok(web::Json(guest))
}

/// Update a guest's name, room or status.
#[utoipa::path(
    patch,
    path = "/api/guests/{id}",
    params(("id" = String, Path, description = "Guest record id")),
    request_body = GuestPatchBody,
    responses(
        (status = 200, description = "Guest updated", body = GuestSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Unknown guest", body = ErrorSchema),
        (status = 503, description = "CRM unavailable", body = ErrorSchema)
    ),
    tags = ["guests"],
    operation_id = "updateGuest"
)]
#[patch("/guests/{id}")]
pub async fn update_guest(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<GuestPatchBody>,
) -> ApiResult<web::Json<Guest>> {
    let patch = parse_guest_patch(payload.into_inner())?;
    let guest = state.dashboard.update_guest(&path.into_inner(), patch).await?;
    Ok(web::Json(guest))
}
