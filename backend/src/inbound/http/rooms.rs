//! Room HTTP handlers.
//!
//! ```text
//! GET   /api/rooms
//! PATCH /api/rooms/{id}
//! ```

use actix_web::{get, patch, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::Error;
use crate::domain::records::{Room, RoomPatch};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, RoomSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_optional_picklist};

/// Partial room update.
///
/// An empty `guestId` clears the room's guest.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoomPatchBody {
    #[schema(example = "Alerted")]
    pub status: Option<String>,
    pub guest_id: Option<String>,
}

fn parse_room_patch(body: RoomPatchBody) -> Result<RoomPatch, Error> {
    Ok(RoomPatch {
        status: parse_optional_picklist(body.status, FieldName::new("status"))?,
        guest_id: body.guest_id.map(|raw| raw.trim().to_owned()),
    })
}

/// Every room, ordered by number.
#[utoipa::path(
    get,
    path = "/api/rooms",
    responses((status = 200, description = "Rooms", body = Vec<RoomSchema>)),
    tags = ["rooms"],
    operation_id = "listRooms"
)]
#[get("/rooms")]
pub async fn list_rooms(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<Room>>> {
    Ok(web::Json(state.dashboard.read(|snapshot| snapshot.rooms.clone())))
}

/// Change a room's status or assigned guest.
#[utoipa::path(
    patch,
    path = "/api/rooms/{id}",
    params(("id" = String, Path, description = "Room record id")),
    request_body = RoomPatchBody,
    responses(
        (status = 200, description = "Room updated", body = RoomSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Unknown room", body = ErrorSchema),
        (status = 503, description = "CRM unavailable", body = ErrorSchema)
    ),
    tags = ["rooms"],
    operation_id = "updateRoom"
)]
#[patch("/rooms/{id}")]
pub async fn update_room(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<RoomPatchBody>,
) -> ApiResult<web::Json<Room>> {
    let patch = parse_room_patch(payload.into_inner())?;
    Ok(web::Json(
        state.dashboard.update_room(&path.into_inner(), patch).await?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::{api_app, seeded_gateway, state_with};
    use actix_web::{http::StatusCode, test};
    use serde_json::{Value, json};

    const ROOM_ID: &str = "a0R5g000001AbCdEAA";

    fn routes(cfg: &mut web::ServiceConfig) {
        cfg.service(list_rooms).service(update_room);
    }

    fn occupied_room() -> Value {
        json!({
            "Id": ROOM_ID,
            "Name": "204",
            "Status__c": "Occupied",
            "Guest__c": "a0G5g000001AbCdEAA"
        })
    }

    #[actix_web::test]
    async fn vacating_a_room_clears_its_guest() {
        let mut crm = seeded_gateway("Room__c", vec![occupied_room()]);
        crm.expect_update()
            .withf(|object, _, fields| {
                object.as_str() == "Room__c"
                    && fields.get("Status__c") == Some(&json!("Vacant"))
                    && fields.get("Guest__c") == Some(&Value::Null)
            })
            .times(1)
            .returning(|_, _, _| Ok(()));
        let state = state_with(crm);
        state.dashboard.refresh_all().await;
        let app = test::init_service(api_app(state, routes)).await;

        let request = test::TestRequest::patch()
            .uri(&format!("/api/rooms/{ROOM_ID}"))
            .set_json(json!({ "status": "vacant", "guestId": "" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, request).await;

        assert_eq!(body["status"], "Vacant");
        assert_eq!(body["guestId"], Value::Null);
        assert_eq!(body["roomNumber"], "204");
    }

    #[actix_web::test]
    async fn unknown_room_status_is_rejected_before_any_write() {
        let state = state_with(seeded_gateway("Room__c", vec![occupied_room()]));
        state.dashboard.refresh_all().await;
        let app = test::init_service(api_app(state, routes)).await;

        let request = test::TestRequest::patch()
            .uri(&format!("/api/rooms/{ROOM_ID}"))
            .set_json(json!({ "status": "flooded" }))
            .to_request();
        let response = test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(response).await;
        assert_eq!(body["details"]["value"], "flooded");
    }
}
