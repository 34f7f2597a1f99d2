//! Read-only collection handlers.
//!
//! ```text
//! GET /api/staff
//! GET /api/face-logs
//! GET /api/audio-logs
//! ```
//!
//! These collections are written by other systems; the dashboard only
//! renders the last refreshed copy.

use actix_web::{get, web};

use crate::domain::records::{AudioLog, FaceLog, Staff};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{AudioLogSchema, FaceLogSchema, StaffSchema};
use crate::inbound::http::state::HttpState;

/// Staff roster.
#[utoipa::path(
    get,
    path = "/api/staff",
    responses((status = 200, description = "Staff roster", body = Vec<StaffSchema>)),
    tags = ["records"],
    operation_id = "listStaff"
)]
#[get("/staff")]
pub async fn list_staff(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<Staff>>> {
    Ok(web::Json(state.dashboard.read(|snapshot| snapshot.staff.clone())))
}

/// Face-detection events, newest first.
#[utoipa::path(
    get,
    path = "/api/face-logs",
    responses((status = 200, description = "Face detections", body = Vec<FaceLogSchema>)),
    tags = ["records"],
    operation_id = "listFaceLogs"
)]
#[get("/face-logs")]
pub async fn list_face_logs(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<FaceLog>>> {
    Ok(web::Json(
        state.dashboard.read(|snapshot| snapshot.face_logs.clone()),
    ))
}

/// Audio recordings, newest first.
#[utoipa::path(
    get,
    path = "/api/audio-logs",
    responses((status = 200, description = "Audio recordings", body = Vec<AudioLogSchema>)),
    tags = ["records"],
    operation_id = "listAudioLogs"
)]
#[get("/audio-logs")]
pub async fn list_audio_logs(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<AudioLog>>> {
    Ok(web::Json(
        state.dashboard.read(|snapshot| snapshot.audio_logs.clone()),
    ))
}
