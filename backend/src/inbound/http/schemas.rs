//! OpenAPI schema definitions for domain types.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. This
//! module provides the schema definitions required for OpenAPI documentation
//! using utoipa's external schema registration.
//!
//! The schema wrappers mirror the serialised shape of their domain types but
//! live in the inbound adapter layer where framework concerns belong.

#![expect(
    dead_code,
    reason = "Schema wrappers are used only for OpenAPI generation via utoipa"
)]

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// The CRM rejected the configured credentials.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// The record or CRM object does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The CRM is unreachable or the session is not connected.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// The CRM answered with a non-success status.
    #[schema(rename = "upstream_rejected")]
    UpstreamRejected,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Error)]
#[schema(rename_all = "camelCase")]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "invalid_request")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "missing required field: name")]
    message: String,
    /// Correlation identifier, also sent in the `trace-id` header.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    /// Supplementary error details such as `{field, code}` or `{errorCode}`.
    details: Option<serde_json::Value>,
}

/// OpenAPI schema for [`crate::domain::records::Guest`].
#[derive(ToSchema)]
#[schema(as = crate::domain::records::Guest)]
#[schema(rename_all = "camelCase")]
pub struct GuestSchema {
    #[schema(example = "a0G5g000001AbCdEAA")]
    id: String,
    #[schema(example = "Ada Lovelace")]
    name: String,
    #[schema(example = "204")]
    room_number: Option<String>,
    #[schema(format = "date-time")]
    check_in: Option<String>,
    #[schema(format = "date-time")]
    check_out: Option<String>,
    #[schema(example = "checked-in")]
    status: String,
}

/// OpenAPI schema for [`crate::domain::records::Staff`].
#[derive(ToSchema)]
#[schema(as = crate::domain::records::Staff)]
#[schema(rename_all = "camelCase")]
pub struct StaffSchema {
    id: String,
    name: String,
    #[schema(example = "security")]
    role: String,
    #[schema(example = "22:00")]
    shift_start: Option<String>,
    #[schema(example = "06:00")]
    shift_end: Option<String>,
}

/// OpenAPI schema for [`crate::domain::records::Room`].
#[derive(ToSchema)]
#[schema(as = crate::domain::records::Room)]
#[schema(rename_all = "camelCase")]
pub struct RoomSchema {
    id: String,
    #[schema(example = "204")]
    room_number: String,
    #[schema(example = "Occupied")]
    status: String,
    guest_id: Option<String>,
}

/// OpenAPI schema for [`crate::domain::records::FaceLog`].
#[derive(ToSchema)]
#[schema(as = crate::domain::records::FaceLog)]
#[schema(rename_all = "camelCase")]
pub struct FaceLogSchema {
    id: String,
    #[schema(format = "date-time")]
    timestamp: String,
    room_id: Option<String>,
    #[schema(example = "Unknown")]
    match_type: String,
    #[schema(example = 87.5)]
    confidence: f64,
    image_url: Option<String>,
}

/// OpenAPI schema for [`crate::domain::records::SecurityAlert`].
#[derive(ToSchema)]
#[schema(as = crate::domain::records::SecurityAlert)]
#[schema(rename_all = "camelCase")]
pub struct SecurityAlertSchema {
    id: String,
    #[schema(rename = "type")]
    #[schema(example = "Intruder")]
    alert_type: String,
    #[schema(example = "Open")]
    status: String,
    assigned_to: Option<String>,
    comments: Option<String>,
    room_id: Option<String>,
    #[schema(format = "date-time")]
    raised_at: Option<String>,
}

/// OpenAPI schema for [`crate::domain::records::AudioLog`].
#[derive(ToSchema)]
#[schema(as = crate::domain::records::AudioLog)]
#[schema(rename_all = "camelCase")]
pub struct AudioLogSchema {
    id: String,
    recording_url: Option<String>,
    duration_seconds: Option<f64>,
    room_id: Option<String>,
    #[schema(format = "date-time")]
    recorded_at: Option<String>,
    #[schema(example = "neutral")]
    sentiment: String,
    flags: Vec<String>,
}

/// OpenAPI schema for [`crate::domain::records::LinenStock`].
#[derive(ToSchema)]
#[schema(as = crate::domain::records::LinenStock)]
#[schema(rename_all = "camelCase")]
pub struct LinenStockSchema {
    id: String,
    #[schema(example = "Bath towel")]
    linen_type: String,
    room_id: Option<String>,
    #[schema(example = "Issued")]
    status: String,
    #[schema(format = "date")]
    issued_on: Option<String>,
    #[schema(format = "date")]
    returned_on: Option<String>,
}

/// OpenAPI schema for [`crate::domain::ConnectionStatus`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ConnectionStatus)]
#[schema(rename_all = "camelCase")]
pub struct ConnectionStatusSchema {
    connected: bool,
    last_error: Option<String>,
    #[schema(format = "date-time")]
    last_synced_at: Option<String>,
}

/// OpenAPI schema for [`crate::domain::DashboardSnapshot`].
#[derive(ToSchema)]
#[schema(as = crate::domain::DashboardSnapshot)]
#[schema(rename_all = "camelCase")]
pub struct DashboardSnapshotSchema {
    guests: Vec<GuestSchema>,
    staff: Vec<StaffSchema>,
    rooms: Vec<RoomSchema>,
    face_logs: Vec<FaceLogSchema>,
    alerts: Vec<SecurityAlertSchema>,
    audio_logs: Vec<AudioLogSchema>,
    linen: Vec<LinenStockSchema>,
    connection: ConnectionStatusSchema,
}

/// OpenAPI schema for [`crate::domain::DashboardSummary`].
#[derive(ToSchema)]
#[schema(as = crate::domain::DashboardSummary)]
#[schema(rename_all = "camelCase")]
pub struct DashboardSummarySchema {
    /// Guest counts keyed by wire status.
    #[schema(value_type = Object)]
    guests_by_status: serde_json::Value,
    /// Room counts keyed by status.
    #[schema(value_type = Object)]
    rooms_by_status: serde_json::Value,
    open_alerts: usize,
    escalated_alerts: usize,
    unknown_faces_last_24h: usize,
    /// Linen counts keyed by status.
    #[schema(value_type = Object)]
    linen_by_status: serde_json::Value,
    connected: bool,
}

/// OpenAPI schema for [`crate::domain::MutationRecord`].
#[derive(ToSchema)]
#[schema(as = crate::domain::MutationRecord)]
#[schema(rename_all = "camelCase")]
pub struct MutationRecordSchema {
    sequence: u64,
    #[schema(example = "guests")]
    collection: String,
    #[schema(example = "update")]
    kind: String,
    entity_id: String,
    crm_id: Option<String>,
    #[schema(example = "committed")]
    state: String,
    error: Option<String>,
    #[schema(format = "date-time")]
    staged_at: String,
    #[schema(format = "date-time")]
    settled_at: Option<String>,
}

/// OpenAPI schema for [`crate::domain::RefreshReport`].
#[derive(ToSchema)]
#[schema(as = crate::domain::RefreshReport)]
#[schema(rename_all = "camelCase")]
pub struct RefreshReportSchema {
    #[schema(format = "date-time")]
    finished_at: String,
    /// Per collection `{collection, outcome, count | reason}`.
    #[schema(value_type = Vec<Object>)]
    collections: Vec<serde_json::Value>,
}

/// OpenAPI schema for [`crate::domain::SchemaStatus`].
#[derive(ToSchema)]
#[schema(as = crate::domain::SchemaStatus)]
#[schema(rename_all = "camelCase")]
pub struct SchemaStatusSchema {
    ready: bool,
    present_objects: Vec<String>,
    missing_objects: Vec<String>,
    /// `{object, field}` pairs.
    #[schema(value_type = Vec<Object>)]
    missing_fields: Vec<serde_json::Value>,
}

/// OpenAPI schema for [`crate::domain::ProvisionReport`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ProvisionReport)]
#[schema(rename_all = "camelCase")]
pub struct ProvisionReportSchema {
    /// `{kind, name, id}` per created item.
    #[schema(value_type = Vec<Object>)]
    created: Vec<serde_json::Value>,
    /// `{kind, name, error}` per failed item.
    #[schema(value_type = Vec<Object>)]
    failed: Vec<serde_json::Value>,
}

/// OpenAPI schema for [`crate::domain::ports::ObjectSummary`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ports::ObjectSummary)]
pub struct ObjectSummarySchema {
    #[schema(example = "Guest__c")]
    name: String,
    label: String,
    custom: bool,
}

/// OpenAPI schema for [`crate::domain::ports::FieldDescription`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ports::FieldDescription)]
pub struct FieldDescriptionSchema {
    #[schema(example = "Status__c")]
    name: String,
    label: String,
    #[schema(rename = "type")]
    #[schema(example = "picklist")]
    field_type: String,
    custom: bool,
}

/// OpenAPI schema for [`crate::domain::ports::ObjectDescription`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ports::ObjectDescription)]
pub struct ObjectDescriptionSchema {
    #[schema(example = "Guest__c")]
    name: String,
    label: String,
    custom: bool,
    fields: Vec<FieldDescriptionSchema>,
}

/// OpenAPI schema for [`crate::domain::DiagnosticsReport`].
#[derive(ToSchema)]
#[schema(as = crate::domain::DiagnosticsReport)]
#[schema(rename_all = "camelCase")]
pub struct DiagnosticsReportSchema {
    /// Login URL, API version, user name and whether a security token is set.
    #[schema(value_type = Object)]
    profile: serde_json::Value,
    /// `{ok, instanceUrl?, error?}`.
    #[schema(value_type = Object)]
    authentication: serde_json::Value,
    /// `{state: "empty"}` or `{state: "cached", expiresAt}`.
    #[schema(value_type = Object)]
    token: serde_json::Value,
    /// `{object, status, error?}` per dashboard object.
    #[schema(value_type = Vec<Object>)]
    objects: Vec<serde_json::Value>,
}
