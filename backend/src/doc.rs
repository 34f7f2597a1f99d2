//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! specification for the REST API. It registers:
//!
//! - **Paths**: every HTTP endpoint from the inbound layer (dashboard,
//!   collections, CRM pass-throughs, health)
//! - **Schemas**: domain type wrappers from
//!   [`crate::inbound::http::schemas`] that provide OpenAPI definitions
//!   without coupling domain types to the utoipa framework
//!
//! The generated specification is used by Swagger UI (debug builds) and
//! exported via `cargo run --bin openapi-dump` for external tooling.

use utoipa::OpenApi;

use crate::inbound::http::schemas::{
    AudioLogSchema, ConnectionStatusSchema, DashboardSnapshotSchema, DashboardSummarySchema,
    DiagnosticsReportSchema, ErrorCodeSchema, ErrorSchema, FaceLogSchema, FieldDescriptionSchema,
    GuestSchema, LinenStockSchema, MutationRecordSchema, ObjectDescriptionSchema,
    ObjectSummarySchema, ProvisionReportSchema, RefreshReportSchema, RoomSchema,
    SchemaStatusSchema, SecurityAlertSchema, StaffSchema,
};

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Nightdesk backend API",
        description = "Hotel security and operations dashboard backed by a Salesforce org."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::dashboard::get_dashboard,
        crate::inbound::http::dashboard::get_summary,
        crate::inbound::http::dashboard::refresh_dashboard,
        crate::inbound::http::dashboard::list_mutations,
        crate::inbound::http::guests::list_guests,
        crate::inbound::http::guests::create_guest,
        crate::inbound::http::guests::update_guest,
        crate::inbound::http::alerts::list_alerts,
        crate::inbound::http::alerts::create_alert,
        crate::inbound::http::alerts::update_alert,
        crate::inbound::http::rooms::list_rooms,
        crate::inbound::http::rooms::update_room,
        crate::inbound::http::linen::list_linen,
        crate::inbound::http::linen::create_linen,
        crate::inbound::http::linen::update_linen,
        crate::inbound::http::records::list_staff,
        crate::inbound::http::records::list_face_logs,
        crate::inbound::http::records::list_audio_logs,
        crate::inbound::http::salesforce::salesforce_action,
        crate::inbound::http::salesforce::authenticate,
        crate::inbound::http::salesforce::query_get,
        crate::inbound::http::salesforce::query_post,
        crate::inbound::http::salesforce::describe,
        crate::inbound::http::salesforce::diagnostics,
        crate::inbound::http::salesforce::setup_status,
        crate::inbound::http::salesforce::setup_objects,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        GuestSchema,
        StaffSchema,
        RoomSchema,
        FaceLogSchema,
        SecurityAlertSchema,
        AudioLogSchema,
        LinenStockSchema,
        ConnectionStatusSchema,
        DashboardSnapshotSchema,
        DashboardSummarySchema,
        MutationRecordSchema,
        RefreshReportSchema,
        SchemaStatusSchema,
        ProvisionReportSchema,
        DiagnosticsReportSchema,
        ObjectSummarySchema,
        FieldDescriptionSchema,
        ObjectDescriptionSchema,
    )),
    tags(
        (name = "dashboard", description = "Aggregated snapshot and refresh control"),
        (name = "guests", description = "Guest check-in and status"),
        (name = "alerts", description = "Security alert triage"),
        (name = "rooms", description = "Room status map"),
        (name = "linen", description = "Linen inventory"),
        (name = "records", description = "Read-only staff, face and audio logs"),
        (name = "salesforce", description = "CRM pass-through, diagnostics and provisioning"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
