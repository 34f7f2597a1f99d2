//! Domain primitives, services and ports.
//!
//! Purpose: hold the CRM-backed dashboard logic independent of HTTP and of
//! the concrete Salesforce adapter. Inbound adapters call the services here;
//! outbound adapters implement the traits in [`ports`].
//!
//! Public surface:
//! - Error / ErrorCode: API error payload and its stable code.
//! - TraceId: per-request correlation id.
//! - ObjectName / RecordId: validated CRM path segments.
//! - TokenCache / CrmSession: token-managed CRM access.
//! - DashboardService / RefreshPoller: aggregation and its refresh cycle.
//! - SchemaProvisioner / DiagnosticsService: setup and connectivity checks.

pub mod dashboard;
pub mod diagnostics;
pub mod error;
pub mod ports;
pub mod provisioning;
pub mod records;
pub mod refresh_poller;
pub mod schema_catalogue;

mod crm_names;
mod crm_session;
mod token_cache;
mod trace_id;

pub use self::crm_names::{ObjectName, RecordId};
pub use self::crm_session::CrmSession;
pub use self::dashboard::{
    ConnectionStatus, DashboardService, DashboardSnapshot, DashboardSummary, MutationRecord,
    RefreshReport,
};
pub use self::diagnostics::{ConnectionProfile, DiagnosticsReport, DiagnosticsService};
pub use self::error::{Error, ErrorCode};
pub use self::provisioning::{ProvisionReport, SchemaProvisioner, SchemaStatus};
pub use self::refresh_poller::{
    BackoffJitter, PollSleeper, PollerConfig, PollerHandle, RandomJitter, RefreshPoller,
    TokioSleeper,
};
pub use self::token_cache::{DEFAULT_TOKEN_TTL, MAX_TOKEN_TTL, TokenCache};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
