//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain services and ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::CrmGateway;
use crate::domain::{ConnectionProfile, DashboardService, DiagnosticsService, SchemaProvisioner};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Token-managed CRM access for the pass-through routes.
    pub crm: Arc<dyn CrmGateway>,
    /// Aggregated dashboard state and its mutations.
    pub dashboard: Arc<DashboardService>,
    /// Schema status and provisioning.
    pub provisioner: Arc<SchemaProvisioner>,
    /// Connectivity diagnostics.
    pub diagnostics: Arc<DiagnosticsService>,
}

impl HttpState {
    /// Build the state around one CRM gateway shared by every service.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use mockable::DefaultClock;
    /// use nightdesk::domain::ports::DisconnectedCrmGateway;
    /// use nightdesk::domain::{ConnectionProfile, DashboardService};
    /// use nightdesk::inbound::http::state::HttpState;
    ///
    /// let crm = Arc::new(DisconnectedCrmGateway);
    /// let dashboard = Arc::new(DashboardService::new(crm.clone(), Arc::new(DefaultClock)));
    /// let profile = ConnectionProfile {
    ///     login_url: "https://login.salesforce.com/".to_owned(),
    ///     api_version: "v58.0".to_owned(),
    ///     username: "frontdesk@example.com".to_owned(),
    ///     security_token_configured: false,
    /// };
    /// let state = HttpState::new(crm, dashboard, profile);
    /// assert!(!state.dashboard.snapshot().connection.connected);
    /// ```
    pub fn new(
        crm: Arc<dyn CrmGateway>,
        dashboard: Arc<DashboardService>,
        profile: ConnectionProfile,
    ) -> Self {
        Self {
            provisioner: Arc::new(SchemaProvisioner::new(crm.clone())),
            diagnostics: Arc::new(DiagnosticsService::new(crm.clone(), profile)),
            crm,
            dashboard,
        }
    }
}
