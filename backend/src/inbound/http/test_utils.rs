//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::{App, web};
use serde_json::Value;

use crate::domain::ports::{CrmGateway, CrmRecord, DisconnectedCrmGateway, MockCrmGateway};
use crate::domain::{ConnectionProfile, DashboardService};
use crate::inbound::http::state::HttpState;
use crate::test_support::{MutableClock, start_of_shift};

/// Profile of the fake org used by handler tests.
pub fn test_profile() -> ConnectionProfile {
    ConnectionProfile {
        login_url: "https://login.salesforce.com/".to_owned(),
        api_version: "v58.0".to_owned(),
        username: "frontdesk@nightdesk.test".to_owned(),
        security_token_configured: true,
    }
}

/// Build handler state around `crm` with a clock frozen at the start of the
/// night shift.
pub fn state_with(crm: impl CrmGateway + 'static) -> HttpState {
    let crm: Arc<dyn CrmGateway> = Arc::new(crm);
    let dashboard = Arc::new(DashboardService::new(
        crm.clone(),
        Arc::new(MutableClock::new(start_of_shift())),
    ));
    HttpState::new(crm, dashboard, test_profile())
}

/// State whose CRM can never be reached.
pub fn disconnected_state() -> HttpState {
    state_with(DisconnectedCrmGateway)
}

/// Convert a JSON object literal into a CRM record.
pub fn crm_record(value: Value) -> CrmRecord {
    value.as_object().cloned().unwrap_or_default()
}

/// Mock gateway whose queries against `object` return `records` and whose
/// other queries return nothing.
pub fn seeded_gateway(object: &'static str, records: Vec<Value>) -> MockCrmGateway {
    let records: Vec<CrmRecord> = records.into_iter().map(crm_record).collect();
    let mut crm = MockCrmGateway::new();
    crm.expect_query().returning(move |soql| {
        if soql.contains(&format!("FROM {object} ")) {
            Ok(records.clone())
        } else {
            Ok(Vec::new())
        }
    });
    crm
}

/// Application with `state` and the routes added by `configure` mounted
/// under `/api`.
pub fn api_app(
    state: HttpState,
    configure: fn(&mut web::ServiceConfig),
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .service(web::scope("/api").configure(configure))
}
