//! Liveness and readiness probes.
//!
//! Readiness does not depend on the CRM: a dashboard with a disconnected CRM
//! still serves its last snapshot, so the probe only reports the CRM flag.

use std::sync::atomic::{AtomicBool, Ordering};

use actix_web::{HttpResponse, get, http::header, web};
use serde::Serialize;
use utoipa::ToSchema;

use crate::inbound::http::state::HttpState;

/// Shared probe state.
pub struct HealthState {
    ready: AtomicBool,
    live: AtomicBool,
}

impl Default for HealthState {
    fn default() -> Self {
        Self {
            ready: AtomicBool::new(false),
            live: AtomicBool::new(true),
        }
    }
}

impl HealthState {
    /// Start as live but not ready.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the service as ready once the listener is bound.
    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    /// Fail liveness while draining on shutdown.
    pub fn mark_unhealthy(&self) {
        self.live.store(false, Ordering::Release);
    }

    /// Readiness flag.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Liveness flag.
    pub fn is_alive(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }
}

/// Probe response body.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProbeBody {
    /// Whether the probe passed.
    pub ok: bool,
    /// Whether the last refresh cycle reached the CRM.
    pub crm_connected: bool,
}

fn probe_response(probe_ok: bool, crm_connected: bool) -> HttpResponse {
    let mut response = if probe_ok {
        HttpResponse::Ok()
    } else {
        HttpResponse::ServiceUnavailable()
    };
    response
        .insert_header((header::CACHE_CONTROL, "no-store"))
        .json(ProbeBody {
            ok: probe_ok,
            crm_connected,
        })
}

fn crm_connected(state: &HttpState) -> bool {
    state.dashboard.read(|snapshot| snapshot.connection.connected)
}

/// Readiness probe. 200 once the server accepts traffic, 503 before.
#[utoipa::path(
    get,
    path = "/health/ready",
    tags = ["health"],
    responses(
        (status = 200, description = "Server is ready to handle traffic", body = ProbeBody),
        (status = 503, description = "Server is not ready", body = ProbeBody)
    )
)]
#[get("/health/ready")]
pub async fn ready(health: web::Data<HealthState>, state: web::Data<HttpState>) -> HttpResponse {
    probe_response(health.is_ready(), crm_connected(&state))
}

/// Liveness probe. 200 while alive, 503 once draining.
#[utoipa::path(
    get,
    path = "/health/live",
    tags = ["health"],
    responses(
        (status = 200, description = "Server is alive", body = ProbeBody),
        (status = 503, description = "Server is shutting down", body = ProbeBody)
    )
)]
#[get("/health/live")]
pub async fn live(health: web::Data<HealthState>, state: web::Data<HttpState>) -> HttpResponse {
    probe_response(health.is_alive(), crm_connected(&state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::disconnected_state;
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use serde_json::Value;

    async fn probe(health: HealthState, uri: &str) -> (StatusCode, Value) {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(health))
                .app_data(web::Data::new(disconnected_state()))
                .service(ready)
                .service(live),
        )
        .await;
        let response = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        let status = response.status();
        (status, test::read_body_json(response).await)
    }

    #[actix_web::test]
    async fn readiness_waits_for_mark_ready() {
        let (status, body) = probe(HealthState::new(), "/health/ready").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["ok"], false);

        let health = HealthState::new();
        health.mark_ready();
        let (status, body) = probe(health, "/health/ready").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["crmConnected"], false);
    }

    #[actix_web::test]
    async fn liveness_fails_while_draining() {
        let health = HealthState::new();
        health.mark_unhealthy();

        let (status, _) = probe(health, "/health/live").await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
