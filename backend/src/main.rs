//! Backend entry-point: loads configuration, wires the CRM session and the
//! dashboard poller, then serves the REST API and OpenAPI docs.

mod server;

use std::io;
use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock, DefaultEnv};
use ortho_config::OrthoConfig;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use nightdesk::crm_config::CrmCredentials;
use nightdesk::domain::ports::{CrmApi, CrmAuthenticator, CrmGateway};
use nightdesk::domain::{CrmSession, DashboardService, RefreshPoller, TokenCache};
use nightdesk::inbound::http::health::HealthState;
use nightdesk::inbound::http::state::HttpState;
use nightdesk::outbound::salesforce::SalesforceHttpClient;
use nightdesk::settings::ServiceSettings;

use server::{ServerConfig, create_server};

fn startup_error(context: &str, error: impl std::fmt::Display) -> io::Error {
    error!(%error, "{context}");
    io::Error::other(format!("{context}: {error}"))
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ServiceSettings::load_from_iter(std::env::args_os())
        .map_err(|e| startup_error("failed to load settings", e))?;
    let bind_addr = settings
        .bind_addr()
        .map_err(|e| startup_error("invalid bind address", e))?;
    let poller_config = settings
        .poller()
        .map_err(|e| startup_error("invalid poller settings", e))?;
    let request_timeout = settings
        .request_timeout()
        .map_err(|e| startup_error("invalid request timeout", e))?;
    let token_ttl = settings
        .token_ttl()
        .map_err(|e| startup_error("invalid token ttl", e))?;

    let credentials = CrmCredentials::from_env(&DefaultEnv::new())
        .map_err(|e| startup_error("CRM credentials are not configured", e))?;
    let profile = credentials.profile();
    let client = Arc::new(
        SalesforceHttpClient::new(credentials, request_timeout)
            .map_err(|e| startup_error("failed to build CRM HTTP client", e))?,
    );

    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let authenticator: Arc<dyn CrmAuthenticator> = client.clone();
    let api: Arc<dyn CrmApi> = client;
    let tokens = TokenCache::with_ttl(authenticator, clock.clone(), token_ttl);
    let crm: Arc<dyn CrmGateway> = Arc::new(CrmSession::new(tokens, api));
    let dashboard = Arc::new(DashboardService::new(crm.clone(), clock));
    let poller = RefreshPoller::new(dashboard.clone(), poller_config).spawn();

    let health_state = web::Data::new(HealthState::new());
    let config = ServerConfig::new(bind_addr, HttpState::new(crm, dashboard, profile));
    info!(addr = %config.bind_addr(), "starting HTTP server");
    let served = match create_server(health_state.clone(), config) {
        Ok(server) => server.await,
        Err(e) => Err(e),
    };

    health_state.mark_unhealthy();
    poller.shutdown().await;
    info!("server stopped");
    served
}
