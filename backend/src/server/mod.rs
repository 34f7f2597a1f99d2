//! Server construction and middleware wiring.

mod config;

pub use config::ServerConfig;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use nightdesk::Trace;
#[cfg(debug_assertions)]
use nightdesk::doc::ApiDoc;
use nightdesk::inbound::http::health::{HealthState, live, ready};
use nightdesk::inbound::http::state::HttpState;
use nightdesk::inbound::http::{alerts, dashboard, guests, linen, records, rooms, salesforce};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
}

fn api_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(dashboard::get_dashboard)
        .service(dashboard::get_summary)
        .service(dashboard::refresh_dashboard)
        .service(dashboard::list_mutations)
        .service(guests::list_guests)
        .service(guests::create_guest)
        .service(guests::update_guest)
        .service(alerts::list_alerts)
        .service(alerts::create_alert)
        .service(alerts::update_alert)
        .service(rooms::list_rooms)
        .service(rooms::update_room)
        .service(linen::list_linen)
        .service(linen::create_linen)
        .service(linen::update_linen)
        .service(records::list_staff)
        .service(records::list_face_logs)
        .service(records::list_audio_logs)
        .service(salesforce::salesforce_action)
        .service(salesforce::authenticate)
        .service(salesforce::query_get)
        .service(salesforce::query_post)
        .service(salesforce::describe)
        .service(salesforce::diagnostics)
        .service(salesforce::setup_status)
        .service(salesforce::setup_objects);
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
    } = deps;

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(web::scope("/api").configure(api_routes))
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// # Parameters
/// - `health_state`: shared readiness state updated once the listener is bound.
/// - `config`: pre-built [`ServerConfig`] carrying the bind address and handler state.
///
/// # Returns
/// A spawned [`Server`] that must be awaited to drive the listener.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let ServerConfig {
        bind_addr,
        http_state,
    } = config;
    let http_state = web::Data::new(http_state);

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
