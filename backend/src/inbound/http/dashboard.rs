//! Dashboard snapshot HTTP handlers.
//!
//! ```text
//! GET  /api/dashboard
//! GET  /api/dashboard/summary
//! POST /api/dashboard/refresh
//! GET  /api/dashboard/mutations
//! ```

use actix_web::{get, post, web};

use crate::domain::{DashboardSnapshot, DashboardSummary, MutationRecord, RefreshReport};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{
    DashboardSnapshotSchema, DashboardSummarySchema, MutationRecordSchema, RefreshReportSchema,
};
use crate::inbound::http::state::HttpState;

/// Every collection plus the CRM connection status.
///
/// Never fails: with the CRM down this is the last good snapshot (or empty
/// collections) with `connection.connected = false`.
#[utoipa::path(
    get,
    path = "/api/dashboard",
    responses((status = 200, description = "Current snapshot", body = DashboardSnapshotSchema)),
    tags = ["dashboard"],
    operation_id = "getDashboard"
)]
#[get("/dashboard")]
pub async fn get_dashboard(state: web::Data<HttpState>) -> ApiResult<web::Json<DashboardSnapshot>> {
    Ok(web::Json(state.dashboard.snapshot()))
}

/// Owner-overview counters.
#[utoipa::path(
    get,
    path = "/api/dashboard/summary",
    responses((status = 200, description = "Counters", body = DashboardSummarySchema)),
    tags = ["dashboard"],
    operation_id = "getDashboardSummary"
)]
#[get("/dashboard/summary")]
pub async fn get_summary(state: web::Data<HttpState>) -> ApiResult<web::Json<DashboardSummary>> {
    Ok(web::Json(state.dashboard.summary()))
}

/// Run a refresh cycle now and report the per-collection outcome.
#[utoipa::path(
    post,
    path = "/api/dashboard/refresh",
    responses((status = 200, description = "Refresh outcome", body = RefreshReportSchema)),
    tags = ["dashboard"],
    operation_id = "refreshDashboard"
)]
#[post("/dashboard/refresh")]
pub async fn refresh_dashboard(state: web::Data<HttpState>) -> ApiResult<web::Json<RefreshReport>> {
    Ok(web::Json(state.dashboard.refresh_all().await))
}

/// Recent optimistic writes, newest first.
#[utoipa::path(
    get,
    path = "/api/dashboard/mutations",
    responses((status = 200, description = "Mutation log", body = Vec<MutationRecordSchema>)),
    tags = ["dashboard"],
    operation_id = "listMutations"
)]
#[get("/dashboard/mutations")]
pub async fn list_mutations(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<MutationRecord>>> {
    Ok(web::Json(state.dashboard.mutations()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::{api_app, disconnected_state, seeded_gateway, state_with};
    use actix_web::{http::StatusCode, test};
    use serde_json::{Value, json};

    fn routes(cfg: &mut web::ServiceConfig) {
        cfg.service(get_dashboard)
            .service(get_summary)
            .service(refresh_dashboard)
            .service(list_mutations);
    }

    #[actix_web::test]
    async fn unreachable_crm_yields_empty_disconnected_dashboard() {
        let app = test::init_service(api_app(disconnected_state(), routes)).await;

        let refresh = test::TestRequest::post().uri("/api/dashboard/refresh").to_request();
        let report: Value = test::call_and_read_body_json(&app, refresh).await;
        assert_eq!(report["collections"].as_array().map(Vec::len), Some(7));
        assert_eq!(report["collections"][0]["outcome"], "failed");

        let response =
            test::call_service(&app, test::TestRequest::get().uri("/api/dashboard").to_request())
                .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = test::read_body_json(response).await;
        assert_eq!(body["connection"]["connected"], false);
        assert!(body["connection"]["lastError"].is_string());
        for collection in ["guests", "staff", "rooms", "faceLogs", "alerts", "audioLogs", "linen"] {
            assert_eq!(body[collection], json!([]), "{collection} should be empty");
        }
    }

    #[actix_web::test]
    async fn summary_counts_refreshed_guests() {
        let crm = seeded_gateway(
            "Guest__c",
            vec![
                json!({
                    "Id": "a0G5g000001AbCdEAA",
                    "Name": "Ada Lovelace",
                    "Check_In_Time__c": "2026-03-14T20:00:00.000+0000"
                }),
                json!({ "Id": "a0G5g000001AbCdEAB", "Name": "Alan Turing" }),
            ],
        );
        let app = test::init_service(api_app(state_with(crm), routes)).await;

        let refresh = test::TestRequest::post().uri("/api/dashboard/refresh").to_request();
        test::call_service(&app, refresh).await;
        let summary: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri("/api/dashboard/summary").to_request(),
        )
        .await;

        assert_eq!(summary["guestsByStatus"]["checked-in"], 1);
        assert_eq!(summary["guestsByStatus"]["not-arrived"], 1);
        assert_eq!(summary["connected"], true);
    }

    #[actix_web::test]
    async fn mutation_log_starts_empty() {
        let app = test::init_service(api_app(disconnected_state(), routes)).await;

        let body: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri("/api/dashboard/mutations").to_request(),
        )
        .await;

        assert_eq!(body, json!([]));
    }
}
