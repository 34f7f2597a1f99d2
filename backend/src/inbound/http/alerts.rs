//! Security alert HTTP handlers.
//!
//! ```text
//! GET   /api/alerts
//! POST  /api/alerts
//! PATCH /api/alerts/{id}
//! ```

use actix_web::{get, patch, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::Error;
use crate::domain::records::{AlertPatch, NewAlert, SecurityAlert};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, SecurityAlertSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, missing_field_error, optional_text, parse_optional_picklist, parse_picklist,
};

/// Request payload for raising an alert.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewAlertBody {
    #[serde(rename = "type")]
    #[schema(example = "Intruder")]
    pub alert_type: Option<String>,
    pub room_id: Option<String>,
    pub assigned_to: Option<String>,
    pub comments: Option<String>,
}

/// Partial alert update. Any status may follow any other.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AlertPatchBody {
    #[schema(example = "Responded")]
    pub status: Option<String>,
    pub assigned_to: Option<String>,
    pub comments: Option<String>,
}

fn parse_new_alert(body: NewAlertBody) -> Result<NewAlert, Error> {
    let field = FieldName::new("type");
    let alert_type = body
        .alert_type
        .ok_or_else(|| missing_field_error(field))?;
    Ok(NewAlert {
        alert_type: parse_picklist(alert_type, field)?,
        room_id: optional_text(body.room_id),
        assigned_to: optional_text(body.assigned_to),
        comments: optional_text(body.comments),
    })
}

fn parse_alert_patch(body: AlertPatchBody) -> Result<AlertPatch, Error> {
    Ok(AlertPatch {
        status: parse_optional_picklist(body.status, FieldName::new("status"))?,
        assigned_to: body.assigned_to.map(|raw| raw.trim().to_owned()),
        comments: body.comments,
    })
}

/// Every alert, newest first.
#[utoipa::path(
    get,
    path = "/api/alerts",
    responses((status = 200, description = "Alerts", body = Vec<SecurityAlertSchema>)),
    tags = ["alerts"],
    operation_id = "listAlerts"
)]
#[get("/alerts")]
pub async fn list_alerts(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<SecurityAlert>>> {
    Ok(web::Json(state.dashboard.read(|snapshot| snapshot.alerts.clone())))
}

/// Raise a new, open alert.
#[utoipa::path(
    post,
    path = "/api/alerts",
    request_body = NewAlertBody,
    responses(
        (status = 200, description = "Alert raised", body = SecurityAlertSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 503, description = "CRM unavailable", body = ErrorSchema)
    ),
    tags = ["alerts"],
    operation_id = "createAlert"
)]
#[post("/alerts")]
pub async fn create_alert(
    state: web::Data<HttpState>,
    payload: web::Json<NewAlertBody>,
) -> ApiResult<web::Json<SecurityAlert>> {
    let draft = parse_new_alert(payload.into_inner())?;
    Ok(web::Json(state.dashboard.add_alert(draft).await?))
}

/// Respond to, resolve or escalate an alert.
#[utoipa::path(
    patch,
    path = "/api/alerts/{id}",
    params(("id" = String, Path, description = "Alert record id")),
    request_body = AlertPatchBody,
    responses(
        (status = 200, description = "Alert updated", body = SecurityAlertSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Unknown alert", body = ErrorSchema),
        (status = 503, description = "CRM unavailable", body = ErrorSchema)
    ),
    tags = ["alerts"],
    operation_id = "updateAlert"
)]
#[patch("/alerts/{id}")]
pub async fn update_alert(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<AlertPatchBody>,
) -> ApiResult<web::Json<SecurityAlert>> {
    let patch = parse_alert_patch(payload.into_inner())?;
    Ok(web::Json(
        state.dashboard.update_alert(&path.into_inner(), patch).await?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RecordId;
    use crate::domain::ports::CrmError;
    use crate::inbound::http::test_utils::{api_app, seeded_gateway, state_with};
    use actix_web::{http::StatusCode, test};
    use rstest::rstest;
    use serde_json::{Value, json};

    const ALERT_ID: &str = "a0B5g000001AbCdEAA";

    fn routes(cfg: &mut web::ServiceConfig) {
        cfg.service(list_alerts)
            .service(create_alert)
            .service(update_alert);
    }

    fn resolved_alert() -> Value {
        json!({
            "Id": ALERT_ID,
            "Alert_Type__c": "Tailgating",
            "Status__c": "Resolved",
            "Room__c": "a0R5g000001AbCdEAA",
            "CreatedDate": "2026-03-14T21:55:00.000+0000"
        })
    }

    #[actix_web::test]
    async fn raised_alert_starts_open() {
        let mut crm = seeded_gateway("Security_Alert__c", Vec::new());
        crm.expect_create()
            .withf(|object, fields| {
                object.as_str() == "Security_Alert__c"
                    && fields.get("Alert_Type__c") == Some(&json!("Intruder"))
                    && fields.get("Status__c") == Some(&json!("Open"))
            })
            .returning(|_, _| Ok(RecordId::new(ALERT_ID).expect("valid id")));
        let app = test::init_service(api_app(state_with(crm), routes)).await;

        let request = test::TestRequest::post()
            .uri("/api/alerts")
            .set_json(json!({ "type": "intruder", "comments": "Door 3 forced" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, request).await;

        assert_eq!(body["id"], ALERT_ID);
        assert_eq!(body["type"], "Intruder");
        assert_eq!(body["status"], "Open");
        assert!(body["raisedAt"].is_string());
    }

    #[actix_web::test]
    async fn alert_type_is_required() {
        let app = test::init_service(api_app(
            state_with(seeded_gateway("Security_Alert__c", Vec::new())),
            routes,
        ))
        .await;

        let request = test::TestRequest::post()
            .uri("/api/alerts")
            .set_json(json!({ "comments": "no type" }))
            .to_request();
        let response = test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(response).await;
        assert_eq!(body["details"]["field"], "type");
        assert_eq!(body["details"]["code"], "missing_field");
    }

    #[rstest]
    #[case("Open")]
    #[case("Escalated")]
    #[actix_web::test]
    async fn resolved_alerts_may_be_reopened_or_escalated(#[case] next: &str) {
        let mut crm = seeded_gateway("Security_Alert__c", vec![resolved_alert()]);
        crm.expect_update().times(1).returning(|_, _, _| Ok(()));
        let state = state_with(crm);
        state.dashboard.refresh_all().await;
        let app = test::init_service(api_app(state, routes)).await;

        let request = test::TestRequest::patch()
            .uri(&format!("/api/alerts/{ALERT_ID}"))
            .set_json(json!({ "status": next }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, request).await;

        assert_eq!(body["status"], next);
    }

    #[actix_web::test]
    async fn rejected_update_restores_previous_status() {
        let mut crm = seeded_gateway("Security_Alert__c", vec![resolved_alert()]);
        crm.expect_update().returning(|_, _, _| {
            Err(CrmError::rejected(
                400_u16,
                "FIELD_CUSTOM_VALIDATION_EXCEPTION",
                "comments required",
            ))
        });
        let state = state_with(crm);
        state.dashboard.refresh_all().await;
        let dashboard = state.dashboard.clone();
        let app = test::init_service(api_app(state, routes)).await;

        let request = test::TestRequest::patch()
            .uri(&format!("/api/alerts/{ALERT_ID}"))
            .set_json(json!({ "status": "Escalated" }))
            .to_request();
        let response = test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(response).await;
        assert_eq!(body["code"], "upstream_rejected");
        assert_eq!(body["details"]["errorCode"], "FIELD_CUSTOM_VALIDATION_EXCEPTION");
        let status = dashboard.read(|snapshot| snapshot.alerts[0].status.as_str());
        assert_eq!(status, "Resolved");
    }
}
