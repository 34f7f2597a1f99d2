//! Connectivity diagnostics for the CRM integration.

use std::sync::Arc;

use serde::Serialize;

use super::ports::{CrmGateway, TokenState};
use super::records::{
    AudioLog, CrmEntity, FaceLog, Guest, LinenStock, Room, SecurityAlert, Staff,
};

/// Non-secret view of the configured CRM connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionProfile {
    pub login_url: String,
    pub api_version: String,
    pub username: String,
    pub security_token_configured: bool,
}

/// Whether one object answered a probe query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ProbeStatus {
    Ok,
    Missing,
    Error,
}

/// Probe result for one object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectProbe {
    pub object: &'static str,
    pub status: ProbeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Outcome of the authentication step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationCheck {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Full diagnostics payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticsReport {
    pub profile: ConnectionProfile,
    pub authentication: AuthenticationCheck,
    pub token: TokenState,
    pub objects: Vec<ObjectProbe>,
}

/// Runs the diagnostics checks.
pub struct DiagnosticsService {
    crm: Arc<dyn CrmGateway>,
    profile: ConnectionProfile,
}

impl DiagnosticsService {
    pub fn new(crm: Arc<dyn CrmGateway>, profile: ConnectionProfile) -> Self {
        Self { crm, profile }
    }

    /// Authenticate, then probe each dashboard object with a one-row query.
    /// Probes are skipped when authentication fails.
    pub async fn run(&self) -> DiagnosticsReport {
        let authentication = match self.crm.connect().await {
            Ok(info) => AuthenticationCheck {
                ok: true,
                instance_url: Some(info.instance_url),
                error: None,
            },
            Err(error) => AuthenticationCheck {
                ok: false,
                instance_url: None,
                error: Some(error.to_string()),
            },
        };

        let mut objects = Vec::new();
        if authentication.ok {
            for object in [
                Guest::OBJECT,
                Staff::OBJECT,
                Room::OBJECT,
                FaceLog::OBJECT,
                SecurityAlert::OBJECT,
                AudioLog::OBJECT,
                LinenStock::OBJECT,
            ] {
                objects.push(self.probe(object).await);
            }
        }

        DiagnosticsReport {
            profile: self.profile.clone(),
            authentication,
            token: self.crm.token_state(),
            objects,
        }
    }

    async fn probe(&self, object: &'static str) -> ObjectProbe {
        let soql = format!("SELECT Id FROM {object} LIMIT 1");
        match self.crm.query(&soql).await {
            Ok(_) => ObjectProbe {
                object,
                status: ProbeStatus::Ok,
                error: None,
            },
            Err(error) => ObjectProbe {
                object,
                status: if error.is_missing_object() {
                    ProbeStatus::Missing
                } else {
                    ProbeStatus::Error
                },
                error: Some(error.to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{ConnectionInfo, CrmError, DisconnectedCrmGateway, MockCrmGateway};
    use crate::test_support::start_of_shift;

    fn profile() -> ConnectionProfile {
        ConnectionProfile {
            login_url: "https://login.salesforce.com".to_owned(),
            api_version: "v58.0".to_owned(),
            username: "integration@nightdesk.test".to_owned(),
            security_token_configured: false,
        }
    }

    #[tokio::test]
    async fn probes_each_object_after_connecting() {
        let mut crm = MockCrmGateway::new();
        crm.expect_connect().returning(|| {
            Ok(ConnectionInfo {
                instance_url: "https://nightdesk-dev.my.salesforce.com/".to_owned(),
                expires_at: start_of_shift(),
            })
        });
        crm.expect_query().times(7).returning(|soql| {
            if soql.contains("Audio_Log__c") {
                Err(CrmError::missing_object("INVALID_TYPE"))
            } else {
                Ok(Vec::new())
            }
        });
        crm.expect_token_state().returning(|| TokenState::Empty);
        let service = DiagnosticsService::new(Arc::new(crm), profile());

        let report = service.run().await;

        assert!(report.authentication.ok);
        assert_eq!(report.objects.len(), 7);
        let audio = report
            .objects
            .iter()
            .find(|probe| probe.object == "Audio_Log__c")
            .expect("audio probe");
        assert_eq!(audio.status, ProbeStatus::Missing);
    }

    #[tokio::test]
    async fn failed_authentication_skips_probes() {
        let service = DiagnosticsService::new(Arc::new(DisconnectedCrmGateway), profile());

        let report = service.run().await;

        assert!(!report.authentication.ok);
        assert!(report.objects.is_empty());
        assert_eq!(report.token, TokenState::Empty);
    }
}
