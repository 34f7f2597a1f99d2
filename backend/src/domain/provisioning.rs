//! Detects and creates the CRM schema the dashboard needs.
//!
//! Status is read through the describe calls. Provisioning creates every
//! missing object first and then every missing field, each through the
//! Tooling API and each behind its own failure boundary: one rejected item
//! is reported and the rest still run.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use super::ports::{CrmError, CrmGateway};
use super::schema_catalogue::{CustomFieldSpec, CustomObjectSpec, catalogue};
use super::{Error, ObjectName};

/// A catalogue field absent from an existing object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingField {
    pub object: String,
    pub field: String,
}

/// Schema readiness of the org.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaStatus {
    pub ready: bool,
    pub present_objects: Vec<String>,
    pub missing_objects: Vec<String>,
    pub missing_fields: Vec<MissingField>,
}

/// Kind of schema item created by provisioning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SchemaItemKind {
    Object,
    Field,
}

/// Outcome for one object or field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionedItem {
    pub kind: SchemaItemKind,
    /// `Object__c` or `Object__c.Field__c`.
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of [`SchemaProvisioner::provision`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionReport {
    pub created: Vec<ProvisionedItem>,
    pub failed: Vec<ProvisionedItem>,
}

impl ProvisionReport {
    fn record(&mut self, kind: SchemaItemKind, name: String, result: Result<String, String>) {
        match result {
            Ok(id) => {
                info!(?kind, %name, %id, "schema item created");
                self.created.push(ProvisionedItem {
                    kind,
                    name,
                    id: Some(id),
                    error: None,
                });
            }
            Err(error) => {
                warn!(?kind, %name, %error, "schema item not created");
                self.failed.push(ProvisionedItem {
                    kind,
                    name,
                    id: None,
                    error: Some(error),
                });
            }
        }
    }
}

/// Work left after comparing the catalogue with the org.
struct SchemaGap {
    status: SchemaStatus,
    missing_objects: Vec<&'static CustomObjectSpec>,
    missing_fields: Vec<(&'static CustomObjectSpec, &'static CustomFieldSpec)>,
}

/// Compares the org schema with the catalogue and fills the gaps.
pub struct SchemaProvisioner {
    crm: Arc<dyn CrmGateway>,
}

impl SchemaProvisioner {
    /// Create a provisioner backed by the given gateway.
    pub fn new(crm: Arc<dyn CrmGateway>) -> Self {
        Self { crm }
    }

    /// Report which catalogue objects and fields exist.
    ///
    /// # Errors
    /// Fails when the CRM cannot be described at all.
    pub async fn status(&self) -> Result<SchemaStatus, Error> {
        Ok(self.gap().await?.status)
    }

    /// Create every missing object, then every missing field.
    ///
    /// # Errors
    /// Fails only when the initial schema read fails; per-item failures are
    /// reported in [`ProvisionReport::failed`].
    pub async fn provision(&self) -> Result<ProvisionReport, Error> {
        let gap = self.gap().await?;
        let custom_object = ObjectName::new("CustomObject")?;
        let custom_field = ObjectName::new("CustomField")?;
        let mut report = ProvisionReport::default();
        let mut pending_fields = gap.missing_fields;

        for spec in gap.missing_objects {
            let result = self
                .crm
                .tooling_create(&custom_object, &spec.tooling_body())
                .await;
            let created = result.is_ok();
            report.record(SchemaItemKind::Object, spec.api_name.to_owned(), outcome(result));
            if created {
                pending_fields.extend(spec.fields.iter().map(|field| (spec, field)));
            } else {
                for field in &spec.fields {
                    report.record(
                        SchemaItemKind::Field,
                        field.full_name(spec.api_name),
                        Err(format!("object {} was not created", spec.api_name)),
                    );
                }
            }
        }

        for (spec, field) in pending_fields {
            let result = self
                .crm
                .tooling_create(&custom_field, &field.tooling_body(spec.api_name))
                .await;
            report.record(
                SchemaItemKind::Field,
                field.full_name(spec.api_name),
                outcome(result),
            );
        }

        info!(
            created = report.created.len(),
            failed = report.failed.len(),
            "schema provisioning finished"
        );
        Ok(report)
    }

    async fn gap(&self) -> Result<SchemaGap, Error> {
        let listed = self.crm.describe_global().await?;
        let mut status = SchemaStatus {
            ready: false,
            present_objects: Vec::new(),
            missing_objects: Vec::new(),
            missing_fields: Vec::new(),
        };
        let mut missing_objects = Vec::new();
        let mut missing_fields = Vec::new();

        for spec in catalogue() {
            let exists = listed
                .iter()
                .any(|summary| summary.name.eq_ignore_ascii_case(spec.api_name));
            if !exists {
                status.missing_objects.push(spec.api_name.to_owned());
                missing_objects.push(spec);
                continue;
            }

            let description = match self.crm.describe(&ObjectName::new(spec.api_name)?).await {
                Ok(description) => description,
                Err(error) if error.is_missing_object() => {
                    status.missing_objects.push(spec.api_name.to_owned());
                    missing_objects.push(spec);
                    continue;
                }
                Err(error) => return Err(error.into()),
            };
            status.present_objects.push(spec.api_name.to_owned());
            for field in &spec.fields {
                if !description.has_field(field.api_name) {
                    status.missing_fields.push(MissingField {
                        object: spec.api_name.to_owned(),
                        field: field.api_name.to_owned(),
                    });
                    missing_fields.push((spec, field));
                }
            }
        }

        status.ready = status.missing_objects.is_empty() && status.missing_fields.is_empty();
        Ok(SchemaGap {
            status,
            missing_objects,
            missing_fields,
        })
    }
}

fn outcome<T: std::fmt::Display>(result: Result<T, CrmError>) -> Result<String, String> {
    result
        .map(|id| id.to_string())
        .map_err(|error| error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RecordId;
    use crate::domain::ports::{
        FieldDescription, MockCrmGateway, ObjectDescription, ObjectSummary,
    };
    use crate::domain::ErrorCode;

    const CREATED_ID: &str = "01I5g000000AbCdEAA";

    fn summary(name: &str) -> ObjectSummary {
        ObjectSummary {
            name: name.to_owned(),
            label: name.to_owned(),
            custom: true,
        }
    }

    fn complete_description(object: &ObjectName) -> ObjectDescription {
        let spec = catalogue()
            .iter()
            .find(|spec| spec.api_name == object.as_str())
            .expect("catalogue object");
        ObjectDescription {
            name: spec.api_name.to_owned(),
            label: spec.label.to_owned(),
            custom: true,
            fields: spec
                .fields
                .iter()
                .map(|field| FieldDescription {
                    name: field.api_name.to_owned(),
                    label: field.label.to_owned(),
                    field_type: "string".to_owned(),
                    custom: true,
                })
                .collect(),
        }
    }

    fn every_object_but(missing: &'static str) -> Vec<ObjectSummary> {
        catalogue()
            .iter()
            .filter(|spec| spec.api_name != missing)
            .map(|spec| summary(spec.api_name))
            .collect()
    }

    #[tokio::test]
    async fn status_reports_missing_objects_and_fields() {
        let mut crm = MockCrmGateway::new();
        crm.expect_describe_global()
            .returning(|| Ok(every_object_but("Audio_Log__c")));
        crm.expect_describe().returning(|object| {
            let mut description = complete_description(object);
            if object.as_str() == "Guest__c" {
                description.fields.retain(|field| field.name != "Status__c");
            }
            Ok(description)
        });
        let provisioner = SchemaProvisioner::new(Arc::new(crm));

        let status = provisioner.status().await.expect("status");

        assert!(!status.ready);
        assert_eq!(status.missing_objects, ["Audio_Log__c"]);
        assert_eq!(
            status.missing_fields,
            [MissingField {
                object: "Guest__c".to_owned(),
                field: "Status__c".to_owned(),
            }]
        );
        assert_eq!(status.present_objects.len(), catalogue().len() - 1);
    }

    #[tokio::test]
    async fn provisioning_continues_past_rejected_items() {
        let mut crm = MockCrmGateway::new();
        crm.expect_describe_global()
            .returning(|| Ok(every_object_but("Audio_Log__c")));
        crm.expect_describe()
            .returning(|object| Ok(complete_description(object)));
        crm.expect_tooling_create().returning(|kind, body| {
            if kind.as_str() == "CustomField" && body["FullName"] == "Audio_Log__c.Duration__c" {
                Err(CrmError::rejected(
                    400_u16,
                    "DUPLICATE_DEVELOPER_NAME",
                    "duplicate",
                ))
            } else {
                RecordId::new(CREATED_ID)
            }
        });
        let provisioner = SchemaProvisioner::new(Arc::new(crm));

        let report = provisioner.provision().await.expect("report");

        let created: Vec<&str> = report.created.iter().map(|item| item.name.as_str()).collect();
        assert_eq!(
            created,
            ["Audio_Log__c", "Audio_Log__c.Recording_URL__c", "Audio_Log__c.Room__c"]
        );
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].name, "Audio_Log__c.Duration__c");
        assert!(
            report.failed[0]
                .error
                .as_deref()
                .is_some_and(|error| error.contains("DUPLICATE_DEVELOPER_NAME"))
        );
    }

    #[tokio::test]
    async fn failed_object_skips_its_fields() {
        let mut crm = MockCrmGateway::new();
        crm.expect_describe_global()
            .returning(|| Ok(every_object_but("Staff__c")));
        crm.expect_describe()
            .returning(|object| Ok(complete_description(object)));
        crm.expect_tooling_create()
            .times(1)
            .returning(|_, _| Err(CrmError::rejected(403_u16, "INSUFFICIENT_ACCESS", "no")));
        let provisioner = SchemaProvisioner::new(Arc::new(crm));

        let report = provisioner.provision().await.expect("report");

        assert!(report.created.is_empty());
        assert_eq!(report.failed.len(), 4);
        assert_eq!(report.failed[0].kind, SchemaItemKind::Object);
    }

    #[tokio::test]
    async fn unreachable_crm_fails_the_status_check() {
        let provisioner =
            SchemaProvisioner::new(Arc::new(crate::domain::ports::DisconnectedCrmGateway));

        let error = provisioner.status().await.expect_err("unreachable");

        assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
    }
}
