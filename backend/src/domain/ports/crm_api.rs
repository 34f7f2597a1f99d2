//! Driven port for the CRM REST data and schema API.
//!
//! Calls take an explicit [`AccessGrant`]; the adapter owns transport,
//! URL construction and status mapping only.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};

use super::{AccessGrant, CrmError};
use crate::domain::{ObjectName, RecordId};

/// One CRM record as returned by SOQL, keyed by field API name.
pub type CrmRecord = Map<String, Value>;

/// Entry of the global describe listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectSummary {
    /// Object API name.
    pub name: String,
    /// Singular label.
    pub label: String,
    /// Whether the object is a custom object.
    pub custom: bool,
}

/// Field metadata from an object describe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescription {
    /// Field API name.
    pub name: String,
    /// Field label.
    pub label: String,
    /// CRM field type (`string`, `picklist`, `datetime`, ...).
    #[serde(rename = "type")]
    pub field_type: String,
    /// Whether the field is custom.
    pub custom: bool,
}

/// Object describe result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectDescription {
    /// Object API name.
    pub name: String,
    /// Singular label.
    pub label: String,
    /// Whether the object is custom.
    pub custom: bool,
    /// Fields visible to the integration user.
    pub fields: Vec<FieldDescription>,
}

impl ObjectDescription {
    /// Whether a field with the given API name exists.
    pub fn has_field(&self, name: &str) -> bool {
        self.fields
            .iter()
            .any(|field| field.name.eq_ignore_ascii_case(name))
    }
}

/// Port for CRM data and schema calls.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CrmApi: Send + Sync {
    /// Run a SOQL query and return every record, following result pages.
    async fn query(&self, grant: &AccessGrant, soql: &str) -> Result<Vec<CrmRecord>, CrmError>;

    /// Create a record and return its new id.
    async fn create(
        &self,
        grant: &AccessGrant,
        object: &ObjectName,
        fields: &CrmRecord,
    ) -> Result<RecordId, CrmError>;

    /// Patch fields on an existing record.
    async fn update(
        &self,
        grant: &AccessGrant,
        object: &ObjectName,
        id: &RecordId,
        fields: &CrmRecord,
    ) -> Result<(), CrmError>;

    /// Describe one object.
    async fn describe(
        &self,
        grant: &AccessGrant,
        object: &ObjectName,
    ) -> Result<ObjectDescription, CrmError>;

    /// List every object visible to the integration user.
    async fn describe_global(&self, grant: &AccessGrant) -> Result<Vec<ObjectSummary>, CrmError>;

    /// Create Tooling API metadata (`CustomObject`, `CustomField`).
    async fn tooling_create(
        &self,
        grant: &AccessGrant,
        metadata_type: &ObjectName,
        body: &Value,
    ) -> Result<RecordId, CrmError>;
}
