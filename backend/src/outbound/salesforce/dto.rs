//! Wire payloads exchanged with the CRM REST and OAuth endpoints.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::domain::ports::{CrmRecord, FieldDescription, ObjectDescription, ObjectSummary};

/// Successful password-grant response.
#[derive(Debug, Deserialize)]
pub(super) struct TokenResponseDto {
    pub(super) access_token: String,
    pub(super) instance_url: String,
}

/// OAuth error body, e.g. `{"error":"invalid_grant","error_description":"..."}`.
#[derive(Debug, Deserialize)]
pub(super) struct TokenErrorDto {
    pub(super) error: String,
    #[serde(default)]
    pub(super) error_description: Option<String>,
}

/// One entry of the REST error array.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ApiErrorDto {
    pub(super) message: String,
    pub(super) error_code: String,
}

/// One page of a SOQL result.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct QueryPageDto {
    #[serde(default = "done_by_default")]
    pub(super) done: bool,
    #[serde(default)]
    pub(super) records: Vec<Map<String, Value>>,
    #[serde(default)]
    pub(super) next_records_url: Option<String>,
}

fn done_by_default() -> bool {
    true
}

impl QueryPageDto {
    /// Records without the per-row `attributes` envelope.
    pub(super) fn into_records(self) -> Vec<CrmRecord> {
        self.records
            .into_iter()
            .map(|mut record| {
                record.remove("attributes");
                record
            })
            .collect()
    }
}

/// Response of an sobject or Tooling API create.
#[derive(Debug, Deserialize)]
pub(super) struct CreateResponseDto {
    pub(super) id: String,
    #[serde(default = "done_by_default")]
    pub(super) success: bool,
    #[serde(default)]
    pub(super) errors: Vec<Value>,
}

#[derive(Debug, Deserialize)]
pub(super) struct DescribeGlobalDto {
    pub(super) sobjects: Vec<SObjectSummaryDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct SObjectSummaryDto {
    name: String,
    label: String,
    #[serde(default)]
    custom: bool,
}

impl From<SObjectSummaryDto> for ObjectSummary {
    fn from(value: SObjectSummaryDto) -> Self {
        Self {
            name: value.name,
            label: value.label,
            custom: value.custom,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct DescribeDto {
    name: String,
    label: String,
    #[serde(default)]
    custom: bool,
    #[serde(default)]
    fields: Vec<FieldDto>,
}

#[derive(Debug, Deserialize)]
struct FieldDto {
    name: String,
    label: String,
    #[serde(rename = "type")]
    field_type: String,
    #[serde(default)]
    custom: bool,
}

impl From<DescribeDto> for ObjectDescription {
    fn from(value: DescribeDto) -> Self {
        Self {
            name: value.name,
            label: value.label,
            custom: value.custom,
            fields: value
                .fields
                .into_iter()
                .map(|field| FieldDescription {
                    name: field.name,
                    label: field.label,
                    field_type: field.field_type,
                    custom: field.custom,
                })
                .collect(),
        }
    }
}
