//! Shared validation helpers for inbound HTTP adapters.
//!
//! Request bodies arrive as loosely typed strings; these helpers turn them
//! into domain values and report failures as `invalid_request` errors with a
//! `{field, code, value?}` details object.

use chrono::NaiveDate;
use serde_json::json;

use crate::domain::records::Picklist;
use crate::domain::{Error, ObjectName, RecordId};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidPicklistValue,
    InvalidDate,
    InvalidObjectName,
    InvalidRecordId,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidPicklistValue => "invalid_picklist_value",
            ErrorCode::InvalidDate => "invalid_date",
            ErrorCode::InvalidObjectName => "invalid_object_name",
            ErrorCode::InvalidRecordId => "invalid_record_id",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &str {
        self.0
    }
}

/// Builder for validation errors with field context.
struct ValidationError {
    field: String,
    message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    fn with_code(self, code: ErrorCode) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "code": code.as_str(),
        }))
    }

    fn with_value(self, code: ErrorCode, value: impl Into<String>) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "value": value.into(),
            "code": code.as_str(),
        }))
    }
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("missing required field: {field}"))
        .with_code(ErrorCode::MissingField)
}

/// Trimmed, non-blank text.
pub(crate) fn require_text(value: Option<String>, field: FieldName) -> Result<String, Error> {
    value
        .map(|raw| raw.trim().to_owned())
        .filter(|trimmed| !trimmed.is_empty())
        .ok_or_else(|| missing_field_error(field))
}

/// Trimmed text; blank input becomes `None`.
pub(crate) fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_owned())
        .filter(|trimmed| !trimmed.is_empty())
}

pub(crate) fn parse_picklist<T: Picklist>(value: String, field: FieldName) -> Result<T, Error> {
    value.parse::<T>().map_err(|_| {
        let field = field.as_str();
        ValidationError::new(
            field,
            format!("{field} must be one of {}", T::allowed().join(", ")),
        )
        .with_value(ErrorCode::InvalidPicklistValue, value)
    })
}

pub(crate) fn parse_optional_picklist<T: Picklist>(
    value: Option<String>,
    field: FieldName,
) -> Result<Option<T>, Error> {
    value.map(|raw| parse_picklist(raw, field)).transpose()
}

pub(crate) fn parse_date(value: String, field: FieldName) -> Result<NaiveDate, Error> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        let field = field.as_str();
        ValidationError::new(field, format!("{field} must be a YYYY-MM-DD date"))
            .with_value(ErrorCode::InvalidDate, value)
    })
}

pub(crate) fn parse_optional_date(
    value: Option<String>,
    field: FieldName,
) -> Result<Option<NaiveDate>, Error> {
    optional_text(value)
        .map(|raw| parse_date(raw, field))
        .transpose()
}

pub(crate) fn parse_object_name(value: Option<String>, field: FieldName) -> Result<ObjectName, Error> {
    let raw = require_text(value, field)?;
    ObjectName::new(raw.clone()).map_err(|_| {
        let field = field.as_str();
        ValidationError::new(field, format!("{field} must be a CRM object API name"))
            .with_value(ErrorCode::InvalidObjectName, raw)
    })
}

pub(crate) fn parse_record_id(value: Option<String>, field: FieldName) -> Result<RecordId, Error> {
    let raw = require_text(value, field)?;
    RecordId::new(raw.clone()).map_err(|_| {
        let field = field.as_str();
        ValidationError::new(field, format!("{field} must be a 15 or 18 character record id"))
            .with_value(ErrorCode::InvalidRecordId, raw)
    })
}
