//! Validated identifiers spliced into CRM REST paths.
//!
//! Object API names and record ids end up inside URL paths, so both are
//! checked against the CRM's own character rules before any request is made.

use std::fmt;

use serde::Serialize;

use super::ports::CrmError;

const MAX_OBJECT_NAME_LEN: usize = 80;

/// CRM object API name such as `Guest__c`.
///
/// # Examples
/// ```
/// use nightdesk::domain::ObjectName;
///
/// assert!(ObjectName::new("Guest__c").is_ok());
/// assert!(ObjectName::new("Guest__c/../Account").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ObjectName(String);

impl ObjectName {
    /// Validate an object API name.
    pub fn new(value: impl Into<String>) -> Result<Self, CrmError> {
        let raw = value.into();
        let mut chars = raw.chars();
        let starts_with_letter = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
        let rest_valid = chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !starts_with_letter || !rest_valid || raw.len() > MAX_OBJECT_NAME_LEN {
            return Err(CrmError::invalid_request(format!(
                "'{raw}' is not a valid CRM object name"
            )));
        }
        Ok(Self(raw))
    }

    /// Borrow the name.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ObjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// CRM record id (15- or 18-character alphanumeric).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Validate a record id.
    ///
    /// # Examples
    /// ```
    /// use nightdesk::domain::RecordId;
    ///
    /// assert!(RecordId::new("a015g00000XyZ12AAB").is_ok());
    /// assert!(RecordId::new("G1700000000000").is_err());
    /// ```
    pub fn new(value: impl Into<String>) -> Result<Self, CrmError> {
        let raw = value.into();
        let valid_len = matches!(raw.len(), 15 | 18);
        if !valid_len || !raw.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(CrmError::invalid_request(format!(
                "'{raw}' is not a valid CRM record id"
            )));
        }
        Ok(Self(raw))
    }

    /// Borrow the id.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Consume into the owned string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Account")]
    #[case("Linen_Stock__c")]
    #[case("X1")]
    fn accepts_api_names(#[case] name: &str) {
        assert_eq!(ObjectName::new(name).expect("valid").as_str(), name);
    }

    #[rstest]
    #[case("")]
    #[case("1Guest")]
    #[case("Guest__c/describe")]
    #[case("Guest c")]
    fn rejects_names_unsafe_for_paths(#[case] name: &str) {
        let err = ObjectName::new(name).expect_err("invalid");
        assert!(matches!(err, CrmError::InvalidRequest { .. }));
    }

    #[rstest]
    #[case("a015g00000XyZ12")]
    #[case("a015g00000XyZ12AAB")]
    fn accepts_record_ids(#[case] id: &str) {
        assert!(RecordId::new(id).is_ok());
    }

    #[rstest]
    #[case("a015g00000XyZ1")]
    #[case("a015g00000XyZ12AA/")]
    #[case("")]
    fn rejects_malformed_record_ids(#[case] id: &str) {
        assert!(RecordId::new(id).is_err());
    }
}
