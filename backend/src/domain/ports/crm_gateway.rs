//! Session-level CRM port consumed by domain services and HTTP handlers.
//!
//! Implementations own token management, so callers never see a bearer
//! token. [`crate::domain::CrmSession`] is the production implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use super::{CrmError, CrmRecord, ObjectDescription, ObjectSummary};
use crate::domain::{ObjectName, RecordId};

/// Outcome of an explicit connection test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionInfo {
    /// Org instance the session is bound to.
    pub instance_url: String,
    /// Local expiry of the cached token.
    pub expires_at: DateTime<Utc>,
}

/// Observable state of the token cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum TokenState {
    /// No usable token is cached.
    Empty,
    /// A token is cached until `expires_at`.
    #[serde(rename_all = "camelCase")]
    Cached {
        /// Local expiry instant.
        expires_at: DateTime<Utc>,
    },
}

/// Port for token-managed CRM access.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CrmGateway: Send + Sync {
    /// Ensure a token is available, authenticating when needed.
    async fn connect(&self) -> Result<ConnectionInfo, CrmError>;

    /// Run a SOQL query.
    async fn query(&self, soql: &str) -> Result<Vec<CrmRecord>, CrmError>;

    /// Create a record.
    async fn create(&self, object: &ObjectName, fields: &CrmRecord) -> Result<RecordId, CrmError>;

    /// Update a record.
    async fn update(
        &self,
        object: &ObjectName,
        id: &RecordId,
        fields: &CrmRecord,
    ) -> Result<(), CrmError>;

    /// Describe one object.
    async fn describe(&self, object: &ObjectName) -> Result<ObjectDescription, CrmError>;

    /// List visible objects.
    async fn describe_global(&self) -> Result<Vec<ObjectSummary>, CrmError>;

    /// Create Tooling API metadata.
    async fn tooling_create(
        &self,
        metadata_type: &ObjectName,
        body: &Value,
    ) -> Result<RecordId, CrmError>;

    /// Current token cache state.
    fn token_state(&self) -> TokenState;
}

/// Fixture gateway for a CRM that can never be reached.
///
/// Every call fails with a transport error; useful for offline runs and
/// tests of the degraded, not-connected behaviour.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisconnectedCrmGateway;

const DISCONNECTED: &str = "CRM connectivity unavailable";

#[async_trait]
impl CrmGateway for DisconnectedCrmGateway {
    async fn connect(&self) -> Result<ConnectionInfo, CrmError> {
        Err(CrmError::transport(DISCONNECTED))
    }

    async fn query(&self, _soql: &str) -> Result<Vec<CrmRecord>, CrmError> {
        Err(CrmError::transport(DISCONNECTED))
    }

    async fn create(
        &self,
        _object: &ObjectName,
        _fields: &CrmRecord,
    ) -> Result<RecordId, CrmError> {
        Err(CrmError::transport(DISCONNECTED))
    }

    async fn update(
        &self,
        _object: &ObjectName,
        _id: &RecordId,
        _fields: &CrmRecord,
    ) -> Result<(), CrmError> {
        Err(CrmError::transport(DISCONNECTED))
    }

    async fn describe(&self, _object: &ObjectName) -> Result<ObjectDescription, CrmError> {
        Err(CrmError::transport(DISCONNECTED))
    }

    async fn describe_global(&self) -> Result<Vec<ObjectSummary>, CrmError> {
        Err(CrmError::transport(DISCONNECTED))
    }

    async fn tooling_create(
        &self,
        _metadata_type: &ObjectName,
        _body: &Value,
    ) -> Result<RecordId, CrmError> {
        Err(CrmError::transport(DISCONNECTED))
    }

    fn token_state(&self) -> TokenState {
        TokenState::Empty
    }
}
