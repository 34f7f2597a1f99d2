//! Token-managed CRM session.
//!
//! Wraps the raw [`CrmApi`] with a [`TokenCache`]. A call that reports an
//! expired session drops the cached token; the error still reaches the
//! caller, which treats it as "not connected", and the next call
//! re-authenticates.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

use super::ports::{
    AccessGrant, ConnectionInfo, CrmApi, CrmError, CrmGateway, CrmRecord, ObjectDescription,
    ObjectSummary, TokenState,
};
use super::token_cache::TokenCache;
use super::{ObjectName, RecordId};

/// Production [`CrmGateway`] implementation.
pub struct CrmSession {
    tokens: TokenCache,
    api: Arc<dyn CrmApi>,
}

impl CrmSession {
    /// Combine a token cache with a CRM API adapter.
    pub fn new(tokens: TokenCache, api: Arc<dyn CrmApi>) -> Self {
        Self { tokens, api }
    }

    async fn grant(&self) -> Result<AccessGrant, CrmError> {
        self.tokens.get_token().await
    }

    fn observe<T>(&self, result: Result<T, CrmError>) -> Result<T, CrmError> {
        if let Err(error) = &result {
            if error.invalidates_session() {
                warn!(%error, "CRM session rejected; dropping cached token");
                self.tokens.invalidate();
            }
        }
        result
    }
}

#[async_trait]
impl CrmGateway for CrmSession {
    async fn connect(&self) -> Result<ConnectionInfo, CrmError> {
        let grant = self.grant().await?;
        Ok(ConnectionInfo {
            instance_url: grant.instance_url().to_string(),
            expires_at: self.tokens.expires_at().unwrap_or_default(),
        })
    }

    async fn query(&self, soql: &str) -> Result<Vec<CrmRecord>, CrmError> {
        let grant = self.grant().await?;
        self.observe(self.api.query(&grant, soql).await)
    }

    async fn create(&self, object: &ObjectName, fields: &CrmRecord) -> Result<RecordId, CrmError> {
        let grant = self.grant().await?;
        self.observe(self.api.create(&grant, object, fields).await)
    }

    async fn update(
        &self,
        object: &ObjectName,
        id: &RecordId,
        fields: &CrmRecord,
    ) -> Result<(), CrmError> {
        let grant = self.grant().await?;
        self.observe(self.api.update(&grant, object, id, fields).await)
    }

    async fn describe(&self, object: &ObjectName) -> Result<ObjectDescription, CrmError> {
        let grant = self.grant().await?;
        self.observe(self.api.describe(&grant, object).await)
    }

    async fn describe_global(&self) -> Result<Vec<ObjectSummary>, CrmError> {
        let grant = self.grant().await?;
        self.observe(self.api.describe_global(&grant).await)
    }

    async fn tooling_create(
        &self,
        metadata_type: &ObjectName,
        body: &Value,
    ) -> Result<RecordId, CrmError> {
        let grant = self.grant().await?;
        self.observe(self.api.tooling_create(&grant, metadata_type, body).await)
    }

    fn token_state(&self) -> TokenState {
        self.tokens.state()
    }
}
