//! Driven port for exchanging CRM credentials for a bearer token.

use std::fmt;

use async_trait::async_trait;
use url::Url;
use zeroize::Zeroizing;

use super::CrmError;

/// Bearer token plus the org instance it is valid for.
#[derive(Clone)]
pub struct AccessGrant {
    access_token: Zeroizing<String>,
    instance_url: Url,
}

impl AccessGrant {
    /// Pair a bearer token with its instance URL.
    pub fn new(access_token: impl Into<String>, instance_url: Url) -> Self {
        Self {
            access_token: Zeroizing::new(access_token.into()),
            instance_url,
        }
    }

    /// Bearer token for the `Authorization` header.
    pub fn access_token(&self) -> &str {
        self.access_token.as_str()
    }

    /// Base URL of the org's REST API host.
    pub fn instance_url(&self) -> &Url {
        &self.instance_url
    }
}

impl PartialEq for AccessGrant {
    fn eq(&self, other: &Self) -> bool {
        self.access_token.as_str() == other.access_token.as_str()
            && self.instance_url == other.instance_url
    }
}

impl fmt::Debug for AccessGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessGrant")
            .field("access_token", &"<redacted>")
            .field("instance_url", &self.instance_url.as_str())
            .finish()
    }
}

/// Port performing the OAuth2 password-grant exchange.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CrmAuthenticator: Send + Sync {
    /// Exchange the configured credentials for a fresh grant.
    ///
    /// Every call hits the token endpoint; caching is the caller's job.
    async fn authenticate(&self) -> Result<AccessGrant, CrmError>;
}
