//! Bearer token cache for the CRM session.
//!
//! Two states: `Empty` and `Cached`. A cached grant is returned while
//! `now < expires_at`; otherwise the authenticator is called and its grant is
//! stored with `expires_at = now + ttl`. Failed exchanges leave the cache
//! empty. There is no refresh guard: concurrent misses each authenticate and
//! the last one to finish wins.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;
use tracing::{debug, info, warn};

use super::ports::{AccessGrant, CrmAuthenticator, CrmError, TokenState};

/// Token lifetime applied to every grant, shared by all call sites.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(50 * 60);

const MAX_TTL_SECS: i64 = 24 * 60 * 60;

/// Longest lifetime a cache will assign; the org's own session limit.
pub const MAX_TOKEN_TTL: Duration = Duration::from_secs(MAX_TTL_SECS.unsigned_abs());

struct CachedGrant {
    grant: AccessGrant,
    expires_at: DateTime<Utc>,
}

/// Memoises one bearer token per process.
pub struct TokenCache {
    authenticator: Arc<dyn CrmAuthenticator>,
    clock: Arc<dyn Clock>,
    ttl: TimeDelta,
    entry: Mutex<Option<CachedGrant>>,
}

impl TokenCache {
    /// Build a cache using [`DEFAULT_TOKEN_TTL`].
    pub fn new(authenticator: Arc<dyn CrmAuthenticator>, clock: Arc<dyn Clock>) -> Self {
        Self::with_ttl(authenticator, clock, DEFAULT_TOKEN_TTL)
    }

    /// Build a cache with an explicit token lifetime.
    ///
    /// Lifetimes above [`MAX_TOKEN_TTL`] are clamped to it; configuration
    /// rejects them before they get here.
    pub fn with_ttl(
        authenticator: Arc<dyn CrmAuthenticator>,
        clock: Arc<dyn Clock>,
        ttl: Duration,
    ) -> Self {
        let seconds = i64::try_from(ttl.as_secs()).map_or(MAX_TTL_SECS, |s| s.min(MAX_TTL_SECS));
        Self {
            authenticator,
            clock,
            ttl: TimeDelta::seconds(seconds),
            entry: Mutex::new(None),
        }
    }

    /// Return the cached grant, authenticating when it is missing or stale.
    ///
    /// # Errors
    /// Propagates the authenticator's error; the cache is left empty.
    pub async fn get_token(&self) -> Result<AccessGrant, CrmError> {
        if let Some(grant) = self.fresh_grant(self.clock.utc()) {
            return Ok(grant);
        }

        debug!("CRM token cache miss; authenticating");
        match self.authenticator.authenticate().await {
            Ok(grant) => {
                let now = self.clock.utc();
                let expires_at = now
                    .checked_add_signed(self.ttl)
                    .unwrap_or(DateTime::<Utc>::MAX_UTC);
                *self.lock_entry() = Some(CachedGrant {
                    grant: grant.clone(),
                    expires_at,
                });
                info!(
                    instance_url = %grant.instance_url(),
                    %expires_at,
                    "CRM token cached"
                );
                Ok(grant)
            }
            Err(error) => {
                self.invalidate();
                warn!(%error, "CRM authentication failed");
                Err(error)
            }
        }
    }

    /// Drop the cached grant so the next call re-authenticates.
    pub fn invalidate(&self) {
        *self.lock_entry() = None;
    }

    /// Expiry of the cached grant, if any.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.lock_entry().as_ref().map(|entry| entry.expires_at)
    }

    /// Observable state relative to the injected clock.
    pub fn state(&self) -> TokenState {
        let now = self.clock.utc();
        match self.lock_entry().as_ref() {
            Some(entry) if now < entry.expires_at => TokenState::Cached {
                expires_at: entry.expires_at,
            },
            _ => TokenState::Empty,
        }
    }

    fn fresh_grant(&self, now: DateTime<Utc>) -> Option<AccessGrant> {
        self.lock_entry()
            .as_ref()
            .filter(|entry| now < entry.expires_at)
            .map(|entry| entry.grant.clone())
    }

    fn lock_entry(&self) -> MutexGuard<'_, Option<CachedGrant>> {
        self.entry.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
