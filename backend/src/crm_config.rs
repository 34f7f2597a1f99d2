//! CRM credential loading.
//!
//! Credentials come only from the environment. Every required variable is
//! checked before the server starts and all missing names are reported
//! together, so a misconfigured deployment fails once with the full list.

use std::fmt;

use mockable::Env;
use tracing::warn;
use url::Url;
use zeroize::Zeroizing;

use crate::domain::ConnectionProfile;

const LOGIN_URL_ENV: &str = "SALESFORCE_LOGIN_URL";
const CLIENT_ID_ENV: &str = "SALESFORCE_CLIENT_ID";
const CLIENT_SECRET_ENV: &str = "SALESFORCE_CLIENT_SECRET";
const USERNAME_ENV: &str = "SALESFORCE_USERNAME";
const PASSWORD_ENV: &str = "SALESFORCE_PASSWORD";
const SECURITY_TOKEN_ENV: &str = "SALESFORCE_SECURITY_TOKEN";
const API_VERSION_ENV: &str = "SALESFORCE_API_VERSION";

/// Login host used when `SALESFORCE_LOGIN_URL` is unset.
pub const DEFAULT_LOGIN_URL: &str = "https://login.salesforce.com";
/// REST API version used when `SALESFORCE_API_VERSION` is unset.
pub const DEFAULT_API_VERSION: &str = "v58.0";

/// Errors raised while reading CRM credentials.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum CrmConfigError {
    /// One or more required variables are unset or blank.
    #[error("missing required environment variables: {}", names.join(", "))]
    Missing { names: Vec<&'static str> },
    /// A variable is present but malformed.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    Invalid {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Password-grant credentials for the CRM org.
pub struct CrmCredentials {
    /// OAuth login host.
    pub login_url: Url,
    /// REST API version segment such as `v58.0`.
    pub api_version: String,
    /// Connected app consumer key.
    pub client_id: String,
    /// Connected app consumer secret.
    pub client_secret: Zeroizing<String>,
    /// Integration user name.
    pub username: String,
    /// Integration user password.
    pub password: Zeroizing<String>,
    /// Security token appended to the password, when the org requires one.
    pub security_token: Option<Zeroizing<String>>,
}

impl CrmCredentials {
    /// Read credentials from the environment.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use mockable::MockEnv;
    /// use nightdesk::crm_config::CrmCredentials;
    ///
    /// let mut env = MockEnv::new();
    /// env.expect_string().returning(|name| match name {
    ///     "SALESFORCE_CLIENT_ID" => Some("client".to_owned()),
    ///     "SALESFORCE_CLIENT_SECRET" => Some("secret".to_owned()),
    ///     "SALESFORCE_USERNAME" => Some("desk@example.com".to_owned()),
    ///     "SALESFORCE_PASSWORD" => Some("hunter2".to_owned()),
    ///     _ => None,
    /// });
    ///
    /// let credentials = CrmCredentials::from_env(&env).expect("credentials");
    /// assert_eq!(credentials.api_version, "v58.0");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`CrmConfigError::Missing`] naming every absent required
    /// variable, or [`CrmConfigError::Invalid`] for a malformed login URL or
    /// API version.
    pub fn from_env<E: Env>(env: &E) -> Result<Self, CrmConfigError> {
        let read = |name: &'static str| {
            env.string(name)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let mut missing = Vec::new();
        let mut required = |name: &'static str| {
            let value = read(name);
            if value.is_none() {
                missing.push(name);
            }
            value.unwrap_or_default()
        };
        let client_id = required(CLIENT_ID_ENV);
        let client_secret = Zeroizing::new(required(CLIENT_SECRET_ENV));
        let username = required(USERNAME_ENV);
        let password = Zeroizing::new(required(PASSWORD_ENV));
        if !missing.is_empty() {
            return Err(CrmConfigError::Missing { names: missing });
        }

        let login_url = match read(LOGIN_URL_ENV) {
            Some(raw) => parse_login_url(raw)?,
            None => parse_login_url(DEFAULT_LOGIN_URL.to_owned())?,
        };
        let api_version = match read(API_VERSION_ENV) {
            Some(raw) if is_api_version(&raw) => raw,
            Some(raw) => {
                return Err(CrmConfigError::Invalid {
                    name: API_VERSION_ENV,
                    value: raw,
                    expected: "vNN.N",
                });
            }
            None => DEFAULT_API_VERSION.to_owned(),
        };
        let security_token = read(SECURITY_TOKEN_ENV).map(Zeroizing::new);
        if security_token.is_none() {
            warn!("SALESFORCE_SECURITY_TOKEN not set; logins from untrusted networks will fail");
        }

        Ok(Self {
            login_url,
            api_version,
            client_id,
            client_secret,
            username,
            password,
            security_token,
        })
    }

    /// Password as sent to the token endpoint: password then security token.
    pub fn grant_password(&self) -> Zeroizing<String> {
        let mut combined = Zeroizing::new(String::with_capacity(
            self.password.len()
                + self
                    .security_token
                    .as_ref()
                    .map_or(0, |token| token.len()),
        ));
        combined.push_str(&self.password);
        if let Some(token) = &self.security_token {
            combined.push_str(token);
        }
        combined
    }

    /// Non-secret summary for diagnostics.
    pub fn profile(&self) -> ConnectionProfile {
        ConnectionProfile {
            login_url: self.login_url.to_string(),
            api_version: self.api_version.clone(),
            username: self.username.clone(),
            security_token_configured: self.security_token.is_some(),
        }
    }
}

impl fmt::Debug for CrmCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrmCredentials")
            .field("login_url", &self.login_url.as_str())
            .field("api_version", &self.api_version)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field(
                "security_token",
                &self.security_token.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

fn parse_login_url(raw: String) -> Result<Url, CrmConfigError> {
    match Url::parse(&raw) {
        Ok(url) if matches!(url.scheme(), "https" | "http") && url.has_host() => Ok(url),
        _ => Err(CrmConfigError::Invalid {
            name: LOGIN_URL_ENV,
            value: raw,
            expected: "an absolute http(s) URL",
        }),
    }
}

fn is_api_version(raw: &str) -> bool {
    raw.strip_prefix('v')
        .and_then(|rest| rest.split_once('.'))
        .is_some_and(|(major, minor)| {
            !major.is_empty()
                && !minor.is_empty()
                && major.chars().all(|c| c.is_ascii_digit())
                && minor.chars().all(|c| c.is_ascii_digit())
        })
}
