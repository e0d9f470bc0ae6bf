// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! OAuth provider settings and their resolution against the environment.
//!
//! Every field may come from the explicit config or from a `ZEEBE_*`
//! variable. A non-empty variable overrides the explicit value.

use crate::cache::OAuthCredentialsCache;
use crate::error::CredentialsError;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use url::Url;
use zb_core::env::{self, EnvLookup};

pub const DEFAULT_AUTHORIZATION_SERVER_URL: &str = "https://login.cloud.camunda.io/oauth/token/";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Explicit OAuth settings. Unset fields fall back to the environment,
/// then to defaults where one exists.
#[derive(Clone, Default)]
pub struct OAuthProviderConfig {
    client_id: Option<String>,
    client_secret: Option<String>,
    audience: Option<String>,
    authorization_server_url: Option<String>,
    request_timeout: Option<Duration>,
    cache_path: Option<PathBuf>,
    cache: Option<Arc<OAuthCredentialsCache>>,
}

impl OAuthProviderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    zb_core::setters! {
        option {
            client_id: String,
            client_secret: String,
            audience: String,
            authorization_server_url: String,
            request_timeout: Duration,
            cache_path: PathBuf,
        }
    }

    /// Share an already opened cache instead of opening one.
    pub fn cache(mut self, cache: Arc<OAuthCredentialsCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub(crate) fn cache_handle(&self) -> Option<Arc<OAuthCredentialsCache>> {
        self.cache.clone()
    }

    pub(crate) fn cache_path_setting(&self) -> Option<PathBuf> {
        self.cache_path.clone()
    }

    pub fn resolve(&self, env: &dyn EnvLookup) -> Result<ResolvedOAuthConfig, CredentialsError> {
        let pick = |key: &str, explicit: &Option<String>| {
            env.non_empty(key).or_else(|| explicit.clone().filter(|v| !v.trim().is_empty()))
        };
        let required = |field: &'static str, key: &'static str, explicit: &Option<String>| {
            pick(key, explicit).ok_or(CredentialsError::MissingField { field, env: key })
        };

        let client_id = required("client id", env::CLIENT_ID, &self.client_id)?;
        let client_secret = required("client secret", env::CLIENT_SECRET, &self.client_secret)?;
        let audience = required("audience", env::TOKEN_AUDIENCE, &self.audience)?;

        let raw_url = pick(env::AUTHORIZATION_SERVER_URL, &self.authorization_server_url)
            .unwrap_or_else(|| DEFAULT_AUTHORIZATION_SERVER_URL.to_string());
        let authorization_server_url = parse_server_url(&raw_url)?;

        let request_timeout = match env.non_empty(env::AUTH_REQUEST_TIMEOUT) {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| CredentialsError::InvalidTimeout(raw))?,
            None => self.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT),
        };

        Ok(ResolvedOAuthConfig {
            client_id,
            client_secret,
            audience,
            authorization_server_url,
            request_timeout,
        })
    }
}

impl fmt::Debug for OAuthProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthProviderConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "<redacted>"))
            .field("audience", &self.audience)
            .field("authorization_server_url", &self.authorization_server_url)
            .field("request_timeout", &self.request_timeout)
            .field("cache_path", &self.cache_path)
            .finish_non_exhaustive()
    }
}

/// Settings after environment overrides and defaults.
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedOAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub audience: String,
    pub authorization_server_url: Url,
    pub request_timeout: Duration,
}

impl fmt::Debug for ResolvedOAuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedOAuthConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("audience", &self.audience)
            .field("authorization_server_url", &self.authorization_server_url.as_str())
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

fn parse_server_url(raw: &str) -> Result<Url, CredentialsError> {
    let invalid = |reason: String| CredentialsError::InvalidUrl { url: raw.to_string(), reason };
    let url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" if url.has_host() => Ok(url),
        "http" | "https" => Err(invalid("missing host".to_string())),
        other => Err(invalid(format!("unsupported scheme '{other}'"))),
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
