// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! OAuth 2.0 client-credentials provider.
//!
//! Tokens are looked up in memory, then in the shared on-disk cache, and
//! only then fetched from the authorization server. A rejected call
//! (`Unauthenticated`) forces a refresh that skips the in-memory token;
//! the call is retried only if that produced a different token.

use crate::cache::OAuthCredentialsCache;
use crate::config::{OAuthProviderConfig, ResolvedOAuthConfig};
use crate::error::CredentialsError;
use crate::provider::CredentialsProvider;
use crate::token::CachedToken;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use zb_core::{Clock, EnvLookup, ProcessEnv, SystemClock};
use zb_gateway::{Metadata, RpcCode, RpcError, AUTHORIZATION};

const USER_AGENT: &str = concat!("zb-worker/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

/// How far a refresh may reuse what is already known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Refresh {
    /// Keep a valid in-memory token.
    IfNeeded,
    /// The gateway rejected the current token; ignore it.
    Rejected,
}

pub struct OAuthCredentialsProvider<C: Clock = SystemClock> {
    config: ResolvedOAuthConfig,
    http: reqwest::Client,
    cache: Arc<OAuthCredentialsCache>,
    token: Mutex<Option<CachedToken>>,
    clock: C,
}

impl<C: Clock> std::fmt::Debug for OAuthCredentialsProvider<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthCredentialsProvider")
            .field("config", &self.config)
            .field("cache", &self.cache.path())
            .finish_non_exhaustive()
    }
}

impl OAuthCredentialsProvider<SystemClock> {
    /// Build from `config` and the process environment.
    pub fn new(config: OAuthProviderConfig) -> Result<Self, CredentialsError> {
        Self::with_env(config, &ProcessEnv)
    }

    pub fn with_env(
        config: OAuthProviderConfig,
        env: &dyn EnvLookup,
    ) -> Result<Self, CredentialsError> {
        Self::with_clock(config, env, SystemClock)
    }
}

impl<C: Clock> OAuthCredentialsProvider<C> {
    pub fn with_clock(
        config: OAuthProviderConfig,
        env: &dyn EnvLookup,
        clock: C,
    ) -> Result<Self, CredentialsError> {
        let resolved = config.resolve(env)?;
        let cache = match config.cache_handle() {
            Some(cache) => cache,
            None => Arc::new(OAuthCredentialsCache::open(config.cache_path_setting(), env)?),
        };
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(resolved.request_timeout)
            .build()?;
        Ok(Self { config: resolved, http, cache, token: Mutex::new(None), clock })
    }

    pub fn config(&self) -> &ResolvedOAuthConfig {
        &self.config
    }

    /// Make sure `slot` holds a valid token. Returns whether the token changed.
    async fn refresh(
        &self,
        slot: &mut Option<CachedToken>,
        mode: Refresh,
    ) -> Result<bool, CredentialsError> {
        let now = self.clock.now();
        let previous = slot.as_ref().map(|t| t.access_token.clone());
        if mode == Refresh::IfNeeded && slot.as_ref().is_some_and(|t| t.is_valid_at(now)) {
            return Ok(false);
        }

        if let Err(e) = self.cache.refresh() {
            tracing::warn!(
                path = %self.cache.path().display(),
                error = %e,
                "failed to read credentials cache"
            );
        }
        let cached = self.cache.get(&self.config.audience).filter(|t| t.is_valid_at(now));
        if let Some(cached) = cached {
            // a rejected token is only worth replacing with a different one
            if mode == Refresh::IfNeeded || previous.as_deref() != Some(cached.access_token.as_str())
            {
                tracing::debug!(audience = %self.config.audience, "using cached OAuth token");
                let changed = previous.as_deref() != Some(cached.access_token.as_str());
                *slot = Some(cached);
                return Ok(changed);
            }
        }

        let fresh = self.fetch_token().await?;
        if let Err(e) = self.cache.update(&self.config.audience, fresh.clone()) {
            tracing::warn!(
                path = %self.cache.path().display(),
                error = %e,
                "failed to write credentials cache"
            );
        }
        let changed = previous.as_deref() != Some(fresh.access_token.as_str());
        *slot = Some(fresh);
        Ok(changed)
    }

    async fn fetch_token(&self) -> Result<CachedToken, CredentialsError> {
        tracing::debug!(
            url = %self.config.authorization_server_url,
            audience = %self.config.audience,
            "requesting OAuth token"
        );
        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("audience", self.config.audience.as_str()),
        ];
        let response = self
            .http
            .post(self.config.authorization_server_url.clone())
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "OAuth token request rejected");
            return Err(CredentialsError::Rejected { status: status.as_u16(), body });
        }

        let body: TokenResponse = response.json().await?;
        if body.access_token.is_empty() {
            return Err(CredentialsError::EmptyToken);
        }
        Ok(CachedToken {
            access_token: body.access_token,
            token_type: body.token_type,
            expiry: self.expiry_after(body.expires_in),
        })
    }

    // No lifetime from the server means the token does not expire.
    fn expiry_after(&self, expires_in: Option<i64>) -> DateTime<Utc> {
        expires_in
            .filter(|secs| *secs > 0)
            .and_then(chrono::Duration::try_seconds)
            .and_then(|lifetime| self.clock.now().checked_add_signed(lifetime))
            .unwrap_or_else(never_expires)
    }
}

// Latest instant that still round-trips through the YAML cache.
fn never_expires() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(253_402_300_799, 0).unwrap_or_default()
}

#[async_trait]
impl<C: Clock> CredentialsProvider for OAuthCredentialsProvider<C> {
    async fn apply_credentials(&self, headers: &mut Metadata) -> Result<(), CredentialsError> {
        let mut slot = self.token.lock().await;
        self.refresh(&mut slot, Refresh::IfNeeded).await?;
        match slot.as_ref() {
            Some(token) => {
                headers.insert(AUTHORIZATION, token.authorization_header());
                Ok(())
            }
            None => Err(CredentialsError::EmptyToken),
        }
    }

    async fn should_retry_request(&self, error: &RpcError) -> bool {
        if error.code != RpcCode::Unauthenticated {
            return false;
        }
        let mut slot = self.token.lock().await;
        match self.refresh(&mut slot, Refresh::Rejected).await {
            Ok(changed) => {
                tracing::debug!(changed, "refreshed OAuth token after rejected call");
                changed
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to refresh OAuth token");
                false
            }
        }
    }
}

#[cfg(test)]
#[path = "oauth_tests.rs"]
mod tests;
