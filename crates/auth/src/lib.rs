// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! zb-auth: Credentials for gateway calls, including OAuth client credentials
//! with a token cache shared across processes.

mod cache;
mod config;
mod error;
mod oauth;
mod provider;
mod token;

pub use cache::{resolve_path as resolve_cache_path, OAuthCredentialsCache};
pub use config::{
    OAuthProviderConfig, ResolvedOAuthConfig, DEFAULT_AUTHORIZATION_SERVER_URL,
    DEFAULT_REQUEST_TIMEOUT,
};
pub use error::{CacheError, CredentialsError};
pub use oauth::OAuthCredentialsProvider;
pub use provider::{CredentialsProvider, NoopCredentialsProvider};
pub use token::CachedToken;
