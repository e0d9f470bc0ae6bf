// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Environment variable access for client configuration.
//!
//! Configuration resolution reads the environment through [`EnvLookup`] so
//! tests can inject a [`MapEnv`] instead of mutating the process environment.

use std::collections::HashMap;
use std::path::PathBuf;

pub const CLIENT_ID: &str = "ZEEBE_CLIENT_ID";
pub const CLIENT_SECRET: &str = "ZEEBE_CLIENT_SECRET";
pub const TOKEN_AUDIENCE: &str = "ZEEBE_TOKEN_AUDIENCE";
pub const AUTHORIZATION_SERVER_URL: &str = "ZEEBE_AUTHORIZATION_SERVER_URL";
/// Milliseconds
pub const AUTH_REQUEST_TIMEOUT: &str = "ZEEBE_AUTH_REQUEST_TIMEOUT";
pub const CLIENT_CONFIG_PATH: &str = "ZEEBE_CLIENT_CONFIG_PATH";
pub const GATEWAY_ADDRESS: &str = "ZEEBE_ADDRESS";
pub const INSECURE_CONNECTION: &str = "ZEEBE_INSECURE_CONNECTION";
pub const CA_CERTIFICATE_PATH: &str = "ZEEBE_CA_CERTIFICATE_PATH";
/// Milliseconds
pub const KEEP_ALIVE: &str = "ZEEBE_KEEP_ALIVE";

/// Read-only view of environment variables.
pub trait EnvLookup: Send + Sync {
    fn var(&self, key: &str) -> Option<String>;

    /// The variable's value, treating empty strings as unset.
    fn non_empty(&self, key: &str) -> Option<String> {
        self.var(key).filter(|v| !v.trim().is_empty())
    }

    /// The user's home directory: `HOME`, then the platform lookup.
    fn home_dir(&self) -> Option<PathBuf> {
        self.non_empty("HOME").map(PathBuf::from).or_else(dirs::home_dir)
    }
}

/// The real process environment.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessEnv;

impl EnvLookup for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// A fixed set of variables, for tests and embedding.
#[derive(Clone, Debug, Default)]
pub struct MapEnv {
    vars: HashMap<String, String>,
}

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }
}

impl EnvLookup for MapEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }

    fn home_dir(&self) -> Option<PathBuf> {
        // never fall back to the real home directory
        self.non_empty("HOME").map(PathBuf::from)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapEnv {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self { vars: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect() }
    }
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
