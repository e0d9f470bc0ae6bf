// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Gateway connection settings.
//!
//! The transport itself lives behind [`zb_gateway::Gateway`]; this module
//! resolves what it needs from explicit values and `ZEEBE_*` variables.
//! A non-empty variable overrides the explicit value.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use zb_core::env::{self, EnvLookup};

pub const DEFAULT_GATEWAY_ADDRESS: &str = "0.0.0.0:26500";
pub const DEFAULT_KEEP_ALIVE: Duration = Duration::from_secs(45);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("CA certificate {0} does not exist")]
    CaCertificateNotFound(PathBuf),

    #[error("invalid keep-alive '{0}': expected non-negative milliseconds")]
    InvalidKeepAlive(String),

    #[error("invalid boolean '{value}' for {key}")]
    InvalidBool { key: &'static str, value: String },
}

#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    gateway_address: Option<String>,
    use_plaintext: Option<bool>,
    ca_certificate_path: Option<PathBuf>,
    keep_alive: Option<Duration>,
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    zb_core::setters! {
        option {
            gateway_address: String,
            use_plaintext: bool,
            ca_certificate_path: PathBuf,
            keep_alive: Duration,
        }
    }

    pub fn resolve(&self, env: &dyn EnvLookup) -> Result<ResolvedClientConfig, ConfigError> {
        let gateway_address = env
            .non_empty(env::GATEWAY_ADDRESS)
            .or_else(|| self.gateway_address.clone())
            .unwrap_or_else(|| DEFAULT_GATEWAY_ADDRESS.to_string());

        let use_plaintext = match env.non_empty(env::INSECURE_CONNECTION) {
            Some(raw) => parse_bool(env::INSECURE_CONNECTION, &raw)?,
            None => self.use_plaintext.unwrap_or(false),
        };

        let ca_certificate_path = env
            .non_empty(env::CA_CERTIFICATE_PATH)
            .map(PathBuf::from)
            .or_else(|| self.ca_certificate_path.clone());
        if let Some(path) = &ca_certificate_path {
            if !path.exists() {
                return Err(ConfigError::CaCertificateNotFound(path.clone()));
            }
        }

        let keep_alive = match env.non_empty(env::KEEP_ALIVE) {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| ConfigError::InvalidKeepAlive(raw))?,
            None => self.keep_alive.unwrap_or(DEFAULT_KEEP_ALIVE),
        };

        Ok(ResolvedClientConfig { gateway_address, use_plaintext, ca_certificate_path, keep_alive })
    }
}

/// Settings after environment overrides and defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedClientConfig {
    pub gateway_address: String,
    pub use_plaintext: bool,
    pub ca_certificate_path: Option<PathBuf>,
    pub keep_alive: Duration,
}

fn parse_bool(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim() {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(false),
        other => Err(ConfigError::InvalidBool { key, value: other.to_string() }),
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
