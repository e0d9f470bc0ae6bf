// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;
use thiserror::Error;

/// Errors from the on-disk token cache
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("could not determine cache path: set ZEEBE_CLIENT_CONFIG_PATH or HOME")]
    NoPath,

    #[error("cache path {0} is a directory, expected a file")]
    IsDirectory(PathBuf),

    #[error("cache parent {0} exists but is not a directory")]
    NotADirectory(PathBuf),

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid cache file {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Errors constructing a credentials provider or obtaining a token
#[derive(Debug, Error)]
pub enum CredentialsError {
    #[error("missing OAuth {field}: set it in the config or via {env}")]
    MissingField { field: &'static str, env: &'static str },

    #[error("invalid authorization server URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("invalid auth request timeout '{0}': expected milliseconds")]
    InvalidTimeout(String),

    #[error("token request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("token request rejected with HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("token response has no access_token")]
    EmptyToken,

    #[error("credentials cache: {0}")]
    Cache(#[from] CacheError),
}
