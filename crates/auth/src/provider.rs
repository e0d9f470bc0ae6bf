// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Credentials applied to every gateway call.

use crate::error::CredentialsError;
use async_trait::async_trait;
use zb_gateway::{Metadata, RpcError};

/// Attaches credentials to outgoing calls and decides whether a failed
/// call is worth retrying after refreshing them.
#[async_trait]
pub trait CredentialsProvider: Send + Sync {
    /// Add credential headers to `headers`. Fails when no valid
    /// credentials can be obtained.
    async fn apply_credentials(&self, headers: &mut Metadata) -> Result<(), CredentialsError>;

    /// Called after a failed call. Returns `true` if retrying the same
    /// request may now succeed.
    async fn should_retry_request(&self, error: &RpcError) -> bool;
}

/// Provider for unsecured gateways: adds nothing, never retries.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCredentialsProvider;

#[async_trait]
impl CredentialsProvider for NoopCredentialsProvider {
    async fn apply_credentials(&self, _headers: &mut Metadata) -> Result<(), CredentialsError> {
        Ok(())
    }

    async fn should_retry_request(&self, _error: &RpcError) -> bool {
        false
    }
}
