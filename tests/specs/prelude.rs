// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared helpers for the end-to-end specs.

pub use std::sync::Arc;
pub use std::time::Duration;
pub use zb_auth::{
    CacheError, CredentialsError, CredentialsProvider, OAuthCredentialsCache,
    OAuthCredentialsProvider, OAuthProviderConfig,
};
pub use zb_core::{Job, MapEnv};
pub use zb_gateway::{
    ActivatedJob, CompleteJobRequest, FakeGateway, Method, Metadata, RpcCode, RpcError,
    StreamScript,
};
pub use zb_worker::{JobClient, JobWorkerBuilder};

use async_trait::async_trait;
use parking_lot::Mutex;
use std::future::Future;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Route worker logs to the test output when `RUST_LOG` is set.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Poll `check` until it holds, failing after five seconds.
pub async fn eventually(what: &str, mut check: impl FnMut() -> bool) {
    let wait = async {
        while !check() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    };
    if tokio::time::timeout(Duration::from_secs(5), wait).await.is_err() {
        panic!("timed out waiting for {what}");
    }
}

pub async fn within<T>(future: impl Future<Output = T>) -> T {
    match tokio::time::timeout(Duration::from_secs(5), future).await {
        Ok(value) => value,
        Err(_) => panic!("timed out"),
    }
}

pub fn wire_jobs(first_key: i64, count: usize, job_type: &str) -> Vec<ActivatedJob> {
    zb_core::test_support::jobs(first_key, count, job_type).iter().map(ActivatedJob::from).collect()
}

/// Delegates to `inner` and records every retry decision.
pub struct RecordingCredentials<P> {
    inner: P,
    decisions: Mutex<Vec<bool>>,
}

impl<P> RecordingCredentials<P> {
    pub fn new(inner: P) -> Arc<Self> {
        Arc::new(Self { inner, decisions: Mutex::new(Vec::new()) })
    }

    pub fn decisions(&self) -> Vec<bool> {
        self.decisions.lock().clone()
    }
}

#[async_trait]
impl<P: CredentialsProvider> CredentialsProvider for RecordingCredentials<P> {
    async fn apply_credentials(&self, headers: &mut Metadata) -> Result<(), CredentialsError> {
        self.inner.apply_credentials(headers).await
    }

    async fn should_retry_request(&self, error: &RpcError) -> bool {
        let retry = self.inner.should_retry_request(error).await;
        self.decisions.lock().push(retry);
        retry
    }
}

/// Token endpoint answering with `tokens` in order; the last one repeats.
pub async fn token_server(tokens: &[&str]) -> MockServer {
    let server = MockServer::start().await;
    for (i, token) in tokens.iter().enumerate() {
        let mock = Mock::given(method("POST")).and(path("/oauth/token")).respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": token,
                "token_type": "Bearer",
                "expires_in": 3600,
            })),
        );
        if i + 1 < tokens.len() {
            mock.up_to_n_times(1).mount(&server).await;
        } else {
            mock.mount(&server).await;
        }
    }
    server
}

/// OAuth provider against `server`, caching under `cache_dir`.
pub fn oauth_provider(server: &MockServer, cache_dir: &std::path::Path) -> OAuthCredentialsProvider {
    let config = OAuthProviderConfig::new()
        .client_id("spec-client")
        .client_secret("spec-secret")
        .audience("zeebe.spec")
        .authorization_server_url(format!("{}/oauth/token", server.uri()))
        .cache_path(cache_dir.join("credentials"));
    match OAuthCredentialsProvider::with_env(config, &MapEnv::new()) {
        Ok(provider) => provider,
        Err(e) => panic!("provider: {e}"),
    }
}
