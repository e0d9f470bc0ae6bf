// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Credentials cache file specs

use crate::prelude::*;
use zb_auth::CachedToken;

fn token(value: &str) -> CachedToken {
    CachedToken {
        access_token: value.into(),
        token_type: "Bearer".into(),
        expiry: chrono::DateTime::from_timestamp(1_900_000_000, 0).unwrap(),
    }
}

#[tokio::test]
async fn default_location_is_created_under_home() {
    let home = tempfile::tempdir().unwrap();
    let env = MapEnv::new().with("HOME", home.path().to_string_lossy());

    let cache = OAuthCredentialsCache::open(None, &env).unwrap();

    let dir = home.path().join(".camunda");
    let file = dir.join("credentials");
    assert_eq!(cache.path(), file);
    assert!(file.is_file());
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = |p: &std::path::Path| std::fs::metadata(p).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode(&dir), 0o770);
        assert_eq!(mode(&file), 0o660);
    }
}

#[tokio::test]
async fn tokens_survive_a_reopen() {
    let home = tempfile::tempdir().unwrap();
    let env = MapEnv::new().with("HOME", home.path().to_string_lossy());

    let cache = OAuthCredentialsCache::open(None, &env).unwrap();
    cache.update("zeebe.spec", token("persisted")).unwrap();
    drop(cache);

    let reopened = OAuthCredentialsCache::open(None, &env).unwrap();
    assert_eq!(reopened.get("zeebe.spec"), Some(token("persisted")));
    assert_eq!(reopened.get("other"), None);
}

#[tokio::test]
async fn directory_at_the_cache_path_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let taken = dir.path().join("credentials");
    std::fs::create_dir(&taken).unwrap();

    let err = OAuthCredentialsCache::open(Some(taken.clone()), &MapEnv::new()).unwrap_err();
    assert!(matches!(err, CacheError::IsDirectory(ref p) if *p == taken), "{err}");

    let config = OAuthProviderConfig::new()
        .client_id("spec-client")
        .client_secret("spec-secret")
        .audience("zeebe.spec")
        .cache_path(taken);
    let err = OAuthCredentialsProvider::with_env(config, &MapEnv::new()).unwrap_err();
    assert!(matches!(err, CredentialsError::Cache(CacheError::IsDirectory(_))), "{err}");
}

#[tokio::test]
async fn provider_shares_tokens_through_the_file() {
    let server = token_server(&["shared-token"]).await;
    let dir = tempfile::tempdir().unwrap();

    let first = oauth_provider(&server, dir.path());
    let mut headers = Metadata::new();
    first.apply_credentials(&mut headers).await.unwrap();

    let second = oauth_provider(&server, dir.path());
    let mut headers = Metadata::new();
    second.apply_credentials(&mut headers).await.unwrap();

    assert_eq!(headers.authorization(), Some("Bearer shared-token"));
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}
