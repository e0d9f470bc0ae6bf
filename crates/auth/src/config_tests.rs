// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use zb_core::MapEnv;

fn explicit() -> OAuthProviderConfig {
    OAuthProviderConfig::new()
        .client_id("explicit-id")
        .client_secret("explicit-secret")
        .audience("explicit-aud")
}

#[test]
fn explicit_values_and_defaults() {
    let resolved = explicit().resolve(&MapEnv::new()).unwrap();
    assert_eq!(resolved.client_id, "explicit-id");
    assert_eq!(resolved.client_secret, "explicit-secret");
    assert_eq!(resolved.audience, "explicit-aud");
    assert_eq!(resolved.authorization_server_url.as_str(), DEFAULT_AUTHORIZATION_SERVER_URL);
    assert_eq!(resolved.request_timeout, DEFAULT_REQUEST_TIMEOUT);
}

#[test]
fn environment_overrides_explicit_values() {
    let env = MapEnv::new()
        .with(env::CLIENT_ID, "env-id")
        .with(env::CLIENT_SECRET, "env-secret")
        .with(env::TOKEN_AUDIENCE, "env-aud")
        .with(env::AUTHORIZATION_SERVER_URL, "http://localhost:18080/token")
        .with(env::AUTH_REQUEST_TIMEOUT, "2500");
    let config = explicit().authorization_server_url("https://other/").request_timeout(
        Duration::from_secs(1),
    );

    let resolved = config.resolve(&env).unwrap();

    assert_eq!(resolved.client_id, "env-id");
    assert_eq!(resolved.client_secret, "env-secret");
    assert_eq!(resolved.audience, "env-aud");
    assert_eq!(resolved.authorization_server_url.as_str(), "http://localhost:18080/token");
    assert_eq!(resolved.request_timeout, Duration::from_millis(2500));
}

#[test]
fn empty_environment_values_are_ignored() {
    let env = MapEnv::new().with(env::CLIENT_ID, "  ");
    assert_eq!(explicit().resolve(&env).unwrap().client_id, "explicit-id");
}

#[test]
fn environment_alone_is_enough() {
    let env = MapEnv::new()
        .with(env::CLIENT_ID, "id")
        .with(env::CLIENT_SECRET, "secret")
        .with(env::TOKEN_AUDIENCE, "aud");
    assert!(OAuthProviderConfig::new().resolve(&env).is_ok());
}

#[yare::parameterized(
    client_id     = { env::CLIENT_ID },
    client_secret = { env::CLIENT_SECRET },
    audience      = { env::TOKEN_AUDIENCE },
)]
fn each_credential_field_is_required(missing: &str) {
    let env: MapEnv = [env::CLIENT_ID, env::CLIENT_SECRET, env::TOKEN_AUDIENCE]
        .into_iter()
        .filter(|key| *key != missing)
        .map(|key| (key, "value"))
        .collect();

    let err = OAuthProviderConfig::new().resolve(&env).unwrap_err();

    match err {
        CredentialsError::MissingField { env, .. } => assert_eq!(env, missing),
        other => panic!("unexpected error: {other}"),
    }
}

#[yare::parameterized(
    not_a_url  = { "not a url" },
    relative   = { "/oauth/token" },
    ftp_scheme = { "ftp://login.example.com/token" },
)]
fn invalid_server_urls_are_rejected(url: &str) {
    let err = explicit().authorization_server_url(url).resolve(&MapEnv::new()).unwrap_err();
    assert!(matches!(err, CredentialsError::InvalidUrl { .. }), "got {err}");
}

#[test]
fn non_numeric_timeout_is_rejected() {
    let env = MapEnv::new().with(env::AUTH_REQUEST_TIMEOUT, "10s");
    let err = explicit().resolve(&env).unwrap_err();
    assert!(matches!(err, CredentialsError::InvalidTimeout(v) if v == "10s"));
}

#[test]
fn debug_output_hides_the_secret() {
    let config = explicit();
    assert!(!format!("{config:?}").contains("explicit-secret"));
    let resolved = config.resolve(&MapEnv::new()).unwrap();
    assert!(!format!("{resolved:?}").contains("explicit-secret"));
}
