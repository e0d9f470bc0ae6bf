// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Credential refresh specs
//!
//! An `Unauthenticated` failure triggers a token refresh; the call is
//! repeated only when the refresh produced a different token.

use crate::prelude::*;

fn authorizations(gateway: &FakeGateway) -> Vec<Option<String>> {
    gateway
        .calls_to(Method::CompleteJob)
        .iter()
        .map(|c| c.metadata.authorization().map(str::to_string))
        .collect()
}

#[tokio::test]
async fn rejected_token_is_replaced_and_the_call_repeated() {
    let server = token_server(&["token-a", "token-b"]).await;
    let dir = tempfile::tempdir().unwrap();
    let credentials = RecordingCredentials::new(oauth_provider(&server, dir.path()));
    let gateway = FakeGateway::new();
    gateway.fail_next(Method::CompleteJob, RpcError::unauthenticated("token expired"));
    let client =
        JobClient::new(Arc::new(gateway.clone())).with_credentials(credentials.clone());

    client
        .complete_job(CompleteJobRequest { job_key: 1, variables: "{}".into() })
        .await
        .unwrap();

    assert_eq!(
        authorizations(&gateway),
        vec![Some("Bearer token-a".to_string()), Some("Bearer token-b".to_string())]
    );
    assert_eq!(credentials.decisions(), vec![true]);
}

#[tokio::test]
async fn unchanged_token_surfaces_the_failure() {
    let server = token_server(&["token-a"]).await;
    let dir = tempfile::tempdir().unwrap();
    let credentials = RecordingCredentials::new(oauth_provider(&server, dir.path()));
    let gateway = FakeGateway::new();
    gateway.fail_next(Method::CompleteJob, RpcError::unauthenticated("token revoked"));
    let client =
        JobClient::new(Arc::new(gateway.clone())).with_credentials(credentials.clone());

    let err = client
        .complete_job(CompleteJobRequest { job_key: 1, variables: "{}".into() })
        .await
        .unwrap_err();

    assert_eq!(err.code, RpcCode::Unauthenticated);
    assert_eq!(authorizations(&gateway), vec![Some("Bearer token-a".to_string())]);
    assert_eq!(credentials.decisions(), vec![false]);
}

#[tokio::test]
async fn other_failures_are_not_retried() {
    let server = token_server(&["token-a"]).await;
    let dir = tempfile::tempdir().unwrap();
    let credentials = RecordingCredentials::new(oauth_provider(&server, dir.path()));
    let gateway = FakeGateway::new();
    gateway.fail_next(Method::CompleteJob, RpcError::unavailable("broker down"));
    let client =
        JobClient::new(Arc::new(gateway.clone())).with_credentials(credentials.clone());

    let err = client
        .complete_job(CompleteJobRequest { job_key: 1, variables: "{}".into() })
        .await
        .unwrap_err();

    assert_eq!(err.code, RpcCode::Unavailable);
    assert_eq!(gateway.calls_to(Method::CompleteJob).len(), 1);
    assert_eq!(credentials.decisions(), vec![false]);
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}
