// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! RPC failure classification.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Status code attached to a failed gateway call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RpcCode {
    Cancelled,
    InvalidArgument,
    DeadlineExceeded,
    NotFound,
    AlreadyExists,
    PermissionDenied,
    ResourceExhausted,
    FailedPrecondition,
    Unavailable,
    Unauthenticated,
    Internal,
    /// Any status without a dedicated variant.
    Other,
}

zb_core::simple_display! {
    RpcCode {
        Cancelled => "cancelled",
        InvalidArgument => "invalid-argument",
        DeadlineExceeded => "deadline-exceeded",
        NotFound => "not-found",
        AlreadyExists => "already-exists",
        PermissionDenied => "permission-denied",
        ResourceExhausted => "resource-exhausted",
        FailedPrecondition => "failed-precondition",
        Unavailable => "unavailable",
        Unauthenticated => "unauthenticated",
        Internal => "internal",
        Other => "other",
    }
}

/// How the worker runtime reacts to a failed call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Gateway overloaded or briefly unreachable; retried silently.
    Transient,
    /// Token rejected; retried once the credentials layer produces a new one.
    CredentialRefreshable,
    /// Anything else; surfaced to the caller or logged.
    Permanent,
}

zb_core::simple_display! {
    ErrorClass {
        Transient => "transient",
        CredentialRefreshable => "credential-refreshable",
        Permanent => "permanent",
    }
}

/// A failed gateway call.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{code}: {message}")]
pub struct RpcError {
    pub code: RpcCode,
    pub message: String,
}

impl RpcError {
    pub fn new(code: RpcCode, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::new(RpcCode::Unauthenticated, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(RpcCode::Unavailable, message)
    }

    pub fn resource_exhausted(message: impl Into<String>) -> Self {
        Self::new(RpcCode::ResourceExhausted, message)
    }

    pub fn deadline_exceeded(message: impl Into<String>) -> Self {
        Self::new(RpcCode::DeadlineExceeded, message)
    }

    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::new(RpcCode::Cancelled, message)
    }

    pub fn class(&self) -> ErrorClass {
        match self.code {
            RpcCode::Unavailable | RpcCode::ResourceExhausted => ErrorClass::Transient,
            RpcCode::Unauthenticated => ErrorClass::CredentialRefreshable,
            _ => ErrorClass::Permanent,
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
