// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authorization errors.
//!
//! Every variant is a terminal decision for the current request. The
//! `Display` output is diagnostic and goes to logs only; the response body
//! carries the generic [`AuthError::public_message`].

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use super::roles::Role;
use crate::ownership::ResourceKind;

/// Why the credential verifier rejected a token. Logged, never returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenRejection {
    /// Empty token string
    Empty,
    /// Not a decodable JWT (bad segments, base64, JSON or claim types)
    Malformed,
    /// Signature does not match the verification key
    Signature,
    /// `exp` is in the past
    Expired,
    /// Missing or invalid registered claims, or a disallowed algorithm
    Claims,
}

impl TokenRejection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenRejection::Empty => "empty",
            TokenRejection::Malformed => "malformed",
            TokenRejection::Signature => "signature",
            TokenRejection::Expired => "expired",
            TokenRejection::Claims => "claims",
        }
    }
}

/// Failure taxonomy, independent of the diagnostic payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    MissingHeader,
    MissingToken,
    InvalidToken,
    RoleMismatch,
    OwnershipMismatch,
    ResourceNotFound,
    LookupFailed,
}

/// Authorization error type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No authorization header present
    MissingHeader,
    /// Authorization header present but the token is empty
    MissingToken,
    /// Token failed verification
    InvalidToken(TokenRejection),
    /// Token is valid but carries another role
    RoleMismatch { required: Role, actual: Role },
    /// Caller is not the recorded owner (`what` names the compared owner)
    OwnershipMismatch { what: &'static str },
    /// Referenced resource does not exist
    ResourceNotFound { kind: ResourceKind, id: String },
    /// Resource lookup failed or timed out
    LookupFailed(String),
}

#[derive(Serialize)]
struct AuthErrorBody {
    status: &'static str,
    msg: &'static str,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::MissingHeader => "missing_header",
            FailureKind::MissingToken => "missing_token",
            FailureKind::InvalidToken => "invalid_token",
            FailureKind::RoleMismatch => "role_mismatch",
            FailureKind::OwnershipMismatch => "ownership_mismatch",
            FailureKind::ResourceNotFound => "resource_not_found",
            FailureKind::LookupFailed => "lookup_failed",
        }
    }
}

impl AuthError {
    pub fn kind(&self) -> FailureKind {
        match self {
            AuthError::MissingHeader => FailureKind::MissingHeader,
            AuthError::MissingToken => FailureKind::MissingToken,
            AuthError::InvalidToken(_) => FailureKind::InvalidToken,
            AuthError::RoleMismatch { .. } => FailureKind::RoleMismatch,
            AuthError::OwnershipMismatch { .. } => FailureKind::OwnershipMismatch,
            AuthError::ResourceNotFound { .. } => FailureKind::ResourceNotFound,
            AuthError::LookupFailed(_) => FailureKind::LookupFailed,
        }
    }

    /// Get the error code for this error. Used in logs, not in bodies.
    pub fn error_code(&self) -> &'static str {
        self.kind().as_str()
    }

    /// Get the HTTP status code for this error.
    ///
    /// Invalid tokens and role mismatches share 401 so callers cannot probe
    /// which check failed.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingHeader => StatusCode::BAD_REQUEST,
            AuthError::MissingToken | AuthError::OwnershipMismatch { .. } => StatusCode::FORBIDDEN,
            AuthError::InvalidToken(_) | AuthError::RoleMismatch { .. } => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            AuthError::LookupFailed(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Message placed in the response body.
    pub fn public_message(&self) -> &'static str {
        match self {
            AuthError::MissingHeader => "no token found",
            AuthError::MissingToken => "missing token",
            AuthError::InvalidToken(_)
            | AuthError::RoleMismatch { .. }
            | AuthError::OwnershipMismatch { .. } => "unauthorized",
            AuthError::ResourceNotFound { .. } => "not found",
            AuthError::LookupFailed(_) => "service unavailable",
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingHeader => write!(f, "Authorization header is required"),
            AuthError::MissingToken => write!(f, "Bearer token is empty"),
            AuthError::InvalidToken(reason) => {
                write!(f, "Token rejected ({})", reason.as_str())
            }
            AuthError::RoleMismatch { required, actual } => {
                write!(f, "Role {actual} cannot access a {required} route")
            }
            AuthError::OwnershipMismatch { what } => {
                write!(f, "Caller is not the owner ({what})")
            }
            AuthError::ResourceNotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            AuthError::LookupFailed(msg) => write!(f, "Owner lookup failed: {msg}"),
        }
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(AuthErrorBody {
            status: "error",
            msg: self.public_message(),
        });
        (status, body).into_response()
    }
}
