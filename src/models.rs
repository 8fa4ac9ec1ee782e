// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Request and Response Models
//!
//! Gates only look at three fields of a request body: `id`, `user` and
//! `merchant`. Everything else in the body belongs to the handler and is
//! ignored here.
//!
//! ## Field presence
//!
//! A field counts as present when it holds a truthy JSON value. `null`,
//! `false`, `0` and the empty string are treated as absent. Only a JSON
//! string in `user` or `merchant` can name the caller; any other present
//! value is an [`OwnerClaim::Opaque`] and never matches.

use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

use crate::auth::{AuthenticatedIdentity, Role};

// =============================================================================
// Request Payload
// =============================================================================

/// Resource and owner references read by the ownership gates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestPayload {
    pub id: Option<String>,
    pub user: Option<OwnerClaim>,
    pub merchant: Option<OwnerClaim>,
}

/// Owner named directly in a request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnerClaim {
    /// A JSON string, compared with the caller's subject id.
    Id(String),
    /// A present non-string value, kept as JSON text for logging.
    Opaque(String),
}

impl OwnerClaim {
    fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => present(value).map(|_| OwnerClaim::Id(s.clone())),
            other => present(other).map(|_| OwnerClaim::Opaque(other.to_string())),
        }
    }

    /// The owner id, if the claim can name one.
    pub fn as_id(&self) -> Option<&str> {
        match self {
            OwnerClaim::Id(id) => Some(id),
            OwnerClaim::Opaque(_) => None,
        }
    }
}

impl From<&str> for OwnerClaim {
    fn from(id: &str) -> Self {
        OwnerClaim::Id(id.to_string())
    }
}

impl RequestPayload {
    /// Extract the gate fields from a decoded JSON body.
    ///
    /// Non-object bodies yield an empty payload.
    pub fn from_json(body: &Value) -> Self {
        let Value::Object(map) = body else {
            return Self::default();
        };

        Self {
            id: map.get("id").and_then(present),
            user: map.get("user").and_then(OwnerClaim::from_json),
            merchant: map.get("merchant").and_then(OwnerClaim::from_json),
        }
    }

    /// Parse raw body bytes. Empty or non-JSON bodies yield an empty payload.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Self::default();
        }
        match serde_json::from_slice::<Value>(bytes) {
            Ok(body) => Self::from_json(&body),
            Err(_) => Self::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.id.is_none() && self.user.is_none() && self.merchant.is_none()
    }
}

/// Normalize a present field to its string form, or `None` when falsy.
fn present(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

// =============================================================================
// Responses
// =============================================================================

/// Body returned when the pipeline admits a request.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
pub struct AdmittedResponse {
    /// Always `"ok"`.
    pub status: String,
    /// Verified account ID.
    pub subject: String,
    /// Verified account role.
    pub role: Role,
}

impl From<AuthenticatedIdentity> for AdmittedResponse {
    fn from(identity: AuthenticatedIdentity) -> Self {
        Self {
            status: "ok".to_string(),
            subject: identity.subject_id,
            role: identity.role,
        }
    }
}

/// Rejection body shared by every failure.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Always `"error"`.
    pub status: String,
    /// Generic reason, e.g. `"unauthorized"`.
    pub msg: String,
}
