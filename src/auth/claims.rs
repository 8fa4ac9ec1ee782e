// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWT claims and authenticated identity representation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::roles::Role;

/// Claims carried by a marketplace access token.
///
/// Tokens minted by the login flow put the account id in `id`; standard
/// issuers use `sub`. Either or both may be present and `id` wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Account ID from the login flow
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Subject (account ID)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// Account role
    pub role: Role,

    /// Issued at timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// Expiration timestamp
    pub exp: i64,
}

impl Claims {
    /// The account ID: `id` if set, else `sub`. Blank values do not count.
    pub fn subject(&self) -> Option<&str> {
        [self.id.as_deref(), self.sub.as_deref()]
            .into_iter()
            .flatten()
            .find(|s| !s.trim().is_empty())
    }

    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        self.iat.and_then(|ts| DateTime::from_timestamp(ts, 0))
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

/// Verified caller identity attached to a request.
///
/// Created by the role gate and read by ownership gates and handlers. It
/// lives in the request extensions and is dropped with the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct AuthenticatedIdentity {
    /// Canonical account ID (token `sub`)
    pub subject_id: String,

    /// Account role
    pub role: Role,
}

impl AuthenticatedIdentity {
    pub fn new(subject_id: impl Into<String>, role: Role) -> Self {
        Self {
            subject_id: subject_id.into(),
            role,
        }
    }

    /// `None` when the claims name no subject.
    pub fn from_claims(claims: &Claims) -> Option<Self> {
        Some(Self::new(claims.subject()?, claims.role))
    }

    /// Whether `owner_id` names this caller.
    pub fn is(&self, owner_id: &str) -> bool {
        self.subject_id == owner_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_id_as_subject() {
        let claims: Claims =
            serde_json::from_str(r#"{"id":"64f0c2","role":"merchant","iat":1700000000,"exp":1700003600}"#)
                .unwrap();
        assert_eq!(claims.subject(), Some("64f0c2"));
        assert_eq!(claims.role, Role::Merchant);
        assert_eq!(claims.issued_at().unwrap().timestamp(), 1700000000);
    }

    #[test]
    fn accepts_sub_and_optional_iat() {
        let claims: Claims =
            serde_json::from_str(r#"{"sub":"u1","role":"user","exp":1700003600}"#).unwrap();
        assert_eq!(claims.subject(), Some("u1"));
        assert!(claims.iat.is_none());
        assert!(claims.issued_at().is_none());
        assert_eq!(claims.expires_at().unwrap().timestamp(), 1700003600);
    }

    #[test]
    fn id_wins_when_both_are_present() {
        let claims: Claims =
            serde_json::from_str(r#"{"id":"u1","sub":"other","role":"user","exp":1700003600}"#)
                .unwrap();
        assert_eq!(claims.subject(), Some("u1"));

        let claims: Claims =
            serde_json::from_str(r#"{"id":"","sub":"u2","role":"user","exp":1700003600}"#).unwrap();
        assert_eq!(claims.subject(), Some("u2"));
    }

    #[test]
    fn blank_or_missing_subject() {
        let claims: Claims =
            serde_json::from_str(r#"{"id":" ","role":"user","exp":1700003600}"#).unwrap();
        assert_eq!(claims.subject(), None);
        assert!(AuthenticatedIdentity::from_claims(&claims).is_none());
    }

    #[test]
    fn rejects_unknown_role() {
        let result: Result<Claims, _> =
            serde_json::from_str(r#"{"sub":"u1","role":"admin","exp":1700003600}"#);
        assert!(result.is_err());
    }

    #[test]
    fn identity_from_claims() {
        let claims = Claims {
            id: None,
            sub: Some("u1".to_string()),
            role: Role::User,
            iat: None,
            exp: 0,
        };
        let identity = AuthenticatedIdentity::from_claims(&claims).unwrap();
        assert_eq!(identity, AuthenticatedIdentity::new("u1", Role::User));
        assert!(identity.is("u1"));
        assert!(!identity.is("u2"));
    }
}
