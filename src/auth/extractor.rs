// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Role gate and Axum extractors for authenticated callers.
//!
//! Use a role extractor in handlers that need a caller of a given role but
//! no ownership checks:
//!
//! ```rust,ignore
//! async fn my_cart(UserAuth { identity, .. }: UserAuth) -> impl IntoResponse {
//!     // identity.subject_id is the verified user
//! }
//! ```
//!
//! Routes behind [`super::middleware::authorize`] read the identity the
//! pipeline attached with [`Identity`] instead.

use std::marker::PhantomData;

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, StatusCode},
};

use super::{
    error::TokenRejection, AuthError, AuthenticatedIdentity, CredentialVerifier, Role,
};
use crate::state::AppState;

/// Pull the bearer token out of the `authorization` header.
///
/// The `Bearer` scheme prefix is optional; a bare value is taken as the
/// token itself. A header holding only the scheme is an empty token.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidToken(TokenRejection::Malformed))?;

    let token = match value.strip_prefix("Bearer") {
        Some(rest) if rest.is_empty() || rest.starts_with(char::is_whitespace) => rest.trim(),
        _ => value.trim(),
    };

    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }
    Ok(token)
}

/// Admits a request only if its bearer token verifies and carries `required`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleGate {
    pub required: Role,
}

impl RoleGate {
    pub const USER: Self = Self { required: Role::User };
    pub const MERCHANT: Self = Self {
        required: Role::Merchant,
    };

    pub fn new(required: Role) -> Self {
        Self { required }
    }

    pub fn admit(
        &self,
        verifier: &CredentialVerifier,
        headers: &HeaderMap,
    ) -> Result<AuthenticatedIdentity, AuthError> {
        let token = bearer_token(headers)?;

        let claims = verifier.verify(token).inspect_err(|e| {
            tracing::warn!(error = %e, "access token rejected");
        })?;

        let identity = AuthenticatedIdentity::from_claims(&claims)
            .ok_or(AuthError::InvalidToken(TokenRejection::Claims))?;

        if identity.role != self.required {
            tracing::warn!(
                subject = %identity.subject_id,
                role = %identity.role,
                required = %self.required,
                expires_at = ?claims.expires_at(),
                "role not allowed on this route"
            );
            return Err(AuthError::RoleMismatch {
                required: self.required,
                actual: identity.role,
            });
        }

        tracing::debug!(
            subject = %identity.subject_id,
            issued_at = ?claims.issued_at(),
            expires_at = ?claims.expires_at(),
            "access token verified"
        );
        Ok(identity)
    }
}

/// Compile-time role selector for [`RequireRole`].
pub trait RequiredRole: Send + Sync + 'static {
    const ROLE: Role;
}

/// Marker for `user` routes.
pub struct UserRole;

/// Marker for `merchant` routes.
pub struct MerchantRole;

impl RequiredRole for UserRole {
    const ROLE: Role = Role::User;
}

impl RequiredRole for MerchantRole {
    const ROLE: Role = Role::Merchant;
}

/// Extractor that requires a caller of role `R`.
pub struct RequireRole<R: RequiredRole> {
    pub identity: AuthenticatedIdentity,
    _role: PhantomData<R>,
}

impl<R: RequiredRole> RequireRole<R> {
    pub fn into_inner(self) -> AuthenticatedIdentity {
        self.identity
    }
}

/// Extractor for user-only handlers.
pub type UserAuth = RequireRole<UserRole>;

/// Extractor for merchant-only handlers.
pub type MerchantAuth = RequireRole<MerchantRole>;

impl<R: RequiredRole> FromRequestParts<AppState> for RequireRole<R> {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Reuse an identity the pipeline middleware already verified
        if let Some(identity) = parts.extensions.get::<AuthenticatedIdentity>() {
            if identity.role == R::ROLE {
                return Ok(Self {
                    identity: identity.clone(),
                    _role: PhantomData,
                });
            }
        }

        let identity = RoleGate::new(R::ROLE).admit(&state.verifier, &parts.headers)?;
        parts.extensions.insert(identity.clone());

        Ok(Self {
            identity,
            _role: PhantomData,
        })
    }
}

/// Identity attached by the authorization middleware.
///
/// Rejects with 401 when the route is not behind the middleware.
pub struct Identity(pub AuthenticatedIdentity);

impl<S: Send + Sync> FromRequestParts<S> for Identity {
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedIdentity>()
            .cloned()
            .map(Identity)
            .ok_or_else(|| {
                tracing::error!("Identity extractor used on a route without authorization");
                StatusCode::UNAUTHORIZED
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::testing;
    use axum::http::{HeaderValue, Request};

    fn headers_with(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        headers
    }

    fn parts_with(headers: HeaderMap) -> Parts {
        let mut parts = Request::builder()
            .uri("/test")
            .body(())
            .unwrap()
            .into_parts()
            .0;
        parts.headers = headers;
        parts
    }

    #[test]
    fn missing_header() {
        assert_eq!(
            bearer_token(&HeaderMap::new()).unwrap_err(),
            AuthError::MissingHeader
        );
    }

    #[test]
    fn empty_token() {
        assert_eq!(bearer_token(&headers_with("Bearer ")).unwrap_err(), AuthError::MissingToken);
        assert_eq!(bearer_token(&headers_with("Bearer")).unwrap_err(), AuthError::MissingToken);
        assert_eq!(bearer_token(&headers_with("")).unwrap_err(), AuthError::MissingToken);
    }

    #[test]
    fn strips_scheme_prefix() {
        assert_eq!(bearer_token(&headers_with("Bearer abc.def.ghi")).unwrap(), "abc.def.ghi");
        assert_eq!(bearer_token(&headers_with("abc.def.ghi")).unwrap(), "abc.def.ghi");
        assert_eq!(bearer_token(&headers_with("Bearerabc")).unwrap(), "Bearerabc");
    }

    #[test]
    fn role_gate_admits_matching_role() {
        let verifier = testing::verifier();
        let token = testing::token_for("alice", Role::User);

        let identity = RoleGate::USER.admit(&verifier, &bearer(&token)).unwrap();
        assert_eq!(identity, AuthenticatedIdentity::new("alice", Role::User));
    }

    #[test]
    fn role_gate_rejects_other_role() {
        let verifier = testing::verifier();

        let merchant_token = testing::token_for("m1", Role::Merchant);
        let err = RoleGate::USER.admit(&verifier, &bearer(&merchant_token)).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);

        let user_token = testing::token_for("u1", Role::User);
        let err = RoleGate::MERCHANT.admit(&verifier, &bearer(&user_token)).unwrap_err();
        assert_eq!(
            err,
            AuthError::RoleMismatch {
                required: Role::Merchant,
                actual: Role::User
            }
        );
    }

    #[test]
    fn role_gate_rejects_bad_tokens() {
        let verifier = testing::verifier();
        for token in [
            testing::expired_token_for("u1", Role::User),
            "garbage".to_string(),
        ] {
            let err = RoleGate::USER.admit(&verifier, &bearer(&token)).unwrap_err();
            assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
        }
    }

    #[tokio::test]
    async fn user_auth_extracts_identity() {
        let state = AppState::for_tests();
        let token = testing::token_for("alice", Role::User);
        let mut parts = parts_with(bearer(&token));

        let auth = UserAuth::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(auth.identity.subject_id, "alice");
        assert!(parts.extensions.get::<AuthenticatedIdentity>().is_some());
    }

    #[tokio::test]
    async fn merchant_auth_rejects_user() {
        let state = AppState::for_tests();
        let token = testing::token_for("alice", Role::User);
        let mut parts = parts_with(bearer(&token));

        let result = MerchantAuth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::RoleMismatch { .. })));
    }

    #[tokio::test]
    async fn role_extractor_prefers_extensions() {
        let state = AppState::for_tests();
        let mut parts = parts_with(HeaderMap::new());
        parts
            .extensions
            .insert(AuthenticatedIdentity::new("from_middleware", Role::Merchant));

        let auth = MerchantAuth::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(auth.into_inner().subject_id, "from_middleware");

        // A stored identity of another role does not satisfy the extractor
        let result = UserAuth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::MissingHeader)));
    }

    #[tokio::test]
    async fn identity_requires_middleware() {
        let mut parts = parts_with(HeaderMap::new());
        let result = Identity::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(StatusCode::UNAUTHORIZED)));

        parts
            .extensions
            .insert(AuthenticatedIdentity::new("alice", Role::User));
        let Identity(identity) = Identity::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(identity.subject_id, "alice");
    }
}
