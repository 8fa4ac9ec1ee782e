// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Request Pipeline
//!
//! One role gate followed by zero or more ownership gates. Gates run in
//! order and the first rejection is the decision for the request.
//!
//! | Pipeline | Role | Ownership |
//! |----------|------|-----------|
//! | `user` | user | - |
//! | `merchant` | merchant | - |
//! | `cart` | user | [`OwnershipPolicy::CART_ITEM`] |
//! | `listing` | merchant | [`OwnershipPolicy::LISTING`] |
//! | `merchant-order` | merchant | [`OwnershipPolicy::MERCHANT_ORDER`] |
//! | `user-order` | user | [`OwnershipPolicy::USER_ORDER`] |

use axum::http::HeaderMap;
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::{AuthError, AuthenticatedIdentity, FailureKind, Role, RoleGate};
use crate::models::RequestPayload;
use crate::ownership::OwnershipPolicy;
use crate::state::AppState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
    pub role: RoleGate,
    pub ownership: Vec<OwnershipPolicy>,
}

impl Pipeline {
    pub fn new(role: Role) -> Self {
        Self {
            role: RoleGate::new(role),
            ownership: Vec::new(),
        }
    }

    pub fn with_ownership(mut self, policy: OwnershipPolicy) -> Self {
        self.ownership.push(policy);
        self
    }

    /// Whether any gate needs the request body.
    pub fn reads_payload(&self) -> bool {
        !self.ownership.is_empty()
    }

    /// Run every gate in order, stopping at the first rejection.
    pub async fn run(
        &self,
        state: &AppState,
        headers: &HeaderMap,
        payload: &RequestPayload,
    ) -> Result<AuthenticatedIdentity, AuthError> {
        let identity = self.authenticate(state, headers)?;
        self.check_ownership(state, identity, payload).await
    }

    /// Role gate only. Needs nothing but the headers.
    pub fn authenticate(
        &self,
        state: &AppState,
        headers: &HeaderMap,
    ) -> Result<AuthenticatedIdentity, AuthError> {
        self.role.admit(&state.verifier, headers)
    }

    /// Ownership gates for an identity the role gate already admitted.
    pub async fn check_ownership(
        &self,
        state: &AppState,
        identity: AuthenticatedIdentity,
        payload: &RequestPayload,
    ) -> Result<AuthenticatedIdentity, AuthError> {
        for policy in &self.ownership {
            policy
                .admit(state.locator.as_ref(), state.lookup_timeout, &identity, payload)
                .await?;
        }

        tracing::debug!(
            subject = %identity.subject_id,
            role = %identity.role,
            "request admitted"
        );
        Ok(identity)
    }

    pub async fn decide(
        &self,
        state: &AppState,
        headers: &HeaderMap,
        payload: &RequestPayload,
    ) -> AuthorizationDecision {
        AuthorizationDecision::from(&self.run(state, headers, payload).await)
    }
}

/// Outcome of a pipeline run as a plain value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct AuthorizationDecision {
    pub admit: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,
    pub message: String,
}

impl From<&Result<AuthenticatedIdentity, AuthError>> for AuthorizationDecision {
    fn from(outcome: &Result<AuthenticatedIdentity, AuthError>) -> Self {
        match outcome {
            Ok(_) => Self {
                admit: true,
                failure: None,
                message: "ok".to_string(),
            },
            Err(e) => Self {
                admit: false,
                failure: Some(e.kind()),
                message: e.public_message().to_string(),
            },
        }
    }
}

/// Named pipelines exposed by the authorization service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum PipelineKind {
    User,
    Merchant,
    Cart,
    Listing,
    MerchantOrder,
    UserOrder,
}

impl PipelineKind {
    pub const ALL: [PipelineKind; 6] = [
        PipelineKind::User,
        PipelineKind::Merchant,
        PipelineKind::Cart,
        PipelineKind::Listing,
        PipelineKind::MerchantOrder,
        PipelineKind::UserOrder,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineKind::User => "user",
            PipelineKind::Merchant => "merchant",
            PipelineKind::Cart => "cart",
            PipelineKind::Listing => "listing",
            PipelineKind::MerchantOrder => "merchant-order",
            PipelineKind::UserOrder => "user-order",
        }
    }

    pub fn parse(s: &str) -> Option<PipelineKind> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == s)
    }

    pub fn pipeline(&self) -> Pipeline {
        match self {
            PipelineKind::User => Pipeline::new(Role::User),
            PipelineKind::Merchant => Pipeline::new(Role::Merchant),
            PipelineKind::Cart => Pipeline::new(Role::User).with_ownership(OwnershipPolicy::CART_ITEM),
            PipelineKind::Listing => {
                Pipeline::new(Role::Merchant).with_ownership(OwnershipPolicy::LISTING)
            }
            PipelineKind::MerchantOrder => {
                Pipeline::new(Role::Merchant).with_ownership(OwnershipPolicy::MERCHANT_ORDER)
            }
            PipelineKind::UserOrder => {
                Pipeline::new(Role::User).with_ownership(OwnershipPolicy::USER_ORDER)
            }
        }
    }
}

impl std::fmt::Display for PipelineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
