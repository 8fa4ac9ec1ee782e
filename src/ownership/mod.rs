// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Ownership Gates
//!
//! Single-owner checks for cart items, listings and orders.
//!
//! All four marketplace gates share one shape and are expressed as an
//! [`OwnershipPolicy`] value:
//!
//! | Policy | `id` lookup | Payload owner field |
//! |--------|-------------|---------------------|
//! | [`OwnershipPolicy::CART_ITEM`] | cart item → `user` | - |
//! | [`OwnershipPolicy::LISTING`] | listing → `merchant` | `merchant` |
//! | [`OwnershipPolicy::MERCHANT_ORDER`] | order → `merchant` | `merchant` |
//! | [`OwnershipPolicy::USER_ORDER`] | - | `user` |
//!
//! ## Rules
//!
//! - A check only runs when its field is present in the payload.
//! - The lookup runs first, then the payload field; both must pass.
//! - A missing resource is `ResourceNotFound` (404), a foreign one is
//!   `OwnershipMismatch` (403).
//! - The caller is always the verified identity, never a payload field.

pub mod locator;

use std::time::Duration;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::{AuthError, AuthenticatedIdentity};
use crate::models::{OwnerClaim, RequestPayload};

pub use locator::{LocatorError, ResourceLocator};

/// Kinds of owned resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    CartItem,
    Listing,
    Order,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::CartItem => "cart_item",
            ResourceKind::Listing => "listing",
            ResourceKind::Order => "order",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resource referenced by a request, resolved transiently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedResourceRef {
    pub kind: ResourceKind,
    pub id: String,
}

impl std::fmt::Display for OwnedResourceRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.kind, self.id)
    }
}

/// Payload field that names an owner directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerField {
    User,
    Merchant,
}

impl OwnerField {
    fn read<'a>(&self, payload: &'a RequestPayload) -> Option<&'a OwnerClaim> {
        match self {
            OwnerField::User => payload.user.as_ref(),
            OwnerField::Merchant => payload.merchant.as_ref(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OwnerField::User => "user",
            OwnerField::Merchant => "merchant",
        }
    }
}

/// One ownership gate: what to look up and which payload field to compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnershipPolicy {
    /// Resource kind resolved from the payload `id`, if any.
    pub lookup: Option<ResourceKind>,
    /// Payload field compared directly with the caller, if any.
    pub owner_field: Option<OwnerField>,
}

impl OwnershipPolicy {
    pub const CART_ITEM: Self = Self {
        lookup: Some(ResourceKind::CartItem),
        owner_field: None,
    };

    pub const LISTING: Self = Self {
        lookup: Some(ResourceKind::Listing),
        owner_field: Some(OwnerField::Merchant),
    };

    pub const MERCHANT_ORDER: Self = Self {
        lookup: Some(ResourceKind::Order),
        owner_field: Some(OwnerField::Merchant),
    };

    // No existence lookup here, unlike MERCHANT_ORDER. User orders are
    // validated by id in the order handlers.
    pub const USER_ORDER: Self = Self {
        lookup: None,
        owner_field: Some(OwnerField::User),
    };

    /// The resource this policy would resolve for `payload`, if any.
    pub fn resource_ref(&self, payload: &RequestPayload) -> Option<OwnedResourceRef> {
        let kind = self.lookup?;
        let id = payload.id.as_ref()?;
        Some(OwnedResourceRef {
            kind,
            id: id.clone(),
        })
    }

    /// Admit or reject `payload` on behalf of `identity`.
    ///
    /// Performs at most one lookup, bounded by `lookup_timeout`.
    pub async fn admit(
        &self,
        locator: &dyn ResourceLocator,
        lookup_timeout: Duration,
        identity: &AuthenticatedIdentity,
        payload: &RequestPayload,
    ) -> Result<(), AuthError> {
        if let Some(resource) = self.resource_ref(payload) {
            let owner = find_owner(locator, lookup_timeout, &resource).await?;
            if !identity.is(&owner) {
                tracing::info!(
                    subject = %identity.subject_id,
                    resource = %resource,
                    "ownership mismatch"
                );
                return Err(AuthError::OwnershipMismatch {
                    what: resource.kind.as_str(),
                });
            }
        }

        if let Some(field) = self.owner_field {
            if let Some(claimed) = field.read(payload) {
                // Non-string owners never match.
                if !claimed.as_id().is_some_and(|id| identity.is(id)) {
                    tracing::info!(
                        subject = %identity.subject_id,
                        field = field.as_str(),
                        "payload owner does not match caller"
                    );
                    return Err(AuthError::OwnershipMismatch {
                        what: field.as_str(),
                    });
                }
            }
        }

        Ok(())
    }
}

async fn find_owner(
    locator: &dyn ResourceLocator,
    lookup_timeout: Duration,
    resource: &OwnedResourceRef,
) -> Result<String, AuthError> {
    let not_found = || AuthError::ResourceNotFound {
        kind: resource.kind,
        id: resource.id.clone(),
    };

    let lookup = locator.find_owner_by_id(resource.kind, &resource.id);
    match tokio::time::timeout(lookup_timeout, lookup).await {
        Ok(Ok(Some(owner))) => Ok(owner),
        Ok(Ok(None)) => Err(not_found()),
        Ok(Err(LocatorError::InvalidId(reason))) => {
            tracing::debug!(resource = %resource, %reason, "lookup rejected identifier");
            Err(not_found())
        }
        Ok(Err(e @ LocatorError::Unavailable(_))) => {
            tracing::warn!(resource = %resource, error = %e, "owner lookup failed");
            Err(AuthError::LookupFailed(e.to_string()))
        }
        Err(_) => {
            tracing::warn!(
                resource = %resource,
                timeout_ms = lookup_timeout.as_millis() as u64,
                "owner lookup timed out"
            );
            Err(AuthError::LookupFailed(format!(
                "timed out after {}ms",
                lookup_timeout.as_millis()
            )))
        }
    }
}
