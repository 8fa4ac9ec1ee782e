// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Account roles carried in access tokens.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Account role.
///
/// ## Roles
///
/// - `User` - Shopper; owns cart items and places orders
/// - `Merchant` - Seller; owns listings and receives orders
///
/// Roles are flat: neither role implies the other, so a merchant token is
/// rejected on user routes and vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Shopper account
    User,
    /// Seller account
    Merchant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Merchant => "merchant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
