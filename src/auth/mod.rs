// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Bearer credential verification and role gating for marketplace routes.
//!
//! ## Auth Flow
//!
//! 1. The auth service issues an HS256 access token to a user or merchant
//! 2. Clients send `Authorization: Bearer <token>`
//! 3. This crate:
//!    - Verifies the signature and `exp` with the shared access secret
//!    - Extracts:
//!      - `sub` (or legacy `id`) → subject id
//!      - `role` → `user` | `merchant`
//!    - Rejects tokens whose role does not match the route
//!
//! ## Security
//!
//! - Invalid tokens and wrong roles return the same 401 body
//! - Tokens and keys are never logged
//! - No clock skew tolerance unless configured

pub mod claims;
pub mod error;
pub mod extractor;
pub mod middleware;
pub mod roles;
pub mod verifier;

#[cfg(test)]
pub(crate) mod testing;

pub use claims::{AuthenticatedIdentity, Claims};
pub use error::{AuthError, FailureKind, TokenRejection};
pub use extractor::{Identity, MerchantAuth, RequireRole, RoleGate, UserAuth};
pub use roles::Role;
pub use verifier::{CredentialVerifier, VerificationKey};
