// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Marketplace Authz - request authorization for the marketplace backend
//!
//! Verifies bearer credentials, gates routes by role (`user` or `merchant`)
//! and checks single-owner relations for cart items, listings and orders.
//!
//! ## Modules
//!
//! - `api` - External-authorization HTTP service (Axum)
//! - `auth` - Credential verification, role gate, extractors and middleware
//! - `ownership` - Ownership gates and the resource locator interface
//! - `pipeline` - Role gate plus ownership gates, run in order
//! - `store` - In-memory resource locator

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod ownership;
pub mod pipeline;
pub mod state;
pub mod store;
