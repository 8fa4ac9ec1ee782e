// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory owner table.
//!
//! Backs the standalone authorization service and the test suite. Production
//! deployments plug the marketplace database in through
//! [`ResourceLocator`] instead.
//!
//! ## Seed file
//!
//! ```json
//! {
//!   "cart_items": { "<cart item id>": "<user id>" },
//!   "listings":   { "<listing id>": "<merchant id>" },
//!   "orders":     { "<order id>": "<merchant id>" }
//! }
//! ```

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::ownership::{LocatorError, ResourceKind, ResourceLocator};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read seed file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid seed file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Seed file contents: resource id → owner id, per kind.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Seed {
    #[serde(default)]
    pub cart_items: HashMap<String, String>,
    #[serde(default)]
    pub listings: HashMap<String, String>,
    #[serde(default)]
    pub orders: HashMap<String, String>,
}

#[derive(Default)]
pub struct InMemoryStore {
    owners: RwLock<HashMap<(ResourceKind, String), String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_seed(seed: Seed) -> Self {
        let mut owners = HashMap::new();
        for (kind, table) in [
            (ResourceKind::CartItem, seed.cart_items),
            (ResourceKind::Listing, seed.listings),
            (ResourceKind::Order, seed.orders),
        ] {
            for (id, owner) in table {
                owners.insert((kind, id), owner);
            }
        }
        Self {
            owners: RwLock::new(owners),
        }
    }

    pub fn from_seed_file(path: impl AsRef<Path>) -> Result<Self, SeedError> {
        let raw = std::fs::read_to_string(path)?;
        let seed: Seed = serde_json::from_str(&raw)?;
        Ok(Self::from_seed(seed))
    }

    pub async fn insert(&self, kind: ResourceKind, id: impl Into<String>, owner: impl Into<String>) {
        self.owners
            .write()
            .await
            .insert((kind, id.into()), owner.into());
    }

    pub async fn len(&self) -> usize {
        self.owners.read().await.len()
    }
}

#[async_trait]
impl ResourceLocator for InMemoryStore {
    async fn find_owner_by_id(
        &self,
        kind: ResourceKind,
        id: &str,
    ) -> Result<Option<String>, LocatorError> {
        Ok(self.owners.read().await.get(&(kind, id.to_string())).cloned())
    }
}
