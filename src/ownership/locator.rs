// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Owner lookup interface implemented by the persistence layer.

use async_trait::async_trait;
use thiserror::Error;

use super::ResourceKind;

/// Lookup failures other than "not found".
#[derive(Debug, Error)]
pub enum LocatorError {
    /// The identifier can never name a resource (e.g. wrong id format).
    #[error("invalid identifier: {0}")]
    InvalidId(String),
    /// Backend could not answer.
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

/// Resolves the current owner of a resource.
///
/// Implementations must be read-only. `Ok(None)` means the resource does not
/// exist.
#[async_trait]
pub trait ResourceLocator: Send + Sync {
    async fn find_owner_by_id(
        &self,
        kind: ResourceKind,
        id: &str,
    ) -> Result<Option<String>, LocatorError>;
}
