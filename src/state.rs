// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;
use std::time::Duration;

use crate::auth::CredentialVerifier;
use crate::ownership::ResourceLocator;

/// Default bound on a single owner lookup.
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

/// Default request body limit for gated routes (1 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Process-wide, read-only authorization context.
#[derive(Clone)]
pub struct AppState {
    pub verifier: Arc<CredentialVerifier>,
    pub locator: Arc<dyn ResourceLocator>,
    pub lookup_timeout: Duration,
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(verifier: CredentialVerifier, locator: Arc<dyn ResourceLocator>) -> Self {
        Self {
            verifier: Arc::new(verifier),
            locator,
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    pub fn with_lookup_timeout(mut self, lookup_timeout: Duration) -> Self {
        self.lookup_timeout = lookup_timeout;
        self
    }

    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("verifier", &self.verifier)
            .field("lookup_timeout", &self.lookup_timeout)
            .field("max_body_bytes", &self.max_body_bytes)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
impl AppState {
    /// State with the test verifier and an empty in-memory locator.
    pub fn for_tests() -> Self {
        Self::new(
            crate::auth::testing::verifier(),
            Arc::new(crate::store::InMemoryStore::new()),
        )
    }

    /// State with the test verifier and the given store.
    pub fn for_tests_with(store: crate::store::InMemoryStore) -> Self {
        Self::new(crate::auth::testing::verifier(), Arc::new(store))
    }
}
