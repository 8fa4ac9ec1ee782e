// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token minting helpers shared by unit tests.

use jsonwebtoken::{encode, EncodingKey, Header};

use super::{CredentialVerifier, Role, VerificationKey};

pub const TEST_SECRET: &[u8] = b"test-access-secret";

pub fn verifier() -> CredentialVerifier {
    CredentialVerifier::new(&VerificationKey::new(TEST_SECRET), 0)
}

pub fn in_one_hour() -> i64 {
    chrono::Utc::now().timestamp() + 3600
}

pub fn sign(claims: &serde_json::Value, secret: &[u8]) -> String {
    encode(&Header::default(), claims, &EncodingKey::from_secret(secret)).unwrap()
}

pub fn token_for(subject: &str, role: Role) -> String {
    let now = chrono::Utc::now().timestamp();
    sign(
        &serde_json::json!({"sub": subject, "role": role, "iat": now, "exp": now + 3600}),
        TEST_SECRET,
    )
}

pub fn expired_token_for(subject: &str, role: Role) -> String {
    let now = chrono::Utc::now().timestamp();
    sign(
        &serde_json::json!({"sub": subject, "role": role, "iat": now - 7200, "exp": now - 3600}),
        TEST_SECRET,
    )
}
