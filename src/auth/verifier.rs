// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Access token verification.
//!
//! Tokens are HS256 JWTs signed with the shared access secret. The secret is
//! handed to [`CredentialVerifier::new`] once at startup; nothing in this
//! module reads the environment.

use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};

use super::{claims::Claims, error::TokenRejection, AuthError};

/// Shared access-token secret.
///
/// Key material is not printable via `Debug`.
#[derive(Clone)]
pub struct VerificationKey(Vec<u8>);

impl VerificationKey {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self(secret.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for VerificationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("VerificationKey(<redacted>)")
    }
}

/// HS256 access-token verifier.
#[derive(Clone)]
pub struct CredentialVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for CredentialVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("CredentialVerifier")
            .field("validation", &self.validation)
            .finish()
    }
}

impl CredentialVerifier {
    /// Build a verifier for `key`, tolerating `leeway_seconds` of clock skew
    /// on `exp`.
    pub fn new(key: &VerificationKey, leeway_seconds: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = leeway_seconds;
        // Marketplace tokens carry no audience; reject nothing on its account.
        validation.validate_aud = false;

        Self {
            decoding_key: DecodingKey::from_secret(key.as_bytes()),
            validation,
        }
    }

    /// Verify signature and expiry, then decode the claims.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        if token.trim().is_empty() {
            return Err(AuthError::InvalidToken(TokenRejection::Empty));
        }

        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| AuthError::InvalidToken(rejection_for(e.kind())))?
            .claims;

        if claims.subject().is_none() {
            return Err(AuthError::InvalidToken(TokenRejection::Claims));
        }

        Ok(claims)
    }
}

fn rejection_for(kind: &ErrorKind) -> TokenRejection {
    match kind {
        ErrorKind::InvalidSignature => TokenRejection::Signature,
        ErrorKind::ExpiredSignature => TokenRejection::Expired,
        ErrorKind::ImmatureSignature
        | ErrorKind::MissingRequiredClaim(_)
        | ErrorKind::InvalidIssuer
        | ErrorKind::InvalidAudience
        | ErrorKind::InvalidAlgorithm => TokenRejection::Claims,
        _ => TokenRejection::Malformed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::testing::{self, TEST_SECRET};
    use crate::auth::Role;
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

    #[test]
    fn verifies_valid_token() {
        let verifier = testing::verifier();
        let token = testing::token_for("user_1", Role::User);

        let claims = verifier.verify(&token).expect("valid token verifies");
        assert_eq!(claims.subject(), Some("user_1"));
        assert_eq!(claims.role, Role::User);
    }

    #[test]
    fn accepts_login_flow_id_claim() {
        let verifier = testing::verifier();
        let token = testing::sign(
            &serde_json::json!({"id": "merchant_9", "role": "merchant", "exp": testing::in_one_hour()}),
            TEST_SECRET,
        );

        let claims = verifier.verify(&token).unwrap();
        assert_eq!(claims.subject(), Some("merchant_9"));
        assert_eq!(claims.role, Role::Merchant);
    }

    #[test]
    fn accepts_token_with_both_id_and_sub() {
        let verifier = testing::verifier();
        let token = testing::sign(
            &serde_json::json!({"id": "u1", "sub": "u1", "role": "user", "exp": testing::in_one_hour()}),
            TEST_SECRET,
        );

        let claims = verifier.verify(&token).unwrap();
        assert_eq!(claims.subject(), Some("u1"));
    }

    #[test]
    fn rejects_token_without_subject() {
        let verifier = testing::verifier();
        let token = testing::sign(
            &serde_json::json!({"role": "user", "exp": testing::in_one_hour()}),
            TEST_SECRET,
        );
        assert_eq!(
            verifier.verify(&token).unwrap_err(),
            AuthError::InvalidToken(TokenRejection::Claims)
        );
    }

    #[test]
    fn rejects_empty_token() {
        let verifier = testing::verifier();
        assert_eq!(
            verifier.verify("  ").unwrap_err(),
            AuthError::InvalidToken(TokenRejection::Empty)
        );
    }

    #[test]
    fn rejects_garbage() {
        let verifier = testing::verifier();
        assert_eq!(
            verifier.verify("not-a-jwt").unwrap_err(),
            AuthError::InvalidToken(TokenRejection::Malformed)
        );
    }

    #[test]
    fn rejects_foreign_signature() {
        let verifier = testing::verifier();
        let token = testing::sign(
            &serde_json::json!({"sub": "u1", "role": "user", "exp": testing::in_one_hour()}),
            b"some-other-secret",
        );
        assert_eq!(
            verifier.verify(&token).unwrap_err(),
            AuthError::InvalidToken(TokenRejection::Signature)
        );
    }

    #[test]
    fn rejects_expired_token() {
        let verifier = testing::verifier();
        let token = testing::expired_token_for("u1", Role::User);
        assert_eq!(
            verifier.verify(&token).unwrap_err(),
            AuthError::InvalidToken(TokenRejection::Expired)
        );
    }

    #[test]
    fn leeway_tolerates_small_skew() {
        let verifier = CredentialVerifier::new(&VerificationKey::new(TEST_SECRET), 600);
        let token = testing::sign(
            &serde_json::json!({"sub": "u1", "role": "user", "exp": chrono::Utc::now().timestamp() - 30}),
            TEST_SECRET,
        );
        assert!(verifier.verify(&token).is_ok());
    }

    #[test]
    fn rejects_tampered_payload() {
        let verifier = testing::verifier();
        let token = testing::token_for("user_1", Role::User);
        let mut parts: Vec<&str> = token.split('.').collect();

        // Promote the caller to merchant without re-signing.
        let forged = URL_SAFE_NO_PAD.encode(
            serde_json::json!({"sub": "user_1", "role": "merchant", "exp": testing::in_one_hour()})
                .to_string(),
        );
        parts[1] = &forged;

        assert_eq!(
            verifier.verify(&parts.join(".")).unwrap_err(),
            AuthError::InvalidToken(TokenRejection::Signature)
        );
    }

    #[test]
    fn rejects_unsigned_token() {
        let verifier = testing::verifier();
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"none","typ":"JWT"}"#);
        let claims = URL_SAFE_NO_PAD.encode(
            serde_json::json!({"sub": "u1", "role": "user", "exp": testing::in_one_hour()}).to_string(),
        );
        let result = verifier.verify(&format!("{header}.{claims}."));
        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn rejects_missing_exp() {
        let verifier = testing::verifier();
        let token = testing::sign(&serde_json::json!({"sub": "u1", "role": "user"}), TEST_SECRET);
        assert!(matches!(
            verifier.verify(&token),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn rejects_blank_subject() {
        let verifier = testing::verifier();
        let token = testing::sign(
            &serde_json::json!({"sub": " ", "role": "user", "exp": testing::in_one_hour()}),
            TEST_SECRET,
        );
        assert_eq!(
            verifier.verify(&token).unwrap_err(),
            AuthError::InvalidToken(TokenRejection::Claims)
        );
    }

    #[test]
    fn debug_output_redacts_key() {
        let key = VerificationKey::new("hunter2");
        assert!(!format!("{key:?}").contains("hunter2"));
        let verifier = CredentialVerifier::new(&key, 0);
        assert!(!format!("{verifier:?}").contains("hunter2"));
    }
}
