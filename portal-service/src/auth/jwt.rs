//! HS256 access tokens

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::JwtConfig;
use crate::error::{DomainError, DomainResult, ErrorCode};

/// Claims carried by an access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    pub user_id: i64,
    /// Username
    pub sub: String,
    pub email: String,
    pub exp: i64,
    pub iat: i64,
    /// Identifies the persisted token row
    pub token_id: String,
}

/// A signed token together with the values persisted alongside it
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub token_id: String,
    pub expires_at: DateTime<Utc>,
}

/// Signs and verifies access tokens with a shared secret
#[derive(Clone)]
pub struct JwtGenerator {
    encoding_key: Arc<EncodingKey>,
    decoding_key: Arc<DecodingKey>,
    ttl: Duration,
}

impl JwtGenerator {
    pub fn new(config: &JwtConfig) -> Self {
        if config.secret.is_empty() {
            tracing::warn!("JWT signing key is empty; set JWT_KEY or jwt.secret");
        }
        Self {
            encoding_key: Arc::new(EncodingKey::from_secret(config.secret.as_bytes())),
            decoding_key: Arc::new(DecodingKey::from_secret(config.secret.as_bytes())),
            ttl: config.ttl(),
        }
    }

    /// Issue a token for a user, with a fresh token id
    pub fn issue(&self, user_id: i64, username: &str, email: &str) -> DomainResult<IssuedToken> {
        let now = Utc::now();
        let ttl = chrono::Duration::from_std(self.ttl).map_err(DomainError::internal)?;
        let expires_at = now + ttl;
        let token_id = uuid::Uuid::new_v4().to_string();

        let claims = AccessClaims {
            user_id,
            sub: username.to_string(),
            email: email.to_string(),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
            token_id: token_id.clone(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(DomainError::internal)?;

        Ok(IssuedToken {
            token,
            token_id,
            expires_at,
        })
    }

    /// Check signature and expiry, returning the claims
    pub fn verify(&self, token: &str) -> DomainResult<AccessClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);

        decode::<AccessClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| DomainError::wrap(ErrorCode::Unauthenticated, e))
    }
}

impl std::fmt::Debug for JwtGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtGenerator").field("ttl", &self.ttl).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator(secret: &str) -> JwtGenerator {
        JwtGenerator::new(&JwtConfig {
            secret: secret.to_string(),
            ..JwtConfig::default()
        })
    }

    #[test]
    fn test_issue_then_verify() {
        let jwt = generator("test-secret");
        let issued = jwt.issue(42, "admin", "admin@example.com").expect("issue");

        let claims = jwt.verify(&issued.token).expect("verify");
        assert_eq!(claims.user_id, 42);
        assert_eq!(claims.sub, "admin");
        assert_eq!(claims.email, "admin@example.com");
        assert_eq!(claims.token_id, issued.token_id);
        assert_eq!(claims.exp, issued.expires_at.timestamp());
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 60 * 60);
    }

    #[test]
    fn test_token_ids_are_unique() {
        let jwt = generator("test-secret");
        let a = jwt.issue(1, "a", "a@example.com").expect("issue");
        let b = jwt.issue(1, "a", "a@example.com").expect("issue");
        assert_ne!(a.token_id, b.token_id);
        assert!(uuid::Uuid::parse_str(&a.token_id).is_ok());
    }

    #[test]
    fn test_wrong_secret_is_unauthenticated() {
        let issued = generator("one").issue(1, "a", "a@example.com").expect("issue");
        let err = generator("two").verify(&issued.token).unwrap_err();
        assert_eq!(err.code(), ErrorCode::Unauthenticated);
    }
}
