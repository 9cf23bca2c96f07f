//! Access tokens
//!
//! Short-lived HS256 JWTs asserting who the bearer is. They are never stored
//! or revoked server side; revocation lives with refresh sessions.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::Identity;
use crate::utils::{AuthError, Error};

/// Shortest accepted signing key, in bytes.
pub const MIN_SECRET_KEY_LEN: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Unique token id.
    pub jti: String,
    /// User id.
    pub sub: String,
    pub email: String,
    pub username: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: AccessClaims,
}

#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenService {
    /// Build a service around a symmetric key. Keys shorter than
    /// [`MIN_SECRET_KEY_LEN`] are refused.
    pub fn new(secret_key: &str) -> Result<Self, AuthError> {
        if secret_key.len() < MIN_SECRET_KEY_LEN {
            return Err(AuthError::KeyTooShort {
                min: MIN_SECRET_KEY_LEN,
                actual: secret_key.len(),
            });
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding: EncodingKey::from_secret(secret_key.as_bytes()),
            decoding: DecodingKey::from_secret(secret_key.as_bytes()),
            validation,
        })
    }

    pub fn issue_access_token(
        &self,
        user_id: &str,
        email: &str,
        username: &str,
        ttl: Duration,
    ) -> crate::utils::Result<IssuedToken> {
        let now = Utc::now();
        let claims = AccessClaims {
            jti: Uuid::new_v4().to_string(),
            sub: user_id.to_string(),
            email: email.to_string(),
            username: username.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| Error::Internal(format!("failed to sign token: {e}")))?;
        Ok(IssuedToken { token, claims })
    }

    pub fn decode(&self, token: &str) -> Result<AccessClaims, AuthError> {
        decode::<AccessClaims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                ErrorKind::InvalidAlgorithm => AuthError::UnsupportedAlgorithm,
                _ => AuthError::InvalidToken(e.to_string()),
            })
    }

    /// Check signature, algorithm and expiry, yielding the verified identity.
    pub fn verify_access_token(&self, token: &str) -> Result<Identity, AuthError> {
        let claims = self.decode(token)?;
        Ok(Identity {
            user_id: claims.sub,
            username: claims.username,
        })
    }
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("algorithm", &Algorithm::HS256)
            .finish()
    }
}
