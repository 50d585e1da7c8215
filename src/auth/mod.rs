use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::database::models::User;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credential: {0}")]
    InvalidCredential(String),

    #[error("Invalid JWT secret")]
    InvalidSecret,

    #[error("Invalid JWT expiry: {0} hours")]
    InvalidExpiry(u64),

    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),
}

/// Resolves an opaque credential into the caller's user id
pub trait IdentityProvider: Send + Sync {
    fn resolve(&self, credential: &str) -> Result<i64, AuthError>;
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub email: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(
        user_id: i64,
        email: String,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            sub: user_id,
            email,
            exp: expires_at.timestamp(),
            iat: issued_at.timestamp(),
        }
    }
}

/// HS256 bearer tokens signed with a shared secret
pub struct JwtIdentity {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    lifetime: TimeDelta,
}

impl JwtIdentity {
    pub fn new(secret: &str, expiry_hours: u64) -> Result<Self, AuthError> {
        if secret.is_empty() {
            return Err(AuthError::InvalidSecret);
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
            lifetime: token_lifetime(expiry_hours)?,
        })
    }

    /// Sign an access token for `user`
    pub fn issue(&self, user: &User) -> Result<String, AuthError> {
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(self.lifetime)
            .ok_or_else(|| AuthError::TokenGeneration("expiry out of range".to_string()))?;
        let claims = Claims::new(user.id, user.email.clone(), now, expires_at);
        self.sign(&claims)
    }

    fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AuthError::TokenGeneration(e.to_string()))
    }

    /// Verify signature and expiry and return the claims
    pub fn decode(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| AuthError::InvalidCredential(format!("Invalid JWT token: {}", e)))
    }
}

/// Non-zero and small enough that `now + lifetime` is a valid timestamp
fn token_lifetime(expiry_hours: u64) -> Result<TimeDelta, AuthError> {
    let lifetime = i64::try_from(expiry_hours)
        .ok()
        .filter(|hours| *hours > 0)
        .and_then(TimeDelta::try_hours)
        .ok_or(AuthError::InvalidExpiry(expiry_hours))?;

    Utc::now()
        .checked_add_signed(lifetime)
        .map(|_| lifetime)
        .ok_or(AuthError::InvalidExpiry(expiry_hours))
}

impl IdentityProvider for JwtIdentity {
    fn resolve(&self, credential: &str) -> Result<i64, AuthError> {
        self.decode(credential).map(|claims| claims.sub)
    }
}

/// Hash a password with Argon2id and a random salt (PHC string format)
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::PasswordHash(e.to_string()))
}

/// Returns `Ok(false)` on mismatch; errors only on an unreadable stored hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(hash).map_err(|e| AuthError::PasswordHash(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
