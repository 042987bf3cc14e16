//! JWT issuance and verification (HS256)

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::domain::{Id, Role, User};
use crate::error::{Result, YardError};

/// Shortest accepted signing secret, in bytes (128 bits).
pub const MIN_SECRET_LEN: usize = 16;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub expiry_secs: u64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: std::env::var("JWT_SECRET").unwrap_or_default(),
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "yardtrack".to_string()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "yardtrack".to_string()),
            expiry_secs: std::env::var("JWT_EXPIRY_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(2 * 60 * 60),
        }
    }
}

impl JwtConfig {
    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = secret.into();
        self
    }
}

/// Claims carried in every token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub yard_id: Option<Id>,
    #[serde(default)]
    pub status: Option<String>,
    pub role: Role,
    pub iss: String,
    pub aud: String,
    pub exp: u64,
    pub iat: u64,
}

impl Claims {
    pub fn user_id(&self) -> Result<Id> {
        self.sub
            .parse()
            .map_err(|_| YardError::Unauthorized("token subject is not a user id".to_string()))
    }
}

pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    issuer: String,
    audience: String,
    expiry_secs: u64,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("expiry_secs", &self.expiry_secs)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Fails with `Config` when the secret is shorter than [`MIN_SECRET_LEN`].
    pub fn new(config: &JwtConfig) -> Result<Self> {
        if config.secret.len() < MIN_SECRET_LEN {
            return Err(YardError::Config(format!(
                "JWT_SECRET must be at least {} bytes",
                MIN_SECRET_LEN
            )));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_audience(&[config.audience.as_str()]);
        validation.leeway = 60;

        Ok(Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            expiry_secs: config.expiry_secs,
        })
    }

    pub fn issue(&self, user: &User) -> Result<String> {
        let now = Utc::now().timestamp().max(0) as u64;
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            name: user.name.clone(),
            yard_id: user.yard_id,
            status: Some(user.status.clone()).filter(|s| !s.trim().is_empty()),
            role: user.role,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            exp: now + self.expiry_secs,
            iat: now,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| YardError::Internal(format!("failed to sign token: {}", e)))
    }

    pub fn verify(&self, token: &str) -> Result<Claims> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| YardError::Unauthorized(format!("invalid token: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> JwtConfig {
        JwtConfig {
            secret: "a-very-long-test-secret".to_string(),
            issuer: "yardtrack".to_string(),
            audience: "yardtrack".to_string(),
            expiry_secs: 600,
        }
    }

    fn user() -> User {
        User {
            id: 7,
            name: "Bia".to_string(),
            email: "bia@example.com".to_string(),
            password_hash: String::new(),
            status: "ativo".to_string(),
            role: Role::Admin,
            yard_id: Some(2),
        }
    }

    #[test]
    fn test_issue_and_verify() {
        let service = TokenService::new(&config()).unwrap();
        let token = service.issue(&user()).unwrap();
        let claims = service.verify(&token).unwrap();
        assert_eq!(claims.user_id().unwrap(), 7);
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.yard_id, Some(2));
    }

    #[test]
    fn test_short_secret_rejected() {
        let cfg = config().with_secret("short");
        assert!(matches!(TokenService::new(&cfg), Err(YardError::Config(_))));
    }

    #[test]
    fn test_wrong_audience_rejected() {
        let issuer = TokenService::new(&config()).unwrap();
        let mut other = config();
        other.audience = "someone-else".to_string();
        let verifier = TokenService::new(&other).unwrap();

        let token = issuer.issue(&user()).unwrap();
        assert!(matches!(verifier.verify(&token), Err(YardError::Unauthorized(_))));
    }

    #[test]
    fn test_tampered_token_rejected() {
        let service = TokenService::new(&config()).unwrap();
        let mut token = service.issue(&user()).unwrap();
        token.push('x');
        assert!(service.verify(&token).is_err());
    }
}
