//! Registration, login and password-bearing user writes

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use super::jwt::{Claims, TokenService};
use super::password::{PasswordHasher, PasswordVerification};
use crate::domain::{Id, User, UserInput, UserView};
use crate::error::{Result, YardError};
use crate::store::Store;

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: UserView,
    pub token: String,
}

#[derive(Clone)]
pub struct AuthService {
    store: Arc<Store>,
    tokens: Arc<TokenService>,
    hasher: PasswordHasher,
}

impl AuthService {
    pub fn new(store: Arc<Store>, tokens: TokenService) -> Self {
        Self {
            store,
            tokens: Arc::new(tokens),
            hasher: PasswordHasher::default(),
        }
    }

    pub fn with_hasher(mut self, hasher: PasswordHasher) -> Self {
        self.hasher = hasher;
        self
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        self.tokens.verify(token)
    }

    /// Creates the account and returns it with a fresh token. Fails with
    /// `Conflict` if the email is already registered.
    pub async fn register(&self, input: UserInput) -> Result<AuthResponse> {
        let user = self.insert_user(&input).await?;
        let token = self.tokens.issue(&user)?;
        info!(user_id = user.id, role = %user.role, "User registered");
        Ok(AuthResponse {
            user: UserView::from(&user),
            token,
        })
    }

    pub async fn login(&self, request: LoginRequest) -> Result<AuthResponse> {
        if request.email.trim().is_empty() {
            return Err(YardError::Validation("email is required".to_string()));
        }
        if request.password.is_empty() {
            return Err(YardError::Validation("password is required".to_string()));
        }

        let invalid = || YardError::Unauthorized("invalid credentials".to_string());
        let user = self
            .store
            .find_user_by_email(&request.email)
            .await
            .ok_or_else(invalid)?;

        match self.hasher.verify(&request.password, &user.password_hash) {
            PasswordVerification::Failed => {
                warn!(user_id = user.id, "Login failed: bad password");
                return Err(invalid());
            }
            PasswordVerification::SuccessRehashNeeded => {
                let rehashed = self.hasher.hash(&request.password)?;
                self.store.set_password_hash(user.id, rehashed).await?;
                info!(user_id = user.id, "Password hash upgraded");
            }
            PasswordVerification::Success => {}
        }

        let token = self.tokens.issue(&user)?;
        info!(user_id = user.id, "User logged in");
        Ok(AuthResponse {
            user: UserView::from(&user),
            token,
        })
    }

    pub async fn create_user(&self, input: UserInput) -> Result<UserView> {
        let user = self.insert_user(&input).await?;
        Ok(UserView::from(&user))
    }

    async fn insert_user(&self, input: &UserInput) -> Result<User> {
        let role = input.validate()?;
        let hash = self.hasher.hash(&input.password)?;
        self.store.create_user(input, role, hash).await
    }

    /// Replaces the user's fields; the password is always rehashed.
    pub async fn update_user(&self, id: Id, input: UserInput) -> Result<UserView> {
        let role = input.validate()?;
        let hash = self.hasher.hash(&input.password)?;
        let user = self.store.update_user(id, &input, role, hash).await?;
        Ok(UserView::from(&user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::JwtConfig;

    fn service() -> AuthService {
        let config = JwtConfig {
            secret: "unit-test-secret-0123456789".to_string(),
            issuer: "yardtrack".to_string(),
            audience: "yardtrack".to_string(),
            expiry_secs: 600,
        };
        AuthService::new(Arc::new(Store::new()), TokenService::new(&config).unwrap())
            .with_hasher(PasswordHasher::with_iterations(50))
    }

    fn input(email: &str) -> UserInput {
        UserInput {
            name: "Rafa".to_string(),
            email: email.to_string(),
            password: "Segredo#1".to_string(),
            status: None,
            role: "admin".to_string(),
            yard_id: None,
        }
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let auth = service();
        let registered = auth.register(input("rafa@example.com")).await.unwrap();
        let claims = auth.verify_token(&registered.token).unwrap();
        assert_eq!(claims.user_id().unwrap(), registered.user.id);

        let login = auth
            .login(LoginRequest {
                email: " RAFA@example.com".to_string(),
                password: "Segredo#1".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(login.user.id, registered.user.id);
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let auth = service();
        auth.register(input("rafa@example.com")).await.unwrap();
        let err = auth.register(input("Rafa@Example.com ")).await.unwrap_err();
        assert!(matches!(err, YardError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_wrong_password_is_unauthorized() {
        let auth = service();
        auth.register(input("rafa@example.com")).await.unwrap();
        let err = auth
            .login(LoginRequest {
                email: "rafa@example.com".to_string(),
                password: "nope".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, YardError::Unauthorized(_)));

        let err = auth
            .login(LoginRequest {
                email: "ghost@example.com".to_string(),
                password: "nope".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, YardError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_login_upgrades_old_hashes() {
        let auth = service();
        let user = auth.register(input("rafa@example.com")).await.unwrap().user;

        let stronger = auth.clone().with_hasher(PasswordHasher::with_iterations(80));
        stronger
            .login(LoginRequest {
                email: "rafa@example.com".to_string(),
                password: "Segredo#1".to_string(),
            })
            .await
            .unwrap();

        let stored = stronger.store.get_user(user.id).await.unwrap();
        assert!(stored.password_hash.starts_with("pbkdf2-sha256$80$"));
    }
}
