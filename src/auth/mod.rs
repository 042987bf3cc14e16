//! Authentication
//!
//! Password hashing, JWT issuance and verification, and the bearer-token
//! middleware guarding every non-public route.

mod jwt;
mod middleware;
mod password;
mod service;

pub use jwt::{Claims, JwtConfig, TokenService, MIN_SECRET_LEN};
pub use middleware::require_bearer;
pub use password::{PasswordHasher, PasswordVerification, DEFAULT_ITERATIONS};
pub use service::{AuthResponse, AuthService, LoginRequest};
