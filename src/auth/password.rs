//! Salted PBKDF2-HMAC-SHA256 password hashes
//!
//! Stored format: `pbkdf2-sha256$<iterations>$<salt hex>$<hash hex>`.

use hmac::digest::{generic_array::GenericArray, CtOutput};
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;

use crate::error::{Result, YardError};

type HmacSha256 = Hmac<Sha256>;

pub const DEFAULT_ITERATIONS: u32 = 10_000;
const SALT_LEN: usize = 16;
const SCHEME: &str = "pbkdf2-sha256";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordVerification {
    Failed,
    Success,
    /// Correct password, but stored with a different work factor.
    SuccessRehashNeeded,
}

#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    iterations: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
        }
    }
}

impl PasswordHasher {
    pub fn with_iterations(iterations: u32) -> Self {
        Self {
            iterations: iterations.max(1),
        }
    }

    pub fn hash(&self, password: &str) -> Result<String> {
        let mut salt = [0u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt);
        let derived = derive(password, &salt, self.iterations)?;
        Ok(format!(
            "{}${}${}${}",
            SCHEME,
            self.iterations,
            hex::encode(salt),
            hex::encode(derived.into_bytes())
        ))
    }

    pub fn verify(&self, password: &str, stored: &str) -> PasswordVerification {
        let Ok((iterations, salt, expected)) = parse(stored) else {
            return PasswordVerification::Failed;
        };
        let Ok(actual) = derive(password, &salt, iterations) else {
            return PasswordVerification::Failed;
        };
        // CtOutput compares in constant time.
        if actual != expected {
            return PasswordVerification::Failed;
        }
        if iterations != self.iterations {
            PasswordVerification::SuccessRehashNeeded
        } else {
            PasswordVerification::Success
        }
    }
}

/// First output block of PBKDF2 with HMAC-SHA256 as the PRF, which is the
/// whole 32-byte key.
fn derive(password: &str, salt: &[u8], iterations: u32) -> Result<CtOutput<HmacSha256>> {
    let prf = HmacSha256::new_from_slice(password.as_bytes())
        .map_err(|e| YardError::Internal(format!("HMAC initialization failed: {}", e)))?;

    let mut mac = prf.clone();
    mac.update(salt);
    mac.update(&1u32.to_be_bytes());
    let mut block = mac.finalize().into_bytes();
    let mut key = block;

    for _ in 1..iterations {
        let mut mac = prf.clone();
        mac.update(&block);
        block = mac.finalize().into_bytes();
        for (k, b) in key.iter_mut().zip(block.iter()) {
            *k ^= b;
        }
    }
    Ok(CtOutput::new(key))
}

fn parse(stored: &str) -> Result<(u32, Vec<u8>, CtOutput<HmacSha256>)> {
    let malformed = || YardError::Validation("malformed password hash".to_string());
    let mut parts = stored.split('$');
    match (parts.next(), parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(SCHEME), Some(iterations), Some(salt), Some(hash), None) => {
            let iterations: u32 = iterations.parse().map_err(|_| malformed())?;
            if iterations == 0 {
                return Err(malformed());
            }
            let salt = hex::decode(salt).map_err(|_| malformed())?;
            let hash = hex::decode(hash).map_err(|_| malformed())?;
            let expected = GenericArray::from_exact_iter(hash).ok_or_else(malformed)?;
            Ok((iterations, salt, CtOutput::new(expected)))
        }
        _ => Err(malformed()),
    }
}
