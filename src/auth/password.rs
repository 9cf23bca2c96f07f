//! bcrypt password hashes and random refresh tokens.

use rand::Rng;

use crate::utils::{Error, Result};

/// Hash `password` with bcrypt at the given work factor.
pub fn hash_password(password: &str, cost: u32) -> Result<String> {
    bcrypt::hash(password, cost).map_err(|e| Error::Internal(format!("password hashing failed: {e}")))
}

/// A malformed stored hash never verifies.
pub fn verify_password(password: &str, stored: &str) -> bool {
    bcrypt::verify(password, stored).unwrap_or(false)
}

/// Random opaque token of `len` bytes, hex encoded.
pub fn generate_secure_token(len: usize) -> String {
    let mut bytes = vec![0u8; len];
    rand::rng().fill(bytes.as_mut_slice());
    hex::encode(bytes)
}
