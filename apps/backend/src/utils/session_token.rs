//! Opaque per-participant session tokens.
//!
//! The raw token goes to the client once; only its blake3 digest is stored.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::TryRngCore;

use crate::error::AppError;

const TOKEN_BYTES: usize = 32;

#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// Sent to the client, never stored
    pub token: String,
    pub hash: String,
}

/// 32 random bytes from the OS, base64url without padding.
pub fn issue() -> Result<IssuedToken, AppError> {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| AppError::internal(format!("OS random source failed: {e}")))?;
    let token = URL_SAFE_NO_PAD.encode(bytes);
    let hash = hash_token(&token);
    Ok(IssuedToken { token, hash })
}

pub fn hash_token(token: &str) -> String {
    blake3::hash(token.as_bytes()).to_hex().to_string()
}
