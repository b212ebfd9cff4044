// src/commitment/digest.rs

use sha2::{Digest, Sha256};

pub type Bytes32 = [u8; 32];

/// SHA-256 of `bytes`.
pub fn sha256(bytes: &[u8]) -> Bytes32 {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let result = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&result);
    out
}

/// Lowercase hex SHA-256 of `bytes`, no prefix.
pub fn digest_hex(bytes: &[u8]) -> String {
    hex::encode(sha256(bytes))
}

/// Lowercase hex SHA-256 of the UTF-8 encoding of `message`.
pub fn digest_str(message: &str) -> String {
    digest_hex(message.as_bytes())
}
