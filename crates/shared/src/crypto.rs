//! Hashing utilities for module keys and upload filename salts.

use chrono::Utc;
use hmac::{Hmac, Mac};
use rand::Rng;
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

/// Computes SHA-256 hash of the input and returns it as a hex string.
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// Derives the module secure key from the module name and the service secret.
///
/// The key is handed to the admin page and echoed back by the reorder
/// endpoint, so it must be stable across restarts for a given secret.
pub fn module_secure_key(module_name: &str, secret: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any size");
    mac.update(module_name.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Constant-time comparison of a presented secure key against the expected one.
pub fn verify_secure_key(module_name: &str, secret: &str, presented: &str) -> bool {
    let Ok(presented) = hex::decode(presented) else {
        return false;
    };
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any size");
    mac.update(module_name.as_bytes());
    mac.verify_slice(&presented).is_ok()
}

/// Compares two shared secrets without short-circuiting on the first
/// differing byte. An empty expected secret never matches.
pub fn tokens_match(expected: &str, presented: &str) -> bool {
    if expected.is_empty() {
        return false;
    }
    let expected = Sha256::digest(expected.as_bytes());
    let presented = Sha256::digest(presented.as_bytes());
    expected
        .iter()
        .zip(presented.iter())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

/// Generates a time-based random salt used to prefix stored upload filenames.
///
/// Two uploads of the same file in the same instant still get distinct salts.
pub fn upload_salt() -> String {
    let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    let noise: u64 = rand::thread_rng().gen();
    let digest = sha256_hex(&format!("{}:{}", nanos, noise));
    digest[..40].to_string()
}
