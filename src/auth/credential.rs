//! Salted password hashing.
//!
//! A per-user random salt keys an HMAC-SHA1 over the plaintext, rendered
//! as hex. The salt is regenerated every time a password is set, so an
//! old hash never verifies after a password change.

use hmac::{Hmac, Mac};
use sha1::Sha1;
use subtle::ConstantTimeEq;
use uuid::Uuid;

type HmacSha1 = Hmac<Sha1>;

/// Generate a fresh opaque salt for a password set.
pub fn make_salt() -> String {
    Uuid::new_v4().to_string()
}

/// Hash `password` keyed by `salt`, hex-encoded.
///
/// An empty password hashes to the empty string, which never matches any
/// stored hash, rather than being an error.
pub fn encrypt_password(password: &str, salt: &str) -> String {
    if password.is_empty() {
        return String::new();
    }
    let Ok(mut mac) = HmacSha1::new_from_slice(salt.as_bytes()) else {
        return String::new();
    };
    mac.update(password.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// True iff `password` re-derives `hashed` under `salt`. Constant-time
/// comparison, so the check leaks nothing about how much of the hash
/// matched.
pub fn verify_password(password: &str, salt: &str, hashed: &str) -> bool {
    let computed = encrypt_password(password, salt);
    if computed.is_empty() {
        return false;
    }
    bool::from(computed.as_bytes().ct_eq(hashed.as_bytes()))
}
