//! Salted password hashing for the local provider.
//!
//! Passwords are stretched with PBKDF2-HMAC-SHA256. Salts, hashes and
//! tokens are stored hex encoded.

use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;

/// Minimum accepted password length.
pub const MIN_PASSWORD_LEN: usize = 6;

pub const PBKDF2_ITERATIONS: u32 = 600_000;
pub const SALT_LENGTH: usize = 16;
pub const HASH_LENGTH: usize = 32;
const TOKEN_LENGTH: usize = 32;

/// Fresh random salt, hex encoded.
pub fn generate_salt() -> String {
    let mut bytes = [0u8; SALT_LENGTH];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Random opaque token for a session.
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_LENGTH];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Derive the stored hash for `password`. Returns `None` when `salt` is not
/// valid hex.
pub fn hash_password(salt: &str, password: &str, iterations: u32) -> Option<String> {
    let salt = hex::decode(salt).ok()?;
    Some(hex::encode(derive(&salt, password, iterations)))
}

/// Check a candidate password against a stored hash in constant time.
/// Malformed stored values never verify.
pub fn verify_password(salt: &str, password: &str, expected_hash: &str, iterations: u32) -> bool {
    let (Ok(salt), Ok(expected)) = (hex::decode(salt), hex::decode(expected_hash)) else {
        return false;
    };
    let actual = derive(&salt, password, iterations);
    actual[..].ct_eq(&expected[..]).into()
}

fn derive(salt: &[u8], password: &str, iterations: u32) -> [u8; HASH_LENGTH] {
    let mut out = [0u8; HASH_LENGTH];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    // Low count keeps the tests fast; the derivation is the same
    const ITERATIONS: u32 = 1_000;

    #[test]
    fn test_hash_is_salted() {
        let a = hash_password(&generate_salt(), "hunter22", ITERATIONS).unwrap();
        let b = hash_password(&generate_salt(), "hunter22", ITERATIONS).unwrap();
        assert_ne!(a, b);
        assert_eq!(a.len(), HASH_LENGTH * 2);
    }

    #[test]
    fn test_iterations_change_the_hash() {
        let salt = generate_salt();
        assert_ne!(
            hash_password(&salt, "hunter22", ITERATIONS),
            hash_password(&salt, "hunter22", ITERATIONS + 1)
        );
    }

    #[test]
    fn test_known_vector() {
        // RFC 7914 section 11, PBKDF2-HMAC-SHA256 with c = 1
        let salt = hex::encode("salt");
        let hash = hash_password(&salt, "passwd", 1).unwrap();
        assert!(hash.starts_with("55ac046e56e3089fec1691c22544b605"));
    }

    #[test]
    fn test_verify() {
        let salt = generate_salt();
        let hash = hash_password(&salt, "correct horse", ITERATIONS).unwrap();
        assert!(verify_password(&salt, "correct horse", &hash, ITERATIONS));
        assert!(!verify_password(&salt, "correct hors", &hash, ITERATIONS));
        assert!(!verify_password(&salt, "correct horse", &hash, ITERATIONS + 1));
        assert!(!verify_password(&salt, "correct horse", "abcd", ITERATIONS));
    }

    #[test]
    fn test_malformed_values_never_verify() {
        assert_eq!(hash_password("not hex", "pw", ITERATIONS), None);
        assert!(!verify_password("zz", "pw", "00", ITERATIONS));
        let salt = generate_salt();
        assert!(!verify_password(&salt, "pw", "not hex", ITERATIONS));
    }

    #[test]
    fn test_salts_and_tokens_are_random() {
        assert_ne!(generate_salt(), generate_salt());
        assert_eq!(generate_salt().len(), SALT_LENGTH * 2);
        assert_eq!(generate_token().len(), TOKEN_LENGTH * 2);
    }
}
