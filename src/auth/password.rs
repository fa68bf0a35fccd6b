use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};
use tracing::error;

const SALT_BYTES: usize = 16;
pub const SALT_HEX_LEN: usize = SALT_BYTES * 2;
pub const DIGEST_HEX_LEN: usize = 64;

/// Stored format: 32 hex chars of salt followed by the 64 hex char
/// SHA-256 digest of `plain + salt`.
pub fn hash_password(plain: &str) -> String {
    let mut salt = [0u8; SALT_BYTES];
    OsRng.fill_bytes(&mut salt);
    let salt = hex::encode(salt);
    let digest = salted_digest(plain, &salt);
    format!("{salt}{digest}")
}

pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    if hash.len() < SALT_HEX_LEN + DIGEST_HEX_LEN {
        error!(len = hash.len(), "stored password hash too short");
        anyhow::bail!("malformed password hash: expected {} chars", SALT_HEX_LEN + DIGEST_HEX_LEN);
    }
    let (Some(salt), Some(expected)) = (hash.get(..SALT_HEX_LEN), hash.get(SALT_HEX_LEN..)) else {
        error!("stored password hash does not split at the salt boundary");
        anyhow::bail!("malformed password hash");
    };
    Ok(salted_digest(plain, salt) == expected)
}

fn salted_digest(plain: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(plain.as_bytes());
    hasher.update(salt.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let password = "Secur3P@ssw0rd!";
        let hash = hash_password(password);
        assert!(verify_password(password, &hash).expect("verify should succeed"));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let password = "correct-horse-battery-staple";
        let hash = hash_password(password);
        assert!(!verify_password("wrong-password", &hash).expect("verify should not error"));
    }

    #[test]
    fn verify_errors_on_malformed_hash() {
        let err = verify_password("anything", "not-a-valid-hash").unwrap_err();
        assert!(err.to_string().contains("malformed"));
    }

    #[test]
    fn stored_hash_is_salt_then_digest() {
        let hash = hash_password("secret1");
        assert_eq!(hash.len(), SALT_HEX_LEN + DIGEST_HEX_LEN);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));

        let (salt, digest) = hash.split_at(SALT_HEX_LEN);
        let mut hasher = Sha256::new();
        hasher.update(format!("secret1{salt}").as_bytes());
        assert_eq!(hex::encode(hasher.finalize()), digest);
    }

    #[test]
    fn same_password_gets_fresh_salt() {
        let a = hash_password("repeat");
        let b = hash_password("repeat");
        assert_ne!(a, b);
        assert!(verify_password("repeat", &a).unwrap());
        assert!(verify_password("repeat", &b).unwrap());
    }

    #[test]
    fn verifies_known_vector() {
        let salt = "0".repeat(SALT_HEX_LEN);
        let digest = salted_digest("abc", &salt);
        let stored = format!("{salt}{digest}");
        assert!(verify_password("abc", &stored).unwrap());
        assert!(!verify_password("abd", &stored).unwrap());
    }

    #[test]
    fn verify_handles_non_ascii_without_panicking() {
        let stored = format!("a{}{}", "ñ".repeat(40), "b".repeat(30));
        assert!(verify_password("x", &stored).is_err());
    }
}
