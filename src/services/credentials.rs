//! Password digests for basic credential matching
//!
//! Stored form is `<salt>$<blake3 hex>`, where the digest covers the salt
//! followed by the password.

const SEPARATOR: char = '$';

/// Hash a password with a fresh random salt
pub fn hash_password(password: &str) -> String {
    let salt = uuid::Uuid::new_v4().simple().to_string();
    format!("{}{}{}", salt, SEPARATOR, digest(&salt, password).to_hex())
}

/// Check a password against a stored digest
///
/// Malformed digests never match.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt, hex)) = stored.split_once(SEPARATOR) else {
        return false;
    };

    match blake3::Hash::from_hex(hex) {
        // `Hash` equality is constant-time
        Ok(expected) => digest(salt, password) == expected,
        Err(_) => false,
    }
}

fn digest(salt: &str, password: &str) -> blake3::Hash {
    let mut hasher = blake3::Hasher::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hasher.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let stored = hash_password("секрет123");
        assert!(verify_password("секрет123", &stored));
        assert!(!verify_password("секрет124", &stored));
    }

    #[test]
    fn test_salted() {
        let a = hash_password("admin123");
        let b = hash_password("admin123");

        assert_ne!(a, b);
        assert!(!a.contains("admin123"));
    }

    #[test]
    fn test_malformed_digest() {
        assert!(!verify_password("admin123", "admin123"));
        assert!(!verify_password("admin123", "salt$not-hex"));
    }
}
