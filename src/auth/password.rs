use bcrypt::{hash, verify};

use crate::error::ServiceResult;

pub fn hash_password(password: &str, cost: u32) -> ServiceResult<String> {
    Ok(hash(password, cost)?)
}

/// Malformed stored hashes count as a mismatch.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    verify(password, password_hash).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_verifies_only_the_original_password() {
        let hashed = hash_password("siti123", 4 /* bcrypt MIN_COST (private in bcrypt 0.17) */).unwrap();
        assert_ne!(hashed, "siti123");
        assert!(verify_password("siti123", &hashed));
        assert!(!verify_password("siti124", &hashed));
    }

    #[test]
    fn plaintext_stored_value_never_verifies() {
        assert!(!verify_password("admin", "admin"));
    }
}
