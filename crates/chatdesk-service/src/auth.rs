// SPDX-FileCopyrightText: 2026 Chatdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Username normalization and Argon2 PIN hashing.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chatdesk_core::ChatdeskError;

/// Normalize a login handle: trim and lowercase. Applied at provisioning and
/// at login so lookups agree regardless of how the name was typed.
pub fn normalize_username(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// The synthetic login identifier: `<username>@<staff_domain>`. The domain is
/// internal naming, not a deliverable mail address.
pub fn login_email(username: &str, staff_domain: &str) -> String {
    format!("{username}@{staff_domain}")
}

/// Hash a PIN with Argon2id and a fresh random salt.
pub fn hash_pin(pin: &str) -> Result<String, ChatdeskError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(pin.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ChatdeskError::Internal(format!("PIN hashing failed: {e}")))
}

/// Verify a PIN against a stored hash. Malformed stored hashes verify false.
pub fn verify_pin(pin: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(pin.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_trims_and_lowercases() {
        assert_eq!(normalize_username("  Jamie "), "jamie");
        assert_eq!(normalize_username("ASH"), "ash");
    }

    #[test]
    fn login_email_composition() {
        assert_eq!(login_email("ash", "staff.chatdesk"), "ash@staff.chatdesk");
    }

    #[test]
    fn hash_round_trips_and_rejects_wrong_pin() {
        let hash = hash_pin("4821").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_pin("4821", &hash));
        assert!(!verify_pin("0000", &hash));
    }

    #[test]
    fn garbage_hash_verifies_false() {
        assert!(!verify_pin("4821", "not-a-hash"));
    }

    #[test]
    fn same_pin_hashes_differently_per_salt() {
        assert_ne!(hash_pin("4821").unwrap(), hash_pin("4821").unwrap());
    }
}
