// src/common/id_generator.rs
//! Crockford Base32 ID Generator
//!
//! Generates prefixed IDs using Crockford Base32 encoding.
//! Format: PREFIX_XXXXXXXX (e.g., S_K7NP3X2Q for services)
//!
//! No ambiguous characters (excludes I, L, O, U), case-insensitive on input.

use rand::Rng;

use super::ApiError;

/// Crockford Base32 alphabet (excludes I, L, O, U to avoid confusion)
const CROCKFORD_ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

const ID_LENGTH: usize = 8;

/// Entity type prefixes for ID generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityPrefix {
    /// Account (U_)
    User,
    /// Offered service (S_)
    Service,
    /// Booking (B_)
    Booking,
}

impl EntityPrefix {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityPrefix::User => "U",
            EntityPrefix::Service => "S",
            EntityPrefix::Booking => "B",
        }
    }
}

fn generate_crockford_string(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..32);
            CROCKFORD_ALPHABET[idx] as char
        })
        .collect()
}

/// Generate a prefixed ID, e.g. "B_8MWQT2KD"
pub fn generate_id(prefix: EntityPrefix) -> String {
    format!("{}_{}", prefix.as_str(), generate_crockford_string(ID_LENGTH))
}

pub fn generate_user_id() -> String {
    generate_id(EntityPrefix::User)
}

pub fn generate_service_id() -> String {
    generate_id(EntityPrefix::Service)
}

pub fn generate_booking_id() -> String {
    generate_id(EntityPrefix::Booking)
}

/// Whether `id` could have been produced by [`generate_id`] for `prefix`.
pub fn is_well_formed(prefix: EntityPrefix, id: &str) -> bool {
    let Some(rest) = id
        .strip_prefix(prefix.as_str())
        .and_then(|rest| rest.strip_prefix('_'))
    else {
        return false;
    };
    rest.len() == ID_LENGTH
        && rest
            .bytes()
            .all(|b| CROCKFORD_ALPHABET.contains(&b.to_ascii_uppercase()))
}

/// Rejects malformed identifiers before they reach the store.
pub fn ensure_id(prefix: EntityPrefix, id: &str) -> Result<(), ApiError> {
    if is_well_formed(prefix, id) {
        Ok(())
    } else {
        Err(ApiError::MalformedId(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_id_format() {
        let service_id = generate_service_id();
        assert!(service_id.starts_with("S_"));
        assert_eq!(service_id.len(), 10); // "S_" + 8 chars

        let booking_id = generate_booking_id();
        assert!(booking_id.starts_with("B_"));
        assert!(generate_user_id().starts_with("U_"));
    }

    #[test]
    fn test_crockford_alphabet_only() {
        let id = generate_booking_id();
        for c in id[2..].chars() {
            assert!(
                CROCKFORD_ALPHABET.contains(&(c as u8)),
                "Character '{}' not in Crockford alphabet",
                c
            );
        }
    }

    #[test]
    fn test_uniqueness() {
        let mut ids = HashSet::new();
        for _ in 0..1000 {
            let id = generate_service_id();
            assert!(ids.insert(id), "Duplicate ID generated");
        }
    }

    #[test]
    fn test_well_formed_ids() {
        let id = generate_user_id();
        assert!(is_well_formed(EntityPrefix::User, &id));
        assert!(is_well_formed(EntityPrefix::User, &id.to_lowercase().replacen('u', "U", 1)));
        assert!(!is_well_formed(EntityPrefix::Service, &id));
        assert!(!is_well_formed(EntityPrefix::User, "U_123"));
        assert!(!is_well_formed(EntityPrefix::User, "U_ILOU1234"));
        assert!(!is_well_formed(EntityPrefix::User, "not-an-id"));
    }

    #[test]
    fn test_ensure_id_reports_value() {
        match ensure_id(EntityPrefix::Booking, "123") {
            Err(ApiError::MalformedId(id)) => assert_eq!(id, "123"),
            other => panic!("expected malformed id, got {:?}", other),
        }
    }
}
