//! Resource identifiers: 24 lowercase hex characters (12 bytes).
//!
//! Layout: 4-byte big-endian unix seconds, 5 random bytes, 3-byte counter.

use std::sync::atomic::{AtomicU32, Ordering};

use chrono::Utc;
use uuid::Uuid;

pub const OBJECT_ID_LEN: usize = 24;

static COUNTER: AtomicU32 = AtomicU32::new(0);

/// Generates a fresh identifier.
pub fn generate() -> String {
    let mut bytes = [0u8; 12];
    let secs = Utc::now().timestamp() as u32;
    bytes[..4].copy_from_slice(&secs.to_be_bytes());
    bytes[4..9].copy_from_slice(&Uuid::new_v4().as_bytes()[..5]);
    let count = COUNTER.fetch_add(1, Ordering::Relaxed);
    bytes[9..].copy_from_slice(&count.to_be_bytes()[1..]);
    hex::encode(bytes)
}

/// `true` when `candidate` is exactly 24 ASCII hex digits.
pub fn is_valid(candidate: &str) -> bool {
    candidate.len() == OBJECT_ID_LEN && candidate.bytes().all(|b| b.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_valid_and_distinct() {
        let a = generate();
        let b = generate();
        assert!(is_valid(&a), "{a}");
        assert!(is_valid(&b), "{b}");
        assert_ne!(a, b);
    }

    #[test]
    fn rejects_wrong_length_or_alphabet() {
        assert!(is_valid("6650f1c2a1b2c3d4e5f60718"));
        assert!(is_valid("6650F1C2A1B2C3D4E5F60718"));
        assert!(!is_valid("abc"));
        assert!(!is_valid("6650f1c2a1b2c3d4e5f6071"));
        assert!(!is_valid("6650f1c2a1b2c3d4e5f607189"));
        assert!(!is_valid("6650f1c2a1b2c3d4e5f6071z"));
        assert!(!is_valid(""));
    }
}
