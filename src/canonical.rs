//! Canonical serialization for deterministic fingerprints.
//!
//! Constraint graphs, policies and reports are fingerprinted by hashing their
//! canonical JSON form.
//!
//! ## Determinism Guarantees
//!
//! - Stable field order: Struct fields serialize in declaration order
//! - Stable Vec order: Vectors serialize in index order
//! - No HashMap allowed: Use BTreeMap for maps in hashed data
//! - Floats are quantized by callers before hashing

use serde::Serialize;
use xxhash_rust::xxh64::xxh64;

/// Serialize a value to canonical JSON bytes for hashing.
pub fn to_canonical_bytes<T: Serialize>(value: &T) -> Vec<u8> {
    serde_json::to_vec(value).expect("Canonical serialization failed")
}

/// Compute canonical hash of a serializable value.
pub fn canonical_hash<T: Serialize>(value: &T) -> u64 {
    let bytes = to_canonical_bytes(value);
    xxh64(&bytes, 0)
}

/// Compute canonical hash and return as hex string.
pub fn canonical_hash_hex<T: Serialize>(value: &T) -> String {
    format!("{:016x}", canonical_hash(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_determinism() {
        let mut m = BTreeMap::new();
        m.insert("2", vec!['d', 'e']);
        m.insert("1", vec!['a', 'b']);

        assert_eq!(canonical_hash(&m), canonical_hash(&m.clone()));
        assert_eq!(canonical_hash_hex(&m).len(), 16);
    }

    #[test]
    fn test_content_changes_hash() {
        assert_ne!(canonical_hash(&vec![1u32, 2]), canonical_hash(&vec![2u32, 1]));
    }
}
