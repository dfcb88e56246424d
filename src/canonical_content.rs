//! Canonical text handling for input files and content hashing.
//!
//! Constraint files, word lists and serialized dictionaries all pass through
//! the same normalization before they are parsed or hashed:
//!
//! ```text
//! canonical_text(bytes) = normalize_newlines(strip_bom(UTF-8(bytes)))
//! ```
//!
//! Where:
//! - `strip_bom`: remove a single leading U+FEFF
//! - `normalize_newlines`: CRLF → LF, CR → LF
//!
//! Content hashes are SHA-256 over the trimmed canonical text, so the same
//! dictionary body hashes identically regardless of line-ending style.

use sha2::{Digest, Sha256};

/// Version of the canonical content format.
///
/// Changes to this version invalidate all stored dictionary hashes.
pub const CANONICAL_CONTENT_VERSION: &str = "1.0.0";

const BYTE_ORDER_MARK: char = '\u{feff}';

/// Decode raw file bytes into canonical text.
///
/// Returns `None` if the bytes are not valid UTF-8.
pub fn decode_input(bytes: &[u8]) -> Option<String> {
    let text = std::str::from_utf8(bytes).ok()?;
    let text = text.strip_prefix(BYTE_ORDER_MARK).unwrap_or(text);
    Some(normalize_newlines(text))
}

/// Normalize newlines: CRLF → LF, isolated CR → LF.
pub fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Normalize text to its hashed form (newlines normalized, then trimmed).
pub fn normalize_text(text: &str) -> String {
    normalize_newlines(text).trim().to_string()
}

/// Compute the SHA-256 content hash of normalized text as lowercase hex.
pub fn compute_content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(normalize_text(text).as_bytes());
    hex::encode(hasher.finalize())
}

/// Content hash validation result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HashValidation {
    /// Hash matches canonical content.
    Valid,
    /// Hash does not match canonical content.
    Mismatch {
        /// The expected hash that was stored.
        expected: String,
        /// The hash computed from the current content.
        computed: String,
    },
    /// No hash was stored.
    Missing,
}

/// Validate a stored content hash against the canonical content.
pub fn validate_content_hash(text: &str, stored_hash: Option<&str>) -> HashValidation {
    match stored_hash {
        None => HashValidation::Missing,
        Some(expected) => {
            let computed = compute_content_hash(text);
            if computed.eq_ignore_ascii_case(expected.trim()) {
                HashValidation::Valid
            } else {
                HashValidation::Mismatch {
                    expected: expected.to_string(),
                    computed,
                }
            }
        }
    }
}
