//! Content hashing for document revisions
//!
//! A revision is the short SHA-256 digest of a document's bytes. Two reads
//! with the same revision saw the same document.

use sha2::{Digest, Sha256};

/// Compute 16-character hex revision of content (first 64 bits of SHA-256).
///
/// # Arguments
/// * `content` - Byte slice to hash
///
/// # Returns
/// 16-character lowercase hex string
pub fn content_hash(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    let result = hasher.finalize();
    hex::encode(&result[..8])
}
