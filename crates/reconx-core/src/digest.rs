//! Content digests for reconciliation reports.
//!
//! A report records the SHA256 of the document bytes before and after
//! reconciliation. Equal digests mean the run was a no-op for that document,
//! which is what a second run over already-reconciled output must produce.

use sha2::{Digest, Sha256};

/// Hex-encoded SHA256 of `bytes` (64 characters)
pub fn content_digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// First 12 characters of a digest, for human output
pub fn short(digest: &str) -> &str {
    digest.get(..12).unwrap_or(digest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_deterministic() {
        let a = content_digest(b"<manifest/>");
        assert_eq!(a, content_digest(b"<manifest/>"));
        assert_eq!(a.len(), 64);
        assert_ne!(a, content_digest(b"<manifest />"));
    }

    #[test]
    fn test_short_handles_short_input() {
        assert_eq!(short("abc"), "abc");
        assert_eq!(short(&content_digest(b"x")).len(), 12);
    }
}
