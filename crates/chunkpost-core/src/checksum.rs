//! SHA-1 content checksums.
//!
//! Clients send the lowercase hex SHA-1 of each decoded chunk. The digest is
//! only an integrity check on the transport, never a security boundary.

use sha1::{Digest, Sha1};

/// Hash a byte slice, returning the lowercase hex SHA-1 digest.
///
/// # Example
/// ```
/// use chunkpost_core::checksum::sha1_hex;
/// assert_eq!(sha1_hex(b"hello"), "aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d");
/// ```
pub fn sha1_hex(data: &[u8]) -> String {
    hex::encode(Sha1::digest(data))
}

/// Check a payload against a client-supplied digest.
///
/// The comparison is case-sensitive: an uppercase digest does not match.
pub fn matches(data: &[u8], expected: &str) -> bool {
    sha1_hex(data) == expected
}
