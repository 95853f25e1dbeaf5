//! CRC32C hashing utilities.
//!
//! Descriptors carry a cheap numeric identity derived from their file name.
//! CRC32C is stable across runs and platforms, unlike the per-process string
//! hashes of the tooling that produces these files.

/// Compute CRC32C hash of a byte slice.
///
/// Uses hardware acceleration when available (SSE4.2 on x86).
#[inline]
pub fn hash_bytes(data: &[u8]) -> u32 {
    crc32c::crc32c(data)
}

/// Compute CRC32C hash of a string.
#[inline]
pub fn hash_str(s: &str) -> u32 {
    hash_bytes(s.as_bytes())
}

/// Content id for a normalized file name.
///
/// Not unique across renames; two names can collide.
#[inline]
pub fn content_id(file_name: &str) -> i32 {
    hash_str(file_name) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_hash() {
        assert_eq!(hash_bytes(&[]), 0);
    }

    #[test]
    fn test_known_hash() {
        // CRC32C check value
        assert_eq!(hash_str("123456789"), 0xE306_9283);
    }

    #[test]
    fn test_content_id_is_pure() {
        assert_eq!(content_id("dress_001.menu"), content_id("dress_001.menu"));
        assert_ne!(content_id("dress_001.menu"), content_id("dress_002.menu"));
    }
}
