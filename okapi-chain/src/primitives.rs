//! External primitives used in Okapi structures.
//!
//! This contains re-exports of libraries used in the public API, and the
//! digest functions every hashed structure is built on.

pub use ed25519_zebra as ed25519;

/// Fixed-width BLAKE2b digests.
///
/// Transaction and metadata identifiers use the 32-byte digest; key and
/// script hashes use the 28-byte digest.
pub mod digest {
    /// The 32-byte BLAKE2b digest of `bytes`.
    pub fn blake2b_256(bytes: &[u8]) -> [u8; 32] {
        let hash = blake2b_simd::Params::new().hash_length(32).hash(bytes);
        hash.as_bytes()
            .try_into()
            .expect("digest length is configured as 32 bytes")
    }

    /// The 28-byte BLAKE2b digest of `bytes`.
    pub fn blake2b_224(bytes: &[u8]) -> [u8; 28] {
        let hash = blake2b_simd::Params::new().hash_length(28).hash(bytes);
        hash.as_bytes()
            .try_into()
            .expect("digest length is configured as 28 bytes")
    }
}
