//! Content digests and image references using BLAKE3.

use crate::error::{Error, Result};
use std::fmt;

/// Digest size in bytes (BLAKE3 produces 256-bit hashes).
pub const DIGEST_SIZE: usize = 32;

/// File extension of the one standardized image encoding.
pub const IMAGE_EXT: &str = "jpg";

/// A 32-byte BLAKE3 digest of image content.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Digest([u8; DIGEST_SIZE]);

impl Digest {
    /// Create a Digest from raw bytes.
    pub fn from_bytes(bytes: [u8; DIGEST_SIZE]) -> Self {
        Digest(bytes)
    }

    /// Create a Digest from a hex string (64 hex characters).
    pub fn from_hex(hex_str: &str) -> Result<Self> {
        if hex_str.len() != DIGEST_SIZE * 2 {
            return Err(Error::invalid_input(format!(
                "Expected {} hex characters, got {}",
                DIGEST_SIZE * 2,
                hex_str.len()
            )));
        }

        let bytes = hex::decode(hex_str)
            .map_err(|e| Error::invalid_input(format!("Invalid hex: {}", e)))?;

        let mut digest = [0u8; DIGEST_SIZE];
        digest.copy_from_slice(&bytes);
        Ok(Digest(digest))
    }

    /// Convert to lowercase hex string (64 characters).
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Get the raw bytes.
    pub fn as_bytes(&self) -> &[u8; DIGEST_SIZE] {
        &self.0
    }

    /// Hash raw bytes using BLAKE3.
    pub fn hash_bytes(data: &[u8]) -> Self {
        let hash = blake3::hash(data);
        Digest(*hash.as_bytes())
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self.to_hex())
    }
}

/// A content-derived reference to a stored image artifact.
///
/// Rendered as `<64-hex-chars>.jpg`. Identical content always yields the
/// identical reference, which is the store's deduplication guarantee.
/// Parsing rejects anything that is not hex-plus-extension, so a reference
/// can never name a path outside the artifact directory.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageRef {
    digest: Digest,
}

impl ImageRef {
    /// Create a reference from a content digest.
    pub fn from_digest(digest: Digest) -> Self {
        ImageRef { digest }
    }

    /// The digest this reference was derived from.
    pub fn digest(&self) -> &Digest {
        &self.digest
    }

    /// Render the reference as an artifact file name.
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.digest.to_hex(), IMAGE_EXT)
    }

    /// Parse a reference from an artifact file name.
    pub fn parse(name: &str) -> Result<Self> {
        let stem = name.strip_suffix(&format!(".{}", IMAGE_EXT)).ok_or_else(|| {
            Error::invalid_input(format!(
                "Image reference must end with .{}: {}",
                IMAGE_EXT, name
            ))
        })?;

        let digest = Digest::from_hex(stem)?;
        Ok(ImageRef { digest })
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.file_name())
    }
}

impl fmt::Debug for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ImageRef({})", self.file_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_empty() {
        let digest = Digest::hash_bytes(b"");
        assert_eq!(digest.to_hex().len(), 64);
    }

    #[test]
    fn test_digest_hello_world() {
        let digest = Digest::hash_bytes(b"hello world");
        let hex = digest.to_hex();
        assert_eq!(hex.len(), 64);

        // BLAKE3 of "hello world"
        assert_eq!(
            hex,
            "d74981efa70a0c880b8d8c1985d075dbcbf679b99a5f9914e5aaf96b831a9e24"
        );
    }

    #[test]
    fn test_digest_from_hex_roundtrip() {
        let original = Digest::hash_bytes(b"test data");
        let hex = original.to_hex();
        let parsed = Digest::from_hex(&hex).unwrap();
        assert_eq!(original, parsed);
    }

    #[test]
    fn test_digest_from_hex_invalid_length() {
        assert!(Digest::from_hex("abcd").is_err());
        assert!(Digest::from_hex("").is_err());
    }

    #[test]
    fn test_digest_from_hex_invalid_chars() {
        let invalid = "z".repeat(64);
        assert!(Digest::from_hex(&invalid).is_err());
    }

    #[test]
    fn test_image_ref_file_name() {
        let digest = Digest::hash_bytes(b"picture");
        let reference = ImageRef::from_digest(digest);

        let name = reference.file_name();
        assert_eq!(name.len(), 64 + 4);
        assert!(name.ends_with(".jpg"));
        assert!(name.starts_with(&digest.to_hex()));
    }

    #[test]
    fn test_image_ref_parse_roundtrip() {
        let reference = ImageRef::from_digest(Digest::hash_bytes(b"picture"));
        let parsed = ImageRef::parse(&reference.file_name()).unwrap();
        assert_eq!(reference, parsed);
    }

    #[test]
    fn test_image_ref_parse_wrong_extension() {
        let hex = Digest::hash_bytes(b"x").to_hex();
        assert!(ImageRef::parse(&format!("{}.png", hex)).is_err());
        assert!(ImageRef::parse(&hex).is_err());
    }

    #[test]
    fn test_image_ref_parse_rejects_traversal() {
        assert!(ImageRef::parse("../../etc/passwd.jpg").is_err());
        assert!(ImageRef::parse("default.jpg").is_err());
        assert!(ImageRef::parse(".jpg").is_err());
    }

    // Property-based tests
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            max_shrink_iters: 10000,
            ..ProptestConfig::default()
        })]

        /// Digest determinism - hashing the same data always produces the same digest
        #[test]
        fn prop_digest_deterministic(data: Vec<u8>) {
            let digest1 = Digest::hash_bytes(&data);
            let digest2 = Digest::hash_bytes(&data);
            prop_assert_eq!(digest1, digest2);
        }

        /// Hex encoding is bijective - round-trip through hex preserves the digest
        #[test]
        fn prop_hex_roundtrip(bytes in prop::array::uniform32(any::<u8>())) {
            let digest = Digest::from_bytes(bytes);
            let hex = digest.to_hex();
            let parsed = Digest::from_hex(&hex)?;
            prop_assert_eq!(digest, parsed);
        }

        /// Invalid hex length always fails
        #[test]
        fn prop_invalid_hex_length_fails(
            s in "[0-9a-f]{0,63}|[0-9a-f]{65,128}"
        ) {
            prop_assert!(Digest::from_hex(&s).is_err());
        }

        /// Reference rendering and parsing are inverse for any digest
        #[test]
        fn prop_image_ref_roundtrip(bytes in prop::array::uniform32(any::<u8>())) {
            let reference = ImageRef::from_digest(Digest::from_bytes(bytes));
            let parsed = ImageRef::parse(&reference.file_name())?;
            prop_assert_eq!(reference, parsed);
        }
    }
}
