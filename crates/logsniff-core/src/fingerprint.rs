//! Content digests for line comparison.

use std::fmt;

use serde::{Deserialize, Serialize};

/// BLAKE3 digest of a (normalized) line.
///
/// The digest algorithm is an implementation detail: two runs of the same
/// binary agree on fingerprints, but nothing outside the process should
/// depend on the exact bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(pub [u8; 32]);

impl Fingerprint {
    /// Digest a piece of text.
    pub fn of(text: &str) -> Self {
        Self(*blake3::hash(text.as_bytes()).as_bytes())
    }

    /// Get the digest as a hex string.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_text_same_fingerprint() {
        assert_eq!(Fingerprint::of("disk full"), Fingerprint::of("disk full"));
        assert_ne!(Fingerprint::of("disk full"), Fingerprint::of("disk ful"));
    }

    #[test]
    fn test_hex() {
        let hex = Fingerprint([0xab; 32]).to_hex();
        assert_eq!(hex.len(), 64);
        assert!(hex.starts_with("abab"));
        assert_eq!(Fingerprint::of("x").to_string().len(), 64);
    }
}
