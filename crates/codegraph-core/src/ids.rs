use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;
use unicode_normalization::UnicodeNormalization;

/// A deterministic content-derived identifier.
///
/// `Id` is never random: the same `(kind, fqn, span)` triple always hashes
/// to the same value, so rerunning the pipeline on identical content
/// yields identical ids. This is the one place in the workspace where a
/// random UUID would have been the wrong default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct Id(pub u128);

impl Id {
    /// Derive an id from a discriminator plus an arbitrary number of
    /// stringly-typed parts. The discriminator (typically a node/chunk kind
    /// name) guards against collisions between distinct entities that
    /// happen to share a span.
    pub fn derive(discriminant: &str, parts: &[&str]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(discriminant.as_bytes());
        for part in parts {
            hasher.update(0u8.to_be_bytes()); // separator, never appears in utf8 text
            hasher.update(part.as_bytes());
        }
        let digest = hasher.finalize();
        let mut buf = [0u8; 16];
        buf.copy_from_slice(&digest[..16]);
        Id(u128::from_be_bytes(buf))
    }

    pub fn as_u128(self) -> u128 {
        self.0
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

impl FromStr for Id {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        u128::from_str_radix(s, 16).map(Id)
    }
}

/// Normalize a fully-qualified name to NFC before it is hashed or inserted
/// into the symbol table. Returns whether normalization changed the input,
/// so callers can surface a diagnostic instead of silently accepting
/// NFD/NFC drift.
pub fn normalize_fqn(fqn: &str) -> (String, bool) {
    let normalized: String = fqn.nfc().collect();
    let changed = normalized != fqn;
    (normalized, changed)
}
