//! # Constraint Graph Fingerprints
//!
//! Identity of a constraint graph for model caching.
//!
//! Each triple is encoded with `postcard` and fed, length-prefixed, into a
//! digest in fragment order then insertion order. Two fragment lists yield the
//! same fingerprint only if they contain the same triples in the same order,
//! which is exactly what determines the built `ConstraintModel`.
//!
//! With the `crypto-hash` feature the digest is BLAKE3 (64 hex chars);
//! otherwise a 64-bit FNV-1a (16 hex chars).

use crate::graph::Graph;

#[cfg(feature = "crypto-hash")]
struct Digest(blake3::Hasher);

#[cfg(feature = "crypto-hash")]
impl Digest {
    fn new() -> Self {
        Self(blake3::Hasher::new())
    }

    fn update(&mut self, bytes: &[u8]) {
        self.0.update(bytes);
    }

    fn finish(self) -> String {
        self.0.finalize().to_hex().to_string()
    }
}

#[cfg(not(feature = "crypto-hash"))]
struct Digest(u64);

#[cfg(not(feature = "crypto-hash"))]
impl Digest {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    fn new() -> Self {
        Self(Self::OFFSET)
    }

    fn update(&mut self, bytes: &[u8]) {
        for byte in bytes {
            self.0 ^= u64::from(*byte);
            self.0 = self.0.wrapping_mul(Self::PRIME);
        }
    }

    fn finish(self) -> String {
        format!("{:016x}", self.0)
    }
}

/// Fingerprint of a list of constraint graph fragments.
#[must_use]
pub fn fingerprint(fragments: &[Graph]) -> String {
    let mut digest = Digest::new();
    digest.update(&(fragments.len() as u64).to_le_bytes());

    for fragment in fragments {
        digest.update(&(fragment.len() as u64).to_le_bytes());
        for triple in fragment.triples() {
            // Strings and options always encode; an empty buffer is unreachable.
            let bytes = postcard::to_allocvec(triple).unwrap_or_default();
            digest.update(&(bytes.len() as u64).to_le_bytes());
            digest.update(&bytes);
        }
    }
    digest.finish()
}

/// Verify fragments against a previously computed fingerprint.
#[must_use]
pub fn verify_fingerprint(fragments: &[Graph], expected: &str) -> bool {
    fingerprint(fragments) == expected
}

// =============================================================================
// TESTS
// =============================================================================
