use std::fmt;
use xxhash_rust::xxh3::Xxh3;

const XXH3_SEED: u64 = 0x7467_735f_6275_6e64;

/// 128-bit content hash of a generated artifact.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct OutputFingerprint {
    /// High 64 bits.
    pub hi: u64,
    /// Low 64 bits.
    pub lo: u64,
}

impl fmt::Display for OutputFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}{:016x}", self.hi, self.lo)
    }
}

/// Hash generated code. Equal code gives equal fingerprints across runs and platforms.
pub fn fingerprint_code(code: &str) -> OutputFingerprint {
    let mut h = Xxh3::with_seed(XXH3_SEED);
    h.update(code.as_bytes());
    let v = h.digest128();
    OutputFingerprint {
        hi: (v >> 64) as u64,
        lo: v as u64,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/generate/fingerprint.rs"]
mod tests;
