use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt;

/// Stable cache key derived from an operation name and its arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn builder(operation: &str) -> FingerprintBuilder {
        FingerprintBuilder {
            operation: operation.to_string(),
            positional: Vec::new(),
            named: Vec::new(),
            failed: false,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Arguments are canonicalized as JSON; named arguments are hashed in key order
/// so call-site ordering does not change the key.
pub struct FingerprintBuilder {
    operation: String,
    positional: Vec<Vec<u8>>,
    named: Vec<(String, Vec<u8>)>,
    failed: bool,
}

impl FingerprintBuilder {
    pub fn arg<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(bytes) => self.positional.push(bytes),
            Err(_) => self.failed = true,
        }
        self
    }

    pub fn named<T: Serialize + ?Sized>(mut self, key: &str, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(bytes) => self.named.push((key.to_string(), bytes)),
            Err(_) => self.failed = true,
        }
        self
    }

    /// `None` when an argument could not be serialized; callers then skip the cache.
    pub fn finish(mut self) -> Option<Fingerprint> {
        if self.failed {
            return None;
        }
        self.named.sort_by(|a, b| a.0.cmp(&b.0));

        let mut hasher = Sha256::new();
        feed(&mut hasher, self.operation.as_bytes());
        hasher.update([POSITIONAL_TAG]);
        hasher.update((self.positional.len() as u64).to_le_bytes());
        for arg in &self.positional {
            feed(&mut hasher, arg);
        }
        hasher.update([NAMED_TAG]);
        hasher.update((self.named.len() as u64).to_le_bytes());
        for (key, value) in &self.named {
            feed(&mut hasher, key.as_bytes());
            feed(&mut hasher, value);
        }
        Some(Fingerprint(hex::encode(hasher.finalize())))
    }
}

const POSITIONAL_TAG: u8 = b'P';
const NAMED_TAG: u8 = b'N';

// Length prefix keeps ("ab", "c") and ("a", "bc") apart.
fn feed(hasher: &mut Sha256, bytes: &[u8]) {
    hasher.update((bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}
