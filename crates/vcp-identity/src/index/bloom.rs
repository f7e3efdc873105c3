//! Bloom-filter existence index.
//!
//! Sized from an expected entry count and a target false-positive rate:
//!
//! ```text
//! m = ceil(-n · ln p / (ln 2)²)      bits
//! k = round(m / n · ln 2)            hash functions
//! ```
//!
//! Bit positions come from double hashing, `h1 + i·h2 (mod m)`, with `h1`
//! taken from SHA-256 and `h2` from BLAKE3 over the canonical string.
//!
//! Standard Bloom filters cannot delete or shrink. When the load crosses
//! the configured threshold the owner builds a fresh, larger filter from
//! its authoritative entry set via [`ExistenceIndex::rebuild`].

use sha2::{Digest, Sha256};

const MIN_BITS: usize = 64;

/// Probabilistic membership over canonical token strings.
#[derive(Debug, Clone)]
pub struct ExistenceIndex {
    bits: Vec<u64>,
    num_bits: usize,
    num_hashes: u32,
    capacity: usize,
    false_positive_rate: f64,
    inserted: usize,
}

impl ExistenceIndex {
    /// Create an empty filter sized for `capacity` items at
    /// `false_positive_rate`.
    pub fn with_capacity(capacity: usize, false_positive_rate: f64) -> Self {
        let capacity = capacity.max(1);
        let p = false_positive_rate.clamp(f64::MIN_POSITIVE, 0.5);
        let ln2 = std::f64::consts::LN_2;

        let num_bits = ((-(capacity as f64) * p.ln()) / (ln2 * ln2)).ceil() as usize;
        let num_bits = num_bits.max(MIN_BITS);
        let num_hashes = ((num_bits as f64 / capacity as f64) * ln2).round().max(1.0) as u32;

        Self {
            bits: vec![0u64; num_bits.div_ceil(64)],
            num_bits,
            num_hashes,
            capacity,
            false_positive_rate: p,
            inserted: 0,
        }
    }

    /// Build a new filter from an authoritative item set.
    pub fn rebuild<'a, I>(items: I, capacity: usize, false_positive_rate: f64) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut index = Self::with_capacity(capacity, false_positive_rate);
        for item in items {
            index.insert(item);
        }
        index
    }

    /// Record a canonical token string.
    pub fn insert(&mut self, canonical: &str) {
        let (h1, h2) = hash_pair(canonical);
        for i in 0..self.num_hashes {
            let pos = self.position(h1, h2, i);
            self.bits[pos / 64] |= 1u64 << (pos % 64);
        }
        self.inserted += 1;
    }

    /// `false` means definitely absent; `true` means possibly present.
    pub fn might_contain(&self, canonical: &str) -> bool {
        let (h1, h2) = hash_pair(canonical);
        (0..self.num_hashes).all(|i| {
            let pos = self.position(h1, h2, i);
            self.bits[pos / 64] & (1u64 << (pos % 64)) != 0
        })
    }

    /// Whether the insert count has crossed `load_factor × capacity`.
    pub fn needs_rebuild(&self, load_factor: f64) -> bool {
        self.inserted as f64 > self.capacity as f64 * load_factor
    }

    /// Number of insertions so far.
    pub fn len(&self) -> usize {
        self.inserted
    }

    pub fn is_empty(&self) -> bool {
        self.inserted == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn num_bits(&self) -> usize {
        self.num_bits
    }

    pub fn num_hashes(&self) -> u32 {
        self.num_hashes
    }

    /// Target false-positive rate the filter was sized for.
    pub fn target_false_positive_rate(&self) -> f64 {
        self.false_positive_rate
    }

    /// Expected false-positive rate at the current fill:
    /// `(1 - e^(-k·n/m))^k`.
    pub fn estimated_false_positive_rate(&self) -> f64 {
        let k = self.num_hashes as f64;
        let n = self.inserted as f64;
        let m = self.num_bits as f64;
        (1.0 - (-k * n / m).exp()).powf(k)
    }

    fn position(&self, h1: u64, h2: u64, i: u32) -> usize {
        (h1.wrapping_add((i as u64).wrapping_mul(h2)) % self.num_bits as u64) as usize
    }
}

fn hash_pair(item: &str) -> (u64, u64) {
    let sha = Sha256::digest(item.as_bytes());
    let blake = blake3::hash(item.as_bytes());

    let mut a = [0u8; 8];
    a.copy_from_slice(&sha[..8]);
    let mut b = [0u8; 8];
    b.copy_from_slice(&blake.as_bytes()[..8]);

    // An odd stride keeps successive probes distinct.
    (u64::from_le_bytes(a), u64::from_le_bytes(b) | 1)
}
