//! Bloom filter used to pre-screen index buckets before exact fuzzy matching.
//!
//! Multiple probe positions are derived from two independent ahash
//! computations (double hashing), so insert and lookup stay cache-friendly
//! even with a dozen hash functions.

use ahash::RandomState;
use std::hash::{BuildHasher, Hasher};

/// A space-efficient probabilistic membership structure.
///
/// May report false positives, never false negatives: an item that was
/// inserted is always found. Used to reject whole index buckets that cannot
/// contain any match for a query fragment set.
#[derive(Clone, Debug)]
pub struct BloomFilter {
    /// Bit array stored as u64 words
    bits: Vec<u64>,
    /// Number of bits in the filter
    num_bits: usize,
    /// Number of probe positions per item
    num_hashes: u8,
    /// Items inserted so far, for the false-positive estimate
    inserted: usize,
}

impl BloomFilter {
    /// Create a filter sized for `expected_items` at the given target
    /// false-positive rate (e.g. 0.01 for 1%).
    pub fn new(expected_items: usize, false_positive_rate: f64) -> Self {
        // Optimal bit count: m = -n * ln(p) / (ln 2)^2
        let n = expected_items.max(1) as f64;
        let p = false_positive_rate.clamp(0.0001, 0.5);
        let ln2_sq = std::f64::consts::LN_2 * std::f64::consts::LN_2;

        let num_bits = ((-n * p.ln()) / ln2_sq).ceil() as usize;
        let num_words = num_bits.max(64).div_ceil(64);
        let num_bits = num_words * 64;

        // Optimal probe count: k = (m/n) * ln 2
        let num_hashes = ((num_bits as f64 / n) * std::f64::consts::LN_2).round() as u8;
        let num_hashes = num_hashes.clamp(1, 16);

        Self {
            bits: vec![0u64; num_words],
            num_bits,
            num_hashes,
            inserted: 0,
        }
    }

    /// Insert an item.
    #[inline]
    pub fn insert(&mut self, item: u32) {
        let (h1, h2) = self.hash_pair(item);

        for i in 0..self.num_hashes as u64 {
            // Double hashing: h(i) = h1 + i*h2
            let hash = h1.wrapping_add(i.wrapping_mul(h2));
            let bit_index = (hash as usize) % self.num_bits;
            self.bits[bit_index / 64] |= 1u64 << (bit_index % 64);
        }
        self.inserted += 1;
    }

    /// Check whether an item might be in the set.
    /// Returns false if definitely absent, true if possibly present.
    #[inline]
    pub fn might_contain(&self, item: u32) -> bool {
        let (h1, h2) = self.hash_pair(item);

        for i in 0..self.num_hashes as u64 {
            let hash = h1.wrapping_add(i.wrapping_mul(h2));
            let bit_index = (hash as usize) % self.num_bits;

            if (self.bits[bit_index / 64] & (1u64 << (bit_index % 64))) == 0 {
                return false;
            }
        }
        true
    }

    /// Check whether ALL items might be contained.
    /// Returns false as soon as any item is definitely absent.
    #[inline]
    pub fn might_contain_all(&self, items: &[u32]) -> bool {
        items.iter().all(|&item| self.might_contain(item))
    }

    /// Estimated false-positive rate given the current insert count:
    /// `(1 - e^(-k*n/m))^k`. Monotonically increasing in `n`, so the
    /// estimate can be re-read after every build step.
    pub fn estimated_false_positive_rate(&self) -> f64 {
        if self.inserted == 0 {
            return 0.0;
        }
        let k = self.num_hashes as f64;
        let n = self.inserted as f64;
        let m = self.num_bits as f64;
        (1.0 - (-k * n / m).exp()).powf(k)
    }

    /// Two independent hash values for double hashing.
    ///
    /// Reusing a hasher after finish() corrupts the distribution, so each
    /// probe builds two fresh hashers from fixed, distinct seeds.
    #[inline]
    fn hash_pair(&self, item: u32) -> (u64, u64) {
        let mut hasher1 = RandomState::with_seeds(0, 0, 0, 0).build_hasher();
        hasher1.write_u32(item);
        let h1 = hasher1.finish();

        let mut hasher2 = RandomState::with_seeds(
            0x517cc1b727220a95,
            0x9e3779b97f4a7c15,
            0xbf58476d1ce4e5b9,
            0x94d049bb133111eb,
        )
        .build_hasher();
        hasher2.write_u32(item);
        let h2 = hasher2.finish();

        (h1, h2)
    }

    /// Number of items inserted so far
    pub fn inserted(&self) -> usize {
        self.inserted
    }

    /// Number of bits in the filter
    pub fn num_bits(&self) -> usize {
        self.num_bits
    }

    /// Approximate memory usage in bytes
    pub fn memory_usage(&self) -> usize {
        self.bits.len() * 8 + std::mem::size_of::<Self>()
    }
}
