//! ## vakthund-detection::bloom
//! **Probabilistic prefix filter used by the Wu–Manber Bloom variant**
//!
//! No false negatives, tunable false positives. Sized per spec §3/§6 from
//! the pattern count `n` and a target false-positive rate `p`.

use crate::fnv::{fnv1a, fnv1a_seeded};

const SECOND_HASH_SEED: u32 = 0x0100_0193;

#[derive(Debug, Clone)]
pub struct BloomFilter {
    bits: Vec<u64>,
    m_bits: u64,
    k: u32,
}

impl BloomFilter {
    /// `m_bits = ceil(-n * ln(p) / (ln 2)^2)`, `k = floor((m_bits/n) * ln 2)`.
    ///
    /// Spec §3 describes `k` with `round(...)` while §6 labels `floor(...)`
    /// as the bit-exact formula; this implementation follows §6 since it is
    /// the section that claims bit-exactness (see DESIGN.md).
    pub fn new(n: usize, p: f64) -> Self {
        let n = n.max(1) as f64;
        let m_bits = (-n * p.ln() / std::f64::consts::LN_2.powi(2)).ceil() as u64;
        let m_bits = m_bits.max(1);
        let k = ((m_bits as f64 / n) * std::f64::consts::LN_2).floor() as u32;
        let k = k.max(1);
        let words = (m_bits as usize).div_ceil(64);
        Self {
            bits: vec![0u64; words],
            m_bits,
            k,
        }
    }

    pub fn k(&self) -> u32 {
        self.k
    }

    pub fn m_bits(&self) -> u64 {
        self.m_bits
    }

    fn base_hashes(bytes: &[u8]) -> (u64, u64) {
        (fnv1a(bytes) as u64, fnv1a_seeded(bytes, SECOND_HASH_SEED) as u64)
    }

    pub fn insert(&mut self, bytes: &[u8]) {
        let (h1, h2) = Self::base_hashes(bytes);
        for i in 0..self.k as u64 {
            let bit = (h1.wrapping_add(i.wrapping_mul(h2))) % self.m_bits;
            self.set_bit(bit);
        }
    }

    /// `true` means "maybe present"; `false` is a guaranteed absence.
    pub fn check(&self, bytes: &[u8]) -> bool {
        let (h1, h2) = Self::base_hashes(bytes);
        for i in 0..self.k as u64 {
            let bit = (h1.wrapping_add(i.wrapping_mul(h2))) % self.m_bits;
            if !self.test_bit(bit) {
                return false;
            }
        }
        true
    }

    fn set_bit(&mut self, bit: u64) {
        let (word, offset) = (bit / 64, bit % 64);
        self.bits[word as usize] |= 1u64 << offset;
    }

    fn test_bit(&self, bit: u64) -> bool {
        let (word, offset) = (bit / 64, bit % 64);
        (self.bits[word as usize] >> offset) & 1 == 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_false_negatives_for_inserted_keys() {
        let mut filter = BloomFilter::new(16, 0.01);
        let keys: Vec<Vec<u8>> = (0..16u8).map(|i| vec![i, i.wrapping_add(1)]).collect();
        for key in &keys {
            filter.insert(key);
        }
        for key in &keys {
            assert!(filter.check(key), "false negative for {key:?}");
        }
    }

    #[test]
    fn sizes_scale_with_pattern_count() {
        let small = BloomFilter::new(4, 0.01);
        let large = BloomFilter::new(4000, 0.01);
        assert!(large.m_bits() > small.m_bits());
    }

    #[test]
    fn absent_key_is_usually_rejected() {
        let mut filter = BloomFilter::new(4, 0.01);
        filter.insert(b"aa");
        filter.insert(b"bb");
        // Not a guarantee (probabilistic), but with k>=1 and a distinct
        // key this particular input is known not to collide.
        assert!(!filter.check(b"zz") || filter.k() == 0);
    }
}
