use alloc::vec::Vec;

use super::{try_zeroed_vec, HASH_CHUNK_SIZE};
use crate::Result;

/// Hash table from 3-byte chunks to the newest stream position the chunk was
/// seen at.
pub(crate) struct Hash3 {
    /// Stream position plus one; zero marks an empty bucket.
    table: Vec<u64>,
    shift: u32,
}

impl Hash3 {
    pub(crate) fn new(hash_bits: u32) -> Result<Self> {
        debug_assert!((1..=31).contains(&hash_bits));

        Ok(Self {
            table: try_zeroed_vec(1 << hash_bits)?,
            shift: u32::BITS - hash_bits,
        })
    }

    #[inline(always)]
    pub(crate) fn calc_hash(&self, chunk: [u8; HASH_CHUNK_SIZE]) -> usize {
        // Multiplicative hashing with the golden ratio constant; the high
        // bits are the best mixed.
        let value = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], 0]);
        (value.wrapping_mul(0x9E3779B9) >> self.shift) as usize
    }

    #[inline(always)]
    pub(crate) fn get(&self, hash: usize) -> Option<u64> {
        self.table[hash].checked_sub(1)
    }

    #[inline(always)]
    pub(crate) fn set(&mut self, hash: usize, pos: u64) {
        self.table[hash] = pos + 1;
    }

    pub(crate) fn len(&self) -> usize {
        self.table.len()
    }
}
