use alloc::vec::Vec;

use super::{hash3::Hash3, try_zeroed_vec, MatchOptions, RingBuffer, HASH_CHUNK_SIZE};
use crate::Result;

/// Hash chain over 3-byte chunks of the seekback history.
///
/// `Hash3` keeps the newest position of every chunk hash and `chain` links
/// each position to the previous one with the same hash, stored as a forward
/// delta in a cyclic array with one slot per buffer byte. A slot is only
/// reused once its position has left the seekback window, so walks check the
/// window bound before following a link.
pub(crate) struct HashChain3 {
    hash: Hash3,
    chain: Vec<u32>,
    depth_limit: u32,
    /// Next stream position to index.
    next_pos: u64,
}

impl HashChain3 {
    pub(crate) fn new(capacity: usize, options: &MatchOptions) -> Result<Self> {
        Ok(Self {
            hash: Hash3::new(options.hash_bits_for(capacity))?,
            chain: try_zeroed_vec(capacity)?,
            depth_limit: options.depth_limit.max(1),
            next_pos: 0,
        })
    }

    pub(crate) fn depth_limit(&self) -> u32 {
        self.depth_limit
    }

    pub(crate) fn hash_table_len(&self) -> usize {
        self.hash.len()
    }

    /// Indexes every chunk that starts in the seekback history and is fully
    /// resident. Must run after each mutation of `ring`.
    pub(crate) fn update(&mut self, ring: &RingBuffer) {
        let stream_pos = ring.stream_pos();
        let window_start = stream_pos - ring.seekback_limit() as u64;
        let read_pos = stream_pos - ring.used_space() as u64;
        let end = read_pos.min(stream_pos.saturating_sub(HASH_CHUNK_SIZE as u64 - 1));

        // Positions that were overwritten before being indexed are skipped.
        self.next_pos = self.next_pos.max(window_start);

        while self.next_pos < end {
            let distance = (stream_pos - self.next_pos) as usize;
            let chunk = [
                ring.byte_behind(distance),
                ring.byte_behind(distance - 1),
                ring.byte_behind(distance - 2),
            ];
            self.insert(chunk, self.next_pos);
            self.next_pos += 1;
        }
    }

    fn insert(&mut self, chunk: [u8; HASH_CHUNK_SIZE], pos: u64) {
        let hash = self.hash.calc_hash(chunk);
        let slot = self.slot(pos);

        // Zero terminates the chain; deltas too large to store are out of
        // any window anyway.
        self.chain[slot] = self
            .hash
            .get(hash)
            .and_then(|prev| u32::try_from(pos - prev).ok())
            .unwrap_or(0);
        self.hash.set(hash, pos);
    }

    #[inline(always)]
    fn slot(&self, pos: u64) -> usize {
        (pos % self.chain.len() as u64) as usize
    }

    /// Distances, measured back from the read position, of earlier positions
    /// whose chunk hashes like the first unread chunk. Newest (smallest
    /// distance) first; stale positions end the walk.
    ///
    /// Hash collisions are not filtered, callers verify the bytes.
    pub(crate) fn candidates<'a>(&'a self, ring: &RingBuffer) -> Candidates<'a> {
        debug_assert!(ring.used_space() >= HASH_CHUNK_SIZE);

        let used = ring.used_space();
        let chunk = [
            ring.byte_behind(used),
            ring.byte_behind(used - 1),
            ring.byte_behind(used - 2),
        ];
        let stream_pos = ring.stream_pos();

        Candidates {
            chain: self,
            next: self.hash.get(self.hash.calc_hash(chunk)),
            window_start: stream_pos - ring.seekback_limit() as u64,
            read_pos: stream_pos - used as u64,
            depth: self.depth_limit,
            truncated: false,
        }
    }
}

pub(crate) struct Candidates<'a> {
    chain: &'a HashChain3,
    next: Option<u64>,
    window_start: u64,
    read_pos: u64,
    depth: u32,
    truncated: bool,
}

impl Candidates<'_> {
    /// Whether the walk stopped at the depth limit with in-window
    /// candidates left unvisited.
    pub(crate) fn truncated(&self) -> bool {
        self.truncated
    }
}

impl Iterator for Candidates<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let pos = self.next.take()?;
        if pos < self.window_start || pos >= self.read_pos {
            return None;
        }
        if self.depth == 0 {
            self.truncated = true;
            return None;
        }
        self.depth -= 1;

        let delta = self.chain.chain[self.chain.slot(pos)];
        if delta != 0 {
            self.next = pos.checked_sub(u64::from(delta));
        }

        Some((self.read_pos - pos) as usize)
    }
}
