use alloc::vec::Vec;
use core::{fmt, ops::Deref};

use super::{hash_chain::HashChain3, MatchOptions, RingBuffer, HASH_CHUNK_SIZE};
use crate::Result;

/// A back-reference: `length` bytes that repeat the bytes `distance`
/// positions earlier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Match {
    pub distance: usize,
    pub length: usize,
}

/// A [`RingBuffer`] that can search its seekback history for the unread
/// bytes.
///
/// The unread bytes are the *lookahead*. A match of distance `d` compares the
/// lookahead with the history starting `d` bytes before the read position,
/// so that an encoder which consumes the matched bytes (`discard`) emits a
/// back-reference its decoder replays with
/// [`RingBuffer::copy_from_seekback`] at the same distance.
///
/// All read-only queries are available through `Deref<Target = RingBuffer>`.
/// Mutations go through this type so that the candidate index stays in sync.
pub struct MatchableRingBuffer {
    ring: RingBuffer,
    index: HashChain3,
}

impl MatchableRingBuffer {
    /// Creates an empty buffer with default [`MatchOptions`].
    pub fn create_empty(capacity: usize) -> Result<Self> {
        Self::with_options(capacity, MatchOptions::default())
    }

    pub fn with_options(capacity: usize, options: MatchOptions) -> Result<Self> {
        Self::from_ring(RingBuffer::create_empty(capacity)?, options)
    }

    /// Adopts `buf` as the initial, unread content.
    pub fn create_initialized(buf: Vec<u8>) -> Result<Self> {
        Self::create_initialized_with_options(buf, MatchOptions::default())
    }

    pub fn create_initialized_with_options(buf: Vec<u8>, options: MatchOptions) -> Result<Self> {
        Self::from_ring(RingBuffer::create_initialized(buf)?, options)
    }

    fn from_ring(ring: RingBuffer, options: MatchOptions) -> Result<Self> {
        let mut index = HashChain3::new(ring.capacity(), &options)?;
        index.update(&ring);
        log::debug!(
            "created matchable ring buffer with capacity {}, {options:?}",
            ring.capacity()
        );

        Ok(Self { ring, index })
    }

    pub fn into_inner(self) -> RingBuffer {
        self.ring
    }

    /// See [`RingBuffer::write`].
    pub fn write(&mut self, data: &[u8]) -> usize {
        let written = self.ring.write(data);
        self.index.update(&self.ring);
        written
    }

    /// See [`RingBuffer::read`].
    pub fn read<'a>(&mut self, out: &'a mut [u8]) -> &'a mut [u8] {
        let out = self.ring.read(out);
        self.index.update(&self.ring);
        out
    }

    /// See [`RingBuffer::discard`]. Discarding is how an encoder consumes
    /// the bytes it just encoded as a match.
    pub fn discard(&mut self, count: usize) -> Result<()> {
        self.ring.discard(count)?;
        self.index.update(&self.ring);
        Ok(())
    }

    /// See [`RingBuffer::clear`].
    pub fn clear(&mut self) {
        self.ring.clear();
        self.index.update(&self.ring);
    }

    /// See [`RingBuffer::copy_from_seekback`].
    pub fn copy_from_seekback(&mut self, distance: usize, length: usize) -> Result<usize> {
        let copied = self.ring.copy_from_seekback(distance, length)?;
        self.index.update(&self.ring);
        Ok(copied)
    }

    /// See [`RingBuffer::fill_from_reader`].
    #[cfg(feature = "std")]
    pub fn fill_from_reader<R: std::io::Read>(&mut self, reader: &mut R) -> std::io::Result<usize> {
        let result = self.ring.fill_from_reader(reader);
        self.index.update(&self.ring);
        result
    }

    /// See [`RingBuffer::drain_to_writer`].
    #[cfg(feature = "std")]
    pub fn drain_to_writer<W: std::io::Write>(&mut self, writer: &mut W) -> std::io::Result<usize> {
        let result = self.ring.drain_to_writer(writer);
        self.index.update(&self.ring);
        result
    }

    /// Finds the longest match of the lookahead in the seekback history.
    ///
    /// `length` is clamped to `[min_length, max_length]` and to the number of
    /// unread bytes; a `min_length` of 0 counts as 1. Returns `None` if no
    /// match reaches `min_length`.
    ///
    /// Two strategies are used. When the lookahead holds at least
    /// [`HASH_CHUNK_SIZE`] bytes, the candidate index is walked newest-first,
    /// up to [`MatchOptions::depth_limit`] candidates. The whole history is
    /// scanned directly, again nearest-first, when the walk found no match of
    /// at least [`HASH_CHUNK_SIZE`] bytes and `min_length` allows shorter
    /// ones, or when the depth limit cut the walk short of `max_length`. The
    /// result is always the longest match in the history.
    ///
    /// Among matches of equal length the smallest distance wins.
    pub fn find_copy_in_seekback(&self, max_length: usize, min_length: usize) -> Option<Match> {
        let (max_length, min_length) = self.clamp_lengths(max_length, min_length)?;

        if max_length >= HASH_CHUNK_SIZE {
            let mut best = None;
            let mut candidates = self.index.candidates(&self.ring);
            for distance in candidates.by_ref() {
                let length = self.ring.match_len(distance, max_length);
                // Shorter matches are hash collisions, left to the scan.
                if length < HASH_CHUNK_SIZE.max(min_length) {
                    continue;
                }
                if keep_longer(&mut best, Match { distance, length }, max_length) {
                    break;
                }
            }

            if candidates.truncated() {
                // Older candidates may hold a longer match.
                log::trace!("candidate walk hit the depth limit at {best:?}");
            } else if best.is_some() {
                log::trace!("indexed match in seekback: {best:?}");
                return best;
            } else if min_length > HASH_CHUNK_SIZE {
                return None;
            }
        } else if min_length > HASH_CHUNK_SIZE {
            return None;
        }

        let used = self.ring.used_space();
        let first = self.ring.byte_behind(used);
        let mut best = None;
        for distance in 1..=self.ring.search_limit() {
            if self.ring.byte_behind(used + distance) != first {
                continue;
            }
            let length = self.ring.match_len(distance, max_length);
            if length < min_length {
                continue;
            }
            if keep_longer(&mut best, Match { distance, length }, max_length) {
                break;
            }
        }

        log::trace!("scanned match in seekback: {best:?}");
        best
    }

    /// Like [`find_copy_in_seekback`](Self::find_copy_in_seekback), but only
    /// checks the given distances.
    ///
    /// Distances of 0 or beyond [`RingBuffer::search_limit`] are skipped.
    /// Among matches of equal length the first one in `distances` wins.
    pub fn find_copy_in_seekback_hinted(
        &self,
        distances: &[usize],
        max_length: usize,
        min_length: usize,
    ) -> Option<Match> {
        let (max_length, min_length) = self.clamp_lengths(max_length, min_length)?;
        let search_limit = self.ring.search_limit();

        let mut best = None;
        for &distance in distances {
            if distance == 0 || distance > search_limit {
                continue;
            }
            let length = self.ring.match_len(distance, max_length);
            if length < min_length {
                continue;
            }
            if keep_longer(&mut best, Match { distance, length }, max_length) {
                break;
            }
        }

        best
    }

    /// Effective `(max_length, min_length)`, or `None` if no match can
    /// qualify.
    fn clamp_lengths(&self, max_length: usize, min_length: usize) -> Option<(usize, usize)> {
        let min_length = min_length.max(1);
        let max_length = max_length.min(self.ring.used_space());

        if max_length < min_length || self.ring.search_limit() == 0 {
            return None;
        }
        Some((max_length, min_length))
    }
}

/// Replaces `best` if `candidate` is strictly longer. Returns true once the
/// best match reaches `max_length` and the search can stop.
#[inline(always)]
fn keep_longer(best: &mut Option<Match>, candidate: Match, max_length: usize) -> bool {
    if best.is_none_or(|best| candidate.length > best.length) {
        *best = Some(candidate);
    }
    candidate.length >= max_length
}

impl Deref for MatchableRingBuffer {
    type Target = RingBuffer;

    fn deref(&self) -> &Self::Target {
        &self.ring
    }
}

impl fmt::Debug for MatchableRingBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatchableRingBuffer")
            .field("ring", &self.ring)
            .field("depth_limit", &self.index.depth_limit())
            .field("hash_table_len", &self.index.hash_table_len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use alloc::format;

    use super::*;

    /// History "ABABCABCDAB" followed by the lookahead "ABCD".
    fn abcd_window() -> MatchableRingBuffer {
        let haystack = b"ABABCABCDAB";
        let needle = b"ABCD";

        let mut buffer = MatchableRingBuffer::create_empty(haystack.len() + needle.len()).unwrap();
        assert_eq!(buffer.write(haystack), haystack.len());
        buffer.discard(haystack.len()).unwrap();
        assert_eq!(buffer.write(needle), needle.len());
        buffer
    }

    #[test]
    fn keep_longer_prefers_the_first_of_equal_length() {
        let mut best = None;
        assert!(!keep_longer(&mut best, Match { distance: 6, length: 2 }, 3));
        assert!(!keep_longer(&mut best, Match { distance: 9, length: 2 }, 3));
        assert_eq!(best, Some(Match { distance: 6, length: 2 }));

        assert!(keep_longer(&mut best, Match { distance: 9, length: 3 }, 3));
        assert_eq!(best, Some(Match { distance: 9, length: 3 }));
    }

    #[test]
    fn lengths_are_clamped_to_the_lookahead() {
        let buffer = abcd_window();
        assert_eq!(buffer.clamp_lengths(100, 0), Some((4, 1)));
        assert_eq!(buffer.clamp_lengths(12, 13), None);
    }

    #[test]
    fn nothing_to_search_without_history() {
        let mut buffer = MatchableRingBuffer::create_empty(8).unwrap();
        buffer.write(b"aaaa");
        assert_eq!(buffer.search_limit(), 0);
        assert_eq!(buffer.find_copy_in_seekback(4, 1), None);
    }

    #[test]
    fn initialized_content_becomes_history_once_read() {
        let mut buffer = MatchableRingBuffer::create_initialized(b"abcdabcd".to_vec()).unwrap();
        assert_eq!(buffer.find_copy_in_seekback(8, 1), None);

        buffer.discard(4).unwrap();
        assert_eq!(
            buffer.find_copy_in_seekback(8, 1),
            Some(Match { distance: 4, length: 4 })
        );
    }

    #[test]
    fn copies_are_indexed_like_writes() {
        let mut buffer = MatchableRingBuffer::create_empty(32).unwrap();
        buffer.write(b"xyz");
        buffer.discard(3).unwrap();
        assert_eq!(buffer.copy_from_seekback(3, 6).unwrap(), 6);
        buffer.discard(6).unwrap();
        buffer.write(b"xyzxyzxyz!");

        assert_eq!(
            buffer.find_copy_in_seekback(10, 3),
            Some(Match { distance: 3, length: 9 })
        );
    }

    #[test]
    fn debug_output_is_compact() {
        let buffer = MatchableRingBuffer::create_empty(1 << 16).unwrap();
        let debug = format!("{buffer:?}");
        assert!(debug.contains("capacity: 65536"));
        assert!(debug.contains("hash_table_len: 65536"));
    }
}
