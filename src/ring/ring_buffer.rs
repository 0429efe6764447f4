use alloc::vec::Vec;
use core::fmt;

use super::try_zeroed_vec;
use crate::{Error, Result};

/// Fixed-capacity byte ring with a seekback history.
///
/// The storage is split into three logical regions that wrap around the end
/// of the physical array:
///
/// ```text
///   | seekback (already read) | unread (used) | empty |
///                             ^ read_pos      ^ write_pos
/// ```
///
/// Reads and discards move bytes from the unread region into the seekback
/// region. Writes fill the empty region, which overwrites the oldest seekback
/// bytes once the buffer has wrapped. `seekback_limit` counts the intact bytes
/// behind the write position (unread ones included).
#[derive(Clone)]
pub struct RingBuffer {
    buf: Vec<u8>,
    read_pos: usize,
    used: usize,
    seekback_limit: usize,
    /// Total number of bytes ever committed to the buffer.
    stream_pos: u64,
}

impl RingBuffer {
    /// Creates an empty buffer with a fixed `capacity`.
    pub fn create_empty(capacity: usize) -> Result<Self> {
        let buf = try_zeroed_vec(capacity)?;
        log::debug!("created ring buffer with capacity {capacity}");

        Ok(Self {
            buf,
            read_pos: 0,
            used: 0,
            seekback_limit: 0,
            stream_pos: 0,
        })
    }

    /// Adopts `buf` as the initial content. The buffer starts out full and its
    /// capacity is the length of `buf`.
    pub fn create_initialized(buf: Vec<u8>) -> Result<Self> {
        let capacity = buf.len();
        log::debug!("created initialized ring buffer with capacity {capacity}");

        Ok(Self {
            buf,
            read_pos: 0,
            used: capacity,
            seekback_limit: capacity,
            stream_pos: capacity as u64,
        })
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Number of unread bytes.
    #[inline]
    pub fn used_space(&self) -> usize {
        self.used
    }

    #[inline]
    pub fn empty_space(&self) -> usize {
        self.capacity() - self.used
    }

    /// Number of intact bytes behind the write position, unread bytes
    /// included. This is the largest distance `copy_from_seekback` accepts.
    #[inline]
    pub fn seekback_limit(&self) -> usize {
        self.seekback_limit
    }

    /// Number of intact bytes behind the read position. This is the largest
    /// distance a match of the unread bytes can start at.
    #[inline]
    pub fn search_limit(&self) -> usize {
        self.seekback_limit - self.used
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.used == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.used == self.capacity()
    }

    /// Copies as much of `data` as fits and returns the number of bytes
    /// written. A full buffer writes nothing.
    pub fn write(&mut self, data: &[u8]) -> usize {
        let len = data.len().min(self.empty_space());
        let start = self.write_pos();
        let first = (self.capacity() - start).min(len);

        self.buf[start..start + first].copy_from_slice(&data[..first]);
        self.buf[..len - first].copy_from_slice(&data[first..len]);
        self.commit(len);

        len
    }

    /// Moves up to `out.len()` unread bytes into `out` and returns the filled
    /// prefix.
    pub fn read<'a>(&mut self, out: &'a mut [u8]) -> &'a mut [u8] {
        let len = out.len().min(self.used);
        let out = &mut out[..len];

        self.copy_out(self.read_pos, out);
        self.consume(len);

        out
    }

    /// Drops the oldest `count` unread bytes without copying them. They stay
    /// available as seekback history.
    pub fn discard(&mut self, count: usize) -> Result<()> {
        if count > self.used {
            return Err(Error::InsufficientData {
                requested: count,
                available: self.used,
            });
        }

        self.consume(count);
        Ok(())
    }

    /// Drops every unread and seekback byte.
    pub fn clear(&mut self) {
        // Keep the write position where it is, positions in the stream map
        // onto the same physical slots.
        self.read_pos = self.write_pos();
        self.used = 0;
        self.seekback_limit = 0;
    }

    /// The unread bytes as up to two slices in logical order.
    pub fn slices(&self) -> (&[u8], &[u8]) {
        self.spans(self.read_pos, self.used)
    }

    /// Offset of the first occurrence of `needle` in the unread bytes.
    pub fn offset_of(&self, needle: &[u8]) -> Option<usize> {
        self.offset_of_range(needle, None, None)
    }

    /// Offset of the first occurrence of `needle` lying fully inside the
    /// logical window `[after, until)` of the unread bytes.
    ///
    /// `after` defaults to 0 and `until` to the capacity; the window is always
    /// clipped to the unread bytes. Offset 0 is the oldest unread byte.
    pub fn offset_of_range(
        &self,
        needle: &[u8],
        after: Option<usize>,
        until: Option<usize>,
    ) -> Option<usize> {
        let after = after.unwrap_or(0);
        let until = until.unwrap_or(self.capacity()).min(self.used);

        if after > until || needle.len() > until - after {
            return None;
        }

        let Some((&first, _)) = needle.split_first() else {
            return Some(after);
        };

        (after..=until - needle.len()).find(|&offset| {
            let start = self.wrap(self.read_pos + offset);
            if self.buf[start] != first {
                return false;
            }
            let (head, tail) = self.spans(start, needle.len());
            head == &needle[..head.len()] && tail == &needle[head.len()..]
        })
    }

    /// Copies history starting `distance` bytes behind the write position into
    /// `out` without moving any cursor. At most `distance` bytes are returned.
    pub fn read_with_seekback<'a>(
        &self,
        out: &'a mut [u8],
        distance: usize,
    ) -> Result<&'a mut [u8]> {
        self.check_distance(distance)?;

        let len = out.len().min(distance);
        let out = &mut out[..len];
        self.copy_out(self.pos_behind(distance), out);

        Ok(out)
    }

    /// Appends `length` bytes copied from `distance` bytes behind the write
    /// position and returns how many were copied.
    ///
    /// The copy is bounded by `empty_space()` like [`RingBuffer::write`].
    /// `distance` may be smaller than `length`: bytes produced earlier in the
    /// same call are the source of later ones, which repeats the last
    /// `distance` bytes.
    pub fn copy_from_seekback(&mut self, distance: usize, length: usize) -> Result<usize> {
        self.check_distance(distance)?;

        let capacity = self.capacity();
        let total = length.min(self.empty_space());
        let mut copied = 0;

        // The source always trails the destination by a multiple of
        // `distance`. Once the produced run is long enough, the stride doubles
        // so that long repetitions are copied in large chunks.
        let mut stride = distance;
        while copied < total {
            let dst = self.write_pos();
            let src = self.pos_behind(stride);
            let chunk = (total - copied)
                .min(stride)
                .min(capacity - dst)
                .min(capacity - src);

            self.buf.copy_within(src..src + chunk, dst);
            self.commit(chunk);
            copied += chunk;

            while stride * 2 <= distance + copied && stride * 2 <= capacity {
                stride *= 2;
            }
        }

        log::trace!("seekback copy: distance {distance}, copied {copied} of {length}");
        Ok(copied)
    }

    /// Performs a single `read` from `reader` into the empty space and commits
    /// what was read.
    #[cfg(feature = "std")]
    pub fn fill_from_reader<R: std::io::Read>(&mut self, reader: &mut R) -> std::io::Result<usize> {
        let start = self.write_pos();
        let len = (self.capacity() - start).min(self.empty_space());
        if len == 0 {
            return Ok(0);
        }

        // The reader may scribble over the whole span, which holds the oldest
        // seekback bytes.
        let read = match reader.read(&mut self.buf[start..start + len]) {
            Ok(read) => read.min(len),
            Err(err) => {
                self.seekback_limit = self.seekback_limit.min(self.capacity() - len);
                return Err(err);
            }
        };

        self.commit(read);
        self.seekback_limit = self.seekback_limit.min(self.capacity() - (len - read));
        Ok(read)
    }

    /// Performs a single `write` of unread bytes into `writer` and consumes
    /// what was accepted.
    #[cfg(feature = "std")]
    pub fn drain_to_writer<W: std::io::Write>(&mut self, writer: &mut W) -> std::io::Result<usize> {
        let (first, _) = self.slices();
        if first.is_empty() {
            return Ok(0);
        }

        let written = writer.write(first)?.min(first.len());
        self.consume(written);
        Ok(written)
    }

    pub(crate) fn stream_pos(&self) -> u64 {
        self.stream_pos
    }

    /// Byte `distance` positions behind the write position.
    #[inline(always)]
    pub(crate) fn byte_behind(&self, distance: usize) -> u8 {
        self.buf[self.pos_behind(distance)]
    }

    /// Length of the common prefix, at most `limit`, of the unread bytes and
    /// the history starting `distance` bytes behind the read position.
    ///
    /// The history run may extend into the unread bytes when `distance <
    /// limit`.
    pub(crate) fn match_len(&self, distance: usize, limit: usize) -> usize {
        debug_assert!(distance >= 1 && distance <= self.search_limit());
        debug_assert!(limit <= self.used);

        let history = self.spans(self.pos_behind(self.used + distance), limit);
        let lookahead = self.spans(self.read_pos, limit);
        spans_prefix_len(history, lookahead)
    }

    fn check_distance(&self, distance: usize) -> Result<()> {
        if distance == 0 || distance > self.seekback_limit {
            return Err(Error::OutOfRange {
                distance,
                limit: self.seekback_limit,
            });
        }
        Ok(())
    }

    fn commit(&mut self, len: usize) {
        self.used += len;
        self.seekback_limit = (self.seekback_limit + len).min(self.capacity());
        self.stream_pos += len as u64;
    }

    fn consume(&mut self, len: usize) {
        self.read_pos = self.wrap(self.read_pos + len);
        self.used -= len;
    }

    /// Folds a position below `2 * capacity` back into the storage.
    #[inline(always)]
    fn wrap(&self, pos: usize) -> usize {
        if pos >= self.capacity() {
            pos - self.capacity()
        } else {
            pos
        }
    }

    #[inline(always)]
    fn write_pos(&self) -> usize {
        self.wrap(self.read_pos + self.used)
    }

    /// Physical index `distance` bytes behind the write position.
    #[inline(always)]
    fn pos_behind(&self, distance: usize) -> usize {
        debug_assert!(distance <= self.capacity());
        self.wrap(self.write_pos() + self.capacity() - distance)
    }

    /// `len` bytes starting at physical index `start`, split at the end of the
    /// storage.
    fn spans(&self, start: usize, len: usize) -> (&[u8], &[u8]) {
        let first = (self.capacity() - start).min(len);
        (&self.buf[start..start + first], &self.buf[..len - first])
    }

    fn copy_out(&self, start: usize, out: &mut [u8]) {
        let (head, tail) = self.spans(start, out.len());
        out[..head.len()].copy_from_slice(head);
        out[head.len()..].copy_from_slice(tail);
    }
}

impl fmt::Debug for RingBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RingBuffer")
            .field("capacity", &self.capacity())
            .field("read_pos", &self.read_pos)
            .field("used", &self.used)
            .field("seekback_limit", &self.seekback_limit)
            .finish()
    }
}

/// Common prefix length of two byte sequences given as two spans each.
fn spans_prefix_len(a: (&[u8], &[u8]), b: (&[u8], &[u8])) -> usize {
    let (mut a, mut a_rest) = a;
    let (mut b, mut b_rest) = b;
    let mut len = 0;

    loop {
        let n = a.len().min(b.len());
        if n == 0 {
            return len;
        }

        let common = common_prefix_len(&a[..n], &b[..n]);
        len += common;
        if common < n {
            return len;
        }

        a = &a[n..];
        b = &b[n..];
        if a.is_empty() {
            a = core::mem::take(&mut a_rest);
        }
        if b.is_empty() {
            b = core::mem::take(&mut b_rest);
        }
    }
}

/// Length of the common prefix of two slices.
///
/// This function is optimized using word-at-a-time comparisons.
#[cfg(feature = "optimization")]
#[inline(always)]
fn common_prefix_len(a: &[u8], b: &[u8]) -> usize {
    const WORD_SIZE: usize = size_of::<u64>();

    let len = a.len().min(b.len());
    let mut pos = 0;

    while pos + WORD_SIZE <= len {
        let diff_bits = load_word(&a[pos..]) ^ load_word(&b[pos..]);
        if diff_bits != 0 {
            // Little endian loads put the first byte in the lowest bits.
            return pos + (diff_bits.trailing_zeros() / 8) as usize;
        }
        pos += WORD_SIZE;
    }

    pos + a[pos..len]
        .iter()
        .zip(&b[pos..len])
        .take_while(|&(byte1, byte2)| byte1 == byte2)
        .count()
}

#[cfg(feature = "optimization")]
#[inline(always)]
fn load_word(bytes: &[u8]) -> u64 {
    let mut word = [0; size_of::<u64>()];
    word.copy_from_slice(&bytes[..size_of::<u64>()]);
    u64::from_le_bytes(word)
}

/// Length of the common prefix of two slices.
///
/// Unoptimized byte for byte version.
#[cfg(not(feature = "optimization"))]
#[inline(always)]
fn common_prefix_len(a: &[u8], b: &[u8]) -> usize {
    a.iter()
        .zip(b.iter())
        .take_while(|&(byte1, byte2)| byte1 == byte2)
        .count()
}
