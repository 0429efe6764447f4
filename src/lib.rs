//! Fixed-capacity byte ring buffers for LZ-style codecs.
//!
//! [`RingBuffer`] is a plain sliding window: bounded writes and reads, bulk
//! discard, substring search over the unread bytes and the decode-side
//! back-reference primitives ([`RingBuffer::copy_from_seekback`] and
//! [`RingBuffer::read_with_seekback`]). Bytes that were read or discarded stay
//! addressable as *seekback* history until later writes overwrite them.
//!
//! [`MatchableRingBuffer`] adds the encode side: it indexes the history by
//! 3-byte chunks and finds the longest earlier occurrence of the unread
//! *lookahead* bytes, reported as a [`Match`] (`distance`, `length`).
//!
//! ```
//! use lz_ring::{Match, MatchableRingBuffer};
//!
//! let mut window = MatchableRingBuffer::create_empty(15).unwrap();
//! window.write(b"ABABCABCDAB");
//! window.discard(11).unwrap();
//! window.write(b"ABCD");
//!
//! assert_eq!(
//!     window.find_copy_in_seekback(4, 1),
//!     Some(Match { distance: 6, length: 4 })
//! );
//! ```
//!
//! # Features
//!
//! - `std` (default): `std::io` helpers and conversion of [`Error`] into
//!   `std::io::Error`.
//! - `optimization` (default): word-at-a-time comparison when extending
//!   matches.
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod error;
mod ring;

pub use error::{Error, Result};
pub use ring::*;
