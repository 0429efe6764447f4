mod hash3;
mod hash_chain;
mod matchable;
mod options;
mod ring_buffer;

use alloc::vec::Vec;

pub use matchable::*;
pub use options::*;
pub use ring_buffer::*;

use crate::{Error, Result};

/// Length of the byte sequences the candidate index is keyed by.
pub const HASH_CHUNK_SIZE: usize = 3;

/// Reserves exactly `len` elements without aborting on allocation failure.
fn try_zeroed_vec<T: Clone + Default>(len: usize) -> Result<Vec<T>> {
    let mut vec = Vec::new();
    vec.try_reserve_exact(len)
        .map_err(|_| Error::Allocation { capacity: len })?;
    vec.resize(len, T::default());
    Ok(vec)
}
