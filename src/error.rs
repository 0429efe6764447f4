use thiserror::Error;

/// Result type alias for ring buffer operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors returned by the ring buffers.
///
/// Short writes, short reads and short copies are not errors; they are
/// reported through the returned byte counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// Storage for the buffer (or its candidate index) could not be reserved.
    #[error("allocation failed: could not reserve storage for {capacity} elements")]
    Allocation { capacity: usize },

    /// A discard asked for more bytes than are currently unread.
    #[error("insufficient data: requested {requested} bytes, {available} available")]
    InsufficientData { requested: usize, available: usize },

    /// A back-reference points at zero or beyond the resident history.
    #[error("seekback distance {distance} out of range: {limit} bytes of history")]
    OutOfRange { distance: usize, limit: usize },
}

#[cfg(feature = "std")]
impl From<Error> for std::io::Error {
    fn from(value: Error) -> Self {
        let kind = match value {
            Error::Allocation { .. } => std::io::ErrorKind::OutOfMemory,
            Error::InsufficientData { .. } | Error::OutOfRange { .. } => {
                std::io::ErrorKind::InvalidInput
            }
        };
        std::io::Error::new(kind, value)
    }
}
