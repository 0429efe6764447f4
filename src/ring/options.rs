/// Configuration options for the candidate index of a
/// [`MatchableRingBuffer`](super::MatchableRingBuffer).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchOptions {
    /// Maximum number of candidates visited per hash lookup. A walk that
    /// stops here without a match of the requested maximum length falls back
    /// to a direct scan, so this trades speed on repetitive input, never
    /// match quality.
    pub depth_limit: u32,
    /// Log2 of the hash table size (None = derived from the capacity).
    /// Will get clamped to [`MatchOptions::MIN_HASH_BITS`,
    /// `MatchOptions::MAX_HASH_BITS`].
    pub hash_bits: Option<u32>,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self::with_preset(Self::PRESET_DEFAULT)
    }
}

impl MatchOptions {
    pub const PRESET_MIN: u32 = 0;
    pub const PRESET_DEFAULT: u32 = 6;
    pub const PRESET_MAX: u32 = 9;

    pub const MIN_HASH_BITS: u32 = 8;
    pub const MAX_HASH_BITS: u32 = 24;

    const DEPTH_LIMITS: [u32; 10] = [4, 8, 12, 16, 24, 28, 32, 64, 256, 4096];

    /// Create options with a specific preset (0..=9, clamped). Higher presets
    /// walk deeper candidate chains and find longer matches more often.
    pub fn with_preset(preset: u32) -> Self {
        let preset = preset.min(Self::PRESET_MAX);
        Self {
            depth_limit: Self::DEPTH_LIMITS[preset as usize],
            hash_bits: None,
        }
    }

    /// Hash table size in bits for a buffer of `capacity` bytes.
    pub(crate) fn hash_bits_for(&self, capacity: usize) -> u32 {
        self.hash_bits
            .unwrap_or_else(|| usize::BITS - capacity.saturating_sub(1).leading_zeros())
            .clamp(Self::MIN_HASH_BITS, Self::MAX_HASH_BITS)
    }
}
