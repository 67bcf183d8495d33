//! Loader configuration.

/// Notes a key needs before overlap removal runs on it by default.
pub const DEFAULT_OVERLAP_MIN_NOTES: usize = 10;

/// Knobs for a single load.
///
/// Passed explicitly to [`MidiFile::open`](crate::MidiFile::open); nothing is
/// read from process-wide state.
///
/// ```rust
/// use keyroll::LoaderConfig;
///
/// let config = LoaderConfig::new()
///     .decode_threads(4)
///     .key_threads(8)
///     .overlap_min_notes(0);
/// assert_eq!(config.decode_threads, Some(4));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Worker threads for track decoding. `None` uses the available
    /// parallelism of the host.
    pub decode_threads: Option<usize>,
    /// Worker threads for the per-key sort and overlap passes. `None` uses
    /// the available parallelism of the host.
    pub key_threads: Option<usize>,
    /// Keys holding fewer notes than this are left out of overlap removal.
    /// `0` runs it on every key.
    pub overlap_min_notes: usize,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            decode_threads: None,
            key_threads: None,
            overlap_min_notes: DEFAULT_OVERLAP_MIN_NOTES,
        }
    }
}

impl LoaderConfig {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit track decoding to `threads` workers (`0` means no limit).
    #[inline]
    pub fn decode_threads(mut self, threads: usize) -> Self {
        self.decode_threads = (threads > 0).then_some(threads);
        self
    }

    /// Limit per-key processing to `threads` workers (`0` means no limit).
    #[inline]
    pub fn key_threads(mut self, threads: usize) -> Self {
        self.key_threads = (threads > 0).then_some(threads);
        self
    }

    #[inline]
    pub fn overlap_min_notes(mut self, min_notes: usize) -> Self {
        self.overlap_min_notes = min_notes;
        self
    }
}
