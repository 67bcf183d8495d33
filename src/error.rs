//! Errors produced while loading a MIDI file.

use std::path::PathBuf;

use thiserror::Error;

/// The result type used throughout this crate.
pub type Result<T> = core::result::Result<T, Error>;

/// Any failure that aborts a load.
///
/// Every variant is fatal to the current load attempt: no partially built
/// model is ever returned.
#[derive(Debug, Error)]
pub enum Error {
    /// The path does not resolve to an existing file.
    #[error("midi file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// The `MThd` chunk is missing or has an unexpected length.
    #[error("malformed midi header: {0}")]
    MalformedHeader(&'static str),

    /// Only type 0 and type 1 files are supported.
    #[error("unsupported smf format {0}")]
    UnsupportedFormat(u16),

    /// SMPTE timecode divisions and a zero PPQ are not supported.
    #[error("unsupported time division {0:#06x}")]
    UnsupportedDivision(u16),

    /// A declared track does not start with `MTrk`.
    #[error("track #{track} does not start with an MTrk chunk")]
    MalformedTrack { track: usize },

    /// The file ended before a chunk or field was complete.
    #[error("unexpected end of file ({needed} more bytes expected)")]
    TruncatedStream { needed: usize },

    /// A track's events ran past its declared length.
    #[error("track #{track} is truncated at byte offset {offset}")]
    TruncatedTrack { track: usize, offset: usize },

    /// Underlying I/O failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A worker pool could not be started.
    #[cfg(feature = "parallel")]
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
