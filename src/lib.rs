//! Load Standard MIDI Files into a per-key, time-ordered note model.
//!
//! `keyroll` reads type 0 and type 1 SMF files and produces, for each of the
//! 128 MIDI keys, the list of notes played on that key ordered by start
//! tick, together with the file's tempo map. The model is meant for piano
//! roll style renderers, which draw each key independently.
//!
//! - **Bounded decoding**: every read is checked against the declared chunk
//!   and track lengths; corrupt files fail with a typed [`Error`] instead of
//!   reading past their data.
//! - **Parallel**: tracks are decoded concurrently and keys are sorted and
//!   cleaned concurrently, using rayon pools sized by [`LoaderConfig`]
//!   (feature `parallel`, on by default).
//! - **Overlap removal**: overlapping notes on a key are trimmed so that a
//!   renderer never has to draw two notes in the same place; see
//!   [`remove_overlaps`].
//!
//! # Example
//!
//! ```rust,no_run
//! use keyroll::{LoaderConfig, MidiFile};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = LoaderConfig::new().decode_threads(4);
//! let file = MidiFile::open(Path::new("song.mid"), &config)?;
//!
//! println!(
//!     "{} tracks, {} notes, {:.1} s",
//!     file.track_count(),
//!     file.note_count(),
//!     file.duration().as_secs_f64()
//! );
//! # Ok(())
//! # }
//! ```

mod config;
mod cursor;
mod error;
mod header;
mod keys;
mod loader;
mod note;
mod pool;
mod reader;
mod tempo;
mod track;

pub mod memory;

#[cfg(test)]
mod testutil;

pub use crate::{
    config::{LoaderConfig, DEFAULT_OVERLAP_MIN_NOTES},
    cursor::{decode_vlq, MAX_VLQ_BYTES},
    error::{Error, Result},
    header::{Format, Header},
    keys::remove_overlaps,
    loader::{MidiFile, TrackSummary},
    note::{Note, KEY_COUNT},
    reader::MidiReader,
    tempo::{tick_to_time, Tempo, TempoMap, DEFAULT_TEMPO},
};
