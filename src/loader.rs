//! The load pipeline and the resulting per-key note model.
//!
//! Loading runs in strictly separated phases:
//!
//! 1. **Capture**: the header is validated and every track is copied into its
//!    own buffer, sequentially, since the input is a single cursor.
//! 2. **Decode**: tracks are decoded in parallel. Each task owns its buffer
//!    and returns its notes and tempo changes; nothing is shared.
//! 3. **Merge**: tempo changes are reduced into a [`TempoMap`] and notes are
//!    moved into 128 per-key containers.
//! 4. **Sort** and **overlap removal**: each key is processed in parallel.
//!
//! # Example
//!
//! ```rust,no_run
//! use keyroll::{LoaderConfig, MidiFile};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let file = MidiFile::open(Path::new("song.mid"), &LoaderConfig::default())?;
//! println!("{} notes over {:?}", file.note_count(), file.duration());
//! for note in file.key(60) {
//!     println!("middle C from {} to {}", note.start, note.end);
//! }
//! # Ok(())
//! # }
//! ```

use std::{
    io::Read,
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use crate::{
    config::LoaderConfig,
    error::Result,
    header::{self, Format, Header},
    keys,
    note::Note,
    pool::WorkerPool,
    reader::MidiReader,
    tempo::{Tempo, TempoMap},
    track::{self, DecodedTrack},
};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Per-track figures recorded during decoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrackSummary {
    pub index: usize,
    /// Tick of the track's end-of-track event.
    pub ticks: u32,
    /// Notes the track contributed.
    pub notes: usize,
}

/// A fully loaded MIDI file, organised by key.
///
/// All data is owned; the model holds no references into the source.
#[derive(Clone, Debug)]
pub struct MidiFile {
    path: Option<PathBuf>,
    header: Header,
    length_ticks: u32,
    note_count: usize,
    keys: Vec<Vec<Note>>,
    tempos: TempoMap,
    tracks: Vec<TrackSummary>,
}

impl MidiFile {
    /// Load the file at `path`.
    pub fn open(path: &Path, config: &LoaderConfig) -> Result<Self> {
        let reader = MidiReader::open(path)?;
        let mut file = Self::load(reader, config)?;
        file.path = Some(path.to_path_buf());
        Ok(file)
    }

    /// Load a file from any byte source.
    pub fn from_reader<R: Read>(reader: R, config: &LoaderConfig) -> Result<Self> {
        Self::load(MidiReader::new(reader), config)
    }

    fn load<R: Read>(mut reader: MidiReader<R>, config: &LoaderConfig) -> Result<Self> {
        let started = Instant::now();

        let header = header::read_header(&mut reader)?;
        let raw_tracks = header::read_tracks(&mut reader, header.track_count)?;
        log::info!(
            "loading midi: format {}, {} tracks, ppq {}, {} bytes",
            header.format.as_raw(),
            header.track_count,
            header.division,
            reader.position()
        );
        drop(reader);

        let mut decoded = decode_tracks(raw_tracks, config)?;

        let tracks: Vec<TrackSummary> = decoded
            .iter()
            .map(|t| TrackSummary {
                index: t.index,
                ticks: t.ticks,
                notes: t.notes.len(),
            })
            .collect();
        let length_ticks = tracks.iter().map(|t| t.ticks).max().unwrap_or(0);
        let note_count: usize = tracks.iter().map(|t| t.notes).sum();

        let tempo_events: Vec<Tempo> = decoded
            .iter_mut()
            .flat_map(|t| t.tempos.drain(..))
            .collect();
        let tempos = TempoMap::build(tempo_events);

        log::debug!("merging {} notes into key containers", note_count);
        let mut by_key = keys::bucket_notes(&mut decoded);
        drop(decoded);

        let key_pool = WorkerPool::new(config.key_threads, "keys")?;
        key_pool.install(|| keys::sort_keys(&mut by_key));
        log::debug!("key containers sorted");
        let changed =
            key_pool.install(|| keys::remove_all_overlaps(&mut by_key, config.overlap_min_notes));
        log::debug!("overlap removal changed {} notes", changed);

        log::info!(
            "midi loaded in {:.2} s: {} notes, {} tempo changes, {} ticks",
            started.elapsed().as_secs_f64(),
            note_count,
            tempos.len(),
            length_ticks
        );

        Ok(Self {
            path: None,
            header,
            length_ticks,
            note_count,
            keys: by_key,
            tempos,
            tracks,
        })
    }

    /// Path the file was loaded from, if it came from disk.
    #[inline]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    #[inline]
    pub fn header(&self) -> &Header {
        &self.header
    }

    #[inline]
    pub fn format(&self) -> Format {
        self.header.format
    }

    #[inline]
    pub fn track_count(&self) -> u16 {
        self.header.track_count
    }

    /// Ticks per quarter note.
    #[inline]
    pub fn division(&self) -> u16 {
        self.header.division
    }

    /// Length of the longest track in ticks.
    #[inline]
    pub fn length_ticks(&self) -> u32 {
        self.length_ticks
    }

    #[inline]
    pub fn note_count(&self) -> usize {
        self.note_count
    }

    /// All 128 key containers, indexed by key number.
    #[inline]
    pub fn keys(&self) -> &[Vec<Note>] {
        &self.keys
    }

    /// Notes on one key, ordered by start tick. Keys above 127 are empty.
    #[inline]
    pub fn key(&self, key: u8) -> &[Note] {
        self.keys.get(key as usize).map(Vec::as_slice).unwrap_or(&[])
    }

    #[inline]
    pub fn tempos(&self) -> &TempoMap {
        &self.tempos
    }

    #[inline]
    pub fn tracks(&self) -> &[TrackSummary] {
        &self.tracks
    }

    /// Elapsed time at `tick`.
    #[inline]
    pub fn time_of(&self, tick: u32) -> Duration {
        self.tempos.time_of(tick, self.header.division)
    }

    /// Total playing time of the file.
    #[inline]
    pub fn duration(&self) -> Duration {
        self.time_of(self.length_ticks)
    }
}

/// Decode every track on the decode pool, preserving track order.
fn decode_tracks(raw_tracks: Vec<Vec<u8>>, config: &LoaderConfig) -> Result<Vec<DecodedTrack>> {
    let pool = WorkerPool::new(config.decode_threads, "decode")?;
    let decoded: Result<Vec<DecodedTrack>> = pool.install(|| {
        #[cfg(feature = "parallel")]
        {
            raw_tracks
                .into_par_iter()
                .enumerate()
                .map(|(idx, data)| track::decode_track(&data, idx))
                .collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            raw_tracks
                .into_iter()
                .enumerate()
                .map(|(idx, data)| track::decode_track(&data, idx))
                .collect()
        }
    });
    let decoded = decoded?;
    debug_assert!(decoded.iter().enumerate().all(|(i, t)| t.index == i));
    Ok(decoded)
}
