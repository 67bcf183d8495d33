//! `MThd` validation and capture of raw `MTrk` chunks.

use std::io::Read;

use crate::{
    error::{Error, Result},
    reader::MidiReader,
};

/// Layout of the tracks in a file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Format {
    /// Type 0: a single track.
    SingleTrack,
    /// Type 1: simultaneous tracks sharing one timeline.
    Parallel,
}

impl Format {
    #[inline]
    pub fn from_raw(raw: u16) -> Result<Self> {
        match raw {
            0 => Ok(Format::SingleTrack),
            1 => Ok(Format::Parallel),
            other => Err(Error::UnsupportedFormat(other)),
        }
    }

    #[inline]
    pub fn as_raw(self) -> u16 {
        match self {
            Format::SingleTrack => 0,
            Format::Parallel => 1,
        }
    }
}

/// The fields of the `MThd` chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Header {
    pub format: Format,
    pub track_count: u16,
    /// Ticks per quarter note.
    pub division: u16,
}

/// Read and validate the `MThd` chunk.
pub(crate) fn read_header<R: Read>(reader: &mut MidiReader<R>) -> Result<Header> {
    if &reader.read_magic()? != b"MThd" {
        return Err(Error::MalformedHeader("missing MThd chunk"));
    }
    if reader.read_u32()? != 6 {
        return Err(Error::MalformedHeader("header length is not 6"));
    }
    let format = Format::from_raw(reader.read_u16()?)?;
    let track_count = reader.read_u16()?;
    let division = reader.read_u16()?;
    if division == 0 || division & 0x8000 != 0 {
        return Err(Error::UnsupportedDivision(division));
    }
    Ok(Header {
        format,
        track_count,
        division,
    })
}

/// Copy every declared track into its own buffer.
///
/// This must finish before any decoding starts: the reader is a single
/// sequential cursor.
pub(crate) fn read_tracks<R: Read>(
    reader: &mut MidiReader<R>,
    track_count: u16,
) -> Result<Vec<Vec<u8>>> {
    let mut tracks = Vec::with_capacity(track_count as usize);
    for track in 0..track_count as usize {
        if &reader.read_magic()? != b"MTrk" {
            return Err(Error::MalformedTrack { track });
        }
        let len = reader.read_u32()? as usize;
        let data = reader.read_block(len)?;
        log::debug!("captured track #{}: {} bytes", track, len);
        tracks.push(data);
    }
    Ok(tracks)
}
