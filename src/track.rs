//! Decoding of a single track's event stream into notes and tempo changes.

use crate::{
    cursor::TrackCursor,
    error::Result,
    note::{Note, KEY_COUNT},
    tempo::Tempo,
};

/// Everything one track contributes to the loaded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DecodedTrack {
    pub index: usize,
    /// Absolute tick of the end-of-track event.
    pub ticks: u32,
    pub notes: Vec<Note>,
    pub tempos: Vec<Tempo>,
}

/// Pairs note-ons with note-offs while a track is walked.
///
/// Open notes are kept per key as a stack of indices into `notes`, so a
/// note-off always closes the most recently started note on that key.
#[derive(Debug)]
struct NoteAccumulator {
    notes: Vec<Note>,
    tempos: Vec<Tempo>,
    open_notes: Vec<Vec<usize>>,
    current_tick: u32,
    track_idx: u16,
}

impl NoteAccumulator {
    fn new(track_idx: u16, capacity_hint: usize) -> Self {
        Self {
            notes: Vec::with_capacity(capacity_hint),
            tempos: Vec::new(),
            open_notes: vec![Vec::new(); KEY_COUNT],
            current_tick: 0,
            track_idx,
        }
    }

    #[inline]
    fn advance(&mut self, delta: u32) {
        self.current_tick = self.current_tick.saturating_add(delta);
    }

    #[inline]
    fn note_on(&mut self, key: u8) {
        let idx = self.notes.len();
        self.notes.push(Note::new(
            self.current_tick,
            self.current_tick,
            key,
            self.track_idx,
        ));
        self.open_notes[(key & 0x7F) as usize].push(idx);
    }

    #[inline]
    fn note_off(&mut self, key: u8) {
        if let Some(idx) = self.open_notes[(key & 0x7F) as usize].pop() {
            self.notes[idx].end = self.current_tick;
        }
    }

    fn tempo(&mut self, value: u32) {
        self.tempos.push(Tempo::new(self.current_tick, value));
    }

    /// Close every note still sounding at the current tick.
    fn close_all(&mut self) {
        for stack in &mut self.open_notes {
            for idx in stack.drain(..) {
                self.notes[idx].end = self.current_tick;
            }
        }
    }

    fn finish(self, index: usize) -> DecodedTrack {
        DecodedTrack {
            index,
            ticks: self.current_tick,
            notes: self.notes,
            tempos: self.tempos,
        }
    }
}

/// Decode one track's raw bytes.
///
/// The walk ends at the end-of-track meta event; any bytes after it are
/// ignored. A track whose events run past `data` fails with
/// [`Error::TruncatedTrack`](crate::Error::TruncatedTrack).
pub(crate) fn decode_track(data: &[u8], index: usize) -> Result<DecodedTrack> {
    let mut cursor = TrackCursor::new(data, index);
    // A note-on/note-off pair with one-byte deltas takes eight bytes.
    let mut acc = NoteAccumulator::new(index as u16, data.len() / 8);
    let mut running_status: Option<u8> = None;

    loop {
        acc.advance(cursor.read_vlq()?);

        let mut status = cursor.read_u8()?;
        if status < 0x80 {
            // Data byte: re-read it as an operand of the previous status,
            // whatever kind of event that was. With nothing to reuse it is
            // picked up again as the next delta.
            cursor.rewind();
            match running_status {
                Some(prev) => status = prev,
                None => continue,
            }
        } else {
            running_status = Some(status);
        }

        match status & 0xF0 {
            0x80 => {
                let key = cursor.read_u8()?;
                cursor.skip(1)?;
                acc.note_off(key);
            }
            0x90 => {
                let key = cursor.read_u8()?;
                let velocity = cursor.read_u8()?;
                if velocity != 0 {
                    acc.note_on(key);
                } else {
                    acc.note_off(key);
                }
            }
            0xA0 | 0xB0 | 0xE0 => cursor.skip(2)?,
            0xC0 | 0xD0 => cursor.skip(1)?,
            _ => match status {
                0xF0 => cursor.skip_through(0xF7)?,
                0xF2 | 0xF3 => cursor.skip((0xF4 - status) as usize)?,
                0xFF => match cursor.read_u8()? {
                    0x2F => {
                        // The length byte may be missing on the last event.
                        if cursor.skip(1).is_err() {
                            log::debug!("track #{} ends without an end-of-track length byte", index);
                        }
                        acc.close_all();
                        break;
                    }
                    0x51 => {
                        cursor.read_vlq()?;
                        let value = cursor.read_u24()?;
                        acc.tempo(value);
                    }
                    _ => cursor.skip_vlq_block()?,
                },
                // F1 and the remaining system bytes carry nothing we need
                _ => {}
            },
        }
    }

    let track = acc.finish(index);
    log::debug!(
        "track #{} decoded: {} notes, {} tempo changes, {} ticks ({} of {} bytes used)",
        index,
        track.notes.len(),
        track.tempos.len(),
        track.ticks,
        cursor.offset(),
        data.len()
    );
    Ok(track)
}
