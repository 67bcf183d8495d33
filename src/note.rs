/// Number of distinct MIDI key numbers.
pub const KEY_COUNT: usize = 128;

/// A single note on one key.
///
/// Ticks are absolute from the start of the file. After loading, every note
/// satisfies `end >= start`; a note collapsed by overlap removal has
/// `end == start`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Note {
    /// Start time in MIDI ticks.
    pub start: u32,
    /// End time in MIDI ticks.
    pub end: u32,
    /// MIDI key number (0-127).
    pub key: u8,
    /// Index of the track the note was read from.
    pub track: u16,
}

impl Note {
    #[inline]
    pub fn new(start: u32, end: u32, key: u8, track: u16) -> Self {
        Self {
            start,
            end,
            key: key & 0x7F,
            track,
        }
    }

    /// Note length in ticks.
    #[inline]
    pub fn duration(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    /// Whether overlap removal silenced this note.
    #[inline]
    pub fn is_collapsed(&self) -> bool {
        self.end == self.start
    }
}
