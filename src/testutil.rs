//! Helpers for assembling small Standard MIDI Files in tests.

/// Encode a value as a variable-length quantity.
pub(crate) fn encode_vlq(value: u32) -> Vec<u8> {
    let mut out = vec![(value & 0x7F) as u8];
    let mut rest = value >> 7;
    while rest > 0 {
        out.push((rest & 0x7F) as u8 | 0x80);
        rest >>= 7;
    }
    out.reverse();
    out
}

/// Builds the body of one `MTrk` chunk event by event.
#[derive(Default)]
pub(crate) struct TrackBuilder {
    bytes: Vec<u8>,
}

impl TrackBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Append a delta time followed by raw event bytes.
    pub(crate) fn event(mut self, delta: u32, bytes: &[u8]) -> Self {
        self.bytes.extend(encode_vlq(delta));
        self.bytes.extend_from_slice(bytes);
        self
    }

    pub(crate) fn note_on(self, delta: u32, key: u8, vel: u8) -> Self {
        self.event(delta, &[0x90, key, vel])
    }

    pub(crate) fn note_off(self, delta: u32, key: u8) -> Self {
        self.event(delta, &[0x80, key, 0x40])
    }

    pub(crate) fn tempo(self, delta: u32, value: u32) -> Self {
        let [_, b1, b2, b3] = value.to_be_bytes();
        self.event(delta, &[0xFF, 0x51, 0x03, b1, b2, b3])
    }

    pub(crate) fn end(self, delta: u32) -> Self {
        self.event(delta, &[0xFF, 0x2F, 0x00])
    }

    pub(crate) fn build(self) -> Vec<u8> {
        self.bytes
    }
}

/// Wrap track bodies into a complete file.
pub(crate) fn smf(format: u16, division: u16, tracks: &[Vec<u8>]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"MThd");
    out.extend_from_slice(&6u32.to_be_bytes());
    out.extend_from_slice(&format.to_be_bytes());
    out.extend_from_slice(&(tracks.len() as u16).to_be_bytes());
    out.extend_from_slice(&division.to_be_bytes());
    for track in tracks {
        out.extend_from_slice(b"MTrk");
        out.extend_from_slice(&(track.len() as u32).to_be_bytes());
        out.extend_from_slice(track);
    }
    out
}
