//! Bounds-checked cursor over a single track's bytes.

use crate::error::{Error, Result};

/// Longest variable-length quantity accepted. Four bytes carry 28 bits, a
/// fifth completes a full 32-bit value; anything longer is corrupt data.
pub const MAX_VLQ_BYTES: usize = 5;

/// Decode a variable-length quantity from the start of `data`.
///
/// Returns the value and the number of bytes consumed, or `None` if `data`
/// ends before the quantity does.
pub fn decode_vlq(data: &[u8]) -> Option<(u32, usize)> {
    let mut value = 0u32;
    for (i, &byte) in data.iter().take(MAX_VLQ_BYTES).enumerate() {
        value = (value << 7) | (byte & 0x7F) as u32;
        if byte & 0x80 == 0 || i + 1 == MAX_VLQ_BYTES {
            return Some((value, i + 1));
        }
    }
    None
}

/// A read position within one track.
///
/// Every read is checked against the track's declared length; running off
/// the end reports [`Error::TruncatedTrack`] with the track index and the
/// offset at which the read was attempted.
#[derive(Debug, Clone)]
pub(crate) struct TrackCursor<'a> {
    data: &'a [u8],
    offset: usize,
    track: usize,
}

impl<'a> TrackCursor<'a> {
    #[inline]
    pub(crate) fn new(data: &'a [u8], track: usize) -> Self {
        Self {
            data,
            offset: 0,
            track,
        }
    }

    #[inline]
    pub(crate) fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    fn truncated(&self) -> Error {
        Error::TruncatedTrack {
            track: self.track,
            offset: self.offset,
        }
    }

    #[inline]
    pub(crate) fn read_u8(&mut self) -> Result<u8> {
        let byte = *self.data.get(self.offset).ok_or_else(|| self.truncated())?;
        self.offset += 1;
        Ok(byte)
    }

    /// Read three bytes as a big-endian 24-bit value.
    #[inline]
    pub(crate) fn read_u24(&mut self) -> Result<u32> {
        let b1 = self.read_u8()? as u32;
        let b2 = self.read_u8()? as u32;
        let b3 = self.read_u8()? as u32;
        Ok((b1 << 16) | (b2 << 8) | b3)
    }

    /// Step back over the byte just read.
    #[inline]
    pub(crate) fn rewind(&mut self) {
        self.offset = self.offset.saturating_sub(1);
    }

    #[inline]
    pub(crate) fn skip(&mut self, len: usize) -> Result<()> {
        let end = self
            .offset
            .checked_add(len)
            .filter(|&end| end <= self.data.len())
            .ok_or_else(|| self.truncated())?;
        self.offset = end;
        Ok(())
    }

    /// Skip bytes up to and including the first occurrence of `terminator`.
    pub(crate) fn skip_through(&mut self, terminator: u8) -> Result<()> {
        match self.data[self.offset..].iter().position(|&b| b == terminator) {
            Some(pos) => {
                self.offset += pos + 1;
                Ok(())
            }
            None => {
                self.offset = self.data.len();
                Err(self.truncated())
            }
        }
    }

    pub(crate) fn read_vlq(&mut self) -> Result<u32> {
        match decode_vlq(&self.data[self.offset..]) {
            Some((value, len)) => {
                self.offset += len;
                Ok(value)
            }
            None => {
                self.offset = self.data.len();
                Err(self.truncated())
            }
        }
    }

    /// Read a VLQ length prefix and skip that many bytes.
    #[inline]
    pub(crate) fn skip_vlq_block(&mut self) -> Result<()> {
        let len = self.read_vlq()?;
        self.skip(len as usize)
    }
}
