//! Sequential big-endian reads over a byte stream.

use std::{
    fs::File,
    io::{self, BufReader, Read},
    path::Path,
};

use crate::error::{Error, Result};

/// Read buffer used when reading straight from disk.
const FILE_BUFFER_SIZE: usize = 256 * 1024;

/// Upper bound on the up-front allocation for a block read. Larger blocks
/// grow as bytes actually arrive, so a corrupt length cannot reserve
/// gigabytes before the stream runs dry.
const MAX_BLOCK_PREALLOC: usize = 16 * 1024 * 1024;

/// A single-cursor reader of big-endian MIDI primitives.
///
/// This type has no knowledge of chunks or events; it only turns bytes into
/// integers and blocks, failing with [`Error::TruncatedStream`] when the
/// stream ends early.
#[derive(Debug)]
pub struct MidiReader<R> {
    inner: R,
    position: u64,
}

impl MidiReader<BufReader<File>> {
    /// Open a file for sequential reading.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => Error::FileNotFound(path.to_path_buf()),
            _ => Error::Io(err),
        })?;
        Ok(Self::new(BufReader::with_capacity(FILE_BUFFER_SIZE, file)))
    }
}

impl<R: Read> MidiReader<R> {
    /// Wrap an arbitrary reader.
    #[inline]
    pub fn new(inner: R) -> Self {
        Self { inner, position: 0 }
    }

    /// Number of bytes consumed so far.
    #[inline]
    pub fn position(&self) -> u64 {
        self.position
    }

    #[inline]
    pub fn read_u8(&mut self) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.fill(&mut buf)?;
        Ok(buf[0])
    }

    #[inline]
    pub fn read_u16(&mut self) -> Result<u16> {
        let mut buf = [0u8; 2];
        self.fill(&mut buf)?;
        Ok(u16::from_be_bytes(buf))
    }

    #[inline]
    pub fn read_u32(&mut self) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.fill(&mut buf)?;
        Ok(u32::from_be_bytes(buf))
    }

    /// Read a four byte chunk tag such as `MThd`.
    #[inline]
    pub fn read_magic(&mut self) -> Result<[u8; 4]> {
        let mut buf = [0u8; 4];
        self.fill(&mut buf)?;
        Ok(buf)
    }

    /// Read exactly `len` bytes into a new buffer.
    pub fn read_block(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut block = Vec::with_capacity(len.min(MAX_BLOCK_PREALLOC));
        let got = (&mut self.inner)
            .take(len as u64)
            .read_to_end(&mut block)?;
        self.position += got as u64;
        if got < len {
            return Err(Error::TruncatedStream { needed: len - got });
        }
        Ok(block)
    }

    fn fill(&mut self, buf: &mut [u8]) -> Result<()> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => {
                    self.position += filled as u64;
                    return Err(Error::TruncatedStream {
                        needed: buf.len() - filled,
                    });
                }
                Ok(n) => filled += n,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => return Err(err.into()),
            }
        }
        self.position += filled as u64;
        Ok(())
    }
}
