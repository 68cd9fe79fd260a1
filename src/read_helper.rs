use crate::PackError;
use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};
use std::io::{self, Read};

/// Reads a chunk header, returning `(compressed_size, raw_size)`.
pub(crate) fn read_chunk_header(mut r: impl Read) -> io::Result<(u16, u16)> {
    let compressed_size = r.read_u16::<LittleEndian>()?;
    let raw_size = r.read_u16::<LittleEndian>()?;
    Ok((compressed_size, raw_size))
}

/// A bounds checked reader over a compressed stream.
pub(crate) struct ByteSource<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteSource<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        ByteSource { data, pos: 0 }
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn peek(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    pub(crate) fn byte(&mut self) -> Result<u8, PackError> {
        let byte = self
            .peek()
            .ok_or_else(|| PackError::malformed(self.pos, "stream ended before its terminator"))?;
        self.pos += 1;
        Ok(byte)
    }

    pub(crate) fn u16(&mut self) -> Result<u16, PackError> {
        Ok(LittleEndian::read_u16(self.take(2)?))
    }

    pub(crate) fn take(&mut self, count: usize) -> Result<&'a [u8], PackError> {
        let end = self
            .pos
            .checked_add(count)
            .filter(|&end| end <= self.data.len())
            .ok_or_else(|| PackError::malformed(self.pos, "field runs past the end of the stream"))?;
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }
}

/// A fixed-size decompression target that only ever grows from the front.
///
/// Every write is clamped to the buffer; once it is full all further writes
/// are dropped, and decoders are expected to stop.
pub(crate) struct OutputWindow<'a> {
    buf: &'a mut [u8],
    len: usize,
}

impl<'a> OutputWindow<'a> {
    pub(crate) fn new(buf: &'a mut [u8]) -> Self {
        OutputWindow { buf, len: 0 }
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn is_full(&self) -> bool {
        self.len == self.buf.len()
    }

    pub(crate) fn extend(&mut self, bytes: &[u8]) {
        let count = bytes.len().min(self.buf.len() - self.len);
        self.buf[self.len..self.len + count].copy_from_slice(&bytes[..count]);
        self.len += count;
    }

    pub(crate) fn fill(&mut self, value: u8, count: usize) {
        let count = count.min(self.buf.len() - self.len);
        self.buf[self.len..self.len + count].fill(value);
        self.len += count;
    }

    /// Copies `count` already written bytes starting at `start` to the end.
    ///
    /// The copy runs one byte at a time, so a source range that overlaps the
    /// bytes being written repeats them.
    pub(crate) fn copy_from(&mut self, start: usize, count: usize, at: usize) -> Result<(), PackError> {
        for source in start..start.saturating_add(count) {
            if self.is_full() {
                break;
            }
            if source >= self.len {
                return Err(PackError::malformed(at, "copy source lies outside the written output"));
            }
            self.buf[self.len] = self.buf[source];
            self.len += 1;
        }
        Ok(())
    }

    /// Copies `count` bytes from `distance` bytes behind the write position.
    pub(crate) fn copy_back(&mut self, distance: usize, count: usize, at: usize) -> Result<(), PackError> {
        let start = self
            .len
            .checked_sub(distance)
            .filter(|_| distance >= 1)
            .ok_or_else(|| PackError::malformed(at, "back-reference reaches before the output start"))?;
        self.copy_from(start, count, at)
    }
}
