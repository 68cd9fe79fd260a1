//! The chunked container shared by every map pack.
//!
//! A payload is a plain concatenation of chunks, each one a 4-byte header
//! (`u16` compressed size, `u16` raw size, little endian) followed by the
//! compressed block. There is no terminator; the payload ends where the
//! buffer does.

use crate::{format80, lzo, read_helper, write_helper, PackError};
use log::debug;
use std::io::Cursor;

/// Size of the header in front of every chunk.
pub const CHUNK_HEADER_SIZE: usize = 4;

/// Raw block size the game itself writes.
pub const DEFAULT_BLOCK_SIZE: usize = 8192;

/// The compression used for the blocks of a chunked payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockCodec {
    /// Westwood Format80, used by the overlay packs.
    Format80,
    /// LZO1X, used by the tile pack.
    Lzo,
}

impl BlockCodec {
    /// Compresses one raw block.
    #[must_use]
    pub fn compress(self, raw: &[u8]) -> Vec<u8> {
        match self {
            BlockCodec::Format80 => format80::encode(raw),
            BlockCodec::Lzo => lzo::compress(raw),
        }
    }

    /// Decompresses one block into `dst`, returning how many bytes were written.
    ///
    /// # Errors
    /// Errors if the block is malformed.
    pub fn decompress(self, src: &[u8], dst: &mut [u8]) -> Result<usize, PackError> {
        match self {
            BlockCodec::Format80 => format80::decode(src, dst),
            BlockCodec::Lzo => lzo::decompress(src, dst),
        }
    }

    /// Splits `raw` into blocks and compresses them with this codec.
    ///
    /// # Errors
    /// See [`write_chunks`].
    pub fn write_chunks(self, raw: &[u8], block_size: usize) -> Result<Vec<u8>, PackError> {
        write_chunks(raw, block_size, |block| self.compress(block))
    }

    /// Reassembles a chunked payload compressed with this codec.
    ///
    /// # Errors
    /// See [`read_chunks`].
    pub fn read_chunks(self, data: &[u8]) -> Result<Vec<u8>, PackError> {
        read_chunks(data, |src, dst| self.decompress(src, dst))
    }
}

/// Splits `raw` into blocks of at most `block_size` bytes, compressing each one
/// with `compress` and framing it with a chunk header.
///
/// # Errors
/// Errors if `block_size` is zero or does not fit in a `u16`, or if a
/// compressed block does not fit in a `u16`.
pub fn write_chunks<F>(raw: &[u8], block_size: usize, mut compress: F) -> Result<Vec<u8>, PackError>
where
    F: FnMut(&[u8]) -> Vec<u8>,
{
    if block_size == 0 || block_size > usize::from(u16::MAX) {
        return Err(PackError::InvalidBlockSize(block_size));
    }
    let mut out = Vec::with_capacity(raw.len() / 2 + CHUNK_HEADER_SIZE);
    let mut chunk_count = 0;
    for block in raw.chunks(block_size) {
        let compressed = compress(block);
        let compressed_size =
            u16::try_from(compressed.len()).map_err(|_| PackError::BlockTooLarge(compressed.len()))?;
        // block_size fits in a u16, checked above
        write_helper::write_chunk_header(&mut out, compressed_size, block.len() as u16)?;
        out.extend_from_slice(&compressed);
        chunk_count += 1;
    }
    debug!(
        "packed {} bytes into {chunk_count} chunks of {} bytes total",
        raw.len(),
        out.len()
    );
    Ok(out)
}

/// Reassembles a chunked payload, decompressing each chunk with `decompress`
/// into a buffer of exactly its declared raw size.
///
/// # Errors
/// Errors if a chunk header or body runs past the end of `data`, if a chunk
/// decodes to fewer bytes than it declares, or if `decompress` fails.
pub fn read_chunks<F>(data: &[u8], mut decompress: F) -> Result<Vec<u8>, PackError>
where
    F: FnMut(&[u8], &mut [u8]) -> Result<usize, PackError>,
{
    let mut out = Vec::new();
    let mut cursor = Cursor::new(data);
    loop {
        let offset = cursor.position() as usize;
        if offset >= data.len() {
            break;
        }
        let (compressed_size, raw_size) =
            read_helper::read_chunk_header(&mut cursor).map_err(|_| PackError::TruncatedChunk {
                offset,
                declared: CHUNK_HEADER_SIZE,
                available: data.len() - offset,
            })?;
        let start = offset + CHUNK_HEADER_SIZE;
        let end = start + usize::from(compressed_size);
        if end > data.len() {
            return Err(PackError::TruncatedChunk {
                offset,
                declared: usize::from(compressed_size),
                available: data.len() - start,
            });
        }
        let raw_start = out.len();
        out.resize(raw_start + usize::from(raw_size), 0);
        let written = decompress(&data[start..end], &mut out[raw_start..])?;
        if written != usize::from(raw_size) {
            return Err(PackError::ChunkLengthMismatch {
                offset,
                expected: usize::from(raw_size),
                actual: written,
            });
        }
        cursor.set_position(end as u64);
    }
    debug!("unpacked {} bytes into {} bytes", data.len(), out.len());
    Ok(out)
}
