//! Westwood's "Format80" byte stream codec.
//!
//! A stream is a sequence of instructions selected by the top bits of their
//! first byte, ending with a zero-length literal run (`0x80`):
//!
//! | Bits  | Instruction                                                  |
//! |-------|--------------------------------------------------------------|
//! | `0x`  | copy `3..=10` bytes from up to 4095 bytes behind the cursor  |
//! | `10`  | copy `0..=63` bytes from the stream (`0` ends the stream)    |
//! | `11`  | copy `3..=64` bytes from an absolute output offset           |
//! | `FE`  | repeat one byte up to 65535 times                            |
//! | `FF`  | copy up to 65535 bytes from an absolute output offset        |
//!
//! Every multi-byte field is little endian.

use crate::read_helper::{ByteSource, OutputWindow};
use crate::PackError;
use byteorder::{ByteOrder, LittleEndian};
use log::trace;

/// The instruction that ends a stream.
pub const TERMINATOR: u8 = 0x80;

const LITERAL: u8 = 0x80;
const FILL: u8 = 0xFE;
const MAX_LITERAL_RUN: usize = 0x3F;
const MIN_FILL_RUN: usize = 4;
const MAX_FILL_RUN: usize = u16::MAX as usize;

/// Decompresses a Format80 stream into `dst`, returning how many bytes were written.
///
/// Decoding stops at the terminator, or as soon as `dst` is full; an
/// instruction that would overrun `dst` is cut short. A stream that runs out
/// before either happens is malformed.
///
/// # Errors
/// Returns [`PackError::MalformedStream`] if a field runs past the end of
/// `src`, or if a copy instruction reads from outside the bytes written so far.
pub fn decode(src: &[u8], dst: &mut [u8]) -> Result<usize, PackError> {
    let mut input = ByteSource::new(src);
    let mut output = OutputWindow::new(dst);
    while !output.is_full() {
        let at = input.position();
        let code = input.byte()?;
        match code >> 6 {
            // 0cccpppp pppppppp
            0b00 | 0b01 => {
                let count = usize::from(code >> 4) + 3;
                let distance = (usize::from(code & 0x0F) << 8) | usize::from(input.byte()?);
                output.copy_back(distance, count, at)?;
            }
            // 10cccccc
            0b10 => {
                let count = usize::from(code & 0x3F);
                if count == 0 {
                    return Ok(output.len());
                }
                output.extend(input.take(count)?);
            }
            _ => match code {
                // 11111110 cccccccc cccccccc vvvvvvvv
                0xFE => {
                    let count = usize::from(input.u16()?);
                    let value = input.byte()?;
                    output.fill(value, count);
                }
                // 11111111 cccccccc cccccccc pppppppp pppppppp
                0xFF => {
                    let count = usize::from(input.u16()?);
                    let offset = usize::from(input.u16()?);
                    output.copy_from(offset, count, at)?;
                }
                // 11cccccc pppppppp pppppppp
                _ => {
                    let count = usize::from(code & 0x3F) + 3;
                    let offset = usize::from(input.u16()?);
                    output.copy_from(offset, count, at)?;
                }
            },
        }
    }
    if input.peek() != Some(TERMINATOR) {
        trace!(
            "format80 output filled at input byte {} without a terminator",
            input.position()
        );
    }
    Ok(output.len())
}

/// Compresses `src` into a Format80 stream.
///
/// Only literal runs and fill runs are emitted. Runs of at least four equal
/// bytes become fills, everything else is copied verbatim.
#[must_use]
pub fn encode(src: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(src.len() + src.len() / MAX_LITERAL_RUN + 2);
    let mut pending = 0;
    let mut pos = 0;
    while pos < src.len() {
        let value = src[pos];
        let run = src[pos..]
            .iter()
            .take(MAX_FILL_RUN)
            .take_while(|&&b| b == value)
            .count();
        if run < MIN_FILL_RUN {
            pos += 1;
            continue;
        }
        write_literals(&mut out, &src[pending..pos]);
        let mut count = [0; 2];
        LittleEndian::write_u16(&mut count, run as u16);
        out.push(FILL);
        out.extend_from_slice(&count);
        out.push(value);
        pos += run;
        pending = pos;
    }
    write_literals(&mut out, &src[pending..]);
    out.push(TERMINATOR);
    out
}

fn write_literals(out: &mut Vec<u8>, bytes: &[u8]) {
    for run in bytes.chunks(MAX_LITERAL_RUN) {
        out.push(LITERAL | run.len() as u8);
        out.extend_from_slice(run);
    }
}
