//! LZO1X block codec, used for the chunks of the tile pack.

use crate::read_helper::{ByteSource, OutputWindow};
use crate::PackError;

/// An `M4` match with a zero distance, which ends every stream.
pub const END_MARKER: [u8; 3] = [0x11, 0x00, 0x00];

const M2_MAX_OFFSET: usize = 0x0800;
const M4_BASE_OFFSET: usize = 0x4000;
const MAX_FIRST_SHORT_RUN: usize = 238;

/// What the next instruction byte is allowed to mean.
#[derive(Clone, Copy)]
enum Expect {
    /// A literal run or a match.
    Any,
    /// A match; a short `M1` reaches past the `M2` window.
    AfterLiterals,
    /// A match; a short `M1` copies two bytes from close by.
    AfterTrailing,
}

enum Matched {
    Trailing(usize),
    End,
}

/// Decompresses an LZO1X stream into `dst`, returning how many bytes were written.
///
/// Like [`crate::format80::decode`], decoding stops early once `dst` is full.
///
/// # Errors
/// Returns [`PackError::MalformedStream`] if the stream ends before its end
/// marker, or a match reaches before the start of the output.
pub fn decompress(src: &[u8], dst: &mut [u8]) -> Result<usize, PackError> {
    let mut input = ByteSource::new(src);
    let mut output = OutputWindow::new(dst);
    let mut expect = Expect::Any;

    // A first byte above 17 is a literal run with no match before it
    if let Some(first) = input.peek().filter(|&b| b > 17) {
        input.byte()?;
        let count = usize::from(first - 17);
        output.extend(input.take(count)?);
        expect = if count < 4 {
            Expect::AfterTrailing
        } else {
            Expect::AfterLiterals
        };
    }

    while !output.is_full() {
        let at = input.position();
        let code = input.byte()?;
        let matched = match (expect, code) {
            (_, 16..) => copy_match(code, &mut input, &mut output, at)?,
            (Expect::Any, _) => {
                let count = if code == 0 {
                    15 + read_length(&mut input)?
                } else {
                    usize::from(code)
                } + 3;
                output.extend(input.take(count)?);
                expect = Expect::AfterLiterals;
                continue;
            }
            (Expect::AfterLiterals, _) => {
                let distance =
                    1 + M2_MAX_OFFSET + usize::from(code >> 2) + (usize::from(input.byte()?) << 2);
                output.copy_back(distance, 3, at)?;
                Matched::Trailing(usize::from(code & 3))
            }
            (Expect::AfterTrailing, _) => {
                let distance = 1 + usize::from(code >> 2) + (usize::from(input.byte()?) << 2);
                output.copy_back(distance, 2, at)?;
                Matched::Trailing(usize::from(code & 3))
            }
        };
        match matched {
            Matched::End => break,
            Matched::Trailing(0) => expect = Expect::Any,
            Matched::Trailing(count) => {
                output.extend(input.take(count)?);
                expect = Expect::AfterTrailing;
            }
        }
    }
    Ok(output.len())
}

/// Decodes an `M2`, `M3` or `M4` match starting with `code`.
fn copy_match(
    code: u8,
    input: &mut ByteSource,
    output: &mut OutputWindow,
    at: usize,
) -> Result<Matched, PackError> {
    let (distance, count, trailing) = match code {
        // M2: lllddds dddddddd
        64.. => {
            let low = input.byte()?;
            let distance = 1 + usize::from((code >> 2) & 7) + (usize::from(low) << 3);
            (distance, usize::from(code >> 5) + 1, code & 3)
        }
        // M3: 001lllll, then 14 bits of distance
        32.. => {
            let count = match code & 31 {
                0 => 31 + read_length(input)?,
                n => usize::from(n),
            } + 2;
            let (low, high) = (input.byte()?, input.byte()?);
            let distance = 1 + usize::from(low >> 2) + (usize::from(high) << 6);
            (distance, count, low & 3)
        }
        // M4: 0001hlll, then 14 bits of distance
        _ => {
            let count = match code & 7 {
                0 => 7 + read_length(input)?,
                n => usize::from(n),
            } + 2;
            let (low, high) = (input.byte()?, input.byte()?);
            let distance = (usize::from(code & 8) << 11) + usize::from(low >> 2) + (usize::from(high) << 6);
            if distance == 0 {
                return Ok(Matched::End);
            }
            (distance + M4_BASE_OFFSET, count, low & 3)
        }
    };
    output.copy_back(distance, count, at)?;
    Ok(Matched::Trailing(usize::from(trailing)))
}

/// Reads an extended length: each zero byte adds 255, the first non-zero byte ends it.
fn read_length(input: &mut ByteSource) -> Result<usize, PackError> {
    let mut length = 0;
    loop {
        match input.byte()? {
            0 => length += 255,
            n => return Ok(length + usize::from(n)),
        }
    }
}

/// Compresses `src` into an LZO1X stream made of one literal run.
#[must_use]
pub fn compress(src: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(src.len() + src.len() / 255 + 8);
    if src.len() > MAX_FIRST_SHORT_RUN {
        let mut rest = src.len() - 18;
        out.push(0);
        while rest > 255 {
            rest -= 255;
            out.push(0);
        }
        out.push(rest as u8);
    } else if !src.is_empty() {
        out.push(src.len() as u8 + 17);
    }
    out.extend_from_slice(src);
    out.extend_from_slice(&END_MARKER);
    out
}
