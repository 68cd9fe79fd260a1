//! Moving packed payloads in and out of the map's INI text.
//!
//! A payload is stored base64 encoded and wrapped into lines of at most
//! [`LINE_LENGTH`] characters, keyed `1`, `2`, `3`, ... in order.

use crate::PackError;
use base64::alphabet;
use base64::engine::{general_purpose, DecodePaddingMode, GeneralPurpose};
use base64::Engine;
use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

/// Maximum number of base64 characters on one line.
pub const LINE_LENGTH: usize = 70;

/// Standard alphabet, written padded, read with or without padding.
const ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    general_purpose::PAD.with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// A key/value section of an INI file.
pub trait TextSection {
    /// Returns the value stored under `key`.
    fn value(&self, key: &str) -> Option<&str>;
    /// Stores `value` under `key`, replacing any previous value.
    fn set_value(&mut self, key: String, value: String);
    /// Removes every key.
    fn clear(&mut self);
}

impl TextSection for BTreeMap<String, String> {
    fn value(&self, key: &str) -> Option<&str> {
        self.get(key).map(String::as_str)
    }

    fn set_value(&mut self, key: String, value: String) {
        self.insert(key, value);
    }

    fn clear(&mut self) {
        BTreeMap::clear(self);
    }
}

impl<S: BuildHasher> TextSection for HashMap<String, String, S> {
    fn value(&self, key: &str) -> Option<&str> {
        self.get(key).map(String::as_str)
    }

    fn set_value(&mut self, key: String, value: String) {
        self.insert(key, value);
    }

    fn clear(&mut self) {
        HashMap::clear(self);
    }
}

/// Base64 encodes `data` and splits it into numbered lines.
#[must_use]
pub fn to_base64_lines(data: &[u8]) -> Vec<(u32, String)> {
    let encoded = ENGINE.encode(data);
    (0..encoded.len())
        .step_by(LINE_LENGTH)
        .zip(1..)
        .map(|(start, key)| {
            let end = (start + LINE_LENGTH).min(encoded.len());
            (key, encoded[start..end].to_owned())
        })
        .collect()
}

/// Joins lines, already in key order, and base64 decodes them.
///
/// # Errors
/// Errors if the joined text is not valid base64.
pub fn from_base64_lines<'a, I>(lines: I) -> Result<Vec<u8>, PackError>
where
    I: IntoIterator<Item = &'a str>,
{
    let joined: String = lines.into_iter().map(str::trim).collect();
    Ok(ENGINE.decode(joined)?)
}

/// Reads the payload stored in a section, following keys `1`, `2`, ...
/// up to the first missing one.
///
/// # Errors
/// Errors if the stored text is not valid base64.
pub fn read_section_lines(section: &impl TextSection) -> Result<Vec<u8>, PackError> {
    from_base64_lines((1u32..).map_while(|key| section.value(&key.to_string())))
}

/// Replaces the contents of a section with `data`.
pub fn write_section_lines(section: &mut impl TextSection, data: &[u8]) {
    section.clear();
    for (key, line) in to_base64_lines(data) {
        section.set_value(key.to_string(), line);
    }
}
