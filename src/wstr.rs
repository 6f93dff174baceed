//! Decoding of the fixed-capacity 16-bit strings stored in PAC headers.

use std::{borrow::Cow, fmt};

/// A narrow string produced by [`decode`].
///
/// The bytes are the low halves of the original 16-bit units and are not guaranteed to be valid
/// UTF-8.
#[derive(Clone, Default, Eq, PartialEq, Hash)]
pub struct NarrowString(Vec<u8>);

impl NarrowString {
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the string with invalid UTF-8 sequences replaced.
    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.as_bytes())
    }
}

impl PartialEq<str> for NarrowString {
    fn eq(&self, other: &str) -> bool {
        self.0 == other.as_bytes()
    }
}

impl PartialEq<&str> for NarrowString {
    fn eq(&self, other: &&str) -> bool {
        self.0 == other.as_bytes()
    }
}

impl fmt::Display for NarrowString {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}

impl fmt::Debug for NarrowString {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "\"{}\"", self.0.escape_ascii())
    }
}

/// Decodes a string field of `capacity` 16-bit little-endian units.
///
/// Only the low byte of every unit is kept. Decoding stops at the first zero unit or after
/// `capacity - 1` units, so the result always fits a `capacity`-byte buffer together with a
/// terminator. Units past the end of `field` are treated as zero.
pub fn decode(field: &[u8], capacity: usize) -> NarrowString {
    let max_len = capacity.saturating_sub(1);
    let bytes = field
        .chunks_exact(2)
        .map(|unit| u16::from_le_bytes([unit[0], unit[1]]))
        .take_while(|&unit| unit != 0)
        .take(max_len)
        .map(|unit| (unit & 0xff) as u8)
        .collect();

    NarrowString(bytes)
}
