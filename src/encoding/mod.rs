//! Pluggable text encodings
//!
//! An [`Encoding`] turns bytes into codepoints one at a time. Decoding never
//! fails outright: a malformed sequence yields a [`Decoded`] without a value
//! that still consumes at least one byte, so every byte of a buffer belongs
//! to exactly one (possibly invalid) codepoint.
//!
//! ## Implementor requirement
//!
//! `next_codepoint` must be a pure function of the bytes it is given and may
//! look at no more than `max_codepoint_len()` of them. The incremental fixup
//! relies on this to bound how far before an edit decoding has to restart.

use crate::constants::codepoints::INVALID;

mod utf16;
mod utf8;

pub use utf16::{Endianness, Utf16};
pub use utf8::Utf8;

/// Result of decoding one codepoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoded {
    /// Number of bytes consumed (always at least 1)
    pub len: usize,
    /// The decoded scalar value, or `None` if the bytes were malformed
    pub value: Option<char>,
}

impl Decoded {
    pub const fn valid(len: usize, value: char) -> Self {
        Self {
            len,
            value: Some(value),
        }
    }

    pub const fn invalid(len: usize) -> Self {
        Self { len, value: None }
    }

    pub const fn is_valid(&self) -> bool {
        self.value.is_some()
    }

    /// Codepoint value used for line-break detection (0 for invalid input)
    pub fn line_break_value(&self) -> u32 {
        self.value.map_or(INVALID, |c| c as u32)
    }
}

pub trait Encoding {
    /// Display name ("UTF-8", "UTF-16 LE", ...)
    fn name(&self) -> &'static str;

    /// Longest byte sequence a single codepoint can occupy
    fn max_codepoint_len(&self) -> usize;

    /// Decode the codepoint at the front of `bytes`. `bytes` is never empty.
    fn next_codepoint(&self, bytes: &[u8]) -> Decoded;

    /// Append the encoded form of `c` to `out`
    fn encode(&self, c: char, out: &mut Vec<u8>);

    fn encode_str(&self, text: &str) -> Vec<u8> {
        let mut out = Vec::with_capacity(text.len());
        for c in text.chars() {
            self.encode(c, &mut out);
        }
        out
    }

    /// Decode the codepoint starting at `pos` of `bytes`, or `None` at the end.
    fn decode_at(&self, bytes: &[u8], pos: usize) -> Option<Decoded> {
        if pos >= bytes.len() {
            return None;
        }
        let decoded = self.next_codepoint(&bytes[pos..]);
        debug_assert!(decoded.len > 0 && pos + decoded.len <= bytes.len());
        Some(decoded)
    }
}

/// Look up an encoding by a case-insensitive name
pub fn encoding_by_name(name: &str) -> Option<Box<dyn Encoding>> {
    match name.to_ascii_lowercase().replace('_', "-").as_str() {
        "utf-8" | "utf8" => Some(Box::new(Utf8)),
        "utf-16" | "utf-16le" | "utf-16-le" | "utf16le" => {
            Some(Box::new(Utf16::new(Endianness::Little)))
        }
        "utf-16be" | "utf-16-be" | "utf16be" => Some(Box::new(Utf16::new(Endianness::Big))),
        _ => None,
    }
}
