//! Position converters between bytes, codepoints and characters
//!
//! Each converter remembers where its last query landed. Queries issued in
//! ascending order resume from there, so converting N sorted positions costs
//! roughly one scan over the chunks they touch. Out-of-order queries are
//! still answered correctly, falling back to a tree lookup.

use super::chunks::ChunkPos;
use super::lines::LinePos;
use super::Interpretation;
use crate::buffer::ByteBuffer;
use crate::tree::Bias;

/// Decode position inside a known chunk
#[derive(Debug, Clone, Copy)]
struct ChunkCursor {
    chunk: ChunkPos,
    byte: usize,
    codepoint: usize,
}

impl ChunkCursor {
    fn at_start(chunk: ChunkPos) -> Self {
        Self {
            chunk,
            byte: chunk.byte,
            codepoint: chunk.codepoint,
        }
    }
}

pub struct CodepointByteConverter<'a> {
    interp: &'a Interpretation,
    bytes: &'a [u8],
    cursor: Option<ChunkCursor>,
}

impl<'a> CodepointByteConverter<'a> {
    pub fn new(interp: &'a Interpretation, buffer: &'a ByteBuffer) -> Self {
        debug_assert_eq!(interp.byte_count(), buffer.len(), "stale interpretation");
        Self {
            interp,
            bytes: buffer.bytes(),
            cursor: None,
        }
    }

    /// Byte offset of the first byte of codepoint `codepoint`.
    /// Offsets at or past the end map to the byte length.
    pub fn codepoint_to_byte(&mut self, codepoint: usize) -> usize {
        if codepoint >= self.interp.codepoint_count() {
            return self.bytes.len();
        }
        let mut cursor = match self.cursor {
            Some(c)
                if c.codepoint <= codepoint && codepoint < c.chunk.end_codepoint() =>
            {
                c
            }
            _ => {
                let chunk = self
                    .interp
                    .chunks
                    .find_by_codepoint(codepoint, Bias::Right)
                    .expect("codepoint within bounds");
                ChunkCursor::at_start(chunk)
            }
        };
        let encoding = self.interp.encoding.as_ref();
        while cursor.codepoint < codepoint {
            let decoded = encoding
                .decode_at(self.bytes, cursor.byte)
                .expect("chunk covers decoded bytes");
            cursor.byte += decoded.len;
            cursor.codepoint += 1;
        }
        self.cursor = Some(cursor);
        cursor.byte
    }

    /// Codepoint containing byte `byte`. A byte inside a multi-byte
    /// codepoint maps to that codepoint; offsets past the end map to the
    /// codepoint count.
    pub fn byte_to_codepoint(&mut self, byte: usize) -> usize {
        if byte >= self.bytes.len() {
            return self.interp.codepoint_count();
        }
        let mut cursor = match self.cursor {
            Some(c) if c.byte <= byte && byte < c.chunk.end_byte() => c,
            _ => {
                let chunk = self
                    .interp
                    .chunks
                    .find_by_byte(byte, Bias::Right)
                    .expect("byte within bounds");
                ChunkCursor::at_start(chunk)
            }
        };
        let encoding = self.interp.encoding.as_ref();
        while let Some(decoded) = encoding.decode_at(self.bytes, cursor.byte) {
            if cursor.byte + decoded.len > byte {
                break;
            }
            cursor.byte += decoded.len;
            cursor.codepoint += 1;
        }
        self.cursor = Some(cursor);
        cursor.codepoint
    }
}

pub struct CharacterCodepointConverter<'a> {
    interp: &'a Interpretation,
    line: Option<LinePos>,
}

impl<'a> CharacterCodepointConverter<'a> {
    pub fn new(interp: &'a Interpretation) -> Self {
        Self { interp, line: None }
    }

    fn is_last(&self, line: &LinePos) -> bool {
        line.index + 1 == self.interp.lines.num_lines()
    }

    /// First codepoint of character `offset`; clamps to the end
    pub fn character_to_codepoint(&mut self, offset: usize) -> usize {
        let offset = offset.min(self.interp.character_count());
        let line = match self.line {
            Some(l) if l.first_char <= offset && (offset < l.end_char() || self.is_last(&l)) => l,
            _ => self.interp.lines.line_at_char(offset).0,
        };
        self.line = Some(line);
        let within = offset - line.first_char;
        if within <= line.line.nonbreak_chars {
            line.first_codepoint + within
        } else {
            line.end_codepoint()
        }
    }

    /// Character containing codepoint `offset`. The second codepoint of a
    /// `\r\n` maps to the line break character. Clamps to the end.
    pub fn codepoint_to_character(&mut self, offset: usize) -> usize {
        let offset = offset.min(self.interp.codepoint_count());
        let line = match self.line {
            Some(l)
                if l.first_codepoint <= offset
                    && (offset < l.end_codepoint() || self.is_last(&l)) =>
            {
                l
            }
            _ => self.interp.lines.line_at_codepoint(offset).0,
        };
        self.line = Some(line);
        let within = offset - line.first_codepoint;
        line.first_char + within.min(line.line.nonbreak_chars)
    }
}

/// Character offsets to byte offsets and back, composing the two converters
pub struct CharacterByteConverter<'a> {
    codepoints: CodepointByteConverter<'a>,
    characters: CharacterCodepointConverter<'a>,
}

impl<'a> CharacterByteConverter<'a> {
    pub fn new(interp: &'a Interpretation, buffer: &'a ByteBuffer) -> Self {
        Self {
            codepoints: CodepointByteConverter::new(interp, buffer),
            characters: CharacterCodepointConverter::new(interp),
        }
    }

    pub fn character_to_byte(&mut self, offset: usize) -> usize {
        let codepoint = self.characters.character_to_codepoint(offset);
        self.codepoints.codepoint_to_byte(codepoint)
    }

    pub fn byte_to_character(&mut self, byte: usize) -> usize {
        let codepoint = self.codepoints.byte_to_codepoint(byte);
        self.characters.codepoint_to_character(codepoint)
    }
}
