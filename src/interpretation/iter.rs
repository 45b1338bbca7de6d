//! Forward iterators over decoded codepoints and characters

use std::iter::Peekable;
use std::ops::Range;

use crate::character::{Character, LineEnding};
use crate::encoding::Encoding;

/// One decoded codepoint and the bytes it occupies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodepointInfo {
    /// `None` when the bytes are malformed
    pub value: Option<char>,
    pub bytes: Range<usize>,
}

pub struct CodepointIter<'a> {
    encoding: &'a dyn Encoding,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> CodepointIter<'a> {
    /// `pos` must be the first byte of a codepoint
    pub(super) fn new(encoding: &'a dyn Encoding, bytes: &'a [u8], pos: usize) -> Self {
        Self {
            encoding,
            bytes,
            pos,
        }
    }

    /// Byte offset of the next codepoint
    pub fn position(&self) -> usize {
        self.pos
    }
}

impl Iterator for CodepointIter<'_> {
    type Item = CodepointInfo;

    fn next(&mut self) -> Option<CodepointInfo> {
        let decoded = self.encoding.decode_at(self.bytes, self.pos)?;
        let start = self.pos;
        self.pos += decoded.len;
        Some(CodepointInfo {
            value: decoded.value,
            bytes: start..self.pos,
        })
    }
}

/// Yields characters, folding `\r\n` into a single line break
pub struct CharacterIter<'a> {
    codepoints: Peekable<CodepointIter<'a>>,
}

impl<'a> CharacterIter<'a> {
    pub(super) fn new(codepoints: CodepointIter<'a>) -> Self {
        Self {
            codepoints: codepoints.peekable(),
        }
    }
}

impl Iterator for CharacterIter<'_> {
    type Item = Character;

    fn next(&mut self) -> Option<Character> {
        let info = self.codepoints.next()?;
        Some(match info.value {
            None => Character::Invalid,
            Some('\r') => {
                if self
                    .codepoints
                    .next_if(|next| next.value == Some('\n'))
                    .is_some()
                {
                    Character::LineBreak(LineEnding::Crlf)
                } else {
                    Character::LineBreak(LineEnding::Cr)
                }
            }
            Some('\n') => Character::LineBreak(LineEnding::Lf),
            Some(c) => Character::Codepoint(c),
        })
    }
}
