use std::fmt::{self, Display, Formatter};

/// Terminator of a line.
///
/// `Crlf` is one character but two codepoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LineEnding {
    /// Unterminated; only the last line of a text has this
    #[default]
    None,
    /// `\r`
    Cr,
    /// `\n`
    Lf,
    /// `\r\n`
    Crlf,
}

impl LineEnding {
    /// Number of codepoints the terminator occupies
    pub const fn codepoints(self) -> usize {
        match self {
            Self::None => 0,
            Self::Cr | Self::Lf => 1,
            Self::Crlf => 2,
        }
    }

    /// Number of characters the terminator occupies
    pub const fn chars(self) -> usize {
        match self {
            Self::None => 0,
            _ => 1,
        }
    }

    pub const fn is_break(self) -> bool {
        !matches!(self, Self::None)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Cr => "\r",
            Self::Lf => "\n",
            Self::Crlf => "\r\n",
        }
    }
}

/// A user-perceived unit of text as yielded by character iterators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Character {
    /// A decoded Unicode scalar value other than a line terminator
    Codepoint(char),

    /// A codepoint the encoding could not decode
    Invalid,

    /// A line terminator (`Crlf` spans two codepoints)
    LineBreak(LineEnding),
}

impl Character {
    /// Number of codepoints this character covers
    pub fn codepoint_len(&self) -> usize {
        match self {
            Character::LineBreak(ending) => ending.codepoints(),
            _ => 1,
        }
    }

    pub fn is_line_break(&self) -> bool {
        matches!(self, Character::LineBreak(_))
    }

    /// Convert to char if possible (best effort for display/search)
    pub fn to_char_lossy(&self) -> char {
        match self {
            Character::Codepoint(c) => *c,
            Character::Invalid => '\u{FFFD}',
            Character::LineBreak(LineEnding::Cr) => '\r',
            Character::LineBreak(_) => '\n',
        }
    }

    /// Render the character to a formatter/output
    pub fn render(&self, out: &mut impl fmt::Write) -> fmt::Result {
        match self {
            Character::Codepoint(c) => write!(out, "{}", c),
            Character::Invalid => write!(out, "\u{FFFD}"),
            Character::LineBreak(ending) => write!(out, "{}", ending.as_str()),
        }
    }
}

impl Display for Character {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.render(f)
    }
}

#[cfg(test)]
#[path = "character_tests.rs"]
mod tests;
