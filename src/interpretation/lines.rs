//! Line registry: per-line character/codepoint/line-break rank
//!
//! Every line is stored as its count of non-break characters plus its
//! terminator. Only the last line is unterminated, so a text always has
//! `linebreaks + 1` lines. A `\r` followed by `\n` is a single `Crlf`
//! terminator; the registry keeps that invariant across edits by merging a
//! line ending in `Cr` with a following empty line ending in `Lf`.

use crate::character::LineEnding;
use crate::constants::codepoints::{CR, LF};
use crate::tree::{Bias, Summarize, SumTree, Summary};

/// One line of text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Line {
    /// Characters before the terminator
    pub nonbreak_chars: usize,
    pub ending: LineEnding,
}

impl Line {
    pub const fn new(nonbreak_chars: usize, ending: LineEnding) -> Self {
        Self {
            nonbreak_chars,
            ending,
        }
    }

    pub const fn codepoints(&self) -> usize {
        self.nonbreak_chars + self.ending.codepoints()
    }

    pub const fn chars(&self) -> usize {
        self.nonbreak_chars + self.ending.chars()
    }

    pub const fn linebreaks(&self) -> usize {
        self.ending.chars()
    }

    /// Codepoint offset of character offset `offset` within this line
    fn char_to_codepoint(&self, offset: usize) -> usize {
        if offset <= self.nonbreak_chars {
            offset
        } else {
            self.codepoints()
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineSum {
    pub codepoints: usize,
    pub chars: usize,
    pub linebreaks: usize,
}

impl Summary for LineSum {
    fn combine(self, other: Self) -> Self {
        Self {
            codepoints: self.codepoints + other.codepoints,
            chars: self.chars + other.chars,
            linebreaks: self.linebreaks + other.linebreaks,
        }
    }
}

impl Summarize for Line {
    type Summary = LineSum;

    fn summary(&self) -> LineSum {
        LineSum {
            codepoints: self.codepoints(),
            chars: self.chars(),
            linebreaks: self.linebreaks(),
        }
    }
}

/// A line together with where it starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinePos {
    pub index: usize,
    pub first_char: usize,
    pub first_codepoint: usize,
    pub line: Line,
}

impl LinePos {
    /// One past the last character of the line, terminator included
    pub fn end_char(&self) -> usize {
        self.first_char + self.line.chars()
    }

    pub fn end_codepoint(&self) -> usize {
        self.first_codepoint + self.line.codepoints()
    }
}

/// What [`LineRegistry::erase_chars`] removed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextClipInfo {
    /// Total characters removed
    pub removed_chars: usize,
    /// The removed text broken into lines. The last entry is unterminated.
    pub lines: Vec<Line>,
}

#[derive(Debug, Clone)]
pub struct LineRegistry {
    tree: SumTree<Line>,
}

impl Default for LineRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl LineRegistry {
    /// Registry of an empty text: one empty unterminated line
    pub fn new() -> Self {
        Self {
            tree: SumTree::from_items(vec![Line::default()]),
        }
    }

    /// `lines` must end with an unterminated line and contain no other
    pub fn from_lines(lines: Vec<Line>) -> Self {
        debug_assert!(is_well_formed(&lines));
        Self {
            tree: SumTree::from_items(lines),
        }
    }

    pub fn num_lines(&self) -> usize {
        self.tree.len()
    }

    pub fn num_chars(&self) -> usize {
        self.tree.summary().chars
    }

    pub fn num_codepoints(&self) -> usize {
        self.tree.summary().codepoints
    }

    pub fn num_linebreaks(&self) -> usize {
        self.tree.summary().linebreaks
    }

    pub fn line(&self, index: usize) -> Option<LinePos> {
        self.tree.locate(index).map(|l| LinePos {
            index: l.index,
            first_char: l.before.chars,
            first_codepoint: l.before.codepoints,
            line: *l.item,
        })
    }

    pub fn lines(&self) -> impl Iterator<Item = &Line> + '_ {
        self.tree.iter()
    }

    /// Line containing character `offset`, and the offset within it.
    /// Offsets past the end clamp to the end of the last line.
    pub fn line_at_char(&self, offset: usize) -> (LinePos, usize) {
        self.locate(offset, |s| s.chars)
    }

    /// Line containing codepoint `offset`, and the offset within it.
    /// The second codepoint of a `Crlf` belongs to the line it terminates.
    pub fn line_at_codepoint(&self, offset: usize) -> (LinePos, usize) {
        self.locate(offset, |s| s.codepoints)
    }

    fn locate<F>(&self, target: usize, measure: F) -> (LinePos, usize)
    where
        F: Fn(&LineSum) -> usize,
    {
        let located = self
            .tree
            .find(target, &measure, Bias::Right)
            .or_else(|| self.tree.locate(self.tree.len() - 1))
            .expect("line registry always holds a line");
        let start = measure(&located.before);
        let len = measure(&located.item.summary());
        let pos = LinePos {
            index: located.index,
            first_char: located.before.chars,
            first_codepoint: located.before.codepoints,
            line: *located.item,
        };
        (pos, target.saturating_sub(start).min(len))
    }

    /// Replace codepoints `[begin, end)` with the text described by `lines`.
    ///
    /// `lines` describes the inserted text the same way a whole text is
    /// described: zero or more terminated lines followed by exactly one
    /// unterminated line. Either end of the range may split a `Crlf`.
    pub fn replace_codepoints(&mut self, begin: usize, end: usize, lines: &[Line]) {
        assert!(
            begin <= end && end <= self.num_codepoints(),
            "codepoint range {begin}..{end} out of bounds ({})",
            self.num_codepoints()
        );
        debug_assert!(is_well_formed(lines));

        let (first, head_offset) = self.line_at_codepoint(begin);
        let (last, tail_offset) = self.line_at_codepoint(end);

        let mut out = Vec::with_capacity(lines.len() + 1);
        // Text of the first line before `begin`
        let mut content = if head_offset <= first.line.nonbreak_chars {
            head_offset
        } else {
            // Between the `\r` and `\n` of a `Crlf`
            out.push(Line::new(first.line.nonbreak_chars, LineEnding::Cr));
            0
        };

        let (unterminated, terminated) = lines
            .split_last()
            .expect("replacement text has at least one line");
        for line in terminated {
            out.push(Line::new(content + line.nonbreak_chars, line.ending));
            content = 0;
        }
        content += unterminated.nonbreak_chars;

        // Text of the last line from `end` on
        let tail = if tail_offset <= last.line.nonbreak_chars {
            Line::new(last.line.nonbreak_chars - tail_offset, last.line.ending)
        } else {
            Line::new(0, LineEnding::Lf)
        };
        out.push(Line::new(content + tail.nonbreak_chars, tail.ending));

        merge_crlf(&mut out);
        let produced = out.len();
        self.tree.splice(first.index..last.index + 1, out);

        // The replacement may now adjoin a `\r` or `\n` on either side
        self.try_merge_rn_linebreak(first.index + produced - 1);
        if first.index > 0 {
            self.try_merge_rn_linebreak(first.index - 1);
        }
    }

    pub fn insert_codepoints(&mut self, at: usize, lines: &[Line]) {
        self.replace_codepoints(at, at, lines);
    }

    pub fn erase_codepoints(&mut self, begin: usize, end: usize) {
        self.replace_codepoints(begin, end, &[Line::default()]);
    }

    /// Insert `lines` at character `offset` of line `line`
    pub fn insert_chars(&mut self, line: usize, offset: usize, lines: &[Line]) {
        let at = self.char_position_to_codepoint(line, offset);
        self.insert_codepoints(at, lines);
    }

    /// Erase from (`begin_line`, `begin_offset`) up to (`end_line`,
    /// `end_offset`), character offsets within their lines.
    pub fn erase_chars(
        &mut self,
        begin_line: usize,
        begin_offset: usize,
        end_line: usize,
        end_offset: usize,
    ) -> TextClipInfo {
        let (begin_line, begin_offset) = self.normalize_char_position(begin_line, begin_offset);
        let (end_line, end_offset) = self.normalize_char_position(end_line, end_offset);
        assert!(
            (begin_line, begin_offset) <= (end_line, end_offset),
            "erase range is reversed"
        );

        let mut clipped = Vec::with_capacity(end_line - begin_line + 1);
        if begin_line == end_line {
            clipped.push(Line::new(end_offset - begin_offset, LineEnding::None));
        } else {
            let first = self.line_unchecked(begin_line);
            clipped.push(Line::new(
                first.line.nonbreak_chars - begin_offset,
                first.line.ending,
            ));
            clipped.extend(
                self.tree
                    .iter_from(begin_line + 1)
                    .take(end_line - begin_line - 1)
                    .copied(),
            );
            clipped.push(Line::new(end_offset, LineEnding::None));
        }
        let removed_chars = clipped.iter().map(Line::chars).sum();

        let begin = self.char_position_to_codepoint(begin_line, begin_offset);
        let end = self.char_position_to_codepoint(end_line, end_offset);
        self.erase_codepoints(begin, end);

        TextClipInfo {
            removed_chars,
            lines: clipped,
        }
    }

    /// Merge line `index` into a `Crlf` when it ends in `\r` and the next
    /// line is a bare `\n`. Returns whether a merge happened.
    pub fn try_merge_rn_linebreak(&mut self, index: usize) -> bool {
        let (Some(&line), Some(&next)) = (self.tree.get(index), self.tree.get(index + 1)) else {
            return false;
        };
        if line.ending != LineEnding::Cr || next != Line::new(0, LineEnding::Lf) {
            return false;
        }
        self.tree.splice(
            index..index + 2,
            vec![Line::new(line.nonbreak_chars, LineEnding::Crlf)],
        );
        true
    }

    fn line_unchecked(&self, index: usize) -> LinePos {
        self.line(index)
            .unwrap_or_else(|| panic!("line {index} out of bounds ({})", self.num_lines()))
    }

    /// An offset just past a terminator names the start of the next line
    fn normalize_char_position(&self, line: usize, offset: usize) -> (usize, usize) {
        let pos = self.line_unchecked(line);
        assert!(
            offset <= pos.line.chars(),
            "offset {offset} past end of line {line}"
        );
        if offset > pos.line.nonbreak_chars {
            (line + 1, 0)
        } else {
            (line, offset)
        }
    }

    fn char_position_to_codepoint(&self, line: usize, offset: usize) -> usize {
        let pos = self.line_unchecked(line);
        assert!(
            offset <= pos.line.chars(),
            "offset {offset} past end of line {line}"
        );
        pos.first_codepoint + pos.line.char_to_codepoint(offset)
    }
}

/// Collapse `{x, Cr}` followed by `{0, Lf}` into `{x, Crlf}`
fn merge_crlf(lines: &mut Vec<Line>) {
    let mut i = 0;
    while i + 1 < lines.len() {
        if lines[i].ending == LineEnding::Cr && lines[i + 1] == Line::new(0, LineEnding::Lf) {
            lines[i].ending = LineEnding::Crlf;
            lines.remove(i + 1);
        }
        i += 1;
    }
}

fn is_well_formed(lines: &[Line]) -> bool {
    match lines.split_last() {
        Some((last, rest)) => {
            last.ending == LineEnding::None && rest.iter().all(|l| l.ending.is_break())
        }
        None => false,
    }
}

/// Splits a stream of codepoint values into lines
#[derive(Debug, Default)]
pub struct LineAnalyzer {
    content: usize,
    pending_cr: bool,
    lines: Vec<Line>,
}

impl LineAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the value of the next codepoint (0 for an invalid one)
    pub fn feed(&mut self, value: u32) {
        if self.pending_cr {
            self.pending_cr = false;
            if value == LF {
                self.terminate(LineEnding::Crlf);
                return;
            }
            self.terminate(LineEnding::Cr);
        }
        match value {
            CR => self.pending_cr = true,
            LF => self.terminate(LineEnding::Lf),
            _ => self.content += 1,
        }
    }

    fn terminate(&mut self, ending: LineEnding) {
        self.lines.push(Line::new(self.content, ending));
        self.content = 0;
    }

    /// Lines fed so far, ending with the unterminated remainder
    pub fn finish(mut self) -> Vec<Line> {
        if self.pending_cr {
            self.terminate(LineEnding::Cr);
        }
        self.lines.push(Line::new(self.content, LineEnding::None));
        self.lines
    }

    pub fn analyze(values: impl IntoIterator<Item = u32>) -> Vec<Line> {
        let mut analyzer = Self::new();
        for value in values {
            analyzer.feed(value);
        }
        analyzer.finish()
    }
}

#[cfg(test)]
#[path = "lines_tests.rs"]
mod tests;
