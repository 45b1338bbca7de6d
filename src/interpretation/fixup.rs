//! Incremental repair of the chunk index and line registry after an edit batch
//!
//! Edits are processed in ascending order. Positions of later records are in
//! pre-edit coordinates, so `delta` carries the net byte shift of everything
//! already repaired. For each group of records the decoder restarts a few
//! bytes before the first edit (a codepoint may have ended there) and decodes
//! new content until its position lands exactly on an old chunk boundary
//! beyond the edited region. From there on old and new decoding agree, so
//! the old chunks in between are replaced by the freshly decoded ones.
//! A record that starts before that boundary joins the current group.

use super::chunks::{Chunk, ChunkBuilder, ChunkIndex};
use super::lines::{Line, LineAnalyzer, LineRegistry};
use crate::buffer::Modification;
use crate::encoding::Encoding;
use crate::tree::Bias;

/// Decodes a byte region into chunks and lines
pub(super) struct RegionDecoder<'a> {
    encoding: &'a dyn Encoding,
    bytes: &'a [u8],
    pos: usize,
    chunks: ChunkBuilder,
    lines: LineAnalyzer,
}

impl<'a> RegionDecoder<'a> {
    pub fn new(
        encoding: &'a dyn Encoding,
        bytes: &'a [u8],
        start: usize,
        max_codepoints: usize,
    ) -> Self {
        Self {
            encoding,
            bytes,
            pos: start,
            chunks: ChunkBuilder::new(max_codepoints),
            lines: LineAnalyzer::new(),
        }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Decode whole codepoints until reaching `target` or the end of input.
    /// The position may overshoot `target` by less than one codepoint.
    pub fn decode_until(&mut self, target: usize) {
        while self.pos < target {
            let Some(decoded) = self.encoding.decode_at(self.bytes, self.pos) else {
                break;
            };
            self.pos += decoded.len;
            self.chunks.push(decoded.len);
            self.lines.feed(decoded.line_break_value());
        }
    }

    pub fn codepoints(&self) -> usize {
        self.chunks.codepoints()
    }

    pub fn finish(self) -> (Vec<Chunk>, Vec<Line>) {
        (self.chunks.finish(), self.lines.finish())
    }
}

/// Restart point remembered across groups of one batch
#[derive(Debug, Clone, Copy)]
struct Cursor {
    index: usize,
    byte: usize,
    codepoint: usize,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FixupStats {
    /// Number of independently repaired regions
    pub groups: usize,
    pub chunks_removed: usize,
    pub chunks_inserted: usize,
    /// Bytes decoded in total
    pub bytes_decoded: usize,
}

fn shift(pos: usize, delta: isize) -> usize {
    pos.checked_add_signed(delta)
        .expect("edit position shifted below zero")
}

/// Bring `chunks` and `lines` in line with `bytes`, the buffer content after
/// `modifications` (ascending, non-overlapping, pre-edit positions).
pub(super) fn apply(
    chunks: &mut ChunkIndex,
    lines: &mut LineRegistry,
    encoding: &dyn Encoding,
    max_codepoints: usize,
    bytes: &[u8],
    modifications: &[Modification],
) -> FixupStats {
    let lookbehind = encoding.max_codepoint_len().saturating_sub(1);
    let mut stats = FixupStats::default();
    let mut delta: isize = 0;
    let mut resume: Option<Cursor> = None;
    let mut next = 0;

    while next < modifications.len() {
        let first = modifications[next];
        next += 1;
        if first.removed == 0 && first.added == 0 {
            continue;
        }

        let edit_pos = shift(first.position, delta);
        let suspect = edit_pos.saturating_sub(lookbehind);
        let start = match resume {
            Some(cursor) if reusable(chunks, cursor, suspect) => cursor,
            _ => restart_point(chunks, suspect),
        };

        let mut decoder = RegionDecoder::new(encoding, bytes, start.byte, max_codepoints);
        // Shift of old content past the records absorbed so far
        let mut gap = first.added as isize - first.removed as isize;
        let mut target = edit_pos + first.added;
        let mut absorbed = 1;

        let boundary = loop {
            decoder.decode_until(target);
            let pos = decoder.pos();
            assert!(
                pos >= target,
                "fixup ran out of input at byte {pos} before reaching {target}"
            );
            let boundary = chunks.boundary_at_or_after(shift(pos, -gap));
            let sync = shift(boundary.byte, gap);

            if let Some(record) = modifications.get(next) {
                let record_pos = shift(record.position, delta + gap);
                // Decoding already crossed into the record's bytes
                if sync > record_pos || pos > record_pos {
                    gap += record.added as isize - record.removed as isize;
                    target = record_pos + record.added;
                    next += 1;
                    absorbed += 1;
                    continue;
                }
            }
            if pos == sync {
                break boundary;
            }
            target = sync;
        };

        let new_codepoints = decoder.codepoints();
        let sync_byte = decoder.pos();
        stats.bytes_decoded += sync_byte - start.byte;
        let (new_chunks, new_lines) = decoder.finish();
        let inserted = new_chunks.len();
        let end_index = boundary.index.max(start.index);

        tracing::trace!(
            start = start.byte,
            sync = sync_byte,
            absorbed,
            removed_chunks = end_index - start.index,
            inserted_chunks = inserted,
            "fixup group"
        );
        stats.groups += 1;
        stats.chunks_removed += end_index - start.index;
        stats.chunks_inserted += inserted;

        let last_new = new_chunks.last().copied();
        chunks.splice(start.index..end_index, new_chunks);
        lines.replace_codepoints(
            start.codepoint,
            boundary.codepoint.max(start.codepoint),
            &new_lines,
        );

        resume = Some(merge_edges(
            chunks,
            max_codepoints,
            start,
            inserted,
            last_new,
            sync_byte,
            start.codepoint + new_codepoints,
        ));
        delta += gap;
    }

    stats
}

/// Old chunk to restart decoding from for an edit whose earliest affected
/// byte is `suspect`
fn restart_point(chunks: &ChunkIndex, suspect: usize) -> Cursor {
    match chunks.find_by_byte(suspect, Bias::Left) {
        Some(pos) => Cursor {
            index: pos.index,
            byte: pos.byte,
            codepoint: pos.codepoint,
        },
        None => {
            let end = chunks.end();
            Cursor {
                index: end.index,
                byte: end.byte,
                codepoint: end.codepoint,
            }
        }
    }
}

fn reusable(chunks: &ChunkIndex, cursor: Cursor, suspect: usize) -> bool {
    cursor.byte <= suspect
        && chunks
            .get(cursor.index)
            .is_some_and(|pos| suspect <= pos.end_byte())
}

/// Merge undersized chunks across both edges of a splice of `inserted`
/// chunks at `start`. Returns a restart cursor at or before `sync_byte`.
fn merge_edges(
    chunks: &mut ChunkIndex,
    max_codepoints: usize,
    start: Cursor,
    inserted: usize,
    last_new: Option<Chunk>,
    sync_byte: usize,
    sync_codepoint: usize,
) -> Cursor {
    let previous = start
        .index
        .checked_sub(1)
        .and_then(|index| chunks.get(index));

    let mut cursor = match last_new {
        Some(last) => {
            chunks.merge_with_next(start.index + inserted - 1, max_codepoints);
            Cursor {
                index: start.index + inserted - 1,
                byte: sync_byte - last.num_bytes,
                codepoint: sync_codepoint - last.num_codepoints,
            }
        }
        None => Cursor {
            index: start.index,
            byte: start.byte,
            codepoint: start.codepoint,
        },
    };

    if let Some(prev) = previous {
        if chunks.merge_with_next(prev.index, max_codepoints) {
            if cursor.index == start.index {
                // The cursor chunk was folded into its predecessor
                cursor = Cursor {
                    index: prev.index,
                    byte: prev.byte,
                    codepoint: prev.codepoint,
                };
            } else {
                cursor.index -= 1;
            }
        }
    }
    cursor
}

#[cfg(test)]
#[path = "fixup_tests.rs"]
mod tests;
