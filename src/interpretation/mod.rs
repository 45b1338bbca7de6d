//! Interpretation of an encoded byte buffer as codepoints, characters and lines
//!
//! An [`Interpretation`] attaches to a [`ByteBuffer`] and keeps two indexes
//! in sync with it:
//!
//! - the chunk index, which splits the buffer into runs of codepoints and
//!   answers byte/codepoint rank queries
//! - the line registry, which answers character/codepoint/line queries
//!
//! Both are repaired incrementally after each edit batch: only the region
//! around an edit is re-decoded, no matter how large the buffer is.
//!
//! ## Positions
//!
//! A *codepoint* is one decoded unit of the encoding (malformed bytes decode
//! to an invalid codepoint). A *character* is a codepoint, except that
//! `\r\n` is a single character made of two codepoints.

mod chunks;
mod convert;
mod fixup;
mod iter;
mod lines;

pub use chunks::{Chunk, ChunkPos};
pub use convert::{CharacterByteConverter, CharacterCodepointConverter, CodepointByteConverter};
pub use fixup::FixupStats;
pub use iter::{CharacterIter, CodepointInfo, CodepointIter};
pub use lines::{Line, LineAnalyzer, LinePos, LineRegistry, TextClipInfo};

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use chunks::ChunkIndex;
use fixup::RegionDecoder;

use crate::buffer::{ByteBuffer, EditObserver, Modification, Subscription};
use crate::config::InterpretationConfig;
use crate::encoding::Encoding;
use crate::error::Result;

type Listener = Box<dyn FnMut(u64)>;

pub struct Interpretation {
    encoding: Box<dyn Encoding>,
    config: InterpretationConfig,
    chunks: ChunkIndex,
    lines: LineRegistry,
    revision: u64,
    last_fixup: FixupStats,
    listeners: Vec<(u64, Listener)>,
    next_listener_id: u64,
    subscription: Option<Subscription>,
}

impl Interpretation {
    /// Interpret the current content of `buffer` without following its edits
    pub fn new(
        buffer: &ByteBuffer,
        encoding: Box<dyn Encoding>,
        config: InterpretationConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(buffer.bytes(), encoding, config))
    }

    /// Interpret `buffer` and stay in sync with every later edit batch.
    /// The subscription ends when the interpretation is dropped.
    pub fn attach(
        buffer: &mut ByteBuffer,
        encoding: Box<dyn Encoding>,
        config: InterpretationConfig,
    ) -> Result<Rc<RefCell<Self>>> {
        config.validate()?;
        Ok(Rc::new_cyclic(|weak: &Weak<RefCell<Self>>| {
            let mut interp = Self::build(buffer.bytes(), encoding, config);
            let observer: Weak<RefCell<dyn EditObserver>> = weak.clone();
            interp.subscription = Some(buffer.subscribe(observer));
            RefCell::new(interp)
        }))
    }

    fn build(bytes: &[u8], encoding: Box<dyn Encoding>, config: InterpretationConfig) -> Self {
        let mut decoder = RegionDecoder::new(
            encoding.as_ref(),
            bytes,
            0,
            config.max_codepoints_per_chunk,
        );
        decoder.decode_until(bytes.len());
        let (chunks, lines) = decoder.finish();
        let chunks = ChunkIndex::from_chunks(chunks);
        let lines = LineRegistry::from_lines(lines);
        tracing::debug!(
            encoding = encoding.name(),
            bytes = bytes.len(),
            chunks = chunks.len(),
            lines = lines.num_lines(),
            "built interpretation"
        );
        Self {
            encoding,
            config,
            chunks,
            lines,
            revision: 0,
            last_fixup: FixupStats::default(),
            listeners: Vec::new(),
            next_listener_id: 0,
            subscription: None,
        }
    }

    pub fn is_attached(&self) -> bool {
        self.subscription.is_some()
    }

    /// Stop following buffer edits
    pub fn detach(&mut self) {
        self.subscription = None;
    }

    pub fn encoding(&self) -> &dyn Encoding {
        self.encoding.as_ref()
    }

    pub fn config(&self) -> &InterpretationConfig {
        &self.config
    }

    /// Incremented once per applied edit batch
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Statistics of the most recent fixup
    pub fn last_fixup(&self) -> FixupStats {
        self.last_fixup
    }

    pub fn byte_count(&self) -> usize {
        self.chunks.total_bytes()
    }

    pub fn codepoint_count(&self) -> usize {
        self.chunks.total_codepoints()
    }

    pub fn character_count(&self) -> usize {
        self.lines.num_chars()
    }

    pub fn line_count(&self) -> usize {
        self.lines.num_lines()
    }

    pub fn linebreak_count(&self) -> usize {
        self.lines.num_linebreaks()
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> + '_ {
        self.chunks.iter()
    }

    pub fn chunk(&self, index: usize) -> Option<ChunkPos> {
        self.chunks.get(index)
    }

    pub fn lines(&self) -> impl Iterator<Item = &Line> + '_ {
        self.lines.lines()
    }

    pub fn line_registry(&self) -> &LineRegistry {
        &self.lines
    }

    pub fn line_info(&self, index: usize) -> Option<LinePos> {
        self.lines.line(index)
    }

    /// Line containing character `offset` and the offset within that line
    pub fn line_of_character(&self, offset: usize) -> (LinePos, usize) {
        self.lines.line_at_char(offset)
    }

    pub fn line_of_codepoint(&self, offset: usize) -> (LinePos, usize) {
        self.lines.line_at_codepoint(offset)
    }

    pub fn codepoint_byte_converter<'a>(
        &'a self,
        buffer: &'a ByteBuffer,
    ) -> CodepointByteConverter<'a> {
        CodepointByteConverter::new(self, buffer)
    }

    pub fn character_codepoint_converter(&self) -> CharacterCodepointConverter<'_> {
        CharacterCodepointConverter::new(self)
    }

    pub fn character_byte_converter<'a>(
        &'a self,
        buffer: &'a ByteBuffer,
    ) -> CharacterByteConverter<'a> {
        CharacterByteConverter::new(self, buffer)
    }

    /// Iterate codepoints starting at codepoint `offset`
    pub fn codepoint_iterator_at<'a>(
        &'a self,
        buffer: &'a ByteBuffer,
        offset: usize,
    ) -> CodepointIter<'a> {
        let byte = self.codepoint_byte_converter(buffer).codepoint_to_byte(offset);
        CodepointIter::new(self.encoding.as_ref(), buffer.bytes(), byte)
    }

    /// Iterate characters starting at character `offset`
    pub fn character_iterator_at<'a>(
        &'a self,
        buffer: &'a ByteBuffer,
        offset: usize,
    ) -> CharacterIter<'a> {
        let byte = self.character_byte_converter(buffer).character_to_byte(offset);
        CharacterIter::new(CodepointIter::new(
            self.encoding.as_ref(),
            buffer.bytes(),
            byte,
        ))
    }

    /// The whole text, with invalid codepoints replaced by U+FFFD
    pub fn text_lossy(&self, buffer: &ByteBuffer) -> String {
        let mut text = String::with_capacity(buffer.len());
        for character in self.character_iterator_at(buffer, 0) {
            text.push_str(&character.to_string());
        }
        text
    }

    /// Register `listener` to run with the new revision after every batch
    pub fn on_content_changed(&mut self, listener: impl FnMut(u64) + 'static) -> u64 {
        let id = self.next_listener_id;
        self.next_listener_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn remove_listener(&mut self, id: u64) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    /// Re-decode the whole buffer and compare against both indexes.
    /// Every mismatch is logged; returns whether none was found.
    pub fn check_integrity(&self, buffer: &ByteBuffer) -> bool {
        let bytes = buffer.bytes();
        let encoding = self.encoding.as_ref();
        let mut ok = true;

        if self.chunks.total_bytes() != bytes.len() {
            tracing::warn!(
                indexed = self.chunks.total_bytes(),
                buffer = bytes.len(),
                "chunk index does not cover the buffer"
            );
            ok = false;
        }

        let max = self.config.max_codepoints_per_chunk;
        let mut start = 0;
        for (index, chunk) in self.chunks.iter().enumerate() {
            if chunk.num_codepoints == 0 || chunk.num_codepoints > max {
                tracing::warn!(index, codepoints = chunk.num_codepoints, max, "chunk size out of range");
                ok = false;
            }
            let mut end = start;
            for _ in 0..chunk.num_codepoints {
                match encoding.decode_at(bytes, end) {
                    Some(decoded) => end += decoded.len,
                    None => break,
                }
            }
            if end - start != chunk.num_bytes {
                tracing::warn!(
                    index,
                    start,
                    recorded = chunk.num_bytes,
                    decoded = end - start,
                    "chunk does not match decoded bytes"
                );
                ok = false;
            }
            start += chunk.num_bytes;
        }

        if self.chunks.total_codepoints() != self.lines.num_codepoints() {
            tracing::warn!(
                chunks = self.chunks.total_codepoints(),
                lines = self.lines.num_codepoints(),
                "codepoint totals disagree"
            );
            ok = false;
        }

        let mut decoder = RegionDecoder::new(encoding, bytes, 0, max);
        decoder.decode_until(bytes.len());
        let (_, expected) = decoder.finish();
        let actual: Vec<Line> = self.lines.lines().copied().collect();
        if let Some(index) = first_difference(&expected, &actual) {
            tracing::warn!(
                index,
                expected = ?expected.get(index),
                actual = ?actual.get(index),
                "line registry does not match decoded lines"
            );
            ok = false;
        }

        ok
    }
}

fn first_difference(a: &[Line], b: &[Line]) -> Option<usize> {
    match a.iter().zip(b).position(|(x, y)| x != y) {
        Some(index) => Some(index),
        None if a.len() != b.len() => Some(a.len().min(b.len())),
        None => None,
    }
}

impl EditObserver for Interpretation {
    fn end_edit(&mut self, buffer: &ByteBuffer, modifications: &[Modification]) {
        let stats = fixup::apply(
            &mut self.chunks,
            &mut self.lines,
            self.encoding.as_ref(),
            self.config.max_codepoints_per_chunk,
            buffer.bytes(),
            modifications,
        );
        self.last_fixup = stats;
        self.revision += 1;
        tracing::debug!(
            revision = self.revision,
            records = modifications.len(),
            groups = stats.groups,
            decoded = stats.bytes_decoded,
            chunks = self.chunks.len(),
            lines = self.lines.num_lines(),
            "interpretation updated"
        );

        if self.config.verify_after_edit {
            assert!(
                self.check_integrity(buffer),
                "interpretation out of sync after revision {}",
                self.revision
            );
        }

        let revision = self.revision;
        for (_, listener) in &mut self.listeners {
            listener(revision);
        }
    }
}

impl std::fmt::Debug for Interpretation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interpretation")
            .field("encoding", &self.encoding.name())
            .field("revision", &self.revision)
            .field("bytes", &self.byte_count())
            .field("codepoints", &self.codepoint_count())
            .field("lines", &self.line_count())
            .field("chunks", &self.chunks.len())
            .field("attached", &self.is_attached())
            .finish()
    }
}
