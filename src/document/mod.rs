//! Document: a byte buffer, its interpretation and a set of carets
//!
//! Edits are expressed at the carets in character offsets and applied to
//! the buffer as one batch, so that the interpretation is repaired once per
//! operation regardless of how many carets there are.

use std::cell::{Ref, RefCell};
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::buffer::ByteBuffer;
use crate::caret::{Caret, CaretByteCache, CaretSet};
use crate::character::LineEnding;
use crate::config::InterpretationConfig;
use crate::constants::error_types::INVALID_CURSOR;
use crate::encoding::Encoding;
use crate::error::{Result, RiftError};
use crate::interpretation::Interpretation;

/// Unique identifier for documents
pub type DocumentId = u64;

pub struct Document {
    pub id: DocumentId,
    buffer: ByteBuffer,
    interpretation: Rc<RefCell<Interpretation>>,
    carets: CaretSet,
    cache: CaretByteCache,
    /// Terminator written by [`Document::insert_newline`]
    line_ending: LineEnding,
    file_path: Option<PathBuf>,
    last_saved_revision: u64,
}

impl Document {
    /// Create a new empty document
    pub fn new(id: DocumentId, encoding: Box<dyn Encoding>) -> Result<Self> {
        Self::from_bytes(id, Vec::new(), encoding, InterpretationConfig::default())
    }

    pub fn from_bytes(
        id: DocumentId,
        bytes: Vec<u8>,
        encoding: Box<dyn Encoding>,
        config: InterpretationConfig,
    ) -> Result<Self> {
        let mut buffer = ByteBuffer::from_bytes(bytes);
        let interpretation = Interpretation::attach(&mut buffer, encoding, config)?;
        Ok(Document {
            id,
            buffer,
            interpretation,
            carets: CaretSet::default(),
            cache: CaretByteCache::new(),
            line_ending: LineEnding::Lf,
            file_path: None,
            last_saved_revision: 0,
        })
    }

    /// Encode `text` with `encoding` into a new document
    pub fn from_text(id: DocumentId, text: &str, encoding: Box<dyn Encoding>) -> Result<Self> {
        let bytes = encoding.encode_str(text);
        Self::from_bytes(id, bytes, encoding, InterpretationConfig::default())
    }

    /// Load document from file
    pub fn from_file(
        id: DocumentId,
        path: impl AsRef<Path>,
        encoding: Box<dyn Encoding>,
        config: InterpretationConfig,
    ) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let mut doc = Self::from_bytes(id, bytes, encoding, config)?;
        doc.file_path = Some(path.to_path_buf());
        Ok(doc)
    }

    pub fn buffer(&self) -> &ByteBuffer {
        &self.buffer
    }

    pub fn interpretation(&self) -> Ref<'_, Interpretation> {
        self.interpretation.borrow()
    }

    /// Whole text, invalid codepoints shown as U+FFFD
    pub fn text(&self) -> String {
        self.interpretation.borrow().text_lossy(&self.buffer)
    }

    pub fn carets(&self) -> &CaretSet {
        &self.carets
    }

    /// Replace the caret set. Every endpoint must lie within the text.
    pub fn set_carets(&mut self, carets: impl IntoIterator<Item = Caret>) -> Result<()> {
        let carets = CaretSet::new(carets);
        let len = self.interpretation.borrow().character_count();
        if let Some(bad) = carets.iter().find(|c| c.end() > len) {
            return Err(RiftError::range(
                INVALID_CURSOR,
                format!(
                    "caret {}..{} past end of text ({len} characters)",
                    bad.caret, bad.anchor
                ),
            ));
        }
        self.carets = carets;
        Ok(())
    }

    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    pub fn set_line_ending(&mut self, ending: LineEnding) {
        debug_assert!(ending.is_break());
        self.line_ending = ending;
    }

    /// Current revision number (incremented on edits)
    pub fn revision(&self) -> u64 {
        self.interpretation.borrow().revision()
    }

    /// Check if document has unsaved changes
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.revision() != self.last_saved_revision
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Replace every selection with `text` and place the carets after it
    pub fn insert_text(&mut self, text: &str) -> Result<()> {
        let encoded = self.interpretation.borrow().encoding().encode_str(text);
        let ranges: Vec<Range<usize>> = {
            let interp = self.interpretation.borrow();
            self.cache
                .get(&interp, &self.buffer, self.carets.as_slice())
                .iter()
                .map(|bytes| bytes.range())
                .collect()
        };
        self.replace_ranges(&ranges, &encoded)
    }

    pub fn insert_newline(&mut self) -> Result<()> {
        self.insert_text(self.line_ending.as_str())
    }

    /// Delete each selection, or the character before each bare caret
    pub fn delete_backward(&mut self) -> Result<()> {
        let ranges: Vec<Range<usize>> = self
            .carets
            .iter()
            .map(|c| {
                if c.has_selection() {
                    c.range()
                } else {
                    c.caret.saturating_sub(1)..c.caret
                }
            })
            .collect();
        self.delete_characters(&ranges)
    }

    /// Delete each selection, or the character after each bare caret
    pub fn delete_forward(&mut self) -> Result<()> {
        let len = self.interpretation.borrow().character_count();
        let ranges: Vec<Range<usize>> = self
            .carets
            .iter()
            .map(|c| {
                if c.has_selection() {
                    c.range()
                } else {
                    c.caret..(c.caret + 1).min(len)
                }
            })
            .collect();
        self.delete_characters(&ranges)
    }

    /// Carets whose range is empty stay where they are
    fn delete_characters(&mut self, ranges: &[Range<usize>]) -> Result<()> {
        let spans: Vec<Caret> = ranges
            .iter()
            .map(|r| Caret::with_selection(r.end, r.start))
            .collect();
        let bytes: Vec<Range<usize>> = {
            let interp = self.interpretation.borrow();
            self.cache
                .get(&interp, &self.buffer, &spans)
                .iter()
                .map(|bytes| bytes.range())
                .collect()
        };
        self.replace_ranges(&bytes, &[])
    }

    /// Replace ascending, disjoint byte ranges with `bytes` in one batch and
    /// collapse the carets to the end of each replacement
    fn replace_ranges(&mut self, ranges: &[Range<usize>], bytes: &[u8]) -> Result<()> {
        let mut modifier = self.buffer.modify();
        for range in ranges {
            modifier.replace(range.start, range.len(), bytes)?;
        }
        let modifications = modifier.commit();
        tracing::debug!(
            document = self.id,
            carets = ranges.len(),
            records = modifications.len(),
            "document edit"
        );

        let mut shift: isize = 0;
        let mut ends = Vec::with_capacity(ranges.len());
        for range in ranges {
            let start = range
                .start
                .checked_add_signed(shift)
                .expect("ranges are ascending");
            ends.push(start + bytes.len());
            shift += bytes.len() as isize - range.len() as isize;
        }

        let interp = self.interpretation.borrow();
        let mut converter = interp.character_byte_converter(&self.buffer);
        let carets: Vec<Caret> = ends
            .into_iter()
            .map(|byte| Caret::new(converter.byte_to_character(byte)))
            .collect();
        self.carets = CaretSet::new(carets);
        Ok(())
    }

    /// Check if document has an associated file path
    #[must_use]
    pub fn has_path(&self) -> bool {
        self.file_path.is_some()
    }

    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    /// Get display name for UI (filename or "[No Name]")
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.file_path
            .as_ref()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .unwrap_or("[No Name]")
    }

    /// Save document to its current path
    pub fn save(&mut self) -> Result<()> {
        let path = self.file_path.clone().ok_or_else(|| {
            RiftError::from(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "No file path",
            ))
        })?;
        self.write_to_file(&path)?;
        self.last_saved_revision = self.revision();
        Ok(())
    }

    pub fn save_as(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.write_to_file(path)?;
        self.file_path = Some(path.to_path_buf());
        self.last_saved_revision = self.revision();
        Ok(())
    }

    /// Atomic write to file
    fn write_to_file(&self, path: &Path) -> Result<()> {
        use std::fs;
        use std::io::Write;

        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        let temp_path = parent.join(format!(
            ".{}.tmp",
            path.file_name().and_then(|n| n.to_str()).unwrap_or("file")
        ));

        {
            let mut file = fs::File::create(&temp_path)?;
            file.write_all(self.buffer.bytes())?;
            file.sync_all()?;
        }

        fs::rename(&temp_path, path)?;
        tracing::debug!(path = %path.display(), bytes = self.buffer.len(), "saved document");
        Ok(())
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("id", &self.id)
            .field("path", &self.file_path)
            .field("carets", &self.carets)
            .field("interpretation", &*self.interpretation.borrow())
            .finish()
    }
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
