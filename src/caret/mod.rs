//! Carets, caret sets and the caret byte-position cache
//!
//! Carets live in character offsets. Editing needs byte offsets, and
//! converting each caret from scratch costs a tree lookup per endpoint. The
//! [`CaretByteCache`] converts all endpoints of a caret set in one ascending
//! sweep with a single converter and keeps the result until the
//! interpretation's revision (or the caret set) changes.

use std::ops::Range;

use crate::buffer::ByteBuffer;
use crate::interpretation::Interpretation;

/// A caret with an optional selection.
///
/// `anchor` is the other end of the selection; it may lie before or after
/// `caret`. Without a selection both are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Caret {
    pub caret: usize,
    pub anchor: usize,
}

impl Caret {
    pub const fn new(offset: usize) -> Self {
        Self {
            caret: offset,
            anchor: offset,
        }
    }

    pub const fn with_selection(caret: usize, anchor: usize) -> Self {
        Self { caret, anchor }
    }

    pub fn start(&self) -> usize {
        self.caret.min(self.anchor)
    }

    pub fn end(&self) -> usize {
        self.caret.max(self.anchor)
    }

    pub fn range(&self) -> Range<usize> {
        self.start()..self.end()
    }

    pub fn has_selection(&self) -> bool {
        self.caret != self.anchor
    }
}

/// Carets sorted by start with overlapping or touching selections merged
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaretSet {
    carets: Vec<Caret>,
}

impl Default for CaretSet {
    fn default() -> Self {
        Self {
            carets: vec![Caret::new(0)],
        }
    }
}

impl CaretSet {
    pub fn new(carets: impl IntoIterator<Item = Caret>) -> Self {
        let mut carets: Vec<Caret> = carets.into_iter().collect();
        if carets.is_empty() {
            return Self::default();
        }
        carets.sort_by_key(|c| (c.start(), c.end()));
        let mut merged: Vec<Caret> = Vec::with_capacity(carets.len());
        for caret in carets {
            match merged.last_mut() {
                Some(last) if caret.start() <= last.end() => {
                    if caret.end() > last.end() {
                        *last = Caret::with_selection(caret.end(), last.start());
                    }
                }
                _ => merged.push(caret),
            }
        }
        Self { carets: merged }
    }

    pub fn as_slice(&self) -> &[Caret] {
        &self.carets
    }

    pub fn len(&self) -> usize {
        self.carets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.carets.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Caret> {
        self.carets.iter()
    }
}

/// Byte offsets of one caret
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaretBytes {
    pub caret: usize,
    pub anchor: usize,
}

impl CaretBytes {
    pub fn range(&self) -> Range<usize> {
        self.caret.min(self.anchor)..self.caret.max(self.anchor)
    }
}

#[derive(Debug, Default)]
pub struct CaretByteCache {
    revision: Option<u64>,
    carets: Vec<Caret>,
    positions: Vec<CaretBytes>,
}

impl CaretByteCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn invalidate(&mut self) {
        self.revision = None;
    }

    pub fn is_valid_for(&self, interp: &Interpretation, carets: &[Caret]) -> bool {
        self.revision == Some(interp.revision()) && self.carets == carets
    }

    /// Byte positions of `carets`, in the same order
    pub fn get(
        &mut self,
        interp: &Interpretation,
        buffer: &ByteBuffer,
        carets: &[Caret],
    ) -> &[CaretBytes] {
        if !self.is_valid_for(interp, carets) {
            self.positions = compute(interp, buffer, carets);
            self.carets = carets.to_vec();
            self.revision = Some(interp.revision());
        }
        &self.positions
    }
}

/// Convert every endpoint with one converter, visiting them in ascending
/// character order
fn compute(interp: &Interpretation, buffer: &ByteBuffer, carets: &[Caret]) -> Vec<CaretBytes> {
    let endpoints: Vec<usize> = carets.iter().flat_map(|c| [c.caret, c.anchor]).collect();
    let mut order: Vec<usize> = (0..endpoints.len()).collect();
    if !endpoints.windows(2).all(|w| w[0] <= w[1]) {
        order.sort_by_key(|&i| endpoints[i]);
    }

    let mut converter = interp.character_byte_converter(buffer);
    let mut bytes = vec![0; endpoints.len()];
    for i in order {
        bytes[i] = converter.character_to_byte(endpoints[i]);
    }
    bytes
        .chunks_exact(2)
        .map(|pair| CaretBytes {
            caret: pair[0],
            anchor: pair[1],
        })
        .collect()
}
