//! Chunk index: byte/codepoint rank over runs of decoded codepoints

use crate::tree::{Bias, Summarize, SumTree, Summary};

/// A contiguous, non-empty run of codepoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    pub num_bytes: usize,
    pub num_codepoints: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChunkSum {
    pub bytes: usize,
    pub codepoints: usize,
}

impl Summary for ChunkSum {
    fn combine(self, other: Self) -> Self {
        Self {
            bytes: self.bytes + other.bytes,
            codepoints: self.codepoints + other.codepoints,
        }
    }
}

impl Summarize for Chunk {
    type Summary = ChunkSum;

    fn summary(&self) -> ChunkSum {
        ChunkSum {
            bytes: self.num_bytes,
            codepoints: self.num_codepoints,
        }
    }
}

/// A chunk together with its position in the sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPos {
    pub index: usize,
    /// Byte offset of the first byte of the chunk
    pub byte: usize,
    /// Codepoint offset of the first codepoint of the chunk
    pub codepoint: usize,
    pub chunk: Chunk,
}

impl ChunkPos {
    pub fn end_byte(&self) -> usize {
        self.byte + self.chunk.num_bytes
    }

    pub fn end_codepoint(&self) -> usize {
        self.codepoint + self.chunk.num_codepoints
    }
}

/// A chunk boundary: the position between chunk `index - 1` and `index`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Boundary {
    pub index: usize,
    pub byte: usize,
    pub codepoint: usize,
}

/// Ordered sequence of chunks exactly covering the buffer
#[derive(Debug, Clone, Default)]
pub struct ChunkIndex {
    tree: SumTree<Chunk>,
}

impl ChunkIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_chunks(chunks: Vec<Chunk>) -> Self {
        debug_assert!(chunks.iter().all(|c| c.num_bytes > 0 && c.num_codepoints > 0));
        Self {
            tree: SumTree::from_items(chunks),
        }
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    pub fn total_bytes(&self) -> usize {
        self.tree.summary().bytes
    }

    pub fn total_codepoints(&self) -> usize {
        self.tree.summary().codepoints
    }

    pub fn get(&self, index: usize) -> Option<ChunkPos> {
        self.tree.locate(index).map(|l| ChunkPos {
            index: l.index,
            byte: l.before.bytes,
            codepoint: l.before.codepoints,
            chunk: *l.item,
        })
    }

    /// Chunk containing byte offset `byte`. `None` past the end.
    pub fn find_by_byte(&self, byte: usize, bias: Bias) -> Option<ChunkPos> {
        self.tree
            .find(byte, |s| s.bytes, bias)
            .map(|l| ChunkPos {
                index: l.index,
                byte: l.before.bytes,
                codepoint: l.before.codepoints,
                chunk: *l.item,
            })
    }

    /// Chunk containing codepoint offset `codepoint`. `None` past the end.
    pub fn find_by_codepoint(&self, codepoint: usize, bias: Bias) -> Option<ChunkPos> {
        self.tree
            .find(codepoint, |s| s.codepoints, bias)
            .map(|l| ChunkPos {
                index: l.index,
                byte: l.before.bytes,
                codepoint: l.before.codepoints,
                chunk: *l.item,
            })
    }

    /// First chunk boundary at or after byte offset `byte`.
    /// Offsets at or past the end resolve to the end boundary.
    pub fn boundary_at_or_after(&self, byte: usize) -> Boundary {
        match self.find_by_byte(byte, Bias::Left) {
            Some(pos) => Boundary {
                index: pos.index + 1,
                byte: pos.end_byte(),
                codepoint: pos.end_codepoint(),
            },
            None => self.end(),
        }
    }

    /// The boundary after the last chunk
    pub fn end(&self) -> Boundary {
        Boundary {
            index: self.len(),
            byte: self.total_bytes(),
            codepoint: self.total_codepoints(),
        }
    }

    /// Replace the chunks in `range` with `chunks`
    pub fn splice(&mut self, range: std::ops::Range<usize>, chunks: Vec<Chunk>) {
        debug_assert!(chunks.iter().all(|c| c.num_bytes > 0 && c.num_codepoints > 0));
        self.tree.splice(range, chunks);
    }

    /// Merge chunk `index` with its successor if their combined codepoint
    /// count is below `max_codepoints`. Returns whether a merge happened.
    pub fn merge_with_next(&mut self, index: usize, max_codepoints: usize) -> bool {
        let (Some(a), Some(b)) = (self.tree.get(index), self.tree.get(index + 1)) else {
            return false;
        };
        if a.num_codepoints + b.num_codepoints >= max_codepoints {
            return false;
        }
        let merged = Chunk {
            num_bytes: a.num_bytes + b.num_bytes,
            num_codepoints: a.num_codepoints + b.num_codepoints,
        };
        self.tree.splice(index..index + 2, vec![merged]);
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = &Chunk> + '_ {
        self.tree.iter()
    }
}

/// Groups decoded codepoints into chunks of at most `max_codepoints`
#[derive(Debug)]
pub(crate) struct ChunkBuilder {
    max_codepoints: usize,
    current: Chunk,
    chunks: Vec<Chunk>,
    codepoints: usize,
}

impl ChunkBuilder {
    pub fn new(max_codepoints: usize) -> Self {
        Self {
            max_codepoints,
            current: Chunk {
                num_bytes: 0,
                num_codepoints: 0,
            },
            chunks: Vec::new(),
            codepoints: 0,
        }
    }

    /// Record one codepoint spanning `len` bytes
    pub fn push(&mut self, len: usize) {
        self.current.num_bytes += len;
        self.current.num_codepoints += 1;
        self.codepoints += 1;
        if self.current.num_codepoints >= self.max_codepoints {
            self.chunks.push(self.current);
            self.current = Chunk {
                num_bytes: 0,
                num_codepoints: 0,
            };
        }
    }

    /// Total codepoints recorded so far
    pub fn codepoints(&self) -> usize {
        self.codepoints
    }

    pub fn finish(mut self) -> Vec<Chunk> {
        if self.current.num_codepoints > 0 {
            self.chunks.push(self.current);
        }
        self.chunks
    }
}
