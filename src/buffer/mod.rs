//! Byte buffer with batched, observable edits
//!
//! `ByteBuffer` holds the raw bytes of a document. It knows nothing about
//! encodings; interpretations subscribe to it as [`EditObserver`]s and are
//! told, once per batch, which byte ranges changed.
//!
//! ## Edit batches
//!
//! All mutation goes through a [`Modifier`] obtained from
//! [`ByteBuffer::modify`]. Replacements are issued in ascending,
//! non-overlapping order using *pre-edit* byte positions. On commit (or
//! drop) the buffer:
//!
//! 1. fires `begin_edit` on every observer,
//! 2. applies all replacements to storage,
//! 3. fires `end_edit` with the list of [`Modification`] records.
//!
//! Notifications are synchronous; no observer sees a half-applied batch.

use crate::constants::error_types::{RANGE_OUT_OF_BOUNDS, UNORDERED_EDIT};
use crate::error::{Result, RiftError};
use std::cell::RefCell;
use std::ops::Range;
use std::rc::{Rc, Weak};

/// One byte-range replacement within a batch, in pre-edit coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Modification {
    /// Start of the replaced range
    pub position: usize,
    /// Number of bytes removed at `position`
    pub removed: usize,
    /// Number of bytes inserted at `position`
    pub added: usize,
}

/// Receiver of buffer edit notifications
pub trait EditObserver {
    /// Called before storage is mutated
    fn begin_edit(&mut self, _buffer: &ByteBuffer) {}

    /// Called after storage is mutated, with the batch in ascending order
    fn end_edit(&mut self, buffer: &ByteBuffer, modifications: &[Modification]);
}

type ObserverList = RefCell<Vec<(u64, Weak<RefCell<dyn EditObserver>>)>>;

/// Registration handle returned by [`ByteBuffer::subscribe`].
///
/// Dropping it removes the observer from the buffer.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    observers: Weak<ObserverList>,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(observers) = self.observers.upgrade() {
            observers.borrow_mut().retain(|(id, _)| *id != self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

/// Raw byte storage shared by all interpretations of a document
pub struct ByteBuffer {
    bytes: Vec<u8>,
    observers: Rc<ObserverList>,
    next_observer_id: u64,
    /// Monotonic counter of committed batches
    revision: u64,
}

impl ByteBuffer {
    pub fn new() -> Self {
        Self::from_bytes(Vec::new())
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            observers: Rc::new(RefCell::new(Vec::new())),
            next_observer_id: 0,
            revision: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn slice(&self, range: Range<usize>) -> &[u8] {
        &self.bytes[range]
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Number of live observers
    pub fn observer_count(&self) -> usize {
        self.observers
            .borrow()
            .iter()
            .filter(|(_, weak)| weak.strong_count() > 0)
            .count()
    }

    /// Register an observer. It stays registered until the returned
    /// [`Subscription`] is dropped (or the observer itself is dropped).
    pub fn subscribe(&mut self, observer: Weak<RefCell<dyn EditObserver>>) -> Subscription {
        let id = self.next_observer_id;
        self.next_observer_id += 1;
        self.observers.borrow_mut().push((id, observer));
        Subscription {
            id,
            observers: Rc::downgrade(&self.observers),
        }
    }

    /// Start a batch of edits
    pub fn modify(&mut self) -> Modifier<'_> {
        Modifier {
            buffer: self,
            edits: Vec::new(),
            committed: false,
        }
    }

    /// Insert `bytes` at `position` as a single-edit batch
    pub fn insert(&mut self, position: usize, bytes: &[u8]) -> Result<()> {
        let mut modifier = self.modify();
        modifier.insert(position, bytes)?;
        modifier.commit();
        Ok(())
    }

    /// Erase `len` bytes at `position` as a single-edit batch
    pub fn erase(&mut self, position: usize, len: usize) -> Result<()> {
        let mut modifier = self.modify();
        modifier.erase(position, len)?;
        modifier.commit();
        Ok(())
    }

    fn live_observers(&self) -> Vec<Rc<RefCell<dyn EditObserver>>> {
        let mut observers = self.observers.borrow_mut();
        observers.retain(|(_, weak)| weak.strong_count() > 0);
        observers.iter().filter_map(|(_, weak)| weak.upgrade()).collect()
    }
}

impl Default for ByteBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ByteBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ByteBuffer")
            .field("len", &self.bytes.len())
            .field("revision", &self.revision)
            .field("observers", &self.observer_count())
            .finish()
    }
}

struct PendingEdit {
    position: usize,
    removed: usize,
    bytes: Vec<u8>,
}

/// Scoped modification of a [`ByteBuffer`].
///
/// Positions passed to `replace` are pre-edit offsets and must be issued in
/// ascending order. The batch is applied by [`Modifier::commit`] or when the
/// modifier is dropped.
pub struct Modifier<'a> {
    buffer: &'a mut ByteBuffer,
    edits: Vec<PendingEdit>,
    committed: bool,
}

impl Modifier<'_> {
    /// Replace `removed` bytes at `position` with `bytes`
    pub fn replace(&mut self, position: usize, removed: usize, bytes: &[u8]) -> Result<()> {
        let len = self.buffer.len();
        if position > len || removed > len - position {
            return Err(RiftError::range(
                RANGE_OUT_OF_BOUNDS,
                format!(
                    "Replacement {}..{} out of bounds (len: {})",
                    position,
                    position.saturating_add(removed),
                    len
                ),
            ));
        }
        if removed == 0 && bytes.is_empty() {
            return Ok(());
        }

        if let Some(last) = self.edits.last_mut() {
            let last_end = last.position + last.removed;
            if position < last_end {
                return Err(RiftError::range(
                    UNORDERED_EDIT,
                    format!(
                        "Replacement at {} overlaps or precedes previous edit ending at {}",
                        position, last_end
                    ),
                ));
            }
            if position == last_end {
                // Adjacent: fold into the previous record
                last.removed += removed;
                last.bytes.extend_from_slice(bytes);
                return Ok(());
            }
        }

        self.edits.push(PendingEdit {
            position,
            removed,
            bytes: bytes.to_vec(),
        });
        Ok(())
    }

    pub fn insert(&mut self, position: usize, bytes: &[u8]) -> Result<()> {
        self.replace(position, 0, bytes)
    }

    pub fn erase(&mut self, position: usize, len: usize) -> Result<()> {
        self.replace(position, len, &[])
    }

    /// Pending records of this batch
    pub fn modifications(&self) -> Vec<Modification> {
        self.edits
            .iter()
            .map(|e| Modification {
                position: e.position,
                removed: e.removed,
                added: e.bytes.len(),
            })
            .collect()
    }

    /// Apply the batch and notify observers. Returns the applied records.
    pub fn commit(mut self) -> Vec<Modification> {
        self.apply()
    }

    fn apply(&mut self) -> Vec<Modification> {
        if self.committed {
            return Vec::new();
        }
        self.committed = true;
        if self.edits.is_empty() {
            return Vec::new();
        }

        let modifications = self.modifications();
        let observers = self.buffer.live_observers();
        for observer in &observers {
            observer.borrow_mut().begin_edit(self.buffer);
        }

        let old = std::mem::take(&mut self.buffer.bytes);
        let added: usize = self.edits.iter().map(|e| e.bytes.len()).sum();
        let removed: usize = self.edits.iter().map(|e| e.removed).sum();
        let mut bytes = Vec::with_capacity(old.len() + added - removed);
        let mut copied = 0;
        for edit in &self.edits {
            bytes.extend_from_slice(&old[copied..edit.position]);
            bytes.extend_from_slice(&edit.bytes);
            copied = edit.position + edit.removed;
        }
        bytes.extend_from_slice(&old[copied..]);
        self.buffer.bytes = bytes;
        self.buffer.revision += 1;

        for observer in &observers {
            observer.borrow_mut().end_edit(self.buffer, &modifications);
        }
        modifications
    }
}

impl Drop for Modifier<'_> {
    fn drop(&mut self) {
        self.apply();
    }
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
