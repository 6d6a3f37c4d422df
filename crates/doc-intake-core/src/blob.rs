//! Revocable content handles.
//!
//! Uploaded bytes live in a [`BlobRegistry`]. Each
//! [`Document`](crate::models::Document) owns exactly one [`ContentRef`]
//! into it, the same way a browser object URL points at a file blob.
//! Dropping the handle revokes its registry entry, so removing a document
//! from the collection releases the bytes it referenced.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, Weak};

#[derive(Default)]
struct Slots {
    next_key: u64,
    blobs: HashMap<u64, Arc<[u8]>>,
}

fn lock(slots: &Mutex<Slots>) -> MutexGuard<'_, Slots> {
    slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Owner of all uploaded byte buffers.
///
/// Cloning the registry is cheap and yields another view of the same
/// slots. Handles never keep the registry alive: once every registry
/// clone is gone, outstanding [`ContentRef`]s read as revoked.
#[derive(Clone, Default)]
pub struct BlobRegistry {
    slots: Arc<Mutex<Slots>>,
}

impl BlobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `bytes` and return the handle that exclusively owns them.
    pub fn register(&self, bytes: impl Into<Arc<[u8]>>) -> ContentRef {
        let bytes = bytes.into();
        let len = bytes.len();
        let mut slots = lock(&self.slots);
        let key = slots.next_key;
        slots.next_key += 1;
        slots.blobs.insert(key, bytes);
        ContentRef {
            key,
            len,
            slots: Arc::downgrade(&self.slots),
        }
    }

    /// Number of handles that have not been revoked yet.
    pub fn live_count(&self) -> usize {
        lock(&self.slots).blobs.len()
    }

    /// Total bytes held by live handles.
    pub fn live_bytes(&self) -> usize {
        lock(&self.slots).blobs.values().map(|b| b.len()).sum()
    }
}

impl fmt::Debug for BlobRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlobRegistry")
            .field("live", &self.live_count())
            .finish()
    }
}

/// Opaque, non-cloneable handle to uploaded bytes.
pub struct ContentRef {
    key: u64,
    len: usize,
    slots: Weak<Mutex<Slots>>,
}

impl ContentRef {
    /// Object-URL style identifier, e.g. `blob:3`.
    pub fn uri(&self) -> String {
        format!("blob:{}", self.key)
    }

    /// Size of the referenced content in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Read the referenced bytes.
    ///
    /// Returns `None` if the registry that issued this handle is gone.
    pub fn bytes(&self) -> Option<Arc<[u8]>> {
        let slots = self.slots.upgrade()?;
        let guard = lock(&slots);
        guard.blobs.get(&self.key).cloned()
    }
}

impl Drop for ContentRef {
    fn drop(&mut self) {
        if let Some(slots) = self.slots.upgrade() {
            lock(&slots).blobs.remove(&self.key);
        }
    }
}

impl fmt::Debug for ContentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentRef")
            .field("uri", &self.uri())
            .field("len", &self.len)
            .finish()
    }
}
