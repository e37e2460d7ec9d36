//! Picture bookkeeping
//!
//! Entries are keyed by floating-image id. Load callbacks report into a shared
//! queue that the frame loop drains, and an entry (with whatever callbacks it
//! owns) is dropped as soon as its entity leaves the pool.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Shared queue of `(id, loaded)` results filled by load callbacks
pub type Settled = Rc<RefCell<Vec<(u32, bool)>>>;

pub struct ImageStore<E> {
    entries: HashMap<u32, E>,
    settled: Settled,
}

impl<E> Default for ImageStore<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> ImageStore<E> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            settled: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Handle for a load callback to report through
    pub fn settled_handle(&self) -> Settled {
        self.settled.clone()
    }

    /// Track `entry` for `id`, dropping any entry it replaces
    pub fn insert(&mut self, id: u32, entry: E) {
        self.entries.insert(id, entry);
    }

    /// Load results since the last call, skipping ids no longer tracked
    pub fn take_settled(&self) -> Vec<(u32, bool)> {
        let mut settled = std::mem::take(&mut *self.settled.borrow_mut());
        settled.retain(|(id, _)| self.entries.contains_key(id));
        settled
    }

    /// Drop entries whose entity is gone
    pub fn retain_ids(&mut self, live: impl Fn(u32) -> bool) {
        self.entries.retain(|id, _| live(*id));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.settled.borrow_mut().clear();
    }

    pub fn get(&self, id: u32) -> Option<&E> {
        self.entries.get(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
