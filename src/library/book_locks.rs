use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Mutex as AsyncMutex;

/// Keyed mutual exclusion for image mutations, one async mutex per book id.
///
/// Two concurrent image writes for the same book would otherwise interleave
/// their file writes and row updates, leaving the database pointer and the
/// newest file on disk out of sync.
#[derive(Default)]
pub struct BookLocks {
    locks: Mutex<HashMap<i64, Arc<AsyncMutex<()>>>>,
}

impl BookLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the lock for the given book, creating it on first use.
    /// The entry stays around for the lifetime of the service; the book id
    /// space is small and bounded by the book table.
    pub fn lock_for(&self, book_id: i64) -> Arc<AsyncMutex<()>> {
        let mut locks = self.locks.lock().unwrap();
        locks
            .entry(book_id)
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }
}
