//! Active repository slot.
//!
//! A single process-wide slot holding the repository currently used as the
//! context source. Built on `tokio::sync::watch`: `set` replaces the value
//! unconditionally and `get` clones the `Arc` out without waiting on any
//! writer's I/O. Concurrent connects from different sessions race and the
//! last `set` wins; there is no versioning or rollback. Auto-resolved
//! repositories go through `set_if_empty` and never replace a connect.

use std::sync::Arc;

use tokio::sync::watch;

use smartchat_types::repository::RepositoryHandle;

pub struct ActiveRepository {
    slot: watch::Sender<Option<Arc<RepositoryHandle>>>,
}

impl ActiveRepository {
    pub fn new() -> Self {
        let (slot, _) = watch::channel(None);
        Self { slot }
    }

    /// Replace the active repository.
    pub fn set(&self, handle: RepositoryHandle) {
        self.slot.send_replace(Some(Arc::new(handle)));
    }

    pub fn get(&self) -> Option<Arc<RepositoryHandle>> {
        self.slot.borrow().clone()
    }

    /// Store `handle` only if the slot is empty. Returns whatever the slot
    /// holds afterwards.
    pub fn set_if_empty(&self, handle: RepositoryHandle) -> Option<Arc<RepositoryHandle>> {
        let mut handle = Some(handle);
        self.slot.send_if_modified(|slot| match (slot.is_none(), handle.take()) {
            (true, Some(handle)) => {
                *slot = Some(Arc::new(handle));
                true
            }
            _ => false,
        });
        self.get()
    }
}

impl Default for ActiveRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ActiveRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActiveRepository")
            .field("active", &self.get().map(|repo| repo.full_name()))
            .finish()
    }
}
