//! Ordered, append-only list of opened locations.

use lodestar_api::LocationStorage;
use std::sync::{Arc, PoisonError, RwLock};
use url::Url;

/// Resolution order of one loader.
///
/// Scans work on a snapshot taken under a short read lock, so an append never
/// waits for an in-flight scan to finish and never changes what that scan
/// sees.
#[derive(Default)]
pub struct SearchPath {
    entries: RwLock<Vec<Arc<dyn LocationStorage>>>,
}

impl SearchPath {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a storage; a root already on the path is ignored.
    pub fn push(&self, storage: Arc<dyn LocationStorage>) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if entries.iter().any(|e| e.root() == storage.root()) {
            return false;
        }
        entries.push(storage);
        true
    }

    pub fn contains(&self, url: &Url) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|e| e.root() == url)
    }

    /// Current entries in resolution order.
    pub fn snapshot(&self) -> Vec<Arc<dyn LocationStorage>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn urls(&self) -> Vec<Url> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|e| e.root().clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
