//! Per-loader set of releasable handles.
//!
//! Tracks every opened location storage and every stream handed out by the
//! loader. Streams are tracked weakly: a stream the caller dropped is simply
//! gone by the time the loader closes. Once drained, the tracker refuses new
//! entries so a handle opened during `close()` cannot leak past it.

use lodestar_api::LocationStorage;
use std::io::{self, Read};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use url::Url;

/// Shared state of one open stream.
pub(crate) struct StreamHandle {
    origin: Url,
    path: String,
    reader: Mutex<Option<Box<dyn Read + Send>>>,
}

impl StreamHandle {
    pub(crate) fn new(origin: Url, path: String, reader: Box<dyn Read + Send>) -> Arc<Self> {
        Arc::new(Self {
            origin,
            path,
            reader: Mutex::new(Some(reader)),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Option<Box<dyn Read + Send>>> {
        self.reader.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn close(&self) -> io::Result<()> {
        drop(self.lock().take());
        Ok(())
    }
}

/// Readable stream over a resource, released when its loader closes.
///
/// After release every read fails with `"stream closed by loader"`.
pub struct ResourceStream {
    handle: Arc<StreamHandle>,
}

impl ResourceStream {
    pub(crate) fn new(handle: Arc<StreamHandle>) -> Self {
        Self { handle }
    }

    /// Root of the location that served the stream.
    pub fn origin(&self) -> &Url {
        &self.handle.origin
    }

    pub fn path(&self) -> &str {
        &self.handle.path
    }

    pub fn is_closed(&self) -> bool {
        self.handle.lock().is_none()
    }

    pub fn close(&self) -> io::Result<()> {
        self.handle.close()
    }
}

impl Read for ResourceStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.handle.lock().as_mut() {
            Some(reader) => reader.read(buf),
            None => Err(io::Error::other(format!(
                "stream closed by loader: {}",
                self.handle.path
            ))),
        }
    }
}

impl std::fmt::Debug for ResourceStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceStream")
            .field("origin", &self.handle.origin.as_str())
            .field("path", &self.handle.path)
            .field("closed", &self.is_closed())
            .finish()
    }
}

#[derive(Default)]
struct TrackerState {
    drained: bool,
    storages: Vec<Arc<dyn LocationStorage>>,
    streams: Vec<Weak<StreamHandle>>,
}

#[derive(Default)]
pub struct ResourceTracker {
    state: Mutex<TrackerState>,
}

impl ResourceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, TrackerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// `false` once the tracker has been drained.
    pub fn track_storage(&self, storage: Arc<dyn LocationStorage>) -> bool {
        let mut state = self.lock();
        if state.drained {
            return false;
        }
        state.storages.push(storage);
        true
    }

    /// `false` once the tracker has been drained.
    pub(crate) fn track_stream(&self, handle: &Arc<StreamHandle>) -> bool {
        let mut state = self.lock();
        if state.drained {
            return false;
        }
        state.streams.retain(|s| s.strong_count() > 0);
        state.streams.push(Arc::downgrade(handle));
        true
    }

    /// Number of storages plus live streams.
    pub fn len(&self) -> usize {
        let state = self.lock();
        state.storages.len() + state.streams.iter().filter(|s| s.strong_count() > 0).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_drained(&self) -> bool {
        self.lock().drained
    }

    /// Release everything tracked; archives first, then streams.
    ///
    /// Every handle is attempted even if an earlier one fails. The lock is
    /// held only to take the entries, never while releasing them.
    pub fn release_all(&self) -> Vec<io::Error> {
        let (storages, streams) = {
            let mut state = self.lock();
            state.drained = true;
            (
                std::mem::take(&mut state.storages),
                std::mem::take(&mut state.streams),
            )
        };

        let mut errors = Vec::new();
        for storage in storages {
            if let Err(e) = storage.release() {
                errors.push(e);
            }
        }
        for stream in streams.iter().filter_map(Weak::upgrade) {
            if let Err(e) = stream.close() {
                errors.push(e);
            }
        }
        errors
    }
}
