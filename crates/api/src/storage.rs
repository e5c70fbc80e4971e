//! Storage capability behind a single search-path location.

use crate::models::Resource;
use std::io::{self, Read};
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocationKind {
    /// Probed per request, no persistent handle.
    Directory,
    /// Opened lazily, handle cached until released.
    Archive,
}

/// One root able to serve resources by storage-relative path.
///
/// Implementations are shared between threads; `probe` and `open_stream` may
/// run concurrently with each other and with `release`. After `release`, an
/// implementation must answer with an `io::Error` rather than panic or serve
/// stale data.
pub trait LocationStorage: Send + Sync {
    fn root(&self) -> &Url;

    fn kind(&self) -> LocationKind;

    /// Bytes and origin metadata for `path`, `None` if this root lacks it.
    fn probe(&self, path: &str) -> io::Result<Option<Resource>>;

    /// Readable stream over `path`, `None` if this root lacks it.
    fn open_stream(&self, path: &str) -> io::Result<Option<Box<dyn Read + Send>>>;

    /// Presence check without handing out bytes.
    fn contains(&self, path: &str) -> io::Result<bool> {
        Ok(self.probe(path)?.is_some())
    }

    /// Drop any cached handle. Called once, when the owning loader closes.
    fn release(&self) -> io::Result<()> {
        Ok(())
    }
}
