use lodestar_api::{CodeSource, Package};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use xxhash_rust::xxh3::xxh3_64;

static NEXT_LOADER_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique loader identity, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LoaderId(u64);

impl LoaderId {
    pub(crate) fn next() -> Self {
        LoaderId(NEXT_LOADER_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for LoaderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "loader#{}", self.0)
    }
}

/// A materialized unit, bound to the loader that defined it.
///
/// Two definitions are equal only if they share both name and defining
/// loader; identical bytes loaded twice by unrelated loaders stay distinct.
pub struct Definition {
    name: String,
    bytes: Arc<[u8]>,
    package: Option<Arc<Package>>,
    code_source: CodeSource,
    loader: LoaderId,
    digest: u64,
}

impl Definition {
    pub(crate) fn new(
        name: String,
        bytes: Vec<u8>,
        package: Option<Arc<Package>>,
        code_source: CodeSource,
        loader: LoaderId,
    ) -> Self {
        let digest = xxh3_64(&bytes);
        Self {
            name,
            bytes: bytes.into(),
            package,
            code_source,
            loader,
            digest,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// `None` for the unnamed package.
    pub fn package(&self) -> Option<&Arc<Package>> {
        self.package.as_ref()
    }

    pub fn code_source(&self) -> &CodeSource {
        &self.code_source
    }

    /// Loader that materialized this definition.
    pub fn loader(&self) -> LoaderId {
        self.loader
    }

    /// xxh3 digest of the bytes; equal content gives equal digests across loaders.
    pub fn digest(&self) -> u64 {
        self.digest
    }
}

impl PartialEq for Definition {
    fn eq(&self, other: &Self) -> bool {
        self.loader == other.loader && self.name == other.name
    }
}

impl Eq for Definition {}

impl Hash for Definition {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.loader.hash(state);
        self.name.hash(state);
    }
}

impl fmt::Debug for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Definition")
            .field("name", &self.name)
            .field("loader", &self.loader)
            .field("origin", &self.code_source.location.as_str())
            .field("len", &self.bytes.len())
            .field("digest", &format_args!("{:016x}", self.digest))
            .finish()
    }
}

impl fmt::Display for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.loader)
    }
}
