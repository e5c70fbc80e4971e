//! The loader: delegation, caching and shutdown.
//!
//! A loader asks its own cache first, then its parent, and only then scans
//! its own search path. The parent is called before any per-name lock of the
//! child is taken, so a hierarchy never waits on locks in two directions.

mod builder;

pub use builder::LoaderBuilder;

use crate::definition::{Definition, LoaderId};
use crate::error::Result;
use crate::location::Location;
use crate::materialize::Materializer;
use crate::package::PackageTable;
use crate::registry::DefinitionRegistry;
use crate::resolver::Resolver;
use crate::search_path::SearchPath;
use crate::tracker::{ResourceStream, ResourceTracker, StreamHandle};
use lodestar_api::models::naming;
use lodestar_api::{
    CloseError, DefinitionFormat, LoaderError, Package, PolicyHook, PolicyRequest,
};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, trace, warn};
use url::Url;

pub struct Loader {
    id: LoaderId,
    label: Option<String>,
    parent: Option<Arc<Loader>>,
    search_path: SearchPath,
    registry: DefinitionRegistry,
    packages: PackageTable,
    tracker: ResourceTracker,
    format: Arc<dyn DefinitionFormat>,
    policy: Arc<dyn PolicyHook>,
    closed: AtomicBool,
}

impl Loader {
    pub fn builder() -> LoaderBuilder {
        LoaderBuilder::new()
    }

    fn new(
        label: Option<String>,
        parent: Option<Arc<Loader>>,
        format: Arc<dyn DefinitionFormat>,
        policy: Arc<dyn PolicyHook>,
    ) -> Self {
        Self {
            id: LoaderId::next(),
            label,
            parent,
            search_path: SearchPath::new(),
            registry: DefinitionRegistry::new(),
            packages: PackageTable::new(),
            tracker: ResourceTracker::new(),
            format,
            policy,
            closed: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> LoaderId {
        self.id
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn parent(&self) -> Option<&Arc<Loader>> {
        self.parent.as_ref()
    }

    pub fn format(&self) -> &Arc<dyn DefinitionFormat> {
        &self.format
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Load `name`, parent first.
    ///
    /// Definitions cached by this loader are still returned after `close()`;
    /// anything that would need a new resolution fails with `ClosedLoader`,
    /// even when an ancestor could serve it. The resource lookups behave the
    /// same way and answer `None` once closed. Misses are never remembered: a
    /// later call scans again.
    pub fn load_definition(&self, name: &str) -> Result<Arc<Definition>> {
        self.check_package_access(name)?;

        if let Some(definition) = self.registry.get(name) {
            trace!("Cache hit for {} in {}", name, self);
            return Ok(definition);
        }
        if self.is_closed() {
            return Err(LoaderError::ClosedLoader);
        }

        if let Some(parent) = &self.parent {
            match parent.load_definition(name) {
                Ok(definition) => {
                    trace!("{} delegated {} to {}", self, name, parent);
                    return Ok(definition);
                }
                Err(e) if e.is_delegation_miss() => {}
                Err(e) => return Err(e),
            }
        }

        self.registry.get_or_materialize(name, || {
            let path = self.format.resource_path(name);
            let resource = Resolver::resolve(&self.search_path, &path)
                .map_err(|e| LoaderError::io(name, e))?
                .ok_or_else(|| LoaderError::not_found(name))?;
            debug!("{} resolved {} at {}", self, name, resource.origin);
            self.materializer().materialize(name, resource)
        })
    }

    fn check_package_access(&self, name: &str) -> Result<()> {
        if !self.policy.checks_package_access() {
            return Ok(());
        }
        let Some(package) = naming::package_of(name) else {
            return Ok(());
        };
        let request = PolicyRequest::AccessPackage {
            package: package.to_string(),
        };
        if self.policy.authorize(&request) {
            Ok(())
        } else {
            Err(LoaderError::PolicyDenied { request })
        }
    }

    fn materializer(&self) -> Materializer<'_> {
        Materializer {
            loader: self.id,
            format: self.format.as_ref(),
            policy: self.policy.as_ref(),
            packages: &self.packages,
        }
    }

    /// Append a location; it serves future lookups only.
    ///
    /// Returns `false` when the location is already on the search path or the
    /// loader is closed.
    pub fn add_location(&self, location: &Location) -> bool {
        if self.is_closed() {
            debug!("Ignoring {} for closed {}", location.url(), self);
            return false;
        }
        let storage = location.open();
        if !self.search_path.push(storage.clone()) {
            return false;
        }
        if !self.tracker.track_storage(storage.clone()) {
            // Closed while appending; the tracker will not release it for us.
            if let Err(e) = storage.release() {
                warn!("Failed to release {} for {}: {}", location.url(), self, e);
            }
            return false;
        }
        debug!("Added {} to {}", location.url(), self);
        true
    }

    /// Search path in resolution order.
    pub fn urls(&self) -> Vec<Url> {
        self.search_path.urls()
    }

    /// Names this loader materialized itself; delegated names are not included.
    pub fn loaded_names(&self) -> BTreeSet<String> {
        self.registry.names().into_iter().collect()
    }

    pub fn package(&self, name: &str) -> Option<Arc<Package>> {
        self.packages.get(name)
    }

    pub fn packages(&self) -> Vec<Arc<Package>> {
        self.packages.all()
    }

    /// Root of the first location holding `path`, parent first.
    ///
    /// A closed loader answers `None` without asking its parent.
    pub fn find_resource(&self, path: &str) -> Result<Option<Url>> {
        if self.is_closed() {
            return Ok(None);
        }
        if let Some(parent) = &self.parent {
            if let Some(url) = parent.find_resource(path)? {
                return Ok(Some(url));
            }
        }
        Resolver::find(&self.search_path, path).map_err(|e| LoaderError::io(path, e))
    }

    /// Roots of every location holding `path`: ancestors' first, then this loader's.
    ///
    /// A closed loader answers an empty list; a closed ancestor contributes nothing.
    pub fn find_resources(&self, path: &str) -> Result<Vec<Url>> {
        if self.is_closed() {
            return Ok(Vec::new());
        }
        let mut found = match &self.parent {
            Some(parent) => parent.find_resources(path)?,
            None => Vec::new(),
        };
        found.extend(
            Resolver::find_all(&self.search_path, path).map_err(|e| LoaderError::io(path, e))?,
        );
        Ok(found)
    }

    /// Stream over the first resource at `path`, parent first.
    ///
    /// The stream belongs to this loader even when an ancestor served it:
    /// closing this loader (or the serving ancestor) releases it. A closed
    /// loader answers `None`.
    pub fn open_resource(&self, path: &str) -> Result<Option<ResourceStream>> {
        let Some(handle) = self.open_handle(path)? else {
            return Ok(None);
        };
        Ok(Some(ResourceStream::new(handle)))
    }

    fn open_handle(&self, path: &str) -> Result<Option<Arc<StreamHandle>>> {
        if self.is_closed() {
            return Ok(None);
        }
        let handle = match &self.parent {
            Some(parent) => parent.open_handle(path)?,
            None => None,
        };
        let handle = match handle {
            Some(handle) => handle,
            None => {
                let Some((origin, reader)) = Resolver::open(&self.search_path, path)
                    .map_err(|e| LoaderError::io(path, e))?
                else {
                    return Ok(None);
                };
                StreamHandle::new(origin, path.to_string(), reader)
            }
        };
        if !self.tracker.track_stream(&handle) {
            // Closed meanwhile; nothing would release the stream.
            let _ = handle.close();
            return Ok(None);
        }
        Ok(Some(handle))
    }

    /// Stop resolving and release every tracked handle.
    ///
    /// All handles are attempted; the first failure is reported with the rest
    /// attached. Definitions already returned stay valid. Closing twice is a
    /// no-op.
    pub fn close(&self) -> std::result::Result<(), CloseError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        let errors = self.tracker.release_all();
        for e in &errors {
            warn!("Release failed while closing {}: {}", self, e);
        }
        info!("Closed {} ({} release failure(s))", self, errors.len());
        match CloseError::from_errors(errors) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl fmt::Display for Loader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.label {
            Some(label) => write!(f, "{} ({})", label, self.id),
            None => write!(f, "{}", self.id),
        }
    }
}

impl fmt::Debug for Loader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Loader")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("parent", &self.parent.as_ref().map(|p| p.id))
            .field("urls", &self.search_path.urls())
            .field("format", &self.format.name())
            .field("closed", &self.is_closed())
            .finish()
    }
}
