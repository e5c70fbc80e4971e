//! Search-path locations.
//!
//! A [`Location`] is a description of a root: its URL and how to open it.
//! Each loader opens its own storage from the description when the location
//! is added, so archive handles are never shared between loaders unless the
//! host explicitly hands in a shared [`LocationStorage`] via
//! [`Location::custom`].

pub mod archive;
pub mod directory;

pub use archive::ArchiveStorage;
pub use directory::DirectoryStorage;

use lodestar_api::{LocationKind, LocationStorage};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum LocationError {
    #[error("invalid URL `{0}`: {1}")]
    InvalidUrl(String, url::ParseError),
    #[error("unsupported scheme `{0}`, only file: locations can be opened directly")]
    UnsupportedScheme(String),
    #[error("not an absolute path: {}", .0.display())]
    NotAbsolute(PathBuf),
}

#[derive(Clone)]
enum Source {
    Directory(PathBuf),
    Archive(PathBuf),
    Custom(Arc<dyn LocationStorage>),
}

#[derive(Clone)]
pub struct Location {
    url: Url,
    source: Source,
}

impl Location {
    /// Directory root; probed per request.
    pub fn directory(path: impl AsRef<Path>) -> Result<Self, LocationError> {
        let path = absolute(path.as_ref())?;
        let url = Url::from_directory_path(&path)
            .map_err(|_| LocationError::NotAbsolute(path.clone()))?;
        Ok(Self {
            url,
            source: Source::Directory(path),
        })
    }

    /// Zip archive root; opened on first probe.
    pub fn archive(path: impl AsRef<Path>) -> Result<Self, LocationError> {
        let path = absolute(path.as_ref())?;
        let url =
            Url::from_file_path(&path).map_err(|_| LocationError::NotAbsolute(path.clone()))?;
        Ok(Self {
            url,
            source: Source::Archive(path),
        })
    }

    /// `file:` URL; a trailing slash means directory, anything else archive.
    pub fn from_url(url: Url) -> Result<Self, LocationError> {
        if url.scheme() != "file" {
            return Err(LocationError::UnsupportedScheme(url.scheme().to_string()));
        }
        let path = url
            .to_file_path()
            .map_err(|_| LocationError::NotAbsolute(PathBuf::from(url.path())))?;
        if url.path().ends_with('/') {
            Ok(Self {
                url,
                source: Source::Directory(path),
            })
        } else {
            Ok(Self {
                url,
                source: Source::Archive(path),
            })
        }
    }

    /// Parse a configuration string: either a `file:` URL or a plain path.
    ///
    /// Plain paths ending in `/` or naming an existing directory become
    /// directory locations; everything else is treated as an archive.
    pub fn parse(input: &str) -> Result<Self, LocationError> {
        if input.starts_with("file:") || input.contains("://") {
            let url =
                Url::parse(input).map_err(|e| LocationError::InvalidUrl(input.to_string(), e))?;
            return Self::from_url(url);
        }
        let path = Path::new(input);
        if input.ends_with('/') || path.is_dir() {
            Self::directory(path)
        } else {
            Self::archive(path)
        }
    }

    /// Host-provided storage, shared as-is by every loader it is added to.
    pub fn custom(storage: Arc<dyn LocationStorage>) -> Self {
        Self {
            url: storage.root().clone(),
            source: Source::Custom(storage),
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn kind(&self) -> LocationKind {
        match &self.source {
            Source::Directory(_) => LocationKind::Directory,
            Source::Archive(_) => LocationKind::Archive,
            Source::Custom(storage) => storage.kind(),
        }
    }

    /// Storage for one loader.
    pub(crate) fn open(&self) -> Arc<dyn LocationStorage> {
        match &self.source {
            Source::Directory(path) => {
                Arc::new(DirectoryStorage::new(path.clone(), self.url.clone()))
            }
            Source::Archive(path) => Arc::new(ArchiveStorage::new(path.clone(), self.url.clone())),
            Source::Custom(storage) => storage.clone(),
        }
    }
}

impl fmt::Debug for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Location")
            .field("url", &self.url.as_str())
            .field("kind", &self.kind())
            .finish()
    }
}

fn absolute(path: &Path) -> Result<PathBuf, LocationError> {
    std::path::absolute(path).map_err(|_| LocationError::NotAbsolute(path.to_path_buf()))
}
