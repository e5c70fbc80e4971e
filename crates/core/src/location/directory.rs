use lodestar_api::models::naming::is_safe_resource_path;
use lodestar_api::{LocationKind, LocationStorage, Resource};
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::PathBuf;
use url::Url;

/// Directory root, probed directly on the file system for every request.
pub struct DirectoryStorage {
    dir: PathBuf,
    root: Url,
}

impl DirectoryStorage {
    pub fn new(dir: PathBuf, root: Url) -> Self {
        Self { dir, root }
    }

    fn locate(&self, path: &str) -> Option<PathBuf> {
        if !is_safe_resource_path(path) {
            return None;
        }
        let file = self.dir.join(path);
        file.is_file().then_some(file)
    }
}

fn absent_if_missing<T>(result: io::Result<T>) -> io::Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        // Deleted between the probe and the read
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

impl LocationStorage for DirectoryStorage {
    fn root(&self) -> &Url {
        &self.root
    }

    fn kind(&self) -> LocationKind {
        LocationKind::Directory
    }

    fn probe(&self, path: &str) -> io::Result<Option<Resource>> {
        let Some(file) = self.locate(path) else {
            return Ok(None);
        };
        let bytes = absent_if_missing(fs::read(&file))?;
        Ok(bytes.map(|bytes| Resource::new(path, bytes, self.root.clone())))
    }

    fn open_stream(&self, path: &str) -> io::Result<Option<Box<dyn Read + Send>>> {
        let Some(file) = self.locate(path) else {
            return Ok(None);
        };
        let file = absent_if_missing(File::open(&file))?;
        Ok(file.map(|f| Box::new(f) as Box<dyn Read + Send>))
    }

    fn contains(&self, path: &str) -> io::Result<bool> {
        Ok(self.locate(path).is_some())
    }
}
