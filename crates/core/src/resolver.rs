//! Search-path walking. First hit wins; locations are never merged.

use crate::search_path::SearchPath;
use lodestar_api::Resource;
use lodestar_api::models::naming::is_safe_resource_path;
use std::io::{self, Read};
use tracing::trace;
use url::Url;

pub struct Resolver;

impl Resolver {
    /// Bytes of `resource_path` from the first location that has it.
    pub fn resolve(path: &SearchPath, resource_path: &str) -> io::Result<Option<Resource>> {
        if !is_safe_resource_path(resource_path) {
            return Ok(None);
        }
        for storage in path.snapshot() {
            if let Some(resource) = storage.probe(resource_path)? {
                trace!("Resolved {} in {}", resource_path, storage.root());
                return Ok(Some(resource));
            }
        }
        Ok(None)
    }

    /// Root of the first location holding `resource_path`.
    pub fn find(path: &SearchPath, resource_path: &str) -> io::Result<Option<Url>> {
        if !is_safe_resource_path(resource_path) {
            return Ok(None);
        }
        for storage in path.snapshot() {
            if storage.contains(resource_path)? {
                return Ok(Some(storage.root().clone()));
            }
        }
        Ok(None)
    }

    /// Roots of every location holding `resource_path`, in search order.
    pub fn find_all(path: &SearchPath, resource_path: &str) -> io::Result<Vec<Url>> {
        let mut found = Vec::new();
        if !is_safe_resource_path(resource_path) {
            return Ok(found);
        }
        for storage in path.snapshot() {
            if storage.contains(resource_path)? {
                found.push(storage.root().clone());
            }
        }
        Ok(found)
    }

    /// Stream over `resource_path` from the first location that has it.
    pub fn open(
        path: &SearchPath,
        resource_path: &str,
    ) -> io::Result<Option<(Url, Box<dyn Read + Send>)>> {
        if !is_safe_resource_path(resource_path) {
            return Ok(None);
        }
        for storage in path.snapshot() {
            if let Some(stream) = storage.open_stream(resource_path)? {
                return Ok(Some((storage.root().clone(), stream)));
            }
        }
        Ok(None)
    }
}
