//! Per-loader package records and sealing checks.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use lodestar_api::models::naming;
use lodestar_api::{LoaderError, Package, Resource};
use std::sync::Arc;
use tracing::debug;

/// Package name -> package defined by the first member resolved for it.
#[derive(Default)]
pub struct PackageTable {
    packages: DashMap<String, Arc<Package>>,
}

impl PackageTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define `name` from `resource`, or check `resource` against the existing record.
    ///
    /// Two racing definitions converge on one record; the loser is verified
    /// against the winner like any later member.
    pub fn define_or_verify(
        &self,
        name: &str,
        resource: &Resource,
    ) -> Result<Arc<Package>, LoaderError> {
        let existing = match self.packages.entry(name.to_string()) {
            Entry::Occupied(entry) => entry.get().clone(),
            Entry::Vacant(entry) => {
                let package = Arc::new(Package::define(
                    name,
                    resource.manifest.as_deref(),
                    &resource.origin,
                ));
                debug!(
                    "Defined package {} from {} (sealed: {})",
                    name,
                    resource.origin,
                    package.is_sealed()
                );
                entry.insert(package.clone());
                return Ok(package);
            }
        };
        verify(&existing, resource)?;
        Ok(existing)
    }

    pub fn get(&self, name: &str) -> Option<Arc<Package>> {
        self.packages.get(name).map(|p| p.value().clone())
    }

    /// Every package defined so far, sorted by name.
    pub fn all(&self) -> Vec<Arc<Package>> {
        let mut packages: Vec<Arc<Package>> =
            self.packages.iter().map(|p| p.value().clone()).collect();
        packages.sort_by(|a, b| a.name().cmp(b.name()));
        packages
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

fn verify(package: &Package, resource: &Resource) -> Result<(), LoaderError> {
    if package.is_sealed() {
        if !package.is_sealed_at(&resource.origin) {
            return Err(LoaderError::sealing(package.name(), "package is sealed"));
        }
    } else {
        let path = naming::package_path(package.name());
        if resource.manifest.as_ref().is_some_and(|m| m.is_sealed(&path)) {
            return Err(LoaderError::sealing(
                package.name(),
                "cannot seal package: already loaded",
            ));
        }
    }
    Ok(())
}
