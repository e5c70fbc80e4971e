//! Turning a resolved resource into a definition.

use crate::definition::{Definition, LoaderId};
use crate::error::Result;
use crate::package::PackageTable;
use lodestar_api::models::naming;
use lodestar_api::{DefinitionFormat, LoaderError, PolicyHook, PolicyRequest, Resource};
use std::sync::Arc;
use tracing::debug;

/// What a loader lends to materialization.
pub(crate) struct Materializer<'a> {
    pub loader: LoaderId,
    pub format: &'a dyn DefinitionFormat,
    pub policy: &'a dyn PolicyHook,
    pub packages: &'a PackageTable,
}

impl Materializer<'_> {
    /// Package check, format validation, origin policy, then the definition itself.
    pub fn materialize(&self, name: &str, resource: Resource) -> Result<Arc<Definition>> {
        let package = match naming::package_of(name) {
            Some(package) => Some(self.packages.define_or_verify(package, &resource)?),
            None => None,
        };

        self.format
            .validate(name, &resource.bytes)
            .map_err(|e| LoaderError::malformed(name, e))?;

        if !naming::is_local_origin(&resource.origin) {
            let request = PolicyRequest::ReachOrigin {
                definition: name.to_string(),
                origin: resource.origin.clone(),
            };
            if !self.policy.authorize(&request) {
                return Err(LoaderError::PolicyDenied { request });
            }
        }

        debug!(
            "Materialized {} from {} ({} bytes, {})",
            name,
            resource.origin,
            resource.bytes.len(),
            self.format.name()
        );
        let code_source = resource.code_source();
        Ok(Arc::new(Definition::new(
            name.to_string(),
            resource.bytes,
            package,
            code_source,
            self.loader,
        )))
    }
}
