//! Host-side instantiation of loaded definitions.
//!
//! Definitions are opaque; the host decides what a definition turns into by
//! registering one factory per definition name.

use crate::definition::Definition;
use crate::error::Result;
use dashmap::DashMap;
use lodestar_api::LoaderError;
use std::sync::Arc;

type Factory<T> = Arc<dyn Fn(&Definition) -> Result<T> + Send + Sync>;

pub struct DispatchTable<T> {
    factories: DashMap<String, Factory<T>>,
}

impl<T> Default for DispatchTable<T> {
    fn default() -> Self {
        Self {
            factories: DashMap::new(),
        }
    }
}

impl<T> DispatchTable<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the factory for `name`, replacing any previous one.
    pub fn register<F>(&self, name: impl Into<String>, factory: F)
    where
        F: Fn(&Definition) -> Result<T> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Run the factory registered under the definition's name.
    pub fn instantiate(&self, definition: &Definition) -> Result<T> {
        let factory = self
            .factories
            .get(definition.name())
            .map(|f| f.value().clone())
            .ok_or_else(|| LoaderError::NoFactory {
                name: definition.name().to_string(),
            })?;
        factory(definition)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}
