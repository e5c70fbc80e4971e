//! Per-loader definition cache with one materialization per name.

use crate::definition::Definition;
use crate::error::Result;
use dashmap::DashMap;
use std::sync::{Arc, Mutex, PoisonError};

type Gate = Arc<Mutex<()>>;

/// Name -> definition, never evicted.
///
/// A caller materializing a name holds only that name's gate, so unrelated
/// names proceed in parallel and racing callers for the same name see exactly
/// one materialization. Gates exist only while a name is in flight; lookups
/// and listings read `definitions` and never wait on a gate.
#[derive(Default)]
pub struct DefinitionRegistry {
    definitions: DashMap<String, Arc<Definition>>,
    in_flight: DashMap<String, Gate>,
}

impl DefinitionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<Arc<Definition>> {
        self.definitions.get(name).map(|d| d.value().clone())
    }

    /// Cached definition for `name`, or the result of `materialize` stored under it.
    ///
    /// A failed materialization stores nothing, so the next caller tries again.
    pub fn get_or_materialize<F>(&self, name: &str, materialize: F) -> Result<Arc<Definition>>
    where
        F: FnOnce() -> Result<Arc<Definition>>,
    {
        if let Some(existing) = self.get(name) {
            return Ok(existing);
        }
        let gate = self.gate(name);
        let result = {
            let _guard = gate.lock().unwrap_or_else(PoisonError::into_inner);
            match self.get(name) {
                Some(existing) => Ok(existing),
                None => materialize().inspect(|definition| {
                    self.definitions.insert(name.to_string(), definition.clone());
                }),
            }
        };
        drop(gate);
        // Last one out removes the gate; a waiter still holding it keeps it alive.
        self.in_flight
            .remove_if(name, |_, gate| Arc::strong_count(gate) == 1);
        result
    }

    fn gate(&self, name: &str) -> Gate {
        self.in_flight
            .entry(name.to_string())
            .or_default()
            .value()
            .clone()
    }

    /// Names with a registered definition.
    pub fn names(&self) -> Vec<String> {
        self.definitions.iter().map(|e| e.key().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
