use super::Loader;
use crate::config::LoaderConfig;
use crate::error::{ConfigError, Result};
use crate::location::Location;
use lodestar_api::{
    AllowAll, DefinitionFormat, LoaderError, PolicyHook, PolicyRequest, RawFormat,
};
use std::sync::Arc;

/// Configures and creates a [`Loader`].
///
/// Format and policy default to the parent's when a parent is set, otherwise
/// to [`RawFormat`] and [`AllowAll`].
#[derive(Default)]
pub struct LoaderBuilder {
    label: Option<String>,
    parent: Option<Arc<Loader>>,
    locations: Vec<Location>,
    format: Option<Arc<dyn DefinitionFormat>>,
    policy: Option<Arc<dyn PolicyHook>>,
}

impl LoaderBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn parent(mut self, parent: Arc<Loader>) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn location(mut self, location: Location) -> Self {
        self.locations.push(location);
        self
    }

    pub fn locations(mut self, locations: impl IntoIterator<Item = Location>) -> Self {
        self.locations.extend(locations);
        self
    }

    pub fn format(mut self, format: Arc<dyn DefinitionFormat>) -> Self {
        self.format = Some(format);
        self
    }

    pub fn policy(mut self, policy: Arc<dyn PolicyHook>) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Apply a label and append the configured locations.
    pub fn with_config(mut self, config: &LoaderConfig) -> std::result::Result<Self, ConfigError> {
        if let Some(label) = &config.label {
            self.label = Some(label.clone());
        }
        self.locations.extend(config.locations()?);
        Ok(self)
    }

    /// Ask the policy for consent, then create the loader over the initial locations.
    pub fn build(self) -> Result<Arc<Loader>> {
        let format = self
            .format
            .or_else(|| self.parent.as_ref().map(|p| p.format.clone()))
            .unwrap_or_else(|| Arc::new(RawFormat) as Arc<dyn DefinitionFormat>);
        let policy = self
            .policy
            .or_else(|| self.parent.as_ref().map(|p| p.policy.clone()))
            .unwrap_or_else(|| Arc::new(AllowAll) as Arc<dyn PolicyHook>);

        let request = PolicyRequest::CreateLoader {
            locations: self.locations.iter().map(|l| l.url().clone()).collect(),
        };
        if !policy.authorize(&request) {
            return Err(LoaderError::PolicyDenied { request });
        }

        let loader = Arc::new(Loader::new(self.label, self.parent, format, policy));
        for location in &self.locations {
            loader.add_location(location);
        }
        tracing::info!(
            "Created {} over {} location(s){}",
            loader,
            loader.search_path.len(),
            loader
                .parent
                .as_ref()
                .map(|p| format!(", parent {}", p))
                .unwrap_or_default()
        );
        Ok(loader)
    }
}
