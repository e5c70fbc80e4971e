use super::manifest::Manifest;
use std::sync::Arc;
use url::Url;

/// Identity of a party that signed an archive entry.
///
/// Only the declared signer is carried; signatures are not verified here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CodeSigner {
    pub name: String,
}

impl CodeSigner {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Where a definition's bytes came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeSource {
    pub location: Url,
    pub signers: Vec<CodeSigner>,
}

/// Raw bytes for a named unit, as served by one location.
#[derive(Debug, Clone)]
pub struct Resource {
    /// Storage-relative path the bytes were found under.
    pub path: String,
    pub bytes: Vec<u8>,
    /// Root of the location that served the bytes.
    pub origin: Url,
    pub manifest: Option<Arc<Manifest>>,
    pub signers: Vec<CodeSigner>,
}

impl Resource {
    pub fn new(path: impl Into<String>, bytes: Vec<u8>, origin: Url) -> Self {
        Self {
            path: path.into(),
            bytes,
            origin,
            manifest: None,
            signers: Vec::new(),
        }
    }

    pub fn with_manifest(mut self, manifest: Option<Arc<Manifest>>) -> Self {
        self.manifest = manifest;
        self
    }

    pub fn with_signers(mut self, signers: Vec<CodeSigner>) -> Self {
        self.signers = signers;
        self
    }

    pub fn code_source(&self) -> CodeSource {
        CodeSource {
            location: self.origin.clone(),
            signers: self.signers.clone(),
        }
    }
}
