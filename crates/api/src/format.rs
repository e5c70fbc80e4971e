//! Byte-format capability used during materialization.
//!
//! A format knows two things about its definitions: where a name lives in
//! storage, and whether a blob of bytes is an acceptable body for that name.
//! It never executes or verifies code.

use crate::models::naming;

/// Error type for format operations
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub trait DefinitionFormat: Send + Sync {
    /// Format name (for logging/debugging)
    fn name(&self) -> &str;

    /// Storage-relative path of a definition name.
    fn resource_path(&self, name: &str) -> String {
        naming::default_resource_path(name)
    }

    /// Reject bytes that cannot become a definition named `name`.
    fn validate(&self, name: &str, bytes: &[u8]) -> Result<(), BoxError>;
}

/// Opaque blobs: any non-empty content is accepted.
#[derive(Debug, Default, Clone, Copy)]
pub struct RawFormat;

impl DefinitionFormat for RawFormat {
    fn name(&self) -> &str {
        "raw"
    }

    fn validate(&self, _name: &str, bytes: &[u8]) -> Result<(), BoxError> {
        if bytes.is_empty() {
            return Err("empty resource".into());
        }
        Ok(())
    }
}
