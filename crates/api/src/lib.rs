pub mod error;
pub mod format;
pub mod models;
pub mod policy;
pub mod storage;

// Re-export commonly used types
pub use error::{CloseError, LoaderError, LoaderResult};
pub use format::{BoxError, DefinitionFormat, RawFormat};
pub use models::*;
pub use policy::{AllowAll, PolicyHook, PolicyRequest};
pub use storage::{LocationKind, LocationStorage};
