pub mod manifest;
pub mod naming;
pub mod package;
pub mod resource;

pub use manifest::{Attributes, Manifest, ManifestError};
pub use package::{Package, PackageVersion};
pub use resource::{CodeSigner, CodeSource, Resource};
