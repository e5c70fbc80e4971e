pub mod format;
pub mod naming;

pub use format::{ClassFormatError, ClassInfo, ClassKind, JavaClassFormat};
