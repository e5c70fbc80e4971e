//! JVM class files as definition bodies.

use crate::naming;
use lodestar_api::{BoxError, DefinitionFormat};
use ristretto_classfile::{ClassAccessFlags, ClassFile};
use std::io::Cursor;

#[derive(Debug, thiserror::Error)]
pub enum ClassFormatError {
    #[error("failed to parse class: {0}")]
    Parse(String),
    #[error("wrong name: expected {expected}, class file declares {found}")]
    NameMismatch { expected: String, found: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassKind {
    Class,
    Interface,
    Annotation,
    Enum,
}

/// Header facts of a class file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassInfo {
    /// Binary name, `ivonet.IvoNet`.
    pub name: String,
    pub kind: ClassKind,
    pub is_public: bool,
}

impl ClassInfo {
    pub fn parse(bytes: &[u8]) -> Result<Self, ClassFormatError> {
        let class = ClassFile::from_bytes(&mut Cursor::new(bytes.to_vec()))
            .map_err(|e| ClassFormatError::Parse(format!("{e:?}")))?;
        let internal = class
            .class_name()
            .map_err(|e| ClassFormatError::Parse(format!("{e:?}")))?
            .to_string();

        let flags = class.access_flags;
        // Annotations are interfaces too, so check them first.
        let kind = if flags.contains(ClassAccessFlags::ANNOTATION) {
            ClassKind::Annotation
        } else if flags.contains(ClassAccessFlags::INTERFACE) {
            ClassKind::Interface
        } else if flags.contains(ClassAccessFlags::ENUM) {
            ClassKind::Enum
        } else {
            ClassKind::Class
        };

        Ok(Self {
            name: naming::internal_to_binary(&internal),
            kind,
            is_public: flags.contains(ClassAccessFlags::PUBLIC),
        })
    }
}

/// Binary names map to `.class` paths; bodies must parse and declare the requested name.
#[derive(Debug, Clone, Copy, Default)]
pub struct JavaClassFormat;

impl DefinitionFormat for JavaClassFormat {
    fn name(&self) -> &str {
        "java-class"
    }

    fn resource_path(&self, name: &str) -> String {
        naming::class_file_path(name)
    }

    fn validate(&self, name: &str, bytes: &[u8]) -> Result<(), BoxError> {
        let info = ClassInfo::parse(bytes)?;
        if info.name != name {
            return Err(ClassFormatError::NameMismatch {
                expected: name.to_string(),
                found: info.name,
            }
            .into());
        }
        Ok(())
    }
}
