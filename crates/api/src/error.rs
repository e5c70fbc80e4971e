use crate::policy::PolicyRequest;
use std::io;

/// Failure of a single definition lookup.
#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    #[error("definition not found: {name}")]
    NotFound { name: String },
    #[error("malformed resource for {name}: {reason}")]
    MalformedResource { name: String, reason: String },
    #[error("sealing violation in package {package}: {reason}")]
    SealingViolation { package: String, reason: String },
    #[error("loader is closed")]
    ClosedLoader,
    #[error("policy denied: {request}")]
    PolicyDenied { request: PolicyRequest },
    #[error("I/O error while resolving {name}: {source}")]
    Io {
        name: String,
        #[source]
        source: io::Error,
    },
    #[error("no factory registered for {name}")]
    NoFactory { name: String },
}

impl LoaderError {
    pub fn not_found(name: impl Into<String>) -> Self {
        LoaderError::NotFound { name: name.into() }
    }

    pub fn malformed(name: impl Into<String>, reason: impl ToString) -> Self {
        LoaderError::MalformedResource {
            name: name.into(),
            reason: reason.to_string(),
        }
    }

    pub fn sealing(package: impl Into<String>, reason: impl Into<String>) -> Self {
        LoaderError::SealingViolation {
            package: package.into(),
            reason: reason.into(),
        }
    }

    pub fn io(name: impl Into<String>, source: io::Error) -> Self {
        LoaderError::Io {
            name: name.into(),
            source,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, LoaderError::NotFound { .. })
    }

    /// Parent failures a child loader recovers from by resolving locally.
    pub fn is_delegation_miss(&self) -> bool {
        matches!(self, LoaderError::NotFound { .. } | LoaderError::ClosedLoader)
    }
}

pub type LoaderResult<T> = std::result::Result<T, LoaderError>;

/// Aggregated failure of the release phase of `close()`.
///
/// Every tracked handle has already been released (or given up on) by the
/// time this is returned; the error is advisory.
#[derive(Debug, thiserror::Error)]
#[error("failed to release loader resources: {primary} ({} suppressed)", .suppressed.len())]
pub struct CloseError {
    #[source]
    pub primary: io::Error,
    pub suppressed: Vec<io::Error>,
}

impl CloseError {
    /// First error becomes the primary failure, the rest are suppressed.
    pub fn from_errors(errors: Vec<io::Error>) -> Option<Self> {
        let mut errors = errors.into_iter();
        let primary = errors.next()?;
        Some(Self {
            primary,
            suppressed: errors.collect(),
        })
    }

    /// Total number of release failures.
    pub fn len(&self) -> usize {
        1 + self.suppressed.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn errors(&self) -> impl Iterator<Item = &io::Error> {
        std::iter::once(&self.primary).chain(self.suppressed.iter())
    }
}
