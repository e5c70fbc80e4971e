//! Pluggable permission hook.
//!
//! The loader core never decides on its own whether an operation is allowed;
//! it describes the operation as a [`PolicyRequest`] and asks the host's
//! [`PolicyHook`]. A `false` answer is fatal for the operation.

use std::fmt;
use url::Url;

/// Boundary operation that requires the host's consent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyRequest {
    /// A new loader is about to be created over these locations.
    CreateLoader { locations: Vec<Url> },
    /// A definition is being materialized from a non-local origin.
    ReachOrigin { definition: String, origin: Url },
    /// A caller asks for a definition in this package.
    AccessPackage { package: String },
}

impl fmt::Display for PolicyRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyRequest::CreateLoader { locations } => {
                write!(f, "create loader over {} location(s)", locations.len())?;
                for url in locations {
                    write!(f, " {}", url)?;
                }
                Ok(())
            }
            PolicyRequest::ReachOrigin { definition, origin } => {
                write!(f, "let {} reach {}", definition, origin)
            }
            PolicyRequest::AccessPackage { package } => write!(f, "access package {}", package),
        }
    }
}

/// Host-supplied predicate consulted by the loader at boundary points.
pub trait PolicyHook: Send + Sync {
    fn authorize(&self, request: &PolicyRequest) -> bool;

    /// Opt in to an `AccessPackage` check before every lookup.
    fn checks_package_access(&self) -> bool {
        false
    }
}

/// Default hook: every request is granted.
#[derive(Debug, Default, Clone, Copy)]
pub struct AllowAll;

impl PolicyHook for AllowAll {
    fn authorize(&self, _request: &PolicyRequest) -> bool {
        true
    }
}

impl<F> PolicyHook for F
where
    F: Fn(&PolicyRequest) -> bool + Send + Sync,
{
    fn authorize(&self, request: &PolicyRequest) -> bool {
        self(request)
    }
}
