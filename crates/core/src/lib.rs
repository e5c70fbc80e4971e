pub mod config;
pub mod definition;
pub mod dispatch;
pub mod error;
pub mod loader;
pub mod location;
pub mod logging;
pub mod package;
pub mod registry;
pub mod resolver;
pub mod search_path;
pub mod tracker;

mod materialize;

pub use config::{LoaderConfig, LoggingConfig};
pub use definition::{Definition, LoaderId};
pub use dispatch::DispatchTable;
pub use error::{ConfigError, Result};
pub use loader::{Loader, LoaderBuilder};
pub use location::{Location, LocationError};
pub use tracker::ResourceStream;
