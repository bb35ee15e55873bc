//! Run configuration: device part selection, annealer schedule constants,
//! and logging verbosity, loaded from a `parcfg.toml` file.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str};
pub use types::{AnnealConfig, DeviceConfig, LogLevel, LoggingConfig, RunConfig};
