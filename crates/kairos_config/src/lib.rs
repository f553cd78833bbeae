//! Parsing and validation of `kairos.toml` project configuration files.
//!
//! A project file names the design, the library and netlist inputs, the
//! constraint documents, and how reports are written. Relative paths are
//! interpreted against the directory holding `kairos.toml`.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, CONFIG_FILE_NAME};
pub use types::*;
