//! Configuration for Commitlore.
//!
//! This crate defines the [`GrammarOptions`] that drive the commit grammar,
//! with defaults for the Conventional Commits convention, and handles loading
//! and validating the `commitlore.toml` configuration file.

mod error;
mod grammar;
mod loader;
mod schema;

pub use error::{ConfigError, ConfigResult};
pub use grammar::{GrammarOptions, split_list};
pub use loader::{CONFIG_FILE_NAME, find_and_load_config, find_and_load_config_from, load_config};
pub use schema::{Config, StreamConfig};
