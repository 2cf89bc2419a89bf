//! Configuration for the extpack CLI
//!
//! Two concerns live here so that both the manifest engine and the CLI can
//! share them without a dependency cycle:
//! - [`options`]: the build target (browser + manifest version) handed to the
//!   manifest assembler
//! - [`config`]: the persisted TOML config file holding user defaults

pub mod config;
pub mod options;

pub use config::{Config, ConfigError, CONFIG_ENV_VAR, CONFIG_KEYS};
pub use options::{Browser, BuildOptions, ManifestVersion, OptionsError};
