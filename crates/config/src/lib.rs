//! Configuration loading, env substitution and validation.
//!
//! Config files: `instarelay.toml` or `instarelay.json`, searched in `./`
//! then the user config directory (`~/.config/instarelay/` on Linux).
//!
//! Supports `${ENV_VAR}` substitution in all string values.

pub mod env_subst;
pub mod loader;
pub mod schema;
pub mod validate;

pub use {
    loader::{
        apply_env_overrides, apply_env_overrides_with, config_dir, discover_and_load, load_config,
    },
    schema::{RelayConfig, StorageConfig},
    validate::{ValidationError, validate},
};
