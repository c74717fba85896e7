//! Configuration for the flowsync CLI.
//!
//! Two distinct layers:
//!
//! - [`ConfigStore`]: the user's persisted tool configuration — named
//!   connection domains (API + database settings) stored as TOML under the
//!   XDG config directory.
//! - [`Manifest`]: the per-project `flowsync.config.json` manifest that
//!   drives component discovery and names the target engine domain.

mod error;
mod manifest;
mod store;

pub use error::{ConfigError, Result};
pub use manifest::{ComponentType, DEFAULT_FLOW, MANIFEST_FILE, Manifest, ManifestPaths};
pub use store::{ConfigStore, DEFAULT_DOMAIN, DomainConfig, config_dir, store_path};
