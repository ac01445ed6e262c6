#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Application layer of the field report globe.
//!
//! Brings a visualization up (credential, dataset, map view) through
//! [`bootstrap::Bootstrap`], loads the TOML configuration, and provides the
//! headless renderer and real-time loop used by the `globe` CLI.

pub mod bootstrap;
pub mod config;
pub mod credentials;
pub mod headless;
pub mod runner;
pub mod summary;

pub use bootstrap::{Bootstrap, BootstrapError, FailureKind, FailureMessage};
pub use config::{AppConfig, ConfigError};
pub use credentials::{CredentialError, CredentialProvider};
