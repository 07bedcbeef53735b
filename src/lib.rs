pub mod config;
pub mod directives;
pub mod provider;
pub mod publish;
pub mod version;

pub use config::{ConfigError, ConfigLoader, ConfigMap, ConfigSource};
pub use directives::{render, Directive};
pub use provider::{VersionConfig, VersionProvider};

pub const APP_NAME: &str = "app-version";
