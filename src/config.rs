//! Layered configuration for the version provider.
//!
//! Sources are folded left to right into one [`ConfigMap`], later sources
//! overriding earlier ones:
//! - bundled defaults (`config/version.yaml`, compiled in)
//! - the application config file
//! - environment variables (`APP_VERSION_VERSION`, `APP_VERSION_BUILD`,
//!   `APP_VERSION_FORMAT`)

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_yaml::Value;
use thiserror::Error;

/// Merged key/value mapping handed to the provider.
pub type ConfigMap = BTreeMap<String, String>;

pub const DEFAULT_ENV_PREFIX: &str = "APP_VERSION_";
/// Points at the application config file. Shares the prefix but is not a
/// version key.
pub const CONFIG_PATH_ENV: &str = "APP_VERSION_CONFIG_PATH";
pub const DEFAULT_APP_CONFIG_PATH: &str = "config/version.yaml";

pub(crate) const BUNDLED_DEFAULTS: &str = include_str!("../config/version.yaml");
const ENV_KEYS: [&str; 3] = ["version", "build", "format"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{}'", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config '{origin}'")]
    Parse {
        origin: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("config '{origin}' must be a key/value mapping")]
    NotMapping { origin: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Defaults shipped with the crate.
    Defaults,
    /// A YAML (or JSON) mapping on disk. A missing optional file is skipped.
    File { path: PathBuf, required: bool },
    /// `<prefix>VERSION`, `<prefix>BUILD` and `<prefix>FORMAT`.
    Env { prefix: String },
}

impl ConfigSource {
    pub fn load(&self) -> Result<ConfigMap, ConfigError> {
        match self {
            ConfigSource::Defaults => parse_yaml(BUNDLED_DEFAULTS, "bundled defaults"),
            ConfigSource::File { path, required } => load_file(path, *required),
            ConfigSource::Env { prefix } => Ok(from_vars(prefix, std::env::vars_os())),
        }
    }
}

/// Ordered list of sources to fold.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    sources: Vec<ConfigSource>,
}

impl ConfigLoader {
    pub fn new(sources: Vec<ConfigSource>) -> Self {
        Self { sources }
    }

    /// Defaults, then the application file, then the environment.
    ///
    /// An explicit `app_path`, or one taken from `APP_VERSION_CONFIG_PATH`,
    /// must exist. Otherwise `config/version.yaml` is used when present.
    /// Empty paths count as unset.
    pub fn standard(app_path: Option<PathBuf>, env_prefix: &str) -> Self {
        let file = match app_path
            .filter(|path| !path.as_os_str().is_empty())
            .or_else(|| {
                std::env::var_os(CONFIG_PATH_ENV)
                    .filter(|path| !path.is_empty())
                    .map(PathBuf::from)
            }) {
            Some(path) => ConfigSource::File {
                path,
                required: true,
            },
            None => ConfigSource::File {
                path: PathBuf::from(DEFAULT_APP_CONFIG_PATH),
                required: false,
            },
        };
        Self::new(vec![
            ConfigSource::Defaults,
            file,
            ConfigSource::Env {
                prefix: env_prefix.to_string(),
            },
        ])
    }

    pub fn sources(&self) -> &[ConfigSource] {
        &self.sources
    }

    pub fn load(&self) -> Result<ConfigMap, ConfigError> {
        self.sources.iter().try_fold(ConfigMap::new(), |acc, source| {
            let layer = source.load()?;
            tracing::debug!(source = ?source, keys = layer.len(), "config source loaded");
            Ok(merge(acc, layer))
        })
    }
}

/// Overlays `overlay` on `base`; keys in `overlay` win.
pub fn merge(mut base: ConfigMap, overlay: ConfigMap) -> ConfigMap {
    base.extend(overlay);
    base
}

/// Picks version keys out of `vars`. Keys are matched case-sensitively on
/// the prefix and lowercased after it. Entries that are not valid UTF-8 are
/// skipped.
pub fn from_vars<I>(prefix: &str, vars: I) -> ConfigMap
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    vars.into_iter()
        .filter_map(|(name, value)| {
            let name = name.to_string_lossy();
            let key = name.strip_prefix(prefix)?.to_ascii_lowercase();
            if !ENV_KEYS.contains(&key.as_str()) {
                return None;
            }
            match value.into_string() {
                Ok(value) => Some((key, value)),
                Err(_) => {
                    tracing::warn!(var = %name, "ignoring non UTF-8 environment value");
                    None
                }
            }
        })
        .collect()
}

fn load_file(path: &Path, required: bool) -> Result<ConfigMap, ConfigError> {
    match fs::read_to_string(path) {
        Ok(content) => parse_yaml(&content, &path.display().to_string()),
        Err(e) if e.kind() == io::ErrorKind::NotFound && !required => {
            tracing::debug!(path = %path.display(), "optional config file not found");
            Ok(ConfigMap::new())
        }
        Err(source) => Err(ConfigError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Parses a YAML mapping. Scalars become strings; `null`, sequences and
/// nested mappings are dropped so the provider falls back to defaults.
///
/// Unquoted numbers and booleans keep their text as written (`1.10` stays
/// `1.10`) whenever every value in the document is a scalar.
pub fn parse_yaml(content: &str, origin: &str) -> Result<ConfigMap, ConfigError> {
    let value: Value = serde_yaml::from_str(content).map_err(|source| ConfigError::Parse {
        origin: origin.to_string(),
        source,
    })?;

    let mapping = match value {
        Value::Mapping(mapping) => mapping,
        Value::Null => return Ok(ConfigMap::new()),
        _ => {
            return Err(ConfigError::NotMapping {
                origin: origin.to_string(),
            })
        }
    };

    // Plain scalars deserialized as strings come back verbatim.
    let written: Option<BTreeMap<String, String>> = serde_yaml::from_str(content).ok();

    let mut map = ConfigMap::new();
    for (key, value) in mapping {
        let Some(key) = scalar_to_string(&key) else {
            tracing::warn!(origin, key = ?key, "ignoring non-scalar config key");
            continue;
        };
        let text = match &value {
            Value::Number(_) | Value::Bool(_) | Value::Tagged(_) => written
                .as_ref()
                .and_then(|written| written.get(&key).cloned())
                .or_else(|| {
                    let text = scalar_to_string(&value)?;
                    tracing::warn!(
                        origin,
                        key,
                        value = text,
                        "unquoted value may differ from the file, quote it"
                    );
                    Some(text)
                }),
            _ => scalar_to_string(&value),
        };
        match text {
            Some(text) => {
                map.insert(key, text);
            }
            None => tracing::warn!(origin, key, "ignoring malformed config value"),
        }
    }
    Ok(map)
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar_to_string(&tagged.value),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
    }
}
