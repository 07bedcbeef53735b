use std::fmt;

use crate::config::ConfigMap;

pub const DEFAULT_VERSION: &str = "0.0.0";
pub const DEFAULT_BUILD: &str = "";
pub const DEFAULT_FORMAT: &str = "{version}";

const VERSION_PLACEHOLDER: &str = "{version}";
const BUILD_PLACEHOLDER: &str = "{build}";

/// Resolved version metadata. There is no way to change it once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionConfig {
    version: String,
    build: String,
    format: String,
}

impl VersionConfig {
    pub fn new(
        version: impl Into<String>,
        build: impl Into<String>,
        format: impl Into<String>,
    ) -> Self {
        Self {
            version: version.into(),
            build: build.into(),
            format: format.into(),
        }
    }

    /// Picks `version`, `build` and `format` out of a merged mapping.
    /// Missing keys take their defaults; present keys are used verbatim,
    /// even when empty.
    pub fn from_map(map: &ConfigMap) -> Self {
        let get = |key: &str, default: &str| {
            map.get(key)
                .cloned()
                .unwrap_or_else(|| default.to_string())
        };
        Self {
            version: get("version", DEFAULT_VERSION),
            build: get("build", DEFAULT_BUILD),
            format: get("format", DEFAULT_FORMAT),
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn build(&self) -> &str {
        &self.build
    }

    pub fn format(&self) -> &str {
        &self.format
    }
}

impl Default for VersionConfig {
    fn default() -> Self {
        Self::new(DEFAULT_VERSION, DEFAULT_BUILD, DEFAULT_FORMAT)
    }
}

/// Read-only access to the application's version information.
///
/// Built once at startup and shared (`Arc<VersionProvider>`) with whatever
/// needs it. None of the accessors can fail.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionProvider {
    config: VersionConfig,
}

impl VersionProvider {
    pub fn new(map: &ConfigMap) -> Self {
        Self::from_config(VersionConfig::from_map(map))
    }

    pub fn from_config(config: VersionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &VersionConfig {
        &self.config
    }

    pub fn version(&self) -> &str {
        self.config.version()
    }

    pub fn build(&self) -> &str {
        self.config.build()
    }

    /// Renders the format template.
    ///
    /// `{version}` and `{build}` are replaced in a single pass. Any other
    /// text, unknown placeholders included, is copied as is, and
    /// substituted values are never expanded again.
    pub fn formatted(&self) -> String {
        let template = self.config.format();
        let mut out = String::with_capacity(template.len() + self.version().len());
        let mut rest = template;

        while let Some(pos) = rest.find('{') {
            out.push_str(&rest[..pos]);
            let tail = &rest[pos..];
            if let Some(after) = tail.strip_prefix(VERSION_PLACEHOLDER) {
                out.push_str(self.version());
                rest = after;
            } else if let Some(after) = tail.strip_prefix(BUILD_PLACEHOLDER) {
                out.push_str(self.build());
                rest = after;
            } else {
                out.push('{');
                rest = &tail[1..];
            }
        }
        out.push_str(rest);
        out
    }
}

impl fmt::Display for VersionProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.formatted())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use rstest::rstest;

    use super::*;

    fn map(pairs: &[(&str, &str)]) -> ConfigMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[rstest]
    #[case(&[("version", "2.0.1"), ("build", "abc123"), ("format", "v{version}-{build}")], "v2.0.1-abc123")]
    #[case(&[], "0.0.0")]
    #[case(&[("version", "1.0.0"), ("format", "{version} {build} {version}")], "1.0.0  1.0.0")]
    #[case(&[("version", "1.0.0"), ("format", "{version}-{unknown}")], "1.0.0-{unknown}")]
    #[case(&[("version", "1.0.0"), ("format", "{{version}}")], "{1.0.0}")]
    #[case(&[("version", "1.0.0"), ("format", "{version")], "{version")]
    #[case(&[("version", "{build}"), ("build", "x"), ("format", "{version}")], "{build}")]
    #[case(&[("version", "3.1.4"), ("format", "")], "")]
    #[case(&[("version", "3.1.4"), ("format", "release {version} ✓")], "release 3.1.4 ✓")]
    fn test_formatted(#[case] pairs: &[(&str, &str)], #[case] expected: &str) {
        let provider = VersionProvider::new(&map(pairs));
        assert_eq!(provider.formatted(), expected);
    }

    #[test]
    fn test_defaults_for_empty_config() {
        let provider = VersionProvider::new(&ConfigMap::new());
        assert_eq!(provider.version(), "0.0.0");
        assert_eq!(provider.build(), "");
        assert_eq!(provider.formatted(), "0.0.0");
        assert_eq!(provider, VersionProvider::default());
    }

    #[rstest]
    #[case("1.2.3", "abc123")]
    #[case("", "")]
    #[case("  7.0.0-rc.1 ", "build #42")]
    fn test_values_are_verbatim(#[case] version: &str, #[case] build: &str) {
        let provider = VersionProvider::new(&map(&[("version", version), ("build", build)]));
        assert_eq!(provider.version(), version);
        assert_eq!(provider.build(), build);
    }

    #[test]
    fn test_missing_format_returns_version() {
        let provider = VersionProvider::new(&map(&[("version", "4.5.6"), ("build", "b1")]));
        assert_eq!(provider.formatted(), provider.version());
    }

    #[test]
    fn test_unrelated_keys_ignored() {
        let provider = VersionProvider::new(&map(&[("name", "app"), ("version", "1.0.0")]));
        assert_eq!(provider.config(), &VersionConfig::new("1.0.0", "", "{version}"));
    }

    #[test]
    fn test_formatted_is_idempotent() {
        let provider =
            VersionProvider::new(&map(&[("version", "1.0.0"), ("format", "v{version}")]));
        let first = provider.formatted();
        for _ in 0..3 {
            assert_eq!(provider.formatted(), first);
        }
        assert_eq!(provider.to_string(), first);
    }

    #[test]
    fn test_shared_between_threads() {
        let provider = Arc::new(VersionProvider::from_config(VersionConfig::new(
            "9.9.9",
            "ci-7",
            "{version}+{build}",
        )));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let provider = provider.clone();
                thread::spawn(move || provider.formatted())
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), "9.9.9+ci-7");
        }
    }
}
