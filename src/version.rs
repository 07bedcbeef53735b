//! Version of this tool itself, not of the application it reports on.

use std::sync::LazyLock;

use crate::provider::{VersionConfig, VersionProvider};

/// The tool described with its own provider: crate version plus the commit
/// it was built from.
pub static TOOL: LazyLock<VersionProvider> = LazyLock::new(|| {
    VersionProvider::from_config(VersionConfig::new(
        env!("CARGO_PKG_VERSION"),
        option_env!("APP_VERSION_GIT_COMMIT").unwrap_or("unknown"),
        "v{version}-{build}",
    ))
});

pub static VERSION: LazyLock<String> = LazyLock::new(|| TOOL.formatted());

/// `--version` long form, with the build time when vergen recorded one.
pub static LONG_VERSION: LazyLock<String> = LazyLock::new(|| {
    format!(
        "{}\nbuilt: {}",
        TOOL.formatted(),
        build_timestamp().unwrap_or("unknown")
    )
});

pub fn build_timestamp() -> Option<&'static str> {
    option_env!("VERGEN_BUILD_TIMESTAMP")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_version() {
        assert_eq!(TOOL.version(), env!("CARGO_PKG_VERSION"));
        assert!(!TOOL.build().is_empty());
        assert_eq!(*VERSION, format!("v{}-{}", TOOL.version(), TOOL.build()));
    }

    #[test]
    fn test_long_version() {
        let mut lines = LONG_VERSION.lines();
        assert_eq!(lines.next(), Some(VERSION.as_str()));
        assert!(lines.next().is_some_and(|line| line.starts_with("built: ")));
    }
}
