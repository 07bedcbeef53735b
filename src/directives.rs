//! `@app_version` and `@app_build` template directives.

use std::str::FromStr;

use crate::provider::VersionProvider;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    /// Expands to [`VersionProvider::formatted`].
    AppVersion,
    /// Expands to [`VersionProvider::build`].
    AppBuild,
}

impl Directive {
    pub const ALL: [Directive; 2] = [Directive::AppVersion, Directive::AppBuild];

    pub fn name(&self) -> &'static str {
        match self {
            Directive::AppVersion => "app_version",
            Directive::AppBuild => "app_build",
        }
    }

    pub fn expand(&self, provider: &VersionProvider) -> String {
        match self {
            Directive::AppVersion => provider.formatted(),
            Directive::AppBuild => provider.build().to_string(),
        }
    }
}

impl FromStr for Directive {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Directive::ALL
            .into_iter()
            .find(|d| d.name() == s)
            .ok_or_else(|| format!("unknown directive '@{s}'"))
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn ident_len(s: &str) -> usize {
    s.find(|c: char| !is_ident_char(c)).unwrap_or(s.len())
}

/// Expands every directive in `template`.
///
/// A directive is `@name`, optionally followed by `()`, and must not be
/// directly followed by another identifier character. `@@name` escapes a
/// directive and renders as `@name`. Anything else, including unknown
/// `@words`, is copied through.
pub fn render(template: &str, provider: &VersionProvider) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find('@') {
        out.push_str(&rest[..pos]);
        let after_at = &rest[pos + 1..];

        if let Some(escaped) = after_at.strip_prefix('@') {
            let len = ident_len(escaped);
            if escaped[..len].parse::<Directive>().is_ok() {
                out.push_str(&after_at[..len + 1]);
                rest = &escaped[len..];
                continue;
            }
        }

        let len = ident_len(after_at);
        match after_at[..len].parse::<Directive>() {
            Ok(directive) => {
                out.push_str(&directive.expand(provider));
                let tail = &after_at[len..];
                rest = tail.strip_prefix("()").unwrap_or(tail);
            }
            Err(_) => {
                out.push('@');
                rest = after_at;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::provider::VersionConfig;

    fn provider() -> VersionProvider {
        VersionProvider::from_config(VersionConfig::new("1.2.3", "abc123", "v{version}"))
    }

    #[rstest]
    #[case("@app_version", "v1.2.3")]
    #[case("@app_build", "abc123")]
    #[case("<footer>@app_version() / @app_build()</footer>", "<footer>v1.2.3 / abc123</footer>")]
    #[case("@app_versions", "@app_versions")]
    #[case("mail@example.com", "mail@example.com")]
    #[case("@@app_build", "@app_build")]
    #[case("@@app_version() is @app_version", "@app_version() is v1.2.3")]
    #[case("@@@app_build", "@@app_build")]
    #[case("@@other", "@@other")]
    #[case("@app_build(x)", "abc123(x)")]
    #[case("trailing @", "trailing @")]
    #[case("no directives", "no directives")]
    fn test_render(#[case] template: &str, #[case] expected: &str) {
        assert_eq!(render(template, &provider()), expected);
    }

    #[test]
    fn test_render_empty_build() {
        let provider = VersionProvider::default();
        assert_eq!(render("[@app_build]", &provider), "[]");
        assert_eq!(render("[@app_version]", &provider), "[0.0.0]");
    }

    #[test]
    fn test_directive_names() {
        for directive in Directive::ALL {
            assert_eq!(directive.name().parse::<Directive>(), Ok(directive));
        }
        assert!("app".parse::<Directive>().is_err());
    }
}
