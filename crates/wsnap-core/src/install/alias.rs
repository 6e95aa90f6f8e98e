//! Alias entries: `{from, to, kind}` rewriting rules applied both during
//! target aggregation (package aliases only) and in the bundler's alias
//! plugin stage.

use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliasKind {
    Package,
    Path,
    Url,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasEntry {
    pub from: String,
    pub to: String,
    pub kind: AliasKind,
}

impl AliasEntry {
    #[must_use]
    pub fn classify(from: impl Into<String>, to: impl Into<String>) -> Self {
        let to = to.into();
        let kind = if to.contains("://") {
            AliasKind::Url
        } else if to.starts_with('.') || to.starts_with('/') {
            AliasKind::Path
        } else {
            AliasKind::Package
        };
        Self {
            from: from.into(),
            to,
            kind,
        }
    }
}

/// Build alias entries from a `from -> to` config map, classifying each.
#[must_use]
pub fn build_aliases(map: &BTreeMap<String, String>) -> Vec<AliasEntry> {
    map.iter()
        .map(|(from, to)| AliasEntry::classify(from.clone(), to.clone()))
        .collect()
}

/// Rewrite a specifier through package-kind aliases only. Path/URL aliases
/// never participate in install-target rewriting.
#[must_use]
pub fn rewrite_package_alias<'a>(specifier: &'a str, aliases: &'a [AliasEntry]) -> &'a str {
    for alias in aliases {
        if alias.kind == AliasKind::Package && alias.from == specifier {
            return &alias.to;
        }
    }
    specifier
}

/// Is `specifier` covered by any externalized-package prefix?
/// `spec == ext || spec.starts_with(ext + "/")`.
#[must_use]
pub fn is_externalized(specifier: &str, external_prefixes: &[String]) -> bool {
    external_prefixes.iter().any(|ext| {
        specifier == ext || specifier.starts_with(&format!("{ext}/"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_alias_kinds() {
        assert_eq!(AliasEntry::classify("a", "b").kind, AliasKind::Package);
        assert_eq!(AliasEntry::classify("a", "./b").kind, AliasKind::Path);
        assert_eq!(AliasEntry::classify("a", "/b").kind, AliasKind::Path);
        assert_eq!(
            AliasEntry::classify("a", "https://cdn/b").kind,
            AliasKind::Url
        );
    }

    #[test]
    fn rewrites_only_package_aliases() {
        let aliases = vec![
            AliasEntry::classify("react", "preact/compat"),
            AliasEntry::classify("utils", "./src/utils"),
        ];
        assert_eq!(rewrite_package_alias("react", &aliases), "preact/compat");
        assert_eq!(rewrite_package_alias("utils", &aliases), "utils");
        assert_eq!(rewrite_package_alias("lodash", &aliases), "lodash");
    }

    #[test]
    fn externalized_prefix_match() {
        let ext = vec!["react".to_string(), "@scope/pkg".to_string()];
        assert!(is_externalized("react", &ext));
        assert!(is_externalized("react/jsx-runtime", &ext));
        assert!(!is_externalized("react-dom", &ext));
        assert!(is_externalized("@scope/pkg/sub", &ext));
    }
}
