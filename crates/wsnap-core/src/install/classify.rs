//! Specifier classification (bare / relative / absolute / url) and the
//! deterministic, collision-detecting output-filename sanitizer.

use rustc_hash::FxHashSet as HashSet;

/// How a textual module reference was classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecifierKind {
    Bare,
    Relative,
    Absolute,
    Url,
}

/// Classify a raw specifier string.
#[must_use]
pub fn classify(spec: &str) -> SpecifierKind {
    if spec.contains("://") {
        return SpecifierKind::Url;
    }
    if spec.starts_with("./") || spec.starts_with("../") {
        return SpecifierKind::Relative;
    }
    if spec.starts_with('/') || is_windows_absolute(spec) {
        return SpecifierKind::Absolute;
    }
    SpecifierKind::Bare
}

fn is_windows_absolute(spec: &str) -> bool {
    let bytes = spec.as_bytes();
    bytes.len() >= 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && (bytes[2] == b'\\' || bytes[2] == b'/')
}

/// A bare specifier is one that begins with a letter, `_`, or `@`, and
/// carries no URL scheme.
#[must_use]
pub fn is_bare(spec: &str) -> bool {
    if spec.contains("://") {
        return false;
    }
    matches!(spec.chars().next(), Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '@')
}

/// Is `name` a syntactically valid top-level package name (`lodash`,
/// `@scope/pkg`), as opposed to a subpath (`lodash/fp`, `@scope/pkg/deep`)?
#[must_use]
pub fn is_top_level_package_name(name: &str) -> bool {
    if name.is_empty() {
        return false;
    }
    if let Some(rest) = name.strip_prefix('@') {
        let mut parts = rest.splitn(2, '/');
        let scope = parts.next().unwrap_or("");
        let pkg = parts.next();
        !scope.is_empty() && pkg.is_some() && !pkg.unwrap().contains('/') && !pkg.unwrap().is_empty()
    } else {
        !name.contains('/')
    }
}

/// Split a bare specifier into `(package_name, subpath)`, where `subpath`
/// does not include the leading slash. `None` subpath means the root of
/// the package was requested.
#[must_use]
pub fn split_package_specifier(spec: &str) -> (&str, Option<&str>) {
    if let Some(rest) = spec.strip_prefix('@') {
        if let Some(slash) = rest.find('/') {
            let scope_and_name_len = 1 + slash;
            let after = &rest[slash + 1..];
            if let Some(sub_slash) = after.find('/') {
                return (&spec[..scope_and_name_len + 1 + sub_slash], Some(&after[sub_slash + 1..]));
            }
            return (spec, None);
        }
        return (spec, None);
    }

    if let Some(slash) = spec.find('/') {
        (&spec[..slash], Some(&spec[slash + 1..]))
    } else {
        (spec, None)
    }
}

/// Rewrite a specifier found inside an already-installed relative import
/// back into its original web-module (bare) form, per the `web_modules/`
/// unwrap rule. Returns `None` if the specifier carries no `web_modules/`
/// segment and isn't already bare.
#[must_use]
pub fn as_web_module_specifier(spec: &str) -> Option<String> {
    if is_bare(spec) {
        return Some(spec.to_string());
    }

    let without_query = spec.split('?').next().unwrap_or(spec);
    let marker = "web_modules/";
    let idx = without_query.find(marker)?;
    let remainder = &without_query[idx + marker.len()..];

    let stripped = remainder
        .strip_suffix(".js")
        .or_else(|| remainder.strip_suffix(".mjs"))
        .unwrap_or(remainder);

    if is_top_level_package_name(stripped) {
        Some(stripped.to_string())
    } else {
        Some(remainder.to_string())
    }
}

/// Babel macro specifiers (`./foo.macro`, `../bar.macro.js`) are dropped.
#[must_use]
pub fn is_babel_macro(spec: &str) -> bool {
    let s = spec.strip_suffix(".js").unwrap_or(spec);
    s.ends_with("/macro") || s == "macro" || s.ends_with(".macro")
}

/// Derive a deterministic, filesystem-safe output filename for a specifier.
/// Invalid filename characters are replaced with `-`; the `.js`/`.mjs`
/// extension is stripped only when the specifier names a valid top-level
/// package, otherwise only the extension (if any) is stripped.
#[must_use]
pub fn sanitize_name(spec: &str) -> String {
    let without_ext = if is_top_level_package_name(spec) {
        spec.strip_suffix(".js").or_else(|| spec.strip_suffix(".mjs")).unwrap_or(spec)
    } else {
        match spec.rfind('.') {
            Some(dot) if dot > spec.rfind('/').unwrap_or(0) => &spec[..dot],
            _ => spec,
        }
    };

    without_ext
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '-'
            }
        })
        .collect()
}

/// Sanitize a whole set of specifiers, returning an error if two collide.
///
/// # Errors
/// Returns the specifier pair that collides.
pub fn sanitize_all(specifiers: &[String]) -> Result<Vec<(String, String)>, (String, String)> {
    let mut seen: HashSet<String> = HashSet::default();
    let mut out = Vec::with_capacity(specifiers.len());

    for spec in specifiers {
        let name = sanitize_name(spec);
        if !seen.insert(name.clone()) {
            let prior = out
                .iter()
                .find(|(_, n): &&(String, String)| *n == name)
                .map(|(s, _)| s.clone())
                .unwrap_or_default();
            return Err((prior, spec.clone()));
        }
        out.push((spec.clone(), name));
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_specifiers() {
        assert_eq!(classify("react"), SpecifierKind::Bare);
        assert_eq!(classify("@scope/pkg"), SpecifierKind::Bare);
        assert_eq!(classify("./utils"), SpecifierKind::Relative);
        assert_eq!(classify("../utils"), SpecifierKind::Relative);
        assert_eq!(classify("/abs/path"), SpecifierKind::Absolute);
        assert_eq!(classify("https://cdn.example.com/x.js"), SpecifierKind::Url);
    }

    #[test]
    fn top_level_package_names() {
        assert!(is_top_level_package_name("lodash"));
        assert!(is_top_level_package_name("@scope/pkg"));
        assert!(!is_top_level_package_name("lodash/fp"));
        assert!(!is_top_level_package_name("@scope/pkg/deep"));
        assert!(!is_top_level_package_name("@scope"));
    }

    #[test]
    fn splits_package_and_subpath() {
        assert_eq!(split_package_specifier("lodash"), ("lodash", None));
        assert_eq!(split_package_specifier("lodash/fp"), ("lodash", Some("fp")));
        assert_eq!(
            split_package_specifier("@scope/pkg/deep/file.js"),
            ("@scope/pkg", Some("deep/file.js"))
        );
        assert_eq!(split_package_specifier("@scope/pkg"), ("@scope/pkg", None));
    }

    #[test]
    fn web_module_unwrap() {
        assert_eq!(as_web_module_specifier("react"), Some("react".to_string()));
        assert_eq!(
            as_web_module_specifier("./web_modules/lodash.js"),
            Some("lodash".to_string())
        );
        assert_eq!(
            as_web_module_specifier("./web_modules/lodash/fp.js?v=1"),
            Some("lodash/fp.js".to_string())
        );
        assert_eq!(as_web_module_specifier("./local/util.js"), None);
    }

    #[test]
    fn babel_macro_detection() {
        assert!(is_babel_macro("./colors.macro"));
        assert!(is_babel_macro("./colors.macro.js"));
        assert!(!is_babel_macro("./colors.js"));
    }

    #[test]
    fn sanitize_name_strips_ext_for_packages_only() {
        assert_eq!(sanitize_name("react"), "react");
        assert_eq!(sanitize_name("lodash.js"), "lodash");
        assert_eq!(sanitize_name("@scope/pkg/deep/file.js"), "-scope-pkg-deep-file");
    }

    #[test]
    fn sanitize_all_detects_collisions() {
        let specs = vec!["a/b".to_string(), "a-b".to_string()];
        assert!(sanitize_all(&specs).is_err());
    }
}
