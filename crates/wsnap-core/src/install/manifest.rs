//! Package manifest (`package.json`) field reading, used by the specifier
//! resolver's export-map and main-field cascades.

use serde_json::Value;
use std::path::{Path, PathBuf};

/// A parsed `package.json`, plus the directory it lives in.
pub struct PackageManifest {
    pub dir: PathBuf,
    pub json: Value,
}

impl PackageManifest {
    /// Load the manifest for `pkg_dir/package.json`, if present.
    #[must_use]
    pub fn load(pkg_dir: &Path) -> Option<Self> {
        let json = crate::resolver::read_package_json(&pkg_dir.join("package.json"))?;
        Some(Self {
            dir: pkg_dir.to_path_buf(),
            json,
        })
    }

    #[must_use]
    pub fn has_exports(&self) -> bool {
        self.json.get("exports").is_some()
    }

    /// Resolve the exports map for subpath key `"./" + subpath` (or `"."`
    /// for the package root) under the fixed condition order
    /// `browser -> import -> default -> require`.
    ///
    /// Returns `Ok(None)` if the key is absent, `Err(())` if present but
    /// the resolved value is not a string (an `ExportMapMismatch`).
    pub fn resolve_export_entry(&self, subpath: Option<&str>) -> Result<Option<String>, ()> {
        let Some(exports) = self.json.get("exports") else {
            return Ok(None);
        };

        let key = subpath.map_or_else(|| ".".to_string(), |s| format!("./{s}"));

        // `exports` may be a bare string (root shorthand) or an object.
        let entry = if let Some(s) = exports.as_str() {
            if key == "." {
                return Ok(Some(s.to_string()));
            }
            return Ok(None);
        } else if let Some(obj) = exports.as_object() {
            match obj.get(&key) {
                Some(v) => v,
                None if key == "." => {
                    // Root conditions may be declared directly at the top level
                    // (`{"import": "...", "default": "..."}`) without a `.` key.
                    if obj.keys().any(|k| !k.starts_with('.')) {
                        exports
                    } else {
                        return Ok(None);
                    }
                }
                None => return Ok(None),
            }
        } else {
            return Err(());
        };

        match resolve_condition(entry) {
            Some(s) => Ok(Some(s)),
            None if entry.is_string() => Ok(entry.as_str().map(str::to_string)),
            None => Err(()),
        }
    }

    /// Entry field cascade for whole-package resolution:
    /// `browser:module -> module -> main:esnext -> browser -> main`.
    /// Returns `(entry_path, implicit_index)`.
    #[must_use]
    pub fn main_entry(&self) -> (String, bool) {
        if let Some(s) = self.json.get("browser").and_then(|b| b.get("module")).and_then(Value::as_str) {
            return (s.to_string(), false);
        }
        if let Some(s) = self.json.get("module").and_then(Value::as_str) {
            return (s.to_string(), false);
        }
        if let Some(s) = self.json.get("main:esnext").and_then(Value::as_str) {
            return (s.to_string(), false);
        }
        if let Some(browser) = self.json.get("browser") {
            if let Some(s) = browser.as_str() {
                return (s.to_string(), false);
            }
            if let Some(obj) = browser.as_object() {
                for key in [".", "./index.js", "./index", "./"] {
                    if let Some(Value::String(s)) = obj.get(key) {
                        return (s.clone(), false);
                    }
                }
            }
        }
        if let Some(s) = self.json.get("main").and_then(Value::as_str) {
            return (s.to_string(), false);
        }
        ("index.js".to_string(), true)
    }

    /// Probe the `browser` field as an object keyed by the importing
    /// specifier (resolver step 3's browser-object override).
    #[must_use]
    pub fn browser_override(&self, specifier: &str) -> Option<String> {
        let obj = self.json.get("browser")?.as_object()?;
        for key in [specifier, "./index.js", "./index", "./", "."] {
            if let Some(Value::String(s)) = obj.get(key) {
                return Some(s.clone());
            }
        }
        None
    }

    #[must_use]
    pub fn has_types_field(&self) -> bool {
        self.json.get("types").is_some() || self.json.get("typings").is_some()
    }
}

fn resolve_condition(entry: &Value) -> Option<String> {
    if let Some(s) = entry.as_str() {
        return Some(s.to_string());
    }
    let obj = entry.as_object()?;
    for cond in ["browser", "import", "default", "require"] {
        if let Some(v) = obj.get(cond) {
            if let Some(s) = v.as_str() {
                return Some(s.to_string());
            }
            // Nested conditional object for this condition.
            if let Some(nested) = resolve_condition(v) {
                return Some(nested);
            }
        }
    }
    None
}

/// Reserved package-name prefixes that raise an "obsolete workaround" error.
pub const RESERVED_PACKAGE_PREFIXES: &[&str] = &["@reactesm/", "@pika/react"];

#[must_use]
pub fn is_reserved_package(package_name: &str) -> bool {
    RESERVED_PACKAGE_PREFIXES
        .iter()
        .any(|p| package_name.starts_with(p))
}
