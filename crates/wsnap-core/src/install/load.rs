//! Source loader: reads a candidate file and, for embedded-script formats,
//! extracts the concatenation of inline `<script>` bodies.

use regex_lite::Regex;
use std::path::Path;
use std::sync::OnceLock;

/// A loaded source record ready for scanning.
pub struct LoadedSource {
    pub path: std::path::PathBuf,
    /// Extension without the leading dot, lowercased.
    pub base_ext: String,
    pub contents: String,
}

/// Outcome of attempting to load one file.
pub enum LoadOutcome {
    Loaded(LoadedSource),
    /// Nothing to scan (empty extension, e.g. README).
    Skipped,
    /// Extension has no recognized MIME type.
    IgnoreWarning { path: std::path::PathBuf },
}

fn script_tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)<script[^>]*>(.*?)</script>").expect("static regex is valid")
    })
}

/// Known non-script extensions with a recognized (but irrelevant) MIME
/// type: loading is a no-op, but they don't warrant an ignore warning.
const KNOWN_NON_SCRIPT_EXTENSIONS: &[&str] = &[
    "json", "css", "scss", "less", "png", "jpg", "jpeg", "gif", "svg", "webp", "ico", "woff",
    "woff2", "ttf", "eot", "map", "txt", "md", "yml", "yaml", "toml", "lock",
];

/// Load one file's contents, applying extension-based routing.
///
/// # Errors
/// Returns an error if the file cannot be read as UTF-8.
pub fn load_source(path: &Path) -> std::io::Result<LoadOutcome> {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    if ext.is_empty() {
        return Ok(LoadOutcome::Skipped);
    }

    match ext.as_str() {
        "js" | "jsx" | "mjs" | "ts" | "tsx" => {
            let contents = std::fs::read_to_string(path)?;
            Ok(LoadOutcome::Loaded(LoadedSource {
                path: path.to_path_buf(),
                base_ext: ext,
                contents,
            }))
        }
        "html" | "vue" | "svelte" => {
            let raw = std::fs::read_to_string(path)?;
            let contents = script_tag_regex()
                .captures_iter(&raw)
                .map(|c| c.get(1).map_or("", |m| m.as_str()))
                .collect::<Vec<_>>()
                .join("\n");
            Ok(LoadOutcome::Loaded(LoadedSource {
                path: path.to_path_buf(),
                base_ext: ext,
                contents,
            }))
        }
        known if KNOWN_NON_SCRIPT_EXTENSIONS.contains(&known) => Ok(LoadOutcome::Skipped),
        _ => Ok(LoadOutcome::IgnoreWarning {
            path: path.to_path_buf(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn reads_js_verbatim() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("a.js");
        fs::write(&file, "import x from 'y';").unwrap();

        match load_source(&file).unwrap() {
            LoadOutcome::Loaded(src) => {
                assert_eq!(src.base_ext, "js");
                assert_eq!(src.contents, "import x from 'y';");
            }
            _ => panic!("expected Loaded"),
        }
    }

    #[test]
    fn extracts_script_bodies_from_html() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("index.html");
        fs::write(
            &file,
            "<html><script>import a from 'a';</script><body/><script type=\"module\">import b from 'b';</script></html>",
        )
        .unwrap();

        match load_source(&file).unwrap() {
            LoadOutcome::Loaded(src) => {
                assert!(src.contents.contains("import a from 'a';"));
                assert!(src.contents.contains("import b from 'b';"));
            }
            _ => panic!("expected Loaded"),
        }
    }

    #[test]
    fn skips_empty_extension() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("README");
        fs::write(&file, "hello").unwrap();
        assert!(matches!(load_source(&file).unwrap(), LoadOutcome::Skipped));
    }

    #[test]
    fn warns_on_unrecognized_extension() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("weird.xyz123");
        fs::write(&file, "hello").unwrap();
        assert!(matches!(
            load_source(&file).unwrap(),
            LoadOutcome::IgnoreWarning { .. }
        ));
    }
}
