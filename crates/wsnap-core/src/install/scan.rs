//! Two-phase import scanner.
//!
//! Phase 1 tokenizes the raw source with the project's JS/TS/JSX lexer and
//! walks tokens looking for `import` statements, capturing exact statement
//! spans. Phase 2 is the fallback: strip comments, regex-extract only
//! import-looking lines, and re-run the same statement classification over
//! that reduced text.

use super::classify::{is_babel_macro, is_bare};
use super::target::InstallTarget;
use regex_lite::Regex;
use std::sync::OnceLock;
use wsnap_parser::{Lexer, Token, TokenKind};

/// One raw import statement located by either scan phase.
struct RawImport {
    /// The literal specifier text as written in source.
    specifier: String,
    /// The full statement text, used for shape extraction.
    statement: String,
    dynamic: bool,
}

/// Scan one loaded file's contents and return its install targets.
///
/// `base_ext` is the file's extension without the leading dot, lowercased.
#[must_use]
pub fn scan_file(base_ext: &str, contents: &str) -> Vec<InstallTarget> {
    let raw = if matches!(base_ext, "jsx" | "tsx") {
        scan_phase2(contents)
    } else {
        scan_phase1(contents).unwrap_or_else(|| scan_phase2(contents))
    };

    raw.into_iter().filter_map(classify_raw_import).collect()
}

/// Phase 1: tokenize with the real lexer. Returns `None` if the lexer
/// produced any token it couldn't classify (signals we should fall back).
fn scan_phase1(source: &str) -> Option<Vec<RawImport>> {
    let mut tokens = Vec::new();
    let mut lexer = Lexer::new(source);
    loop {
        let tok = lexer.next_token();
        if matches!(tok.kind, TokenKind::Eof) {
            break;
        }
        if matches!(tok.kind, TokenKind::Unknown) {
            return None;
        }
        tokens.push(tok);
    }

    Some(collect_imports_from_tokens(source, &tokens))
}

fn collect_imports_from_tokens(source: &str, tokens: &[Token]) -> Vec<RawImport> {
    let mut out = Vec::new();
    let mut i = 0;

    while i < tokens.len() {
        if !matches!(tokens[i].kind, TokenKind::Import) {
            i += 1;
            continue;
        }

        let start = tokens[i].span.start as usize;

        // import.meta -> meta-import, drop.
        if matches!(tokens.get(i + 1).map(|t| &t.kind), Some(TokenKind::Dot)) {
            i += 2;
            continue;
        }

        // Dynamic import(...) call.
        if matches!(tokens.get(i + 1).map(|t| &t.kind), Some(TokenKind::LParen)) {
            if let (Some(arg), Some(close)) = (tokens.get(i + 2), tokens.get(i + 3)) {
                let literal = match &arg.kind {
                    TokenKind::String(s) | TokenKind::TemplateNoSub(s) => Some(s.clone()),
                    _ => None,
                };
                if let (Some(spec), TokenKind::RParen) = (literal, &close.kind) {
                    let end = close.span.end as usize;
                    out.push(RawImport {
                        specifier: spec,
                        statement: source[start..end].to_string(),
                        dynamic: true,
                    });
                }
            }
            i += 1;
            continue;
        }

        // Static import: walk forward for the module specifier string,
        // which is either immediately after `import` (side-effect import)
        // or follows a `from` keyword.
        let mut j = i + 1;
        let mut string_idx = None;
        while j < tokens.len() {
            match &tokens[j].kind {
                TokenKind::String(_) => {
                    string_idx = Some(j);
                    break;
                }
                TokenKind::Semicolon => break,
                _ => {}
            }
            j += 1;
        }

        if let Some(str_idx) = string_idx {
            let TokenKind::String(spec) = &tokens[str_idx].kind else {
                unreachable!()
            };
            let mut end = tokens[str_idx].span.end as usize;
            let mut after = str_idx + 1;
            if matches!(tokens.get(after).map(|t| &t.kind), Some(TokenKind::Semicolon)) {
                end = tokens[after].span.end as usize;
                after += 1;
            }
            out.push(RawImport {
                specifier: spec.clone(),
                statement: source[start..end].to_string(),
                dynamic: false,
            });
            i = after;
            continue;
        }

        i = j.max(i + 1);
    }

    out
}

/// Phase 2: strip comments, pull out only import-looking statements, then
/// run the same token-based extraction over that reduced text.
fn scan_phase2(source: &str) -> Vec<RawImport> {
    let stripped = strip_comments(source);
    let reduced = extract_import_lines(&stripped);
    scan_phase1(&reduced).unwrap_or_default()
}

fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let bytes = source.as_bytes();
    let mut i = 0;
    let mut in_string: Option<u8> = None;

    while i < bytes.len() {
        let b = bytes[i];

        if let Some(quote) = in_string {
            out.push(b as char);
            if b == b'\\' && i + 1 < bytes.len() {
                out.push(bytes[i + 1] as char);
                i += 2;
                continue;
            }
            if b == quote {
                in_string = None;
            }
            i += 1;
            continue;
        }

        if b == b'\'' || b == b'"' || b == b'`' {
            in_string = Some(b);
            out.push(b as char);
            i += 1;
            continue;
        }

        if b == b'/' && bytes.get(i + 1) == Some(&b'/') {
            while i < bytes.len() && bytes[i] != b'\n' {
                i += 1;
            }
            continue;
        }

        if b == b'/' && bytes.get(i + 1) == Some(&b'*') {
            i += 2;
            while i + 1 < bytes.len() && !(bytes[i] == b'*' && bytes[i + 1] == b'/') {
                if bytes[i] == b'\n' {
                    out.push('\n');
                }
                i += 1;
            }
            i += 2;
            continue;
        }

        out.push(b as char);
        i += 1;
    }

    out
}

fn import_line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"(?m)^\s*import\s+(?:type\s+)?(?:[\w*{},\s]+\s+from\s+)?['"`][^'"`]*['"`]\s*;?\s*$|import\s*\(\s*['"`][^'"`]*['"`]\s*\)"#,
        )
        .expect("static regex is valid")
    })
}

fn extract_import_lines(source: &str) -> String {
    import_line_regex()
        .find_iter(source)
        .map(|m| m.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

fn classify_raw_import(raw: RawImport) -> Option<InstallTarget> {
    if raw.statement.trim_start().starts_with("import type") {
        return None;
    }

    let specifier = classify_specifier(&raw.specifier)?;
    if is_babel_macro(&specifier) {
        return None;
    }

    let mut target = InstallTarget::new(specifier);

    if raw.dynamic {
        target.all = true;
        return Some(target);
    }

    target.default = default_regex().is_match(&raw.statement);
    target.namespace = raw.statement.contains('*');
    target.named = extract_named(&raw.statement);
    target.all = !target.default && !target.namespace && target.named.is_empty();

    Some(target)
}

fn default_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*import\s+\w+(?:,\s*\{[^}]*\})?\s+from").expect("static regex is valid")
    })
}

fn extract_named(statement: &str) -> Vec<String> {
    let Some(open) = statement.find('{') else {
        return Vec::new();
    };
    let Some(close) = statement[open..].find('}') else {
        return Vec::new();
    };
    let body = &statement[open + 1..open + close];

    let mut names = Vec::new();
    for part in body.split(',') {
        let trimmed = part.trim();
        if trimmed.is_empty() {
            continue;
        }
        let name = trimmed.split(" as ").next().unwrap_or(trimmed).trim();
        if !name.is_empty() && !names.iter().any(|n: &String| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

/// Classify the raw specifier text into the web-module specifier that
/// becomes an install target, or `None` if it should be dropped.
fn classify_specifier(raw: &str) -> Option<String> {
    if is_bare(raw) {
        return Some(raw.to_string());
    }

    super::classify::as_web_module_specifier(raw)
}
