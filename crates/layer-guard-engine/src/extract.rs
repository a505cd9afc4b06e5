//! Import/export extraction.
//!
//! Two interchangeable [`ImportExtractor`] strategies share one output
//! contract: [`RegexExtractor`] scans raw text (fast, no comment/string
//! awareness) and [`TokenExtractor`] walks the token stream (precise,
//! immune to imports inside comments and literals). Callers default to the
//! token extractor and reach for the regex one only where throughput
//! dominates over fidelity.

use std::sync::OnceLock;

use regex::Regex;

use crate::lexer::{self, Token, TokenKind};

/// How the import site was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    /// `import ... from '...'` or side-effect `import '...'`.
    Static,
    /// `import('...')`.
    Dynamic,
    /// `require('...')`.
    Require,
}

/// One discovered import/require site.
///
/// `path` is the literal string inside the quotes, unresolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportInfo {
    /// The full statement text as written.
    pub raw_statement: String,
    /// Literal module specifier.
    pub path: String,
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed).
    pub column: usize,
    /// Static, dynamic, or require.
    pub kind: ImportKind,
    /// Named import specifiers (`a`, `a as b`).
    pub named_imports: Vec<String>,
    /// Default import binding, if any.
    pub default_import: Option<String>,
    /// Whether the whole import is type-level (`import type ...`).
    pub type_only: bool,
}

impl ImportInfo {
    fn new(path: String, line: usize, column: usize, kind: ImportKind) -> Self {
        Self {
            raw_statement: String::new(),
            path,
            line,
            column,
            kind,
            named_imports: Vec::new(),
            default_import: None,
            type_only: false,
        }
    }
}

/// Kind of export statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    /// `export default ...`.
    Default,
    /// `export { a, b as c } [from '...']`.
    Named,
    /// `export * from '...'`.
    ReExportAll,
    /// `export const/function/class/interface/enum/... name`.
    Declaration,
}

/// One discovered export site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportInfo {
    /// Exported binding name, if the statement has one.
    pub name: Option<String>,
    /// Line number (1-indexed).
    pub line: usize,
    /// What form the export takes.
    pub kind: ExportKind,
    /// Whether the export is type-level only.
    pub type_only: bool,
}

/// Strategy interface for finding imports in source text.
pub trait ImportExtractor: Send + Sync {
    /// Extractor identifier for diagnostics.
    fn name(&self) -> &'static str;

    /// Extracts all import sites from the source.
    fn extract(&self, source: &str) -> Vec<ImportInfo>;
}

/// Fast best-effort extractor: three independent global regex passes.
///
/// Has no comment/string awareness; an `import` inside a comment will
/// produce a false positive. Intended for quick scans only.
#[derive(Debug, Default)]
pub struct RegexExtractor;

static STATIC_IMPORT_RE: OnceLock<Regex> = OnceLock::new();
static DYNAMIC_IMPORT_RE: OnceLock<Regex> = OnceLock::new();
static REQUIRE_RE: OnceLock<Regex> = OnceLock::new();

fn static_import_re() -> &'static Regex {
    STATIC_IMPORT_RE.get_or_init(|| {
        #[allow(clippy::unwrap_used)] // pattern is a compile-time constant
        Regex::new(r#"import\s+(?:type\s+)?(?:[\w$*{},\s]+?\s+from\s+)?['"]([^'"]+)['"]"#).unwrap()
    })
}

fn dynamic_import_re() -> &'static Regex {
    DYNAMIC_IMPORT_RE.get_or_init(|| {
        #[allow(clippy::unwrap_used)]
        Regex::new(r#"import\s*\(\s*['"]([^'"]+)['"]\s*\)"#).unwrap()
    })
}

fn require_re() -> &'static Regex {
    REQUIRE_RE.get_or_init(|| {
        #[allow(clippy::unwrap_used)]
        Regex::new(r#"require\s*\(\s*['"]([^'"]+)['"]\s*\)"#).unwrap()
    })
}

/// Computes 1-indexed line/column for a byte offset. Columns count
/// chars, so both extractors agree on lines with non-ASCII text.
fn line_col(source: &str, offset: usize) -> (usize, usize) {
    let before = &source[..offset.min(source.len())];
    let line = before.bytes().filter(|&b| b == b'\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |nl| nl + 1);
    let column = before[line_start..].chars().count() + 1;
    (line, column)
}

impl ImportExtractor for RegexExtractor {
    fn name(&self) -> &'static str {
        "regex"
    }

    fn extract(&self, source: &str) -> Vec<ImportInfo> {
        let mut imports = Vec::new();

        for (re, kind) in [
            (static_import_re(), ImportKind::Static),
            (dynamic_import_re(), ImportKind::Dynamic),
            (require_re(), ImportKind::Require),
        ] {
            for caps in re.captures_iter(source) {
                let whole = caps.get(0).map_or("", |m| m.as_str());
                // The static pattern also matches `import(...)` when written
                // with a space; let the dynamic pass own those.
                if kind == ImportKind::Static && whole.contains('(') {
                    continue;
                }
                let Some(path) = caps.get(1) else { continue };
                let offset = caps.get(0).map_or(0, |m| m.start());
                let (line, column) = line_col(source, offset);
                let mut info =
                    ImportInfo::new(path.as_str().to_owned(), line, column, kind);
                info.raw_statement = whole.to_owned();
                imports.push(info);
            }
        }

        imports.sort_by(|a, b| a.line.cmp(&b.line).then(a.column.cmp(&b.column)));
        imports
    }
}

/// Precise extractor: recursive-descent reader over the token stream.
///
/// Malformed or incomplete statements are abandoned and the outer scan
/// resumes; extraction never fails on broken input.
#[derive(Debug, Default)]
pub struct TokenExtractor;

impl ImportExtractor for TokenExtractor {
    fn name(&self) -> &'static str {
        "token"
    }

    fn extract(&self, source: &str) -> Vec<ImportInfo> {
        let tokens = lexer::tokenize(source);
        let mut cursor = Cursor::new(&tokens);
        let mut imports = Vec::new();

        while let Some(tok) = cursor.peek() {
            if tok.kind == TokenKind::Keyword && tok.text == "import" {
                let mark = cursor.pos;
                if let Some(info) = parse_import(&mut cursor, source) {
                    imports.push(info);
                } else {
                    // Bail out of the malformed statement, resume after
                    // the `import` keyword.
                    cursor.pos = mark + 1;
                }
            } else if tok.kind == TokenKind::Keyword && tok.text == "require" {
                let mark = cursor.pos;
                if let Some(info) = parse_require(&mut cursor, source) {
                    imports.push(info);
                } else {
                    cursor.pos = mark + 1;
                }
            } else {
                cursor.bump();
            }
        }

        imports
    }
}

/// Extracts export statements from source (token-based only).
#[must_use]
pub fn extract_exports(source: &str) -> Vec<ExportInfo> {
    let tokens = lexer::tokenize(source);
    let mut cursor = Cursor::new(&tokens);
    let mut exports = Vec::new();

    while let Some(tok) = cursor.peek() {
        if tok.kind == TokenKind::Keyword && tok.text == "export" {
            let mark = cursor.pos;
            if let Some(mut found) = parse_export(&mut cursor) {
                exports.append(&mut found);
            } else {
                cursor.pos = mark + 1;
            }
        } else {
            cursor.bump();
        }
    }

    exports
}

/// True if every export (and there is at least one) is type-level.
#[must_use]
pub fn is_type_only_module(exports: &[ExportInfo]) -> bool {
    !exports.is_empty() && exports.iter().all(|e| e.type_only)
}

/// Cursor over significant tokens (whitespace, newlines, and comments
/// filtered out).
struct Cursor<'a> {
    toks: Vec<&'a Token>,
    pos: usize,
    /// End byte offset of the last consumed token.
    last_end: usize,
}

impl<'a> Cursor<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        let toks = tokens
            .iter()
            .filter(|t| {
                !matches!(
                    t.kind,
                    TokenKind::Whitespace
                        | TokenKind::Newline
                        | TokenKind::LineComment
                        | TokenKind::BlockComment
                )
            })
            .collect();
        Self {
            toks,
            pos: 0,
            last_end: 0,
        }
    }

    fn peek(&self) -> Option<&'a Token> {
        self.toks.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<&'a Token> {
        let tok = self.toks.get(self.pos).copied()?;
        self.pos += 1;
        self.last_end = tok.offset + tok.text.len();
        Some(tok)
    }

    fn eat_punct(&mut self, p: &str) -> bool {
        if let Some(tok) = self.peek() {
            if tok.kind == TokenKind::Punct && tok.text == p {
                self.bump();
                return true;
            }
        }
        false
    }

    fn eat_keyword(&mut self, k: &str) -> bool {
        if let Some(tok) = self.peek() {
            if tok.kind == TokenKind::Keyword && tok.text == k {
                self.bump();
                return true;
            }
        }
        false
    }

    fn peek_is_punct(&self, p: &str) -> bool {
        self.peek()
            .is_some_and(|t| t.kind == TokenKind::Punct && t.text == p)
    }

    fn peek_is_keyword(&self, k: &str) -> bool {
        self.peek()
            .is_some_and(|t| t.kind == TokenKind::Keyword && t.text == k)
    }

    /// Consumes an identifier-like token (identifiers, or keywords used as
    /// binding names).
    fn eat_name(&mut self) -> Option<String> {
        let tok = self.peek()?;
        if matches!(tok.kind, TokenKind::Ident | TokenKind::Keyword) {
            self.bump();
            Some(tok.text.clone())
        } else {
            None
        }
    }

    /// Consumes a string/template token and returns its unquoted value.
    fn eat_string(&mut self) -> Option<String> {
        let tok = self.peek()?;
        if matches!(tok.kind, TokenKind::Str | TokenKind::Template) {
            self.bump();
            Some(lexer::unquote(&tok.text).to_owned())
        } else {
            None
        }
    }
}

/// Parses one `import` statement starting at the `import` keyword.
/// Returns `None` on malformed input without consuming beyond it.
fn parse_import(cursor: &mut Cursor<'_>, source: &str) -> Option<ImportInfo> {
    let import_tok = cursor.bump()?; // `import`
    let (line, column, start) = (import_tok.line, import_tok.column, import_tok.offset);

    // Dynamic: import('...')
    if cursor.peek_is_punct("(") {
        cursor.bump();
        let path = cursor.eat_string()?;
        if !cursor.eat_punct(")") {
            return None;
        }
        let mut info = ImportInfo::new(path, line, column, ImportKind::Dynamic);
        info.raw_statement = statement_text(source, start, cursor.last_end);
        return Some(info);
    }

    // Side-effect: import '...'
    if let Some(path) = cursor.eat_string() {
        cursor.eat_punct(";");
        let mut info = ImportInfo::new(path, line, column, ImportKind::Static);
        info.raw_statement = statement_text(source, start, cursor.last_end);
        return Some(info);
    }

    let mut type_only = false;
    if cursor.peek_is_keyword("type") {
        // `import type X from ...`; a default binding literally named
        // `type` would read `import type from '...'`, which stays a
        // type-only side case we do not distinguish.
        cursor.bump();
        type_only = true;
    }

    let mut default_import = None;
    let mut named_imports = Vec::new();

    if cursor.peek_is_punct("{") {
        named_imports = parse_named_list(cursor)?;
    } else if cursor.peek_is_punct("*") {
        cursor.bump();
        if !cursor.eat_keyword("as") {
            return None;
        }
        default_import = Some(format!("* as {}", cursor.eat_name()?));
    } else {
        default_import = Some(cursor.eat_name()?);
        if cursor.eat_punct(",") {
            if cursor.peek_is_punct("{") {
                named_imports = parse_named_list(cursor)?;
            } else if cursor.eat_punct("*") {
                if !cursor.eat_keyword("as") {
                    return None;
                }
                cursor.eat_name()?;
            } else {
                return None;
            }
        }
    }

    if !cursor.eat_keyword("from") {
        return None;
    }
    let path = cursor.eat_string()?;
    cursor.eat_punct(";");

    let mut info = ImportInfo::new(path, line, column, ImportKind::Static);
    info.type_only = type_only;
    info.default_import = default_import;
    info.named_imports = named_imports;
    info.raw_statement = statement_text(source, start, cursor.last_end);
    Some(info)
}

/// Parses `{ a, b as c, type D }`, cursor positioned at `{`.
fn parse_named_list(cursor: &mut Cursor<'_>) -> Option<Vec<String>> {
    if !cursor.eat_punct("{") {
        return None;
    }
    let mut names = Vec::new();
    loop {
        if cursor.eat_punct("}") {
            return Some(names);
        }
        // Inline `type` modifier on a single specifier.
        if cursor.peek_is_keyword("type") {
            cursor.bump();
        }
        let name = cursor.eat_name()?;
        if cursor.peek_is_keyword("as") {
            cursor.bump();
            let alias = cursor.eat_name()?;
            names.push(format!("{name} as {alias}"));
        } else {
            names.push(name);
        }
        if !cursor.eat_punct(",") && !cursor.peek_is_punct("}") {
            return None;
        }
    }
}

/// Parses `require('...')` starting at the `require` keyword.
fn parse_require(cursor: &mut Cursor<'_>, source: &str) -> Option<ImportInfo> {
    let require_tok = cursor.bump()?; // `require`
    let (line, column, start) = (require_tok.line, require_tok.column, require_tok.offset);

    if !cursor.eat_punct("(") {
        return None;
    }
    let path = cursor.eat_string()?;
    if !cursor.eat_punct(")") {
        return None;
    }

    let mut info = ImportInfo::new(path, line, column, ImportKind::Require);
    info.raw_statement = statement_text(source, start, cursor.last_end);
    Some(info)
}

/// Parses one `export` statement starting at the `export` keyword.
fn parse_export(cursor: &mut Cursor<'_>) -> Option<Vec<ExportInfo>> {
    let export_tok = cursor.bump()?; // `export`
    let line = export_tok.line;

    // export default ...
    if cursor.eat_keyword("default") {
        return Some(vec![ExportInfo {
            name: None,
            line,
            kind: ExportKind::Default,
            type_only: false,
        }]);
    }

    // export * from '...'
    if cursor.eat_punct("*") {
        if !cursor.eat_keyword("from") {
            return None;
        }
        cursor.eat_string()?;
        return Some(vec![ExportInfo {
            name: None,
            line,
            kind: ExportKind::ReExportAll,
            type_only: false,
        }]);
    }

    let mut type_only = false;
    if cursor.peek_is_keyword("type") {
        cursor.bump();
        type_only = true;
    }

    // export [type] { a, b as c } [from '...']
    if cursor.peek_is_punct("{") {
        let names = parse_named_list(cursor)?;
        if cursor.eat_keyword("from") {
            cursor.eat_string()?;
        }
        return Some(
            names
                .into_iter()
                .map(|name| ExportInfo {
                    name: Some(name),
                    line,
                    kind: ExportKind::Named,
                    type_only,
                })
                .collect(),
        );
    }

    // export type Foo = ...
    if type_only {
        let name = cursor.eat_name()?;
        return Some(vec![ExportInfo {
            name: Some(name),
            line,
            kind: ExportKind::Declaration,
            type_only: true,
        }]);
    }

    // export const/let/var/function/class/interface/enum [async] name
    let mut decl_type_only = false;
    loop {
        let tok = cursor.peek()?;
        if tok.kind == TokenKind::Keyword {
            match tok.text.as_str() {
                "interface" => {
                    decl_type_only = true;
                    cursor.bump();
                }
                "const" | "let" | "var" | "function" | "class" | "enum" | "async" => {
                    cursor.bump();
                }
                _ => break,
            }
        } else {
            break;
        }
    }
    let name = cursor.eat_name()?;
    Some(vec![ExportInfo {
        name: Some(name),
        line,
        kind: ExportKind::Declaration,
        type_only: decl_type_only,
    }])
}

fn statement_text(source: &str, start: usize, end: usize) -> String {
    source
        .get(start..end.min(source.len()))
        .unwrap_or_default()
        .trim_end_matches(';')
        .trim()
        .to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_extract(src: &str) -> Vec<ImportInfo> {
        TokenExtractor.extract(src)
    }

    #[test]
    fn static_import_with_named_and_default() {
        let imports = token_extract("import React, { useState, useEffect as ue } from 'react';");
        assert_eq!(imports.len(), 1);
        let imp = &imports[0];
        assert_eq!(imp.path, "react");
        assert_eq!(imp.kind, ImportKind::Static);
        assert_eq!(imp.default_import.as_deref(), Some("React"));
        assert_eq!(imp.named_imports, vec!["useState", "useEffect as ue"]);
    }

    #[test]
    fn side_effect_import() {
        let imports = token_extract("import './styles.css';");
        assert_eq!(imports.len(), 1);
        assert_eq!(imports[0].path, "./styles.css");
        assert!(imports[0].default_import.is_none());
    }

    #[test]
    fn dynamic_import() {
        let imports = token_extract("const m = await import('@/features/auth');");
        assert_eq!(imports.len(), 1);
        assert_eq!(imports[0].kind, ImportKind::Dynamic);
        assert_eq!(imports[0].path, "@/features/auth");
    }

    #[test]
    fn require_call() {
        let imports = token_extract("const fs = require('node:fs');");
        assert_eq!(imports.len(), 1);
        assert_eq!(imports[0].kind, ImportKind::Require);
        assert_eq!(imports[0].path, "node:fs");
    }

    #[test]
    fn namespace_import() {
        let imports = token_extract("import * as path from 'path';");
        assert_eq!(imports.len(), 1);
        assert_eq!(imports[0].default_import.as_deref(), Some("* as path"));
    }

    #[test]
    fn type_only_import() {
        let imports = token_extract("import type { User } from '@/entities/user';");
        assert_eq!(imports.len(), 1);
        assert!(imports[0].type_only);
        assert_eq!(imports[0].named_imports, vec!["User"]);
    }

    #[test]
    fn import_in_line_comment_ignored() {
        let imports = token_extract("// import { a } from './b'\nconst x = 1;");
        assert!(imports.is_empty());
    }

    #[test]
    fn import_in_block_comment_ignored() {
        let imports = token_extract("/* import { a } from './b' */ const x = 1;");
        assert!(imports.is_empty());
    }

    #[test]
    fn import_in_string_ignored() {
        let imports = token_extract("const s = \"import { a } from './b'\";");
        assert!(imports.is_empty());
    }

    #[test]
    fn import_in_template_ignored() {
        let imports = token_extract("const s = `import { a } from './b'`;");
        assert!(imports.is_empty());
    }

    #[test]
    fn malformed_import_is_skipped_without_losing_later_ones() {
        let src = "import { broken\nimport { ok } from './fine';";
        let imports = token_extract(src);
        assert_eq!(imports.len(), 1);
        assert_eq!(imports[0].path, "./fine");
    }

    #[test]
    fn incomplete_import_at_eof_does_not_panic() {
        assert!(token_extract("import {").is_empty());
        assert!(token_extract("import").is_empty());
        assert!(token_extract("import x from").is_empty());
    }

    #[test]
    fn raw_statement_captures_source_text() {
        let imports = token_extract("import { a } from './b';");
        assert_eq!(imports[0].raw_statement, "import { a } from './b'");
    }

    #[test]
    fn line_and_column_of_import() {
        let imports = token_extract("const x = 1;\n  import { a } from './b';");
        assert_eq!(imports[0].line, 2);
        assert_eq!(imports[0].column, 3);
    }

    #[test]
    fn regex_extractor_finds_all_three_kinds() {
        let src = "import a from './a';\nconst b = import('./b');\nconst c = require('./c');";
        let imports = RegexExtractor.extract(src);
        assert_eq!(imports.len(), 3);
        let kinds: Vec<ImportKind> = imports.iter().map(|i| i.kind).collect();
        assert!(kinds.contains(&ImportKind::Static));
        assert!(kinds.contains(&ImportKind::Dynamic));
        assert!(kinds.contains(&ImportKind::Require));
    }

    #[test]
    fn regex_extractor_has_no_comment_awareness() {
        // Documented trade-off: the fast path sees through nothing.
        let imports = RegexExtractor.extract("// import a from './a'");
        assert_eq!(imports.len(), 1);
    }

    #[test]
    fn both_extractors_agree_on_columns_after_non_ascii_text() {
        let src = "const s = 'héllo'; const m = import('./mod');";
        let fast = RegexExtractor.extract(src);
        let precise = token_extract(src);
        assert_eq!(fast.len(), 1);
        assert_eq!(fast[0].column, 30);
        assert_eq!(fast[0].column, precise[0].column);
    }

    // --- exports ---

    #[test]
    fn export_default_and_named() {
        let exports = extract_exports("export default App;\nexport { helper, other as o };");
        assert_eq!(exports.len(), 3);
        assert_eq!(exports[0].kind, ExportKind::Default);
        assert_eq!(exports[1].name.as_deref(), Some("helper"));
        assert_eq!(exports[2].name.as_deref(), Some("other as o"));
    }

    #[test]
    fn export_star_from() {
        let exports = extract_exports("export * from './model';");
        assert_eq!(exports.len(), 1);
        assert_eq!(exports[0].kind, ExportKind::ReExportAll);
    }

    #[test]
    fn export_declarations() {
        let exports = extract_exports(
            "export const x = 1;\nexport async function go() {}\nexport class Foo {}",
        );
        let names: Vec<&str> = exports.iter().filter_map(|e| e.name.as_deref()).collect();
        assert_eq!(names, vec!["x", "go", "Foo"]);
    }

    #[test]
    fn type_only_module_detection() {
        let exports =
            extract_exports("export type Props = {};\nexport interface State {}");
        assert!(is_type_only_module(&exports));

        let mixed = extract_exports("export type Props = {};\nexport const x = 1;");
        assert!(!is_type_only_module(&mixed));

        assert!(!is_type_only_module(&[]));
    }

    #[test]
    fn export_type_braces() {
        let exports = extract_exports("export type { User, Role } from './user';");
        assert_eq!(exports.len(), 2);
        assert!(exports.iter().all(|e| e.type_only));
    }
}
