//! Single-pass tokenizer for JavaScript/TypeScript sources.
//!
//! Produces just enough structure to find import/export/require statement
//! boundaries: strings, template literals, and comments are consumed
//! opaquely so their contents can never be mistaken for statements.
//! Malformed input (unterminated string, abrupt EOF) is absorbed, never
//! raised; architecture checking must stay useful on in-progress edits.

/// Kind of lexed token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// `\n` or `\r\n`.
    Newline,
    /// Run of spaces/tabs.
    Whitespace,
    /// `// ...` to end of line.
    LineComment,
    /// `/* ... */`, possibly spanning lines.
    BlockComment,
    /// Single- or double-quoted string, quotes included in text.
    Str,
    /// Backtick template literal, treated opaquely.
    Template,
    /// One of `{ } ( ) [ ] ; , . *`.
    Punct,
    /// Identifier.
    Ident,
    /// Reserved word relevant to import/export syntax.
    Keyword,
}

/// A lexed token. Owned by the extraction pass that created it and
/// discarded after extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// What kind of token this is.
    pub kind: TokenKind,
    /// Raw source text of the token.
    pub text: String,
    /// Byte offset of the token start.
    pub offset: usize,
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed).
    pub column: usize,
}

const KEYWORDS: &[&str] = &[
    "import", "export", "from", "require", "as", "type", "typeof", "const", "let", "var",
    "function", "class", "interface", "enum", "await", "async", "default",
];

/// Tokenizes a whole source file in one forward scan.
///
/// O(n) in source length with no backtracking. Unrecognized characters are
/// skipped one at a time.
#[must_use]
pub fn tokenize(source: &str) -> Vec<Token> {
    Lexer::new(source).run()
}

struct Lexer<'a> {
    src: &'a str,
    chars: Vec<(usize, char)>,
    pos: usize,
    line: usize,
    column: usize,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            chars: src.char_indices().collect(),
            pos: 0,
            line: 1,
            column: 1,
            tokens: Vec::new(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).map(|&(_, c)| c)
    }

    fn peek_at(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.pos + ahead).map(|&(_, c)| c)
    }

    fn offset(&self) -> usize {
        self.chars
            .get(self.pos)
            .map_or(self.src.len(), |&(off, _)| off)
    }

    /// Advances one char, tracking line/column.
    fn bump(&mut self) -> Option<char> {
        let &(_, c) = self.chars.get(self.pos)?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn push(&mut self, kind: TokenKind, start_off: usize, line: usize, column: usize) {
        let end = self.offset();
        self.tokens.push(Token {
            kind,
            text: self.src[start_off..end].to_owned(),
            offset: start_off,
            line,
            column,
        });
    }

    fn run(mut self) -> Vec<Token> {
        while let Some(c) = self.peek() {
            let (start, line, column) = (self.offset(), self.line, self.column);
            match c {
                '\n' => {
                    self.bump();
                    self.push(TokenKind::Newline, start, line, column);
                }
                '\r' => {
                    self.bump();
                    if self.peek() == Some('\n') {
                        self.bump();
                    }
                    self.push(TokenKind::Newline, start, line, column);
                }
                ' ' | '\t' => {
                    while matches!(self.peek(), Some(' ' | '\t')) {
                        self.bump();
                    }
                    self.push(TokenKind::Whitespace, start, line, column);
                }
                '/' if self.peek_at(1) == Some('/') => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.bump();
                    }
                    self.push(TokenKind::LineComment, start, line, column);
                }
                '/' if self.peek_at(1) == Some('*') => {
                    self.bump();
                    self.bump();
                    // Consume to `*/`; EOF mid-comment stops cleanly.
                    loop {
                        match self.peek() {
                            None => break,
                            Some('*') if self.peek_at(1) == Some('/') => {
                                self.bump();
                                self.bump();
                                break;
                            }
                            Some(_) => {
                                self.bump();
                            }
                        }
                    }
                    self.push(TokenKind::BlockComment, start, line, column);
                }
                '\'' | '"' => {
                    self.consume_string(c);
                    self.push(TokenKind::Str, start, line, column);
                }
                '`' => {
                    self.consume_string('`');
                    self.push(TokenKind::Template, start, line, column);
                }
                '{' | '}' | '(' | ')' | '[' | ']' | ';' | ',' | '.' | '*' => {
                    self.bump();
                    self.push(TokenKind::Punct, start, line, column);
                }
                c if c.is_alphabetic() || c == '_' || c == '$' => {
                    while let Some(c) = self.peek() {
                        if c.is_alphanumeric() || c == '_' || c == '$' {
                            self.bump();
                        } else {
                            break;
                        }
                    }
                    let text = &self.src[start..self.offset()];
                    let kind = if KEYWORDS.contains(&text) {
                        TokenKind::Keyword
                    } else {
                        TokenKind::Ident
                    };
                    self.push(kind, start, line, column);
                }
                _ => {
                    // Operators, numbers, anything else: skip one char.
                    self.bump();
                }
            }
        }
        self.tokens
    }

    /// Consumes a quoted string or template including its delimiters.
    ///
    /// Escape handling only prevents a backslashed quote from terminating
    /// the literal. No interpolation awareness for templates.
    fn consume_string(&mut self, quote: char) {
        self.bump(); // opening quote
        while let Some(c) = self.peek() {
            if c == '\\' {
                self.bump();
                self.bump(); // escaped char, whatever it is
                continue;
            }
            if c == quote {
                self.bump();
                return;
            }
            if c == '\n' && quote != '`' {
                // Unterminated single-line string: stop at the newline.
                return;
            }
            self.bump();
        }
        // EOF mid-string: stop without error.
    }
}

/// Unquotes a `Str` or `Template` token's text.
#[must_use]
pub fn unquote(text: &str) -> &str {
    let text = text
        .strip_prefix(['\'', '"', '`'])
        .unwrap_or(text);
    text.strip_suffix(['\'', '"', '`']).unwrap_or(text)
}
