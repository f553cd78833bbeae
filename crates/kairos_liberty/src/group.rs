//! Generic group tree for the Liberty-style syntax.
//!
//! The format has three statement shapes:
//!
//! ```text
//! name : value ;              simple attribute
//! name ( args ) ;             complex attribute
//! name ( args ) { ... }       group
//! ```
//!
//! [`scan_groups`] turns comment-masked text into a forest of [`Group`]s
//! without interpreting any names; the library builder walks that tree.

use crate::codes;
use kairos_diagnostics::{Diagnostic, DiagnosticSink, Label};
use kairos_source::{FileId, Span};
use serde::Serialize;

/// A scalar attribute value.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// A bare token that parses as a float.
    Number(f64),
    /// A double-quoted string, quotes removed.
    Str(String),
    /// Any other bare token (or several tokens on one line, space-joined).
    Token(String),
}

impl AttributeValue {
    /// Returns the numeric value, parsing quoted strings if needed.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Number(n) => Some(*n),
            AttributeValue::Str(s) | AttributeValue::Token(s) => s.trim().parse().ok(),
        }
    }

    /// Returns the textual value of a string or token.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::Number(_) => None,
            AttributeValue::Str(s) | AttributeValue::Token(s) => Some(s),
        }
    }

    /// Returns `true` for the token `true` (any case).
    pub fn as_bool(&self) -> bool {
        self.as_str()
            .is_some_and(|s| s.trim().eq_ignore_ascii_case("true"))
    }

    /// Renders the value as text regardless of its kind.
    pub fn to_text(&self) -> String {
        match self {
            AttributeValue::Number(n) => n.to_string(),
            AttributeValue::Str(s) | AttributeValue::Token(s) => s.clone(),
        }
    }
}

/// `name : value ;`
#[derive(Clone, Debug)]
pub struct SimpleAttribute {
    /// Attribute name.
    pub name: String,
    /// Parsed value.
    pub value: AttributeValue,
    /// Location of the whole statement.
    pub span: Span,
}

/// `name ( args ) ;`
#[derive(Clone, Debug)]
pub struct ComplexAttribute {
    /// Attribute name.
    pub name: String,
    /// Comma-separated arguments.
    pub args: Vec<AttributeValue>,
    /// Location of the whole statement.
    pub span: Span,
}

/// `kind ( args ) { ... }`
#[derive(Clone, Debug)]
pub struct Group {
    /// Group keyword, e.g. `cell`, `pin`, `timing`.
    pub kind: String,
    /// Header arguments as raw text, quotes removed.
    pub args: Vec<String>,
    /// Location of the group header.
    pub span: Span,
    /// Simple attributes in source order.
    pub simple: Vec<SimpleAttribute>,
    /// Complex attributes in source order.
    pub complex: Vec<ComplexAttribute>,
    /// Nested groups in source order.
    pub groups: Vec<Group>,
}

impl Group {
    fn new(kind: String, args: Vec<String>, span: Span) -> Self {
        Self {
            kind,
            args,
            span,
            simple: Vec::new(),
            complex: Vec::new(),
            groups: Vec::new(),
        }
    }

    /// The first header argument, which names most groups.
    pub fn name(&self) -> Option<&str> {
        self.args.first().map(String::as_str)
    }

    /// Returns the last simple attribute called `name`.
    pub fn attr(&self, name: &str) -> Option<&AttributeValue> {
        self.simple
            .iter()
            .rev()
            .find(|a| a.name == name)
            .map(|a| &a.value)
    }

    /// Returns a simple attribute as a number.
    pub fn number(&self, name: &str) -> Option<f64> {
        self.attr(name).and_then(AttributeValue::as_f64)
    }

    /// Returns a simple attribute as text.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.attr(name).and_then(AttributeValue::as_str)
    }

    /// Returns the last complex attribute called `name`.
    pub fn complex(&self, name: &str) -> Option<&ComplexAttribute> {
        self.complex.iter().rev().find(|a| a.name == name)
    }

    /// Iterates nested groups of one kind.
    pub fn groups_of<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a Group> + 'a {
        self.groups.iter().filter(move |g| g.kind == kind)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Tok {
    Word,
    Str,
    LParen,
    RParen,
    LBrace,
    RBrace,
    Colon,
    Semi,
    Comma,
}

#[derive(Clone, Copy, Debug)]
struct Token {
    kind: Tok,
    start: usize,
    end: usize,
    line: u32,
}

fn is_delimiter(b: u8) -> bool {
    matches!(b, b'(' | b')' | b'{' | b'}' | b':' | b';' | b',' | b'"' | b'\\')
}

fn lex(text: &str) -> Vec<Token> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut line = 1u32;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b == b'\n' {
            line += 1;
            i += 1;
            continue;
        }
        // Line continuations and stray backslashes are whitespace.
        if b.is_ascii_whitespace() || b == b'\\' {
            i += 1;
            continue;
        }
        let start = i;
        let kind = match b {
            b'(' => Tok::LParen,
            b')' => Tok::RParen,
            b'{' => Tok::LBrace,
            b'}' => Tok::RBrace,
            b':' => Tok::Colon,
            b';' => Tok::Semi,
            b',' => Tok::Comma,
            b'"' => {
                let line_at_start = line;
                i += 1;
                while i < bytes.len() && bytes[i] != b'"' {
                    if bytes[i] == b'\\' {
                        i += 1;
                    }
                    if bytes.get(i) == Some(&b'\n') {
                        line += 1;
                    }
                    i += 1;
                }
                i = (i + 1).min(bytes.len());
                tokens.push(Token {
                    kind: Tok::Str,
                    start,
                    end: i,
                    line: line_at_start,
                });
                continue;
            }
            _ => {
                while i < bytes.len() && !bytes[i].is_ascii_whitespace() && !is_delimiter(bytes[i])
                {
                    i += 1;
                }
                tokens.push(Token {
                    kind: Tok::Word,
                    start,
                    end: i,
                    line,
                });
                continue;
            }
        };
        i += 1;
        tokens.push(Token {
            kind,
            start,
            end: i,
            line,
        });
    }
    tokens
}

/// Scans `text` (already comment-masked) into top-level groups.
///
/// Top-level simple and complex attributes are ignored. Structural problems
/// are reported to `sink`; scanning always continues.
pub fn scan_groups(text: &str, file: FileId, sink: &DiagnosticSink) -> Vec<Group> {
    let mut scanner = Scanner {
        text,
        tokens: lex(text),
        pos: 0,
        file,
        sink,
    };
    let mut root = Group::new(String::new(), Vec::new(), Span::DUMMY);
    while !scanner.at_end() {
        scanner.parse_body(&mut root);
        if let Some(tok) = scanner.peek() {
            // parse_body only stops early on a closing brace.
            scanner.pos += 1;
            scanner.warn(
                codes::UNBALANCED_GROUP,
                "unmatched `}` at top level",
                scanner.span(tok.start, tok.end),
            );
        }
    }
    root.groups
}

struct Scanner<'a> {
    text: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    file: FileId,
    sink: &'a DiagnosticSink,
}

impl<'a> Scanner<'a> {
    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn peek_kind(&self) -> Option<Tok> {
        self.peek().map(|t| t.kind)
    }

    fn span(&self, start: usize, end: usize) -> Span {
        Span::from_range(self.file, start..end)
    }

    fn slice(&self, tok: Token) -> &'a str {
        let raw = &self.text[tok.start..tok.end];
        if tok.kind == Tok::Str {
            let inner = raw.strip_prefix('"').unwrap_or(raw);
            inner.strip_suffix('"').unwrap_or(inner)
        } else {
            raw
        }
    }

    fn warn(&self, code: kairos_diagnostics::DiagnosticCode, msg: impl Into<String>, span: Span) {
        self.sink.emit(Diagnostic::warning(code, msg, span));
    }

    fn value_of(&self, tok: Token) -> AttributeValue {
        let text = self.slice(tok);
        match tok.kind {
            Tok::Str => AttributeValue::Str(text.to_string()),
            _ => match text.parse::<f64>() {
                Ok(n) if n.is_finite() => AttributeValue::Number(n),
                _ => AttributeValue::Token(text.to_string()),
            },
        }
    }

    /// Parses statements into `group` until a `}` (left unconsumed) or EOF.
    fn parse_body(&mut self, group: &mut Group) {
        while let Some(tok) = self.peek() {
            match tok.kind {
                Tok::RBrace => return,
                Tok::Semi => self.pos += 1,
                Tok::Word | Tok::Str => self.parse_statement(group, tok),
                _ => {
                    self.warn(
                        codes::MALFORMED_ATTRIBUTE,
                        format!("unexpected `{}`", self.slice(tok)),
                        self.span(tok.start, tok.end),
                    );
                    self.pos += 1;
                    self.recover();
                }
            }
        }
    }

    fn parse_statement(&mut self, parent: &mut Group, name_tok: Token) {
        self.pos += 1;
        let name = self.slice(name_tok).to_string();
        match self.peek_kind() {
            Some(Tok::Colon) => {
                let colon = self.tokens[self.pos];
                self.pos += 1;
                let mut parts = Vec::new();
                while let Some(tok) = self.peek() {
                    if !matches!(tok.kind, Tok::Word | Tok::Str) || tok.line != colon.line {
                        break;
                    }
                    parts.push(tok);
                    self.pos += 1;
                }
                let end = parts.last().map_or(colon.end, |t| t.end);
                if self.peek_kind() == Some(Tok::Semi) {
                    self.pos += 1;
                }
                let span = self.span(name_tok.start, end);
                let value = match parts.as_slice() {
                    [] => {
                        self.warn(
                            codes::MALFORMED_ATTRIBUTE,
                            format!("attribute `{name}` has no value"),
                            span,
                        );
                        return;
                    }
                    [single] => self.value_of(*single),
                    many => AttributeValue::Token(
                        many.iter()
                            .map(|t| self.slice(*t))
                            .collect::<Vec<_>>()
                            .join(" "),
                    ),
                };
                parent.simple.push(SimpleAttribute { name, value, span });
            }
            Some(Tok::LParen) => {
                self.pos += 1;
                let Some((args, raw, close_end)) = self.parse_args() else {
                    self.warn(
                        codes::MALFORMED_ATTRIBUTE,
                        format!("unterminated argument list for `{name}`"),
                        self.span(name_tok.start, name_tok.end),
                    );
                    return;
                };
                let header = self.span(name_tok.start, close_end);
                if self.peek_kind() == Some(Tok::LBrace) {
                    self.pos += 1;
                    let mut group = Group::new(name, raw, header);
                    self.parse_body(&mut group);
                    if self.peek_kind() == Some(Tok::RBrace) {
                        self.pos += 1;
                    } else {
                        self.sink.emit(
                            Diagnostic::warning(
                                codes::UNBALANCED_GROUP,
                                format!("group `{}` is never closed", group.kind),
                                header,
                            )
                            .with_label(Label::primary(header, "opened here")),
                        );
                    }
                    parent.groups.push(group);
                } else {
                    if self.peek_kind() == Some(Tok::Semi) {
                        self.pos += 1;
                    }
                    parent.complex.push(ComplexAttribute {
                        name,
                        args,
                        span: header,
                    });
                }
            }
            _ => {
                self.warn(
                    codes::MALFORMED_ATTRIBUTE,
                    format!("expected `:` or `(` after `{name}`"),
                    self.span(name_tok.start, name_tok.end),
                );
                self.recover();
            }
        }
    }

    /// Parses `a, b, c )` after an opening parenthesis.
    ///
    /// Returns the values, their raw texts, and the end offset of `)`; `None`
    /// if the list runs into a brace or EOF.
    fn parse_args(&mut self) -> Option<(Vec<AttributeValue>, Vec<String>, usize)> {
        let mut values = Vec::new();
        let mut raw = Vec::new();
        while let Some(tok) = self.peek() {
            match tok.kind {
                Tok::RParen => {
                    self.pos += 1;
                    return Some((values, raw, tok.end));
                }
                Tok::Comma => self.pos += 1,
                Tok::Word | Tok::Str => {
                    values.push(self.value_of(tok));
                    raw.push(self.slice(tok).to_string());
                    self.pos += 1;
                }
                // `{`, `}`, `;` and `:` cannot appear inside an argument list.
                _ => return None,
            }
        }
        None
    }

    /// Skips to just past the next `;`, or to the next `}` of the current
    /// nesting level, stepping over balanced `{ ... }` blocks.
    fn recover(&mut self) {
        let mut depth = 0usize;
        while let Some(tok) = self.peek() {
            match tok.kind {
                Tok::Semi if depth == 0 => {
                    self.pos += 1;
                    return;
                }
                Tok::RBrace if depth == 0 => return,
                Tok::LBrace => depth += 1,
                Tok::RBrace => depth -= 1,
                _ => {}
            }
            self.pos += 1;
        }
    }
}
