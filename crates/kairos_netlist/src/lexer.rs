//! Tokenizer for flattened structural netlists.
//!
//! Works on comment- and attribute-masked text, so every span indexes the
//! original source. Token text is not copied; [`Token::text`] slices it back
//! out of the source.

use kairos_source::{FileId, Span};

/// A token kind.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TokenKind {
    /// `module`
    Module,
    /// `endmodule`
    Endmodule,
    /// `input`
    Input,
    /// `output`
    Output,
    /// `inout`
    Inout,
    /// `wire`
    Wire,
    /// `reg`
    Reg,
    /// `assign`
    Assign,
    /// A simple or escaped identifier.
    Ident,
    /// A decimal or based literal such as `12` or `1'b0`.
    Literal,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `:`
    Colon,
    /// `;`
    Semicolon,
    /// `,`
    Comma,
    /// `.`
    Dot,
    /// `=`
    Equals,
    /// `#`
    Hash,
    /// Any other character.
    Other,
    /// End of input.
    Eof,
}

/// A token with its location in the source.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Token {
    /// What kind of token this is.
    pub kind: TokenKind,
    /// Where it is. Escaped identifiers exclude the leading backslash.
    pub span: Span,
}

impl Token {
    /// Returns the token's text.
    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        source
            .get(self.span.start as usize..self.span.end as usize)
            .unwrap_or("")
    }
}

fn keyword(word: &str) -> TokenKind {
    match word {
        "module" => TokenKind::Module,
        "endmodule" => TokenKind::Endmodule,
        "input" => TokenKind::Input,
        "output" => TokenKind::Output,
        "inout" => TokenKind::Inout,
        "wire" | "tri" => TokenKind::Wire,
        "reg" => TokenKind::Reg,
        "assign" => TokenKind::Assign,
        _ => TokenKind::Ident,
    }
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

/// Lexes `source` into tokens ending with [`TokenKind::Eof`].
pub fn lex(source: &str, file: FileId) -> Vec<Token> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;
    let span = |start: usize, end: usize| Span::from_range(file, start..end);

    while pos < bytes.len() {
        let b = bytes[pos];
        if b.is_ascii_whitespace() {
            pos += 1;
            continue;
        }
        let start = pos;
        let kind = if is_ident_start(b) {
            while pos < bytes.len() && is_ident_continue(bytes[pos]) {
                pos += 1;
            }
            keyword(&source[start..pos])
        } else if b == b'\\' {
            pos += 1;
            while pos < bytes.len() && !bytes[pos].is_ascii_whitespace() {
                pos += 1;
            }
            tokens.push(Token {
                kind: TokenKind::Ident,
                span: span(start + 1, pos),
            });
            continue;
        } else if b.is_ascii_digit() || b == b'\'' {
            pos = literal_end(bytes, pos);
            TokenKind::Literal
        } else {
            pos += 1;
            match b {
                b'(' => TokenKind::LParen,
                b')' => TokenKind::RParen,
                b'[' => TokenKind::LBracket,
                b']' => TokenKind::RBracket,
                b'{' => TokenKind::LBrace,
                b'}' => TokenKind::RBrace,
                b':' => TokenKind::Colon,
                b';' => TokenKind::Semicolon,
                b',' => TokenKind::Comma,
                b'.' => TokenKind::Dot,
                b'=' => TokenKind::Equals,
                b'#' => TokenKind::Hash,
                _ => {
                    // Keep multi-byte characters whole.
                    while pos < bytes.len() && !source.is_char_boundary(pos) {
                        pos += 1;
                    }
                    TokenKind::Other
                }
            }
        };
        tokens.push(Token {
            kind,
            span: span(start, pos),
        });
    }
    tokens.push(Token {
        kind: TokenKind::Eof,
        span: span(bytes.len(), bytes.len()),
    });
    tokens
}

/// Scans `[size]'[s]<base><digits>` or a plain decimal number.
fn literal_end(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && (bytes[pos].is_ascii_digit() || bytes[pos] == b'_') {
        pos += 1;
    }
    if pos < bytes.len() && bytes[pos] == b'\'' {
        pos += 1;
        if pos < bytes.len() && matches!(bytes[pos], b's' | b'S') {
            pos += 1;
        }
        if pos < bytes.len() && matches!(bytes[pos], b'b' | b'B' | b'o' | b'O' | b'd' | b'D' | b'h' | b'H') {
            pos += 1;
        }
        while pos < bytes.len() && (bytes[pos].is_ascii_hexdigit() || matches!(bytes[pos], b'_' | b'x' | b'X' | b'z' | b'Z' | b'?')) {
            pos += 1;
        }
    }
    pos
}

/// Evaluates a bit literal to its truth value: `true` if any bit is set.
///
/// Returns `None` for text that is not a literal. Unknown (`x`/`z`) digits
/// count as zero.
pub fn literal_value(text: &str) -> Option<bool> {
    let (digits, radix) = match text.split_once('\'') {
        None => (text, 10),
        Some((_, based)) => {
            let based = based.strip_prefix(['s', 'S']).unwrap_or(based);
            let mut chars = based.chars();
            let radix = match chars.next()? {
                'b' | 'B' => 2,
                'o' | 'O' => 8,
                'd' | 'D' => 10,
                'h' | 'H' => 16,
                _ => return None,
            };
            (chars.as_str(), radix)
        }
    };
    let mut seen = false;
    let mut nonzero = false;
    for c in digits.chars() {
        match c {
            '_' => {}
            'x' | 'X' | 'z' | 'Z' | '?' => seen = true,
            c => {
                let d = c.to_digit(radix)?;
                seen = true;
                nonzero |= d != 0;
            }
        }
    }
    seen.then_some(nonzero)
}
