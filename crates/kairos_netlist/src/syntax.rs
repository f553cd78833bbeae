//! Statement-level syntax of a flattened netlist module.
//!
//! Only the structural subset is recognized: declarations, `assign`
//! aliases and cell instantiations. Everything else becomes
//! [`Statement::Unsupported`] so the builder can report it and move on.

use crate::error::NetlistError;
use crate::lexer::{literal_value, Token, TokenKind};
use kairos_source::Span;

/// What a declaration declares.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DeclKind {
    /// `input`
    Input,
    /// `output`
    Output,
    /// `inout`
    Inout,
    /// `wire`, `reg` or `tri`
    Net,
}

/// A scalar or bus declaration, possibly of several names.
#[derive(Clone, Debug)]
pub struct Declaration {
    /// Declaration keyword.
    pub kind: DeclKind,
    /// `[msb:lsb]`, if present.
    pub range: Option<(i64, i64)>,
    /// Declared names with their spans.
    pub names: Vec<(String, Span)>,
    /// The whole statement.
    pub span: Span,
}

/// Widest bus a declaration may expand to.
pub const MAX_BUS_WIDTH: u64 = 1 << 16;

impl Declaration {
    /// Number of bits per declared name.
    pub fn width(&self) -> u64 {
        self.range
            .map_or(1, |(msb, lsb)| msb.abs_diff(lsb).saturating_add(1))
    }

    /// Expands `name` to one name per bit, lowest index first.
    pub fn bits(&self, name: &str) -> Vec<String> {
        match self.range {
            None => vec![name.to_string()],
            Some((msb, lsb)) => (msb.min(lsb)..=msb.max(lsb))
                .map(|i| format!("{name}[{i}]"))
                .collect(),
        }
    }
}

/// The right-hand side of an assignment or port connection.
#[derive(Clone, Debug, PartialEq)]
pub enum NetExpr {
    /// A wire or a single bus bit.
    Net {
        /// Full name, `x[3]` for a bit select.
        name: String,
        /// Location of the reference.
        span: Span,
    },
    /// A bit literal tied to constant one (`true`) or zero (`false`).
    Const {
        /// Logic value.
        value: bool,
        /// Location of the literal.
        span: Span,
    },
    /// Anything else (concatenations, part selects, operators).
    Unsupported(Span),
}

impl NetExpr {
    /// Location of the expression.
    pub fn span(&self) -> Span {
        match self {
            NetExpr::Net { span, .. } | NetExpr::Const { span, .. } | NetExpr::Unsupported(span) => {
                *span
            }
        }
    }
}

/// `assign lhs = rhs;`
#[derive(Clone, Debug)]
pub struct Assignment {
    /// Aliased name.
    pub lhs: String,
    /// Location of `lhs`.
    pub lhs_span: Span,
    /// What `lhs` stands for.
    pub rhs: NetExpr,
}

/// `.PORT(net)`
#[derive(Clone, Debug)]
pub struct Connection {
    /// Cell pin name.
    pub port: String,
    /// The connected net; `None` for `.PORT()`.
    pub net: Option<NetExpr>,
    /// The whole connection.
    pub span: Span,
}

/// `CELL name (.A(x), .Y(y));`
#[derive(Clone, Debug)]
pub struct Instantiation {
    /// Library cell name.
    pub cell_type: String,
    /// Location of the cell name.
    pub cell_span: Span,
    /// Instance name.
    pub name: String,
    /// Location of the instance name.
    pub name_span: Span,
    /// Named connections in order.
    pub connections: Vec<Connection>,
    /// Span of the first positional connection, if any.
    pub positional: Option<Span>,
}

/// One `;`-terminated body item.
#[derive(Clone, Debug)]
pub enum Statement {
    /// A declaration.
    Declare(Declaration),
    /// An alias.
    Assign(Assignment),
    /// A cell instance.
    Instance(Instantiation),
    /// Anything outside the structural subset.
    Unsupported(Span),
}

/// A parsed module.
#[derive(Clone, Debug)]
pub struct Module {
    /// Module name.
    pub name: String,
    /// Location of the module name.
    pub name_span: Span,
    /// Header and body items in source order.
    pub statements: Vec<Statement>,
}

/// Parses the single module in `tokens`.
///
/// Fails unless there is exactly one `module` keyword followed later by
/// exactly one `endmodule`.
pub fn parse_module(source: &str, tokens: &[Token]) -> Result<Module, NetlistError> {
    let positions = |kind| {
        tokens
            .iter()
            .enumerate()
            .filter(move |(_, t)| t.kind == kind)
            .map(|(i, _)| i)
            .collect::<Vec<_>>()
    };
    let starts = positions(TokenKind::Module);
    let ends = positions(TokenKind::Endmodule);
    let (start, end) = match (starts.as_slice(), ends.as_slice()) {
        ([s], [e]) if s < e => (*s, *e),
        ([_], [_]) => {
            return Err(NetlistError::InvalidInput(
                "`endmodule` appears before `module`".to_string(),
            ))
        }
        _ => {
            return Err(NetlistError::InvalidInput(format!(
                "expected exactly one `module`/`endmodule` pair, found {} `module` and {} `endmodule`",
                starts.len(),
                ends.len()
            )))
        }
    };

    let body = &tokens[start + 1..end];
    let (name_token, mut rest) = match body.split_first() {
        Some((t, rest)) if t.kind == TokenKind::Ident => (t, rest),
        _ => {
            return Err(NetlistError::InvalidInput(
                "missing module name".to_string(),
            ))
        }
    };

    let mut statements = Vec::new();
    if rest.first().map(|t| t.kind) == Some(TokenKind::Hash) {
        rest = skip_group(&rest[1..]);
    }
    if rest.first().map(|t| t.kind) == Some(TokenKind::LParen) {
        let close = matching_close(rest).unwrap_or(rest.len());
        statements.extend(parse_header(source, &rest[1..close]));
        rest = rest.get(close + 1..).unwrap_or(&[]);
    }

    for item in rest.split(|t| t.kind == TokenKind::Semicolon) {
        if !item.is_empty() {
            statements.extend(parse_statement(source, item));
        }
    }

    Ok(Module {
        name: name_token.text(source).to_string(),
        name_span: name_token.span,
        statements,
    })
}

fn span_of(tokens: &[Token]) -> Span {
    match (tokens.first(), tokens.last()) {
        (Some(first), Some(last)) => Span::new(first.span.file, first.span.start, last.span.end),
        _ => Span::DUMMY,
    }
}

/// Index of the bracket closing `tokens[0]`.
fn matching_close(tokens: &[Token]) -> Option<usize> {
    let mut depth = 0usize;
    for (i, t) in tokens.iter().enumerate() {
        match t.kind {
            TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => depth += 1,
            TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Skips a parenthesized group starting at `tokens[0]`.
fn skip_group(tokens: &[Token]) -> &[Token] {
    if tokens.first().map(|t| t.kind) != Some(TokenKind::LParen) {
        return tokens;
    }
    match matching_close(tokens) {
        Some(close) => &tokens[close + 1..],
        None => &[],
    }
}

/// Splits on `sep` outside any bracket.
fn split_top_level(tokens: &[Token], sep: TokenKind) -> Vec<&[Token]> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, t) in tokens.iter().enumerate() {
        match t.kind {
            TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => depth += 1,
            TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                depth = depth.saturating_sub(1)
            }
            k if k == sep && depth == 0 => {
                parts.push(&tokens[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&tokens[start..]);
    parts
}

fn parse_index(source: &str, token: &Token) -> Option<i64> {
    if token.kind != TokenKind::Literal {
        return None;
    }
    token.text(source).replace('_', "").parse().ok()
}

/// Parses `[msb:lsb]` at the front of `tokens`.
fn parse_range<'t>(source: &str, tokens: &'t [Token]) -> Result<(Option<(i64, i64)>, &'t [Token]), ()> {
    match tokens {
        [open, rest @ ..] if open.kind == TokenKind::LBracket => match rest {
            [msb, colon, lsb, close, rest @ ..]
                if colon.kind == TokenKind::Colon && close.kind == TokenKind::RBracket =>
            {
                let msb = parse_index(source, msb).ok_or(())?;
                let lsb = parse_index(source, lsb).ok_or(())?;
                Ok((Some((msb, lsb)), rest))
            }
            _ => Err(()),
        },
        _ => Ok((None, tokens)),
    }
}

fn decl_kind(kind: TokenKind) -> Option<DeclKind> {
    match kind {
        TokenKind::Input => Some(DeclKind::Input),
        TokenKind::Output => Some(DeclKind::Output),
        TokenKind::Inout => Some(DeclKind::Inout),
        TokenKind::Wire | TokenKind::Reg => Some(DeclKind::Net),
        _ => None,
    }
}

/// Parses a net reference or bit literal.
pub(crate) fn parse_net_expr(source: &str, tokens: &[Token]) -> NetExpr {
    let span = span_of(tokens);
    match tokens {
        [name] if name.kind == TokenKind::Ident => NetExpr::Net {
            name: name.text(source).to_string(),
            span,
        },
        [name, open, index, close]
            if name.kind == TokenKind::Ident
                && open.kind == TokenKind::LBracket
                && close.kind == TokenKind::RBracket =>
        {
            match parse_index(source, index) {
                Some(i) => NetExpr::Net {
                    name: format!("{}[{i}]", name.text(source)),
                    span,
                },
                None => NetExpr::Unsupported(span),
            }
        }
        [literal] if literal.kind == TokenKind::Literal => match literal_value(literal.text(source)) {
            Some(value) => NetExpr::Const { value, span },
            None => NetExpr::Unsupported(span),
        },
        _ => NetExpr::Unsupported(span),
    }
}

/// Parses the port list of the module header.
///
/// Plain port names are ignored; the body declares them. ANSI entries
/// (`input [3:0] a, b`) become declarations, with later bare names inheriting
/// the last direction.
fn parse_header(source: &str, tokens: &[Token]) -> Vec<Statement> {
    let mut statements = Vec::new();
    let mut current: Option<(DeclKind, Option<(i64, i64)>)> = None;
    for entry in split_top_level(tokens, TokenKind::Comma) {
        if entry.is_empty() {
            continue;
        }
        let span = span_of(entry);
        let mut rest = entry;
        if let Some(kind) = decl_kind(rest[0].kind) {
            rest = &rest[1..];
            while rest.first().is_some_and(|t| matches!(t.kind, TokenKind::Wire | TokenKind::Reg)) {
                rest = &rest[1..];
            }
            match parse_range(source, rest) {
                Ok((range, after)) => {
                    current = Some((kind, range));
                    rest = after;
                }
                Err(()) => {
                    statements.push(Statement::Unsupported(span));
                    current = None;
                    continue;
                }
            }
        }
        match (current, rest) {
            (Some((kind, range)), [name]) if name.kind == TokenKind::Ident => {
                statements.push(Statement::Declare(Declaration {
                    kind,
                    range,
                    names: vec![(name.text(source).to_string(), name.span)],
                    span,
                }));
            }
            (None, [name]) if name.kind == TokenKind::Ident => {}
            _ => statements.push(Statement::Unsupported(span)),
        }
    }
    statements
}

fn parse_statement(source: &str, tokens: &[Token]) -> Vec<Statement> {
    let span = span_of(tokens);
    let first = tokens[0];
    if first.kind == TokenKind::Assign {
        return split_top_level(&tokens[1..], TokenKind::Comma)
            .into_iter()
            .map(|part| parse_assignment(source, part))
            .collect();
    }
    if let Some(kind) = decl_kind(first.kind) {
        return parse_declaration(source, kind, tokens);
    }
    if first.kind == TokenKind::Ident {
        return parse_instantiations(source, tokens);
    }
    vec![Statement::Unsupported(span)]
}

fn parse_assignment(source: &str, tokens: &[Token]) -> Statement {
    let span = span_of(tokens);
    let parts = split_top_level(tokens, TokenKind::Equals);
    let [lhs, rhs] = parts.as_slice() else {
        return Statement::Unsupported(span);
    };
    match parse_net_expr(source, lhs) {
        NetExpr::Net { name, span: lhs_span } => Statement::Assign(Assignment {
            lhs: name,
            lhs_span,
            rhs: parse_net_expr(source, rhs),
        }),
        _ => Statement::Unsupported(span),
    }
}

fn parse_declaration(source: &str, kind: DeclKind, tokens: &[Token]) -> Vec<Statement> {
    let span = span_of(tokens);
    let mut rest = &tokens[1..];
    // `output reg q`, `input wire a`
    while rest
        .first()
        .is_some_and(|t| matches!(t.kind, TokenKind::Wire | TokenKind::Reg))
    {
        rest = &rest[1..];
    }
    let Ok((range, rest)) = parse_range(source, rest) else {
        return vec![Statement::Unsupported(span)];
    };

    let mut statements = Vec::new();
    let mut names = Vec::new();
    for item in split_top_level(rest, TokenKind::Comma) {
        match item {
            [name] if name.kind == TokenKind::Ident => {
                names.push((name.text(source).to_string(), name.span));
            }
            [name, eq, rhs @ ..] if name.kind == TokenKind::Ident && eq.kind == TokenKind::Equals => {
                names.push((name.text(source).to_string(), name.span));
                if range.is_some() {
                    statements.push(Statement::Unsupported(span_of(item)));
                } else {
                    statements.push(Statement::Assign(Assignment {
                        lhs: name.text(source).to_string(),
                        lhs_span: name.span,
                        rhs: parse_net_expr(source, rhs),
                    }));
                }
            }
            _ => statements.push(Statement::Unsupported(span_of(item))),
        }
    }
    if !names.is_empty() {
        statements.insert(
            0,
            Statement::Declare(Declaration {
                kind,
                range,
                names,
                span,
            }),
        );
    }
    statements
}

fn parse_instantiations(source: &str, tokens: &[Token]) -> Vec<Statement> {
    let cell = tokens[0];
    let mut rest = &tokens[1..];
    if rest.first().map(|t| t.kind) == Some(TokenKind::Hash) {
        rest = skip_group(&rest[1..]);
    }

    let mut statements = Vec::new();
    for item in split_top_level(rest, TokenKind::Comma) {
        let span = span_of(item);
        let [name, open, inner @ .., close] = item else {
            statements.push(Statement::Unsupported(span_of(tokens)));
            continue;
        };
        if name.kind != TokenKind::Ident
            || open.kind != TokenKind::LParen
            || close.kind != TokenKind::RParen
        {
            statements.push(Statement::Unsupported(span));
            continue;
        }

        let mut connections = Vec::new();
        let mut positional = None;
        for conn in split_top_level(inner, TokenKind::Comma) {
            match conn {
                [] => {}
                [dot, port, open, net @ .., close]
                    if dot.kind == TokenKind::Dot
                        && port.kind == TokenKind::Ident
                        && open.kind == TokenKind::LParen
                        && close.kind == TokenKind::RParen =>
                {
                    connections.push(Connection {
                        port: port.text(source).to_string(),
                        net: (!net.is_empty()).then(|| parse_net_expr(source, net)),
                        span: span_of(conn),
                    });
                }
                _ => {
                    positional.get_or_insert(span_of(conn));
                }
            }
        }
        statements.push(Statement::Instance(Instantiation {
            cell_type: cell.text(source).to_string(),
            cell_span: cell.span,
            name: name.text(source).to_string(),
            name_span: name.span,
            connections,
            positional,
        }));
    }
    statements
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;
    use kairos_source::FileId;

    fn parse(src: &str) -> Result<Module, NetlistError> {
        parse_module(src, &lex(src, FileId::from_raw(0)))
    }

    fn declarations(module: &Module) -> Vec<&Declaration> {
        module
            .statements
            .iter()
            .filter_map(|s| match s {
                Statement::Declare(d) => Some(d),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn requires_exactly_one_module() {
        assert!(matches!(parse("wire a;"), Err(NetlistError::InvalidInput(_))));
        assert!(parse("module a; endmodule module b; endmodule").is_err());
        assert!(parse("endmodule module a;").is_err());
        assert_eq!(parse("module top; endmodule").unwrap().name, "top");
    }

    #[test]
    fn ansi_header_declares_ports() {
        let m = parse("module top(input wire [1:0] a, b, output y); endmodule").unwrap();
        let decls = declarations(&m);
        assert_eq!(decls.len(), 3);
        assert_eq!(decls[1].kind, DeclKind::Input);
        assert_eq!(decls[1].range, Some((1, 0)));
        assert_eq!(decls[1].names[0].0, "b");
        assert_eq!(decls[2].kind, DeclKind::Output);
        assert_eq!(decls[2].range, None);
    }

    #[test]
    fn plain_header_names_are_ignored() {
        let m = parse("module top(a, y); input a; output y; endmodule").unwrap();
        assert_eq!(m.statements.len(), 2);
    }

    #[test]
    fn width_counts_bits_without_expanding() {
        let m = parse("module t; input [2147483647:0] x; wire [3:3] y; output z; endmodule")
            .unwrap();
        let decls = declarations(&m);
        assert_eq!(decls[0].width(), 2_147_483_648);
        assert_eq!(decls[1].width(), 1);
        assert_eq!(decls[2].width(), 1);
    }

    #[test]
    fn bus_bits_ascend_for_either_order() {
        let m = parse("module t; input [3:0] x; wire [0:3] z; endmodule").unwrap();
        let decls = declarations(&m);
        assert_eq!(decls[0].bits("x"), vec!["x[0]", "x[1]", "x[2]", "x[3]"]);
        assert_eq!(decls[1].bits("z"), vec!["z[0]", "z[1]", "z[2]", "z[3]"]);
    }

    #[test]
    fn instantiation_with_named_and_constant_connections() {
        let m = parse("module t; NAND2X1 #(.W(1)) u1 (.A(a[2]), .B(1'b1), .Y()); endmodule").unwrap();
        let Statement::Instance(inst) = &m.statements[0] else {
            panic!("expected instance");
        };
        assert_eq!(inst.cell_type, "NAND2X1");
        assert_eq!(inst.name, "u1");
        assert_eq!(inst.connections.len(), 3);
        assert!(matches!(&inst.connections[0].net, Some(NetExpr::Net { name, .. }) if name == "a[2]"));
        assert!(matches!(inst.connections[1].net, Some(NetExpr::Const { value: true, .. })));
        assert!(inst.connections[2].net.is_none());
        assert!(inst.positional.is_none());
    }

    #[test]
    fn positional_and_concatenation_are_flagged() {
        let m = parse("module t; INVX1 g(a, y); INVX1 h(.A({a,b}), .Y(y)); endmodule").unwrap();
        let Statement::Instance(g) = &m.statements[0] else {
            panic!("expected instance");
        };
        assert!(g.positional.is_some());
        let Statement::Instance(h) = &m.statements[1] else {
            panic!("expected instance");
        };
        assert!(matches!(h.connections[0].net, Some(NetExpr::Unsupported(_))));
    }

    #[test]
    fn assignments_and_net_declaration_assignments() {
        let m = parse("module t; assign a = b, c = 1'b0; wire d = e; endmodule").unwrap();
        let assigns: Vec<&Assignment> = m
            .statements
            .iter()
            .filter_map(|s| match s {
                Statement::Assign(a) => Some(a),
                _ => None,
            })
            .collect();
        assert_eq!(assigns.len(), 3);
        assert_eq!(assigns[0].lhs, "a");
        assert!(matches!(assigns[1].rhs, NetExpr::Const { value: false, .. }));
        assert_eq!(assigns[2].lhs, "d");
        assert_eq!(declarations(&m).len(), 1);
    }

    #[test]
    fn other_statements_are_unsupported() {
        let m = parse("module t; always @(posedge clk) q <= d; endmodule").unwrap();
        assert!(matches!(m.statements[0], Statement::Unsupported(_)));
    }
}
