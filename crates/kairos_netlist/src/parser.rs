//! Builds a [`Netlist`] from structural netlist text.

use crate::annotations::Annotations;
use crate::cell::{CellInstance, InstanceKind};
use crate::codes;
use crate::error::NetlistError;
use crate::ids::{CellId, WireId};
use crate::lexer::lex;
use crate::netlist::Netlist;
use crate::syntax::{parse_module, DeclKind, NetExpr, Statement, MAX_BUS_WIDTH};
use crate::wire::{PinRef, Wire, WireDirection};
use kairos_common::Interner;
use kairos_diagnostics::{Diagnostic, DiagnosticCode, DiagnosticSink, Label};
use kairos_liberty::pseudo::{
    GND_CELL, INPUT_CELL, OUTPUT_CELL, PSEUDO_INPUT_PIN, PSEUDO_OUTPUT_PIN, VDD_CELL,
};
use kairos_liberty::{CellDefinition, Library, PinDirection};
use kairos_source::{mask_attributes, mask_comments, FileId, Span};
use std::collections::{HashMap, HashSet};
use tracing::{debug, trace};

/// Prefix of the pseudo-instance driving a module input.
pub const INPUT_PREFIX: &str = "___input_";
/// Prefix of the pseudo-instance observing a module output.
pub const OUTPUT_PREFIX: &str = "___output_";
/// Name of the constant-one wire.
pub const VDD_WIRE: &str = "vdd_wire";
/// Name of the constant-zero wire.
pub const GND_WIRE: &str = "gnd_wire";

/// Parses a single flattened module against `library`.
///
/// Only a missing or repeated `module`/`endmodule` is fatal. Everything
/// else that cannot be modeled is reported to `sink` as a warning and left
/// out of the returned netlist.
pub fn parse_netlist(
    text: &str,
    file: FileId,
    library: &Library,
    annotations: &Annotations,
    interner: &Interner,
    sink: &DiagnosticSink,
) -> Result<Netlist, NetlistError> {
    let masked = mask_attributes(&mask_comments(text));
    let tokens = lex(&masked, file);
    let module = parse_module(&masked, &tokens)?;

    let mut builder = Builder {
        library,
        annotations,
        interner,
        sink,
        pseudo: PseudoCells::find(library)?,
        netlist: Netlist::new(module.name.clone()),
        aliases: HashMap::new(),
        declared: HashMap::new(),
        buses: HashSet::new(),
        constants: [None, None],
    };
    builder.resolve_aliases(&module.statements);
    builder.declare(&module.statements);
    builder.instantiate(&module.statements);
    builder.check_flying_wires();
    builder.wire_up();
    builder.apply_clock_skew();

    let netlist = builder.netlist;
    debug!(
        module = %netlist.module_name,
        cells = netlist.cell_count(),
        wires = netlist.wire_count(),
        "parsed netlist"
    );
    Ok(netlist)
}

struct PseudoCells<'a> {
    input: &'a CellDefinition,
    output: &'a CellDefinition,
    vdd: &'a CellDefinition,
    gnd: &'a CellDefinition,
}

impl<'a> PseudoCells<'a> {
    fn find(library: &'a Library) -> Result<Self, NetlistError> {
        let get = |name: &str| {
            library.cell(name).ok_or_else(|| {
                NetlistError::InvalidInput(format!("library has no `{name}` pseudo-cell"))
            })
        };
        Ok(Self {
            input: get(INPUT_CELL)?,
            output: get(OUTPUT_CELL)?,
            vdd: get(VDD_CELL)?,
            gnd: get(GND_CELL)?,
        })
    }
}

/// What a name stands for after alias resolution.
#[derive(Clone, Debug, PartialEq)]
enum Target {
    Net(String),
    Const(bool),
}

struct Builder<'a> {
    library: &'a Library,
    annotations: &'a Annotations,
    interner: &'a Interner,
    sink: &'a DiagnosticSink,
    pseudo: PseudoCells<'a>,
    netlist: Netlist,
    /// Aliased name to the name or constant it stands for.
    aliases: HashMap<String, Target>,
    /// Declared names (bus names unexpanded) with kind and first span.
    declared: HashMap<String, (DeclKind, Span)>,
    buses: HashSet<String>,
    /// `gnd_wire`, `vdd_wire` once created.
    constants: [Option<WireId>; 2],
}

impl Builder<'_> {
    fn warn(&self, code: DiagnosticCode, message: impl Into<String>, span: Span) {
        self.sink.emit(Diagnostic::warning(code, message, span));
    }

    fn resolve(&self, name: &str) -> Target {
        self.aliases
            .get(name)
            .cloned()
            .unwrap_or_else(|| Target::Net(name.to_string()))
    }

    /// Builds the alias table from `assign` statements.
    ///
    /// Each chain is followed to its end, and every name on it stands for
    /// the wire at the end: `assign y = n;` makes `y` another name for `n`,
    /// which inherits the port direction declared for `y`.
    fn resolve_aliases(&mut self, statements: &[Statement]) {
        let mut raw: HashMap<&str, (&NetExpr, Span)> = HashMap::new();
        let mut order = Vec::new();
        for statement in statements {
            let Statement::Assign(assign) = statement else {
                continue;
            };
            match &assign.rhs {
                NetExpr::Unsupported(span) => {
                    self.warn(
                        codes::UNSUPPORTED,
                        format!("unsupported right-hand side in assignment to `{}`", assign.lhs),
                        *span,
                    );
                }
                rhs => {
                    if raw.contains_key(assign.lhs.as_str()) {
                        self.warn(
                            codes::MULTIPLE_DRIVERS,
                            format!("`{}` is assigned more than once", assign.lhs),
                            assign.lhs_span,
                        );
                        continue;
                    }
                    raw.insert(assign.lhs.as_str(), (rhs, assign.lhs_span));
                    order.push(assign.lhs.as_str());
                }
            }
        }

        let mut cyclic: HashSet<&str> = HashSet::new();
        for &lhs in &order {
            if cyclic.contains(lhs) {
                continue;
            }
            let mut chain = vec![lhs];
            let mut current = lhs;
            let root = loop {
                match raw.get(current) {
                    None => break Some(Target::Net(current.to_string())),
                    Some((NetExpr::Const { value, .. }, _)) => break Some(Target::Const(*value)),
                    Some((NetExpr::Net { name, .. }, _)) => {
                        if chain.contains(&name.as_str()) {
                            break None;
                        }
                        chain.push(name.as_str());
                        current = name.as_str();
                    }
                    Some((NetExpr::Unsupported(_), _)) => break None,
                }
            };
            match root {
                None => {
                    let span = raw.get(lhs).map_or(Span::DUMMY, |(_, s)| *s);
                    self.sink.emit(
                        Diagnostic::warning(
                            codes::ALIAS_CYCLE,
                            format!("assignments form a cycle: {}", chain.join(" -> ")),
                            span,
                        )
                        .with_note("the names in the cycle are treated as separate wires"),
                    );
                    cyclic.extend(chain);
                }
                Some(Target::Const(value)) => {
                    self.aliases.insert(lhs.to_string(), Target::Const(value));
                }
                Some(Target::Net(root)) => {
                    trace!(alias = %lhs, wire = %root, "resolved alias");
                    self.aliases.insert(lhs.to_string(), Target::Net(root));
                }
            }
        }
    }

    fn declare(&mut self, statements: &[Statement]) {
        let mut constant_outputs = Vec::new();
        for statement in statements {
            match statement {
                Statement::Declare(decl) if decl.width() > MAX_BUS_WIDTH => {
                    self.warn(
                        codes::BUS_TOO_WIDE,
                        format!(
                            "bus of {} bits exceeds the limit of {MAX_BUS_WIDTH}; declaration skipped",
                            decl.width()
                        ),
                        decl.span,
                    );
                }
                Statement::Declare(decl) => {
                    let direction = match decl.kind {
                        DeclKind::Input => WireDirection::Input,
                        DeclKind::Output => WireDirection::Output,
                        DeclKind::Inout => WireDirection::InOut,
                        DeclKind::Net => WireDirection::Internal,
                    };
                    for (name, span) in &decl.names {
                        self.check_redeclaration(name, decl.kind, *span);
                        if decl.range.is_some() {
                            self.buses.insert(name.clone());
                        }
                        for bit in decl.bits(name) {
                            match self.resolve(&bit) {
                                Target::Net(target) => {
                                    self.declare_wire(&target, direction, *span);
                                }
                                Target::Const(value) if direction.is_output() => {
                                    constant_outputs.push((bit, value));
                                }
                                Target::Const(_) => {}
                            }
                        }
                    }
                }
                Statement::Unsupported(span) => {
                    self.warn(codes::UNSUPPORTED, "unsupported statement ignored", *span);
                }
                Statement::Assign(_) | Statement::Instance(_) => {}
            }
        }

        let boundary: Vec<(WireId, String, WireDirection)> = self
            .netlist
            .wires()
            .filter(|(_, w)| w.direction != WireDirection::Internal)
            .map(|(id, w)| (id, self.interner.resolve(w.name).to_string(), w.direction))
            .collect();
        for (wire, name, direction) in boundary {
            if direction.is_input() {
                let input = self.pseudo.input;
                let cell = self.add_pseudo(
                    format!("{INPUT_PREFIX}{name}"),
                    input,
                    InstanceKind::PrimaryInput,
                );
                self.netlist.wire_mut(wire).driver = Some(PinRef {
                    cell,
                    port: PSEUDO_OUTPUT_PIN.to_string(),
                });
            }
            if direction.is_output() {
                self.add_output_pseudo(&name, wire);
            }
        }
        for (name, value) in constant_outputs {
            let wire = self.constant_wire(value);
            self.add_output_pseudo(&name, wire);
        }
    }

    fn check_redeclaration(&mut self, name: &str, kind: DeclKind, span: Span) {
        match self.declared.get(name) {
            None => {
                self.declared.insert(name.to_string(), (kind, span));
            }
            // `output y; wire y;` declares one port.
            Some(&(previous, _)) if (previous == DeclKind::Net) != (kind == DeclKind::Net) => {}
            Some(&(_, first)) => {
                self.sink.emit(
                    Diagnostic::warning(
                        codes::REDECLARED,
                        format!("`{name}` is declared more than once"),
                        span,
                    )
                    .with_label(Label::secondary(first, "first declared here")),
                );
            }
        }
    }

    fn declare_wire(&mut self, name: &str, direction: WireDirection, span: Span) -> WireId {
        let ident = self.interner.get_or_intern(name);
        match self.netlist.find_wire(ident) {
            Some(id) => {
                let wire = self.netlist.wire_mut(id);
                wire.direction = wire.direction.merge(direction);
                id
            }
            None => self.netlist.add_wire(Wire::new(ident, direction, span)),
        }
    }

    fn add_pseudo(&mut self, name: String, def: &CellDefinition, kind: InstanceKind) -> CellId {
        let ident = self.interner.get_or_intern(&name);
        self.netlist
            .add_cell(CellInstance::new(ident, def, kind, Span::DUMMY))
    }

    fn add_output_pseudo(&mut self, name: &str, wire: WireId) {
        let output = self.pseudo.output;
        let cell = self.add_pseudo(
            format!("{OUTPUT_PREFIX}{name}"),
            output,
            InstanceKind::PrimaryOutput,
        );
        self.netlist.wire_mut(wire).sinks.push(PinRef {
            cell,
            port: PSEUDO_INPUT_PIN.to_string(),
        });
    }

    /// Returns the constant wire for `value`, creating it and its source on
    /// first use.
    fn constant_wire(&mut self, value: bool) -> WireId {
        if let Some(id) = self.constants[usize::from(value)] {
            return id;
        }
        let (wire_name, cell_name, def) = if value {
            (VDD_WIRE, format!("___{VDD_CELL}"), self.pseudo.vdd)
        } else {
            (GND_WIRE, format!("___{GND_CELL}"), self.pseudo.gnd)
        };
        let wire = self
            .netlist
            .add_wire(Wire::dummy(self.interner.get_or_intern(wire_name)));
        let cell = self.add_pseudo(cell_name, def, InstanceKind::Constant);
        self.netlist.wire_mut(wire).driver = Some(PinRef {
            cell,
            port: PSEUDO_OUTPUT_PIN.to_string(),
        });
        self.constants[usize::from(value)] = Some(wire);
        wire
    }

    /// Finds the wire a connection refers to, declaring it if needed.
    fn wire_for(&mut self, net: &NetExpr) -> Option<WireId> {
        match net {
            NetExpr::Const { value, .. } => Some(self.constant_wire(*value)),
            NetExpr::Unsupported(span) => {
                self.warn(
                    codes::UNSUPPORTED,
                    "only single wires, bus bits and constants can be connected",
                    *span,
                );
                None
            }
            NetExpr::Net { name, span } => match self.resolve(name) {
                Target::Const(value) => Some(self.constant_wire(value)),
                Target::Net(target) => {
                    if let Some(id) = self.netlist.find_wire(self.interner.get_or_intern(&target)) {
                        return Some(id);
                    }
                    if self.buses.contains(&target) {
                        self.sink.emit(
                            Diagnostic::warning(
                                codes::UNSUPPORTED,
                                format!("`{target}` is a bus; connect its bits individually"),
                                *span,
                            ),
                        );
                        return None;
                    }
                    self.warn(
                        codes::UNDECLARED_WIRE,
                        format!("wire `{target}` is not declared; declaring it implicitly"),
                        *span,
                    );
                    Some(self.declare_wire(&target, WireDirection::Internal, *span))
                }
            },
        }
    }

    fn instantiate(&mut self, statements: &[Statement]) {
        for statement in statements {
            let Statement::Instance(inst) = statement else {
                continue;
            };
            let library = self.library;
            let Some(def) = library.cell(&inst.cell_type).filter(|d| !d.is_pseudo) else {
                self.warn(
                    codes::UNKNOWN_CELL,
                    format!("cell type `{}` is not in library `{}`", inst.cell_type, library.name),
                    inst.cell_span,
                );
                continue;
            };
            let ident = self.interner.get_or_intern(&inst.name);
            if let Some(existing) = self.netlist.find_cell(ident) {
                let first = self.netlist.cell(existing).span;
                self.sink.emit(
                    Diagnostic::warning(
                        codes::REDECLARED,
                        format!("instance `{}` is declared more than once", inst.name),
                        inst.name_span,
                    )
                    .with_label(Label::secondary(first, "first declared here")),
                );
                continue;
            }
            if let Some(span) = inst.positional {
                self.sink.emit(
                    Diagnostic::warning(
                        codes::UNSUPPORTED,
                        format!("positional connections on `{}` are ignored", inst.name),
                        span,
                    )
                    .with_help("use named connections such as `.A(net)`"),
                );
            }

            let cell = self
                .netlist
                .add_cell(CellInstance::new(ident, def, InstanceKind::Gate, inst.name_span));
            for conn in &inst.connections {
                let Some(net) = &conn.net else {
                    continue;
                };
                let direction = match def.pin(&conn.port) {
                    None => {
                        self.warn(
                            codes::UNRESOLVED_PIN,
                            format!("cell `{}` has no pin `{}`", def.name, conn.port),
                            conn.span,
                        );
                        continue;
                    }
                    Some(pin) => pin.direction,
                };
                if !matches!(direction, PinDirection::Input | PinDirection::Output) {
                    self.warn(
                        codes::UNRESOLVED_PIN,
                        format!(
                            "pin `{}` of `{}` is neither an input nor an output",
                            conn.port, def.name
                        ),
                        conn.span,
                    );
                    continue;
                }
                let Some(wire_id) = self.wire_for(net) else {
                    continue;
                };
                let pin = PinRef {
                    cell,
                    port: conn.port.clone(),
                };
                let wire = self.netlist.wire_mut(wire_id);
                if direction == PinDirection::Input {
                    wire.sinks.push(pin);
                } else if wire.driver.is_none() {
                    wire.driver = Some(pin);
                } else {
                    let name = self.interner.resolve(wire.name).to_string();
                    self.warn(
                        codes::MULTIPLE_DRIVERS,
                        format!("wire `{name}` has more than one driver; keeping the first"),
                        conn.span,
                    );
                }
            }
        }
    }

    fn check_flying_wires(&self) {
        for (_, wire) in self.netlist.wires() {
            if !wire.is_flying() {
                continue;
            }
            let problem = match (wire.driver.is_some(), wire.sinks.is_empty()) {
                (false, true) => "is not connected",
                (false, false) => "has no driver",
                _ => "has no sinks",
            };
            self.warn(
                codes::FLYING_WIRE,
                format!("wire `{}` {problem}", self.interner.resolve(wire.name)),
                wire.span,
            );
        }
    }

    /// Connects every driver to each of its wire's sinks.
    fn wire_up(&mut self) {
        let pending: Vec<(WireId, PinRef, Vec<PinRef>)> = self
            .netlist
            .wires()
            .filter_map(|(id, w)| Some((id, w.driver.clone()?, w.sinks.clone())))
            .collect();
        for (wire, driver, sinks) in pending {
            let wire_name = self.interner.resolve(self.netlist.wire(wire).name);
            for sink in sinks {
                let target = self.netlist.cell(sink.cell);
                let target_name = self.interner.resolve(target.name);
                let span = target.span;
                let cap = self.annotations.net_capacitance_for(wire_name, target_name);
                if let Err(e) = self
                    .netlist
                    .connect(driver.cell, sink.cell, &sink.port, wire, cap)
                {
                    let source_name = self.interner.resolve(self.netlist.cell(driver.cell).name);
                    self.warn(
                        codes::CONNECT_REJECTED,
                        format!(
                            "cannot connect `{source_name}` to `{target_name}.{}` over `{wire_name}`: {e}",
                            sink.port
                        ),
                        span,
                    );
                }
            }
        }
    }

    fn apply_clock_skew(&mut self) {
        let annotations = self.annotations;
        for (name, &skew) in &annotations.clock_skew {
            let found = self
                .interner
                .get(name)
                .and_then(|ident| self.netlist.find_cell(ident));
            match found {
                Some(id) if self.netlist.cell(id).is_ff => {
                    self.netlist.cell_mut(id).timing.clock_skew = skew;
                }
                Some(_) => self.warn(
                    codes::SKEW_TARGET,
                    format!("`{name}` is not a flip-flop; its clock skew is ignored"),
                    Span::DUMMY,
                ),
                None => self.warn(
                    codes::SKEW_TARGET,
                    format!("no instance named `{name}`; its clock skew is ignored"),
                    Span::DUMMY,
                ),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kairos_liberty::parse_library;

    const LIB: &str = r#"
library(test) {
  cell(INVX1) {
    area : 1;
    pin(A) { direction : input; capacitance : 0.01; }
    pin(Y) { direction : output; function : "!A"; }
  }
  cell(NAND2X1) {
    area : 2;
    pin(A) { direction : input; capacitance : 0.01; }
    pin(B) { direction : input; capacitance : 0.01; }
    pin(Y) { direction : output; function : "!(A&B)"; }
  }
  cell(DFFX1) {
    area : 5;
    ff(IQ, IQN) { clocked_on : "CK"; next_state : "D"; }
    pin(D) { direction : input; capacitance : 0.02; }
    pin(CK) { direction : input; clock : true; capacitance : 0.02; }
    pin(Q) { direction : output; function : "IQ"; }
  }
  cell(TBUFX1) {
    pin(A) { direction : input; }
    pin(E) { direction : input; }
    pin(Z) { direction : inout; }
  }
}
"#;

    struct Parsed {
        netlist: Netlist,
        interner: Interner,
        sink: DiagnosticSink,
    }

    impl Parsed {
        fn cell(&self, name: &str) -> Option<CellId> {
            self.netlist.find_cell(self.interner.get(name)?)
        }

        fn wire(&self, name: &str) -> Option<WireId> {
            self.netlist.find_wire(self.interner.get(name)?)
        }

        fn name(&self, id: CellId) -> &str {
            self.interner.resolve(self.netlist.cell(id).name)
        }

        fn fanin_names(&self, name: &str) -> Vec<&str> {
            let id = self.cell(name).unwrap();
            self.netlist
                .cell(id)
                .fanin
                .iter()
                .map(|e| self.name(e.source))
                .collect()
        }

        fn has(&self, code: DiagnosticCode) -> bool {
            self.sink.any(|d| d.code == code)
        }
    }

    fn parse_with(text: &str, annotations: &Annotations) -> Parsed {
        let lib_sink = DiagnosticSink::new();
        let library = parse_library(LIB, FileId::from_raw(0), &lib_sink).unwrap();
        let interner = Interner::new();
        let sink = DiagnosticSink::new();
        let netlist =
            parse_netlist(text, FileId::from_raw(1), &library, annotations, &interner, &sink)
                .unwrap();
        Parsed {
            netlist,
            interner,
            sink,
        }
    }

    fn parse(text: &str) -> Parsed {
        parse_with(text, &Annotations::default())
    }

    #[test]
    fn rejects_missing_or_repeated_module() {
        let sink = DiagnosticSink::new();
        let library = parse_library(LIB, FileId::from_raw(0), &sink).unwrap();
        let interner = Interner::new();
        for text in ["INVX1 g(.A(a));", "module a; endmodule\nmodule b; endmodule"] {
            let err = parse_netlist(
                text,
                FileId::from_raw(1),
                &library,
                &Annotations::default(),
                &interner,
                &sink,
            )
            .unwrap_err();
            assert!(matches!(err, NetlistError::InvalidInput(_)));
        }
    }

    #[test]
    fn alias_connects_to_the_aliased_driver() {
        let p = parse(
            "module top(i, out);
               input i; output out;
               wire a; wire b;
               assign a = b;
               INVX1 g0(.A(i), .Y(b));
               INVX1 g1(.A(a), .Y(out));
             endmodule",
        );
        assert_eq!(p.fanin_names("g1"), vec!["g0"]);
        assert!(p.wire("a").is_none());
        assert!(p.wire("b").is_some());
        assert!(!p.has(codes::REDECLARED));
        assert!(!p.has(codes::FLYING_WIRE));
    }

    #[test]
    fn bus_declarations_expand_per_bit() {
        for decl in ["input [3:0] x;", "input [0:3] x;"] {
            let p = parse(&format!("module top; {decl} endmodule"));
            for i in 0..4 {
                let name = format!("x[{i}]");
                let id = p.wire(&name).unwrap();
                assert_eq!(p.netlist.wire(id).direction, WireDirection::Input);
                assert!(p.cell(&format!("___input_x[{i}]")).is_some());
            }
            assert!(p.wire("x[4]").is_none());
            assert!(p.wire("x").is_none());
            assert_eq!(p.netlist.wire_count(), 4);
        }
    }

    #[test]
    fn oversized_bus_is_skipped() {
        let p = parse(
            "module top(x, a, y);
               input [2147483647:0] x;
               input a; output y;
               INVX1 g(.A(a), .Y(y));
             endmodule",
        );
        assert!(p.has(codes::BUS_TOO_WIDE));
        assert!(p.wire("x[0]").is_none());
        assert!(p.cell("___input_x[0]").is_none());
        assert_eq!(p.fanin_names("___output_y"), vec!["g"]);
        assert_eq!(p.netlist.wire_count(), 2);
    }

    #[test]
    fn boundary_pseudo_instances() {
        let p = parse(
            "module top(a, y);
               input a; output y;
               INVX1 g(.A(a), .Y(y));
             endmodule",
        );
        let input = p.cell("___input_a").unwrap();
        let output = p.cell("___output_y").unwrap();
        assert_eq!(p.netlist.cell(input).kind, InstanceKind::PrimaryInput);
        assert_eq!(p.netlist.cell(output).kind, InstanceKind::PrimaryOutput);
        assert_eq!(p.fanin_names("g"), vec!["___input_a"]);
        assert_eq!(p.fanin_names("___output_y"), vec!["g"]);
        assert_eq!(p.netlist.cell(output).fanin[0].port, "A");
        assert_eq!(p.sink.warning_count(), 0);
    }

    #[test]
    fn alias_takes_the_right_hand_name() {
        let p = parse(
            "module top(a, y);
               input a; output y;
               wire n;
               assign y = n;
               INVX1 g(.A(a), .Y(n));
             endmodule",
        );
        assert!(p.wire("y").is_none());
        let n = p.wire("n").unwrap();
        assert_eq!(p.netlist.wire(n).direction, WireDirection::Output);
        assert_eq!(p.fanin_names("___output_n"), vec!["g"]);
        assert!(p.cell("___output_y").is_none());
        assert!(!p.has(codes::REDECLARED));
    }

    #[test]
    fn alias_chain_ends_at_the_last_name() {
        let p = parse(
            "module top(a, y);
               input a; output y;
               wire m, n;
               assign y = m;
               assign m = n;
               INVX1 g(.A(a), .Y(n));
             endmodule",
        );
        assert!(p.wire("y").is_none());
        assert!(p.wire("m").is_none());
        assert_eq!(p.fanin_names("___output_n"), vec!["g"]);
    }

    #[test]
    fn feed_through_alias_becomes_inout() {
        let p = parse(
            "module top(i, o);
               input i; output o;
               assign o = i;
             endmodule",
        );
        let i = p.wire("i").unwrap();
        assert_eq!(p.netlist.wire(i).direction, WireDirection::InOut);
        assert_eq!(p.fanin_names("___output_i"), vec!["___input_i"]);
    }

    #[test]
    fn constants_use_hidden_sources() {
        let p = parse(
            "module top(y, z);
               output y, z;
               NAND2X1 g(.A(1'b1), .B(1'b0), .Y(y));
               assign z = 1'b1;
             endmodule",
        );
        let g = p.cell("g").unwrap();
        let fanin = p.fanin_names("g");
        assert_eq!(fanin, vec!["___vdd", "___gnd"]);
        let vdd = p.wire(VDD_WIRE).unwrap();
        assert!(p.netlist.wire(vdd).is_dummy);
        assert_eq!(p.fanin_names("___output_z"), vec!["___vdd"]);
        assert!(p.netlist.cells().all(|(_, c)| c.kind != InstanceKind::Constant));
        assert_eq!(p.netlist.arena_len(), p.netlist.cell_count() + 2);
        assert_eq!(p.netlist.cell(g).fanin.len(), 2);
    }

    #[test]
    fn comments_and_attributes_are_ignored() {
        let p = parse(
            "module top(a, y); // INVX1 bogus(.A(a));
               input a; output y;
               /* wire hidden; */
               (* keep = 1 *) INVX1 g(.A(a), .Y(y));
             endmodule",
        );
        assert!(p.cell("bogus").is_none());
        assert!(p.wire("hidden").is_none());
        assert!(p.cell("g").is_some());
        assert_eq!(p.sink.warning_count(), 0);
    }

    #[test]
    fn semantic_problems_are_warnings() {
        let p = parse(
            "module top(a, y);
               input a; output y;
               wire a;
               wire w; wire w;
               wire dangling;
               INVX1 g1(.A(a), .Y(undeclared));
               INVX1 g2(.A(undeclared), .Q(y), .Y(y));
               INVX1 g3(.A(a), .Y(y));
               MYSTERY m(.A(a));
               INVX1 g4(a, y);
               TBUFX1 t(.A(a), .Z(y));
               always q = d;
             endmodule",
        );
        assert!(p.has(codes::UNDECLARED_WIRE));
        assert!(p.has(codes::REDECLARED));
        assert!(p.has(codes::FLYING_WIRE));
        assert!(p.has(codes::UNKNOWN_CELL));
        assert!(p.has(codes::UNRESOLVED_PIN));
        assert!(p.has(codes::UNSUPPORTED));
        assert!(p.has(codes::MULTIPLE_DRIVERS));
        assert!(!p.sink.has_errors());
        assert!(p.wire("undeclared").is_some());
        assert!(p.cell("m").is_none());
        // `wire a;` after `input a;` is the same port.
        let redeclared: Vec<String> = p
            .sink
            .diagnostics()
            .into_iter()
            .filter(|d| d.code == codes::REDECLARED)
            .map(|d| d.message)
            .collect();
        assert_eq!(redeclared, vec!["`w` is declared more than once".to_string()]);
        // The second driver of `y` is dropped.
        assert_eq!(p.fanin_names("___output_y"), vec!["g2"]);
    }

    #[test]
    fn alias_cycle_is_reported() {
        let p = parse(
            "module top;
               wire p, q;
               assign p = q;
               assign q = p;
             endmodule",
        );
        assert!(p.has(codes::ALIAS_CYCLE));
        assert!(p.wire("p").is_some());
        assert!(p.wire("q").is_some());
    }

    #[test]
    fn duplicate_sink_port_is_rejected_by_connect() {
        let p = parse(
            "module top(a, y);
               input a; output y;
               NAND2X1 g(.A(a), .A(a), .Y(y));
             endmodule",
        );
        assert!(p.has(codes::CONNECT_REJECTED));
        assert_eq!(p.fanin_names("g"), vec!["___input_a"]);
    }

    #[test]
    fn annotations_are_applied() {
        let annotations = Annotations::from_json(
            Some(r#"{"n1": {"g2": 0.004}}"#),
            Some(r#"{"ff": 0.05, "g2": 0.1, "ghost": 0.2}"#),
        )
        .unwrap();
        let p = parse_with(
            "module top(clk, d, y);
               input clk, d; output y;
               wire n1;
               DFFX1 ff(.D(d), .CK(clk), .Q(n1));
               INVX1 g2(.A(n1), .Y(y));
             endmodule",
            &annotations,
        );
        let ff = p.cell("ff").unwrap();
        let edge = &p.netlist.cell(ff).fanout[0];
        assert_eq!(edge.net_capacitance, 0.004);
        assert_eq!(p.netlist.cell(ff).timing.clock_skew, 0.05);
        assert!(p.netlist.cell(ff).is_ff);
        let skew_warnings = p
            .sink
            .diagnostics()
            .iter()
            .filter(|d| d.code == codes::SKEW_TARGET)
            .count();
        assert_eq!(skew_warnings, 2);
    }
}
