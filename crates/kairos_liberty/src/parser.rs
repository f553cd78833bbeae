//! Builds a [`Library`] from the group tree.

use crate::codes;
use crate::error::LibraryError;
use crate::group::{scan_groups, AttributeValue, Group};
use crate::library::{
    CapacitiveLoadUnit, CellDefinition, Library, OperatingConditions, PinDefinition,
    PinDirection, PowerArc, SequentialElement, SequentialKind, TimingArc,
};
use crate::naming::split_cell_name;
use crate::pseudo::pseudo_cells;
use crate::table::{LookupTable, TableTemplate, TableVariable};
use kairos_diagnostics::{Diagnostic, DiagnosticCode, DiagnosticSink, Label};
use kairos_source::{mask_comments, FileId, Span};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, trace};

/// Parses library text into a [`Library`].
///
/// Only a missing top-level `library` group is fatal. Every other problem is
/// reported to `sink` as a warning and the affected part is left out.
pub fn parse_library(
    text: &str,
    file: FileId,
    sink: &DiagnosticSink,
) -> Result<Library, LibraryError> {
    let masked = mask_comments(text);
    let groups = scan_groups(&masked, file, sink);
    let root = groups
        .into_iter()
        .find(|g| g.kind == "library")
        .ok_or_else(|| {
            LibraryError::InvalidLibrary("no top-level `library(name) { ... }` group".to_string())
        })?;

    let builder = Builder {
        sink,
        templates: parse_templates(&root),
    };
    let library = builder.build(&root);
    debug!(
        library = %library.name,
        cells = library.real_cells().count(),
        templates = library.templates.len(),
        families = library.sizing.len(),
        "parsed cell library"
    );
    Ok(library)
}

const TEMPLATE_KINDS: [&str; 2] = ["lu_table_template", "power_lut_template"];

const DELAY_TABLES: [&str; 6] = [
    "cell_rise",
    "cell_fall",
    "rise_transition",
    "fall_transition",
    "rise_constraint",
    "fall_constraint",
];

fn parse_templates(root: &Group) -> BTreeMap<String, TableTemplate> {
    let mut templates = BTreeMap::new();
    for kind in TEMPLATE_KINDS {
        for g in root.groups_of(kind) {
            let Some(name) = g.name() else { continue };
            let variables: Vec<TableVariable> = (1..=3)
                .map_while(|k| g.text(&format!("variable_{k}")))
                .map(TableVariable::from_name)
                .collect();
            let axes = (1..=variables.len())
                .map(|k| {
                    g.complex(&format!("index_{k}"))
                        .and_then(|attr| parse_numbers(&join_args(&attr.args)).ok())
                        .unwrap_or_default()
                })
                .collect();
            templates.insert(
                name.to_string(),
                TableTemplate {
                    name: name.to_string(),
                    variables,
                    axes,
                },
            );
        }
    }
    templates
}

fn join_args(args: &[AttributeValue]) -> String {
    args.iter()
        .map(AttributeValue::to_text)
        .collect::<Vec<_>>()
        .join(",")
}

/// Parses a comma- and/or whitespace-separated list of floats.
///
/// Returns the offending token on failure.
fn parse_numbers(text: &str) -> Result<Vec<f64>, String> {
    text.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<f64>().map_err(|_| s.to_string()))
        .collect()
}

fn other_attributes(group: &Group, known: &[&str]) -> BTreeMap<String, AttributeValue> {
    group
        .simple
        .iter()
        .filter(|a| !known.contains(&a.name.as_str()))
        .map(|a| (a.name.clone(), a.value.clone()))
        .collect()
}

struct Builder<'a> {
    sink: &'a DiagnosticSink,
    templates: BTreeMap<String, TableTemplate>,
}

impl Builder<'_> {
    fn warn(&self, code: DiagnosticCode, message: impl Into<String>, span: Span) {
        self.sink.emit(Diagnostic::warning(code, message, span));
    }

    fn build(self, root: &Group) -> Library {
        let capacitive_load_unit = root.complex("capacitive_load_unit").and_then(|attr| {
            match attr.args.as_slice() {
                [value, unit] => Some(CapacitiveLoadUnit {
                    value: value.as_f64()?,
                    unit: unit.to_text(),
                }),
                _ => {
                    self.warn(
                        codes::MALFORMED_ATTRIBUTE,
                        "`capacitive_load_unit` takes a value and a unit",
                        attr.span,
                    );
                    None
                }
            }
        });

        let operating_conditions = root
            .groups_of("operating_conditions")
            .filter_map(|g| {
                let name = g.name()?.to_string();
                Some((
                    name.clone(),
                    OperatingConditions {
                        name,
                        process: g.number("process"),
                        temperature: g.number("temperature"),
                        voltage: g.number("voltage"),
                        attributes: other_attributes(g, &["process", "temperature", "voltage"]),
                    },
                ))
            })
            .collect();

        let pseudo = pseudo_cells();
        let mut cells: BTreeMap<String, CellDefinition> = BTreeMap::new();
        let mut first_seen: HashMap<String, Span> = HashMap::new();
        for g in root.groups_of("cell") {
            let Some(name) = g.name() else {
                self.warn(codes::MALFORMED_ATTRIBUTE, "cell group without a name", g.span);
                continue;
            };
            if pseudo.iter().any(|p| p.name == name) {
                self.sink.emit(
                    Diagnostic::warning(
                        codes::RESERVED_CELL_NAME,
                        format!("cell name `{name}` is reserved; definition skipped"),
                        g.span,
                    )
                    .with_note("`input`, `output`, `vdd` and `gnd` are built-in pseudo-cells"),
                );
                continue;
            }
            if let Some(&first) = first_seen.get(name) {
                self.sink.emit(
                    Diagnostic::warning(
                        codes::DUPLICATE_CELL,
                        format!("cell `{name}` is defined more than once"),
                        g.span,
                    )
                    .with_label(Label::secondary(first, "first definition, which is kept")),
                );
                continue;
            }
            first_seen.insert(name.to_string(), g.span);
            cells.insert(name.to_string(), self.build_cell(name, g));
        }

        let mut sizing: BTreeMap<String, BTreeMap<u32, String>> = BTreeMap::new();
        for cell in cells.values() {
            sizing
                .entry(cell.basename_x.clone())
                .or_default()
                .entry(cell.size)
                .or_insert_with(|| cell.name.clone());
        }
        for cell in cells.values_mut() {
            if let Some(sizes) = sizing.get(&cell.basename_x) {
                cell.available_sizes = sizes.keys().copied().collect();
            }
        }
        for cell in pseudo {
            cells.insert(cell.name.clone(), cell);
        }

        Library {
            name: root.name().unwrap_or_default().to_string(),
            capacitive_load_unit,
            operating_conditions,
            templates: self.templates,
            cells,
            sizing,
            attributes: other_attributes(root, &[]),
        }
    }

    fn build_cell(&self, name: &str, g: &Group) -> CellDefinition {
        let split = split_cell_name(name);
        let mut pins = Vec::new();
        let mut sequential = None;
        for sub in &g.groups {
            match sub.kind.as_str() {
                "pin" => {
                    for pin_name in &sub.args {
                        pins.push(self.build_pin(pin_name, sub));
                    }
                }
                "ff" | "latch" => {
                    let kind = if sub.kind == "ff" {
                        SequentialKind::Ff
                    } else {
                        SequentialKind::Latch
                    };
                    sequential = Some(SequentialElement {
                        kind,
                        variables: sub.args.clone(),
                        attributes: other_attributes(sub, &[]),
                    });
                }
                "bus" | "bundle" => self.warn(
                    codes::UNSUPPORTED_GROUP,
                    format!("`{}` group in cell `{name}` is not supported; skipped", sub.kind),
                    sub.span,
                ),
                other => trace!(cell = name, group = other, "ignoring cell sub-group"),
            }
        }

        CellDefinition {
            name: name.to_string(),
            basename: split.basename,
            basename_x: split.basename_x,
            size: split.size,
            area: g.number("area").unwrap_or(0.0),
            leakage_power: g.number("cell_leakage_power").unwrap_or(0.0),
            pins,
            sequential,
            available_sizes: Vec::new(),
            is_pseudo: false,
            attributes: other_attributes(g, &["area", "cell_leakage_power"]),
        }
    }

    fn build_pin(&self, name: &str, g: &Group) -> PinDefinition {
        let rise = g.number("rise_capacitance");
        let fall = g.number("fall_capacitance");
        let capacitance = g.number("capacitance").unwrap_or_else(|| match (rise, fall) {
            (Some(r), Some(f)) => r.max(f),
            (Some(c), None) | (None, Some(c)) => c,
            (None, None) => 0.0,
        });

        let mut timing = Vec::new();
        for t in g.groups_of("timing") {
            for related in related_pins(t) {
                let mut arc = TimingArc::new(related);
                arc.timing_type = t.text("timing_type").map(str::to_string);
                arc.timing_sense = t.text("timing_sense").map(str::to_string);
                for kind in DELAY_TABLES {
                    let table = t.groups_of(kind).next().and_then(|tg| self.build_table(tg));
                    match kind {
                        "cell_rise" => arc.cell_rise = table,
                        "cell_fall" => arc.cell_fall = table,
                        "rise_transition" => arc.rise_transition = table,
                        "fall_transition" => arc.fall_transition = table,
                        "rise_constraint" => arc.rise_constraint = table,
                        _ => arc.fall_constraint = table,
                    }
                }
                timing.push(arc);
            }
        }

        let mut internal_power = Vec::new();
        for p in g.groups_of("internal_power") {
            for related in related_pins(p) {
                internal_power.push(PowerArc {
                    related_pin: related,
                    rise_power: p.groups_of("rise_power").next().and_then(|tg| self.build_table(tg)),
                    fall_power: p.groups_of("fall_power").next().and_then(|tg| self.build_table(tg)),
                });
            }
        }

        PinDefinition {
            name: name.to_string(),
            direction: g
                .text("direction")
                .map_or(PinDirection::Unknown, PinDirection::from_name),
            capacitance,
            max_capacitance: g.number("max_capacitance"),
            function: g.text("function").map(str::to_string),
            is_clock: g.attr("clock").is_some_and(AttributeValue::as_bool),
            timing,
            internal_power,
            attributes: other_attributes(
                g,
                &[
                    "direction",
                    "capacitance",
                    "max_capacitance",
                    "function",
                    "clock",
                ],
            ),
        }
    }

    fn build_table(&self, g: &Group) -> Option<LookupTable> {
        let template_name = g.name().unwrap_or("scalar");
        if g.complex("index_3").is_some() {
            self.warn(
                codes::TABLE_SHAPE,
                format!("`{}` declares a third axis; three-dimensional tables are not supported", g.kind),
                g.span,
            );
            return None;
        }

        let Some(values_attr) = g.complex("values") else {
            self.warn(
                codes::TABLE_SHAPE,
                format!("`{}` has no `values`", g.kind),
                g.span,
            );
            return None;
        };
        let mut rows = Vec::with_capacity(values_attr.args.len());
        for arg in &values_attr.args {
            match parse_numbers(&arg.to_text()) {
                Ok(row) => rows.push(row),
                Err(bad) => {
                    self.warn(
                        codes::BAD_NUMBER,
                        format!("`{bad}` in `{}` values is not a number", g.kind),
                        values_attr.span,
                    );
                    return None;
                }
            }
        }
        let flat: Vec<f64> = rows.iter().flatten().copied().collect();
        let has_own_index = g.complex("index_1").is_some() || g.complex("index_2").is_some();

        if template_name == "scalar" || (!has_own_index && flat.len() == 1) {
            return match flat.as_slice() {
                [v] => Some(LookupTable::scalar(*v)),
                _ => {
                    self.warn(
                        codes::TABLE_SHAPE,
                        format!("scalar `{}` holds {} values", g.kind, flat.len()),
                        values_attr.span,
                    );
                    None
                }
            };
        }

        let Some(template) = self.templates.get(template_name) else {
            self.warn(
                codes::UNKNOWN_TEMPLATE,
                format!("`{}` references unknown template `{template_name}`", g.kind),
                g.span,
            );
            return None;
        };
        if template.variables.len() > 2 {
            self.warn(
                codes::TABLE_SHAPE,
                format!(
                    "template `{template_name}` has {} axes; three-dimensional tables are not supported",
                    template.variables.len()
                ),
                g.span,
            );
            return None;
        }

        let mut axes = Vec::with_capacity(template.variables.len());
        for (k, default_axis) in template.axes.iter().enumerate() {
            let axis = match g.complex(&format!("index_{}", k + 1)) {
                Some(attr) => match parse_numbers(&join_args(&attr.args)) {
                    Ok(axis) => axis,
                    Err(bad) => {
                        self.warn(
                            codes::BAD_NUMBER,
                            format!("`{bad}` in `index_{}` is not a number", k + 1),
                            attr.span,
                        );
                        return None;
                    }
                },
                None => default_axis.clone(),
            };
            axes.push(axis);
        }

        let shape_ok = match axes.as_slice() {
            [] => flat.len() == 1,
            [a] => !a.is_empty() && flat.len() == a.len(),
            [a, b] => {
                let by_rows = rows.len() == a.len() && rows.iter().all(|r| r.len() == b.len());
                let single_row = rows.len() == 1 && flat.len() == a.len() * b.len();
                !a.is_empty() && !b.is_empty() && (by_rows || single_row)
            }
            _ => false,
        };
        if !shape_ok {
            let dims: Vec<String> = axes.iter().map(|a| a.len().to_string()).collect();
            self.warn(
                codes::TABLE_SHAPE,
                format!(
                    "`{}` has {} values in {} rows, which does not fit axes of size [{}]",
                    g.kind,
                    flat.len(),
                    rows.len(),
                    dims.join(" x ")
                ),
                values_attr.span,
            );
            return None;
        }

        Some(LookupTable::new(
            template_name,
            template.variables.clone(),
            axes,
            flat,
        ))
    }
}

/// Splits `related_pin : "A B"` into one name per pin; `any` if absent.
fn related_pins(g: &Group) -> Vec<String> {
    match g.text("related_pin") {
        Some(list) if !list.trim().is_empty() => {
            list.split_whitespace().map(str::to_string).collect()
        }
        _ => vec!["any".to_string()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::TableQuery;

    const LIB: &str = r#"
/* demo library */
library(demo) {
  delay_model : table_lookup;
  time_unit : "1ns";
  capacitive_load_unit (1, pf);
  operating_conditions(typical) {
    process : 1.0;
    temperature : 25;
    voltage : 1.8;
  }
  lu_table_template(delay_2x2) {
    variable_1 : input_net_transition;
    variable_2 : total_output_net_capacitance;
    index_1 ("0.1, 0.5");
    index_2 ("0.01, 0.1");
  }
  cell(BUFX1) {
    area : 2.5;
    cell_leakage_power : 0.01;
    pin(A) {
      direction : input;
      capacitance : 0.002;
    }
    pin(Y) {
      direction : output;
      function : "A";
      timing() {
        related_pin : "A";
        timing_sense : positive_unate;
        cell_rise(delay_2x2) {
          values ("0.10, 0.20", \
                  "0.30, 0.40");
        }
        cell_fall(delay_2x2) {
          values ("0.12, 0.22", "0.32, 0.42");
        }
        rise_transition(scalar) { values ("0.05"); }
      }
    }
  }
  cell(BUFX4) { area : 6.0; pin(A) { direction : input; } pin(Y) { direction : output; } }
}
"#;

    fn parse(text: &str) -> (Library, DiagnosticSink) {
        let sink = DiagnosticSink::new();
        let lib = parse_library(text, FileId::from_raw(0), &sink).unwrap();
        (lib, sink)
    }

    #[test]
    fn minimal_buffer_library() {
        let (lib, sink) = parse(LIB);
        assert!(sink.diagnostics().is_empty(), "{:?}", sink.diagnostics());
        assert_eq!(lib.name, "demo");
        assert_eq!(
            lib.capacitive_load_unit,
            Some(CapacitiveLoadUnit {
                value: 1.0,
                unit: "pf".to_string()
            })
        );
        assert_eq!(lib.operating_conditions["typical"].voltage, Some(1.8));
        assert_eq!(lib.attributes["time_unit"].as_str(), Some("1ns"));

        let buf = lib.cell("BUFX1").unwrap();
        assert_eq!(buf.area, 2.5);
        assert_eq!(buf.leakage_power, 0.01);
        assert_eq!(buf.pin_direction("A"), PinDirection::Input);
        assert_eq!(buf.pin_direction("Y"), PinDirection::Output);
        assert_eq!(buf.pin("A").unwrap().capacitance, 0.002);

        let arc = buf.delay_arc("A").unwrap();
        assert_eq!(arc.timing_sense.as_deref(), Some("positive_unate"));
        let rise = arc.cell_rise.as_ref().unwrap();
        assert_eq!(rise.lookup(&TableQuery::delay(0.5, 0.01)), 0.30);
        assert_eq!(arc.delay(0.1, 0.1), Some((0.20, 0.22)));
        assert_eq!(arc.transition(0.3, 0.05), Some((0.05, 0.05)));
    }

    #[test]
    fn sizing_index_and_pseudo_cells() {
        let (lib, _) = parse(LIB);
        assert_eq!(lib.sizes_of("BUFX"), vec![1, 4]);
        assert_eq!(lib.cell("BUFX4").unwrap().available_sizes, vec![1, 4]);
        assert_eq!(lib.sized_cell("BUFX", 4).unwrap().name, "BUFX4");
        for pseudo in ["input", "output", "vdd", "gnd"] {
            assert!(lib.cell(pseudo).unwrap().is_pseudo);
        }
        assert_eq!(lib.real_cells().count(), 2);
        assert!(!lib.sizing.contains_key("input"));
    }

    #[test]
    fn reserved_cell_names_keep_the_pseudo_cells() {
        let text = "library(x) {
          cell(output) { area : 3; pin(D) { direction : input; } }
          cell(vdd) { area : 1; }
          cell(INVX1) { area : 1; }
        }";
        let (lib, sink) = parse(text);
        let output = lib.cell("output").unwrap();
        assert!(output.is_pseudo);
        assert_eq!(output.area, 0.0);
        assert_eq!(output.pin_direction("A"), PinDirection::Input);
        assert!(lib.cell("vdd").unwrap().is_pseudo);
        assert_eq!(lib.real_cells().count(), 1);
        let reserved: Vec<_> = sink
            .diagnostics()
            .into_iter()
            .filter(|d| d.code == codes::RESERVED_CELL_NAME)
            .collect();
        assert_eq!(reserved.len(), 2);
    }

    #[test]
    fn missing_library_group_is_fatal() {
        let sink = DiagnosticSink::new();
        let err = parse_library("cell(X) { }", FileId::from_raw(0), &sink).unwrap_err();
        assert!(matches!(err, LibraryError::InvalidLibrary(_)));
    }

    #[test]
    fn flip_flop_with_constraints() {
        let text = r#"
library(seq) {
  lu_table_template(constraint_2x2) {
    variable_1 : related_pin_transition;
    variable_2 : constrained_pin_transition;
    index_1 ("0.1, 0.4");
    index_2 ("0.1, 0.4");
  }
  cell(DFFX1) {
    ff(IQ, IQN) { next_state : "D"; clocked_on : "CK"; }
    pin(D) {
      direction : input;
      rise_capacitance : 0.001;
      fall_capacitance : 0.0015;
      timing() {
        related_pin : "CK";
        timing_type : setup_rising;
        rise_constraint(constraint_2x2) { values ("0.05, 0.06", "0.07, 0.08"); }
        fall_constraint(constraint_2x2) { values ("0.04, 0.05", "0.06, 0.07"); }
      }
      timing() {
        related_pin : "CK";
        timing_type : hold_rising;
        rise_constraint(scalar) { values ("0.02"); }
      }
    }
    pin(CK) { direction : input; clock : true; }
    pin(Q) {
      direction : output;
      timing() {
        related_pin : "CK";
        timing_type : rising_edge;
        cell_rise(scalar) { values ("0.3"); }
        cell_fall(scalar) { values ("0.28"); }
      }
    }
  }
}
"#;
        let (lib, sink) = parse(text);
        assert!(sink.diagnostics().is_empty(), "{:?}", sink.diagnostics());
        let ff = lib.cell("DFFX1").unwrap();
        assert!(ff.is_ff());
        assert_eq!(ff.clock_pin().unwrap().name, "CK");
        assert_eq!(ff.pin("D").unwrap().capacitance, 0.0015);
        assert_eq!(ff.clock_to_q_arc().unwrap().delay(0.1, 0.0), Some((0.3, 0.28)));
        let setup = ff.setup_arc("D").unwrap();
        assert_eq!(setup.constraint(0.4, 0.1), Some((0.07, 0.06)));
        assert_eq!(ff.hold_arc("D").unwrap().constraint(0.1, 0.1), Some((0.02, 0.02)));
    }

    #[test]
    fn related_pin_list_yields_one_arc_each() {
        let text = r#"
library(x) {
  cell(NAND2X1) {
    pin(A, B) { direction : input; }
    pin(Y) {
      direction : output;
      timing() { related_pin : "A B"; cell_rise(scalar) { values("0.1"); } }
    }
  }
}
"#;
        let (lib, _) = parse(text);
        let cell = lib.cell("NAND2X1").unwrap();
        assert_eq!(cell.input_pins().count(), 2);
        let y = cell.pin("Y").unwrap();
        let related: Vec<&str> = y.timing.iter().map(|a| a.related_pin.as_str()).collect();
        assert_eq!(related, vec!["A", "B"]);
        assert_eq!(cell.basename, "NAND2");
    }

    #[test]
    fn malformed_tables_warn_and_are_dropped() {
        let text = r#"
library(x) {
  lu_table_template(t2) {
    variable_1 : input_net_transition;
    variable_2 : total_output_net_capacitance;
    index_1 ("0.1, 0.5");
    index_2 ("0.01, 0.1");
  }
  cell(INVX1) {
    pin(A) { direction : input; }
    pin(Y) {
      direction : output;
      timing() {
        related_pin : "A";
        cell_rise(t2) { values ("0.1, 0.2", "0.3"); }
        cell_fall(t2) { values ("0.1, abc", "0.3, 0.4"); }
        rise_transition(nope) { values ("0.1, 0.2", "0.3, 0.4"); }
        fall_transition(t2) { index_3("1, 2"); values ("1"); }
      }
    }
  }
}
"#;
        let (lib, sink) = parse(text);
        let arc = lib.cell("INVX1").unwrap().delay_arc("A").unwrap();
        assert!(arc.cell_rise.is_none());
        assert!(arc.cell_fall.is_none());
        assert!(arc.rise_transition.is_none());
        assert!(arc.fall_transition.is_none());
        let codes: Vec<DiagnosticCode> = sink.diagnostics().iter().map(|d| d.code).collect();
        assert!(codes.contains(&codes::TABLE_SHAPE));
        assert!(codes.contains(&codes::BAD_NUMBER));
        assert!(codes.contains(&codes::UNKNOWN_TEMPLATE));
        assert!(!sink.has_errors());
    }

    #[test]
    fn table_overrides_template_index() {
        let text = r#"
library(x) {
  lu_table_template(t1) { variable_1 : total_output_net_capacitance; index_1 ("1, 2, 3"); }
  cell(BUFX2) {
    pin(Y) {
      direction : output;
      timing() { cell_rise(t1) { index_1 ("0.0, 1.0"); values ("5, 7"); } }
    }
  }
}
"#;
        let (lib, sink) = parse(text);
        assert!(sink.diagnostics().is_empty());
        let y = lib.cell("BUFX2").unwrap().pin("Y").unwrap();
        let rise = y.timing[0].cell_rise.as_ref().unwrap();
        assert_eq!(rise.axes, vec![vec![0.0, 1.0]]);
        assert!((rise.lookup(&TableQuery::delay(0.0, 0.5)) - 6.0).abs() < 1e-9);
        assert_eq!(y.timing[0].related_pin, "any");
    }

    #[test]
    fn duplicate_cell_keeps_first() {
        let text = "library(x) { cell(A1) { area : 1; } cell(A1) { area : 2; } }";
        let (lib, sink) = parse(text);
        assert_eq!(lib.cell("A1").unwrap().area, 1.0);
        let diags = sink.diagnostics();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, codes::DUPLICATE_CELL);
        assert_eq!(diags[0].labels.len(), 1);
    }

    #[test]
    fn bus_groups_are_skipped_with_warning() {
        let text = "library(x) { cell(REGX1) { bus(D) { bus_type : b4; } pg_pin(VDD) { } } }";
        let (lib, sink) = parse(text);
        assert!(lib.cell("REGX1").unwrap().pins.is_empty());
        let diags = sink.diagnostics();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, codes::UNSUPPORTED_GROUP);
    }

    #[test]
    fn unterminated_cell_still_parses_library() {
        let (lib, sink) = parse("library(x) { cell(INVX1) { area : 1.5; ");
        assert_eq!(lib.cell("INVX1").unwrap().area, 1.5);
        assert!(sink.any(|d| d.code == codes::UNBALANCED_GROUP));
    }
}
