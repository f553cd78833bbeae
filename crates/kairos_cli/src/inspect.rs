//! `kairos library` and `kairos cells`: listings of library cells and
//! netlist instances.

use std::error::Error;
use std::path::Path;

use kairos_common::Interner;
use kairos_diagnostics::DiagnosticSink;
use kairos_netlist::Annotations;
use kairos_source::SourceDb;
use kairos_timing::{format_cells, format_library_cells, CellSummary, LibraryCellSummary};

use crate::pipeline::{load_library, load_netlist, render_diagnostics, Inputs};
use crate::{CellsArgs, GlobalArgs, LibraryArgs, ReportFormat};

/// Runs the `kairos library` command.
///
/// Returns exit code 1 if the library produced error diagnostics.
pub fn run_library(args: &LibraryArgs, global: &GlobalArgs) -> Result<i32, Box<dyn Error>> {
    let mut source_db = SourceDb::new();
    let sink = DiagnosticSink::new();
    let library = load_library(Path::new(&args.file), &mut source_db, &sink)?;
    render_diagnostics(&sink, &source_db, global);

    let cells = format_library_cells(&library);
    match args.format {
        ReportFormat::Text => print!("{}", library_table(&cells)),
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&cells)?),
    }
    Ok(if sink.has_errors() { 1 } else { 0 })
}

/// Runs the `kairos cells` command.
///
/// Returns exit code 1 if parsing produced error diagnostics.
pub fn run_cells(args: &CellsArgs, global: &GlobalArgs) -> Result<i32, Box<dyn Error>> {
    let mut inputs = Inputs::new(global);
    let library_path = inputs.required(args.library.as_deref(), |c| c.design.library.as_str())?;
    let netlist_path = inputs.required(args.netlist.as_deref(), |c| c.design.netlist.as_str())?;

    let mut source_db = SourceDb::new();
    let interner = Interner::new();
    let sink = DiagnosticSink::new();
    let library = load_library(&library_path, &mut source_db, &sink)?;
    let netlist = load_netlist(
        &netlist_path,
        &library,
        &Annotations::default(),
        &mut source_db,
        &interner,
        &sink,
    )?;
    render_diagnostics(&sink, &source_db, global);

    let cells = format_cells(&netlist, &library, &interner);
    match args.format {
        ReportFormat::Text => print!("{}", cells_table(&cells)),
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&cells)?),
    }
    Ok(if sink.has_errors() { 1 } else { 0 })
}

fn sizes(available: &[u32]) -> String {
    available
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

fn library_table(cells: &[LibraryCellSummary]) -> String {
    let mut out = format!(
        "{:<12} {:<10} {:>4} {:<10} {:>8} {:>10}  {}\n",
        "cell", "family", "size", "sizes", "area", "leakage", "pins"
    );
    for cell in cells {
        let output = cell.output.as_deref().unwrap_or("-");
        let kind = if cell.is_ff { " (ff)" } else { "" };
        out.push_str(&format!(
            "{:<12} {:<10} {:>4} {:<10} {:>8.3} {:>10.4}  {} -> {}{}\n",
            cell.name,
            cell.basename_x,
            cell.size,
            sizes(&cell.available_sizes),
            cell.area,
            cell.leakage_power,
            cell.inputs.join(","),
            output,
            kind
        ));
    }
    out
}

fn cells_table(cells: &[CellSummary]) -> String {
    let mut out = format!(
        "{:<16} {:<12} {:>4} {:<10} {:>8}  {}\n",
        "instance", "cell", "size", "sizes", "area", "fanin"
    );
    for cell in cells {
        let fanin = cell
            .fanin
            .iter()
            .map(|c| format!("{}<-{}", c.port, c.instance))
            .collect::<Vec<_>>()
            .join(" ");
        out.push_str(&format!(
            "{:<16} {:<12} {:>4} {:<10} {:>8.3}  {}\n",
            cell.name,
            cell.module,
            cell.size,
            sizes(&cell.available_sizes),
            cell.area,
            fanin
        ));
    }
    out
}
