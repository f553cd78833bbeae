//! `kairos analyze`: static timing analysis pipeline.
//!
//! Loads the library, netlist, annotations and constraints, runs the
//! analysis, and reports. The full pipeline:
//!
//! 1. Resolve inputs (command line first, then `kairos.toml`)
//! 2. Load and parse the library, annotations and netlist
//! 3. Load timing constraints
//! 4. Run the analysis
//! 5. Render diagnostics
//! 6. Write report files and print the report

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use kairos_common::Interner;
use kairos_diagnostics::{Diagnostic, DiagnosticSink};
use kairos_source::{SourceDb, SourceKind};
use kairos_timing::{
    analyze_timing, AnalysisOptions, PathsReport, TimingAnalysis, TimingConstraints,
    TimingReport,
};
use serde::Serialize;
use tracing::info;

use crate::pipeline::{
    load_annotations, load_library, load_netlist, read_source, render_diagnostics, Inputs,
    Project,
};
use crate::{AnalyzeArgs, GlobalArgs, ReportFormat};

/// The JSON document printed by `kairos analyze --format json`.
#[derive(Serialize)]
struct AnalysisPayload<'a> {
    timing_report: &'a TimingReport,
    paths_report: &'a PathsReport,
    warnings: &'a [Diagnostic],
}

/// Report settings after merging flags over `[report]`.
#[derive(Debug, PartialEq)]
struct ReportSettings {
    design: Option<String>,
    format: ReportFormat,
    max_paths: usize,
    output_dir: Option<PathBuf>,
}

impl ReportSettings {
    fn merge(args: &AnalyzeArgs, project: Option<&Project>) -> Self {
        let report = project.map(|p| &p.config.report);
        Self {
            design: project.map(|p| p.config.design.name.clone()),
            format: args
                .format
                .or(report.map(|r| r.format.into()))
                .unwrap_or(ReportFormat::Text),
            max_paths: args
                .max_paths
                .or(report.map(|r| r.max_paths))
                .unwrap_or(AnalysisOptions::default().max_paths),
            output_dir: args.output.as_deref().map(PathBuf::from).or_else(|| {
                project.map(|p| p.root.join(&p.config.report.output_dir))
            }),
        }
    }
}

/// Runs the `kairos analyze` command.
///
/// Returns exit code 0 if timing is met, 1 if any endpoint violates.
pub fn run(args: &AnalyzeArgs, global: &GlobalArgs) -> Result<i32, Box<dyn Error>> {
    // Step 1: Resolve inputs
    let mut inputs = Inputs::new(global);
    let library_path = inputs.required(args.library.as_deref(), |c| c.design.library.as_str())?;
    let netlist_path = inputs.required(args.netlist.as_deref(), |c| c.design.netlist.as_str())?;
    let constraints_path =
        inputs.required(args.constraints.as_deref(), |c| c.constraints.timing.as_str())?;
    let net_capacitance_path = inputs.optional(args.net_capacitance.as_deref(), |c| {
        c.constraints.net_capacitance.as_deref()
    })?;
    let clock_skew_path = inputs.optional(args.clock_skew.as_deref(), |c| {
        c.constraints.clock_skew.as_deref()
    })?;
    let settings = ReportSettings::merge(args, inputs.loaded()?);

    // Step 2: Load and parse the structural inputs
    let mut source_db = SourceDb::new();
    let interner = Interner::new();
    let sink = DiagnosticSink::new();

    let library = load_library(&library_path, &mut source_db, &sink)?;
    let annotations = load_annotations(
        net_capacitance_path.as_deref(),
        clock_skew_path.as_deref(),
        &mut source_db,
    )?;
    let mut netlist = load_netlist(
        &netlist_path,
        &library,
        &annotations,
        &mut source_db,
        &interner,
        &sink,
    )?;

    // Step 3: Load timing constraints
    let file = read_source(&constraints_path, SourceKind::Constraints, &mut source_db)?;
    let constraints = TimingConstraints::from_json(&source_db.get_file(file).content)?;

    let design = settings
        .design
        .clone()
        .unwrap_or_else(|| netlist.module_name.clone());
    if !global.quiet && settings.format == ReportFormat::Text {
        eprintln!(
            "   Analyzing {design} (clock period {})",
            constraints.clock_period
        );
    }

    // Step 4: Analyze
    let options = AnalysisOptions {
        max_paths: settings.max_paths,
    };
    let analysis = analyze_timing(
        &mut netlist,
        &library,
        &constraints,
        options,
        &interner,
        &sink,
    )?;

    // Step 5: Render diagnostics
    render_diagnostics(&sink, &source_db, global);
    let warnings = sink.diagnostics();

    // Step 6: Report
    if let Some(ref dir) = settings.output_dir {
        for path in write_reports(dir, &design, &analysis)? {
            info!("wrote {}", path.display());
        }
    }

    match settings.format {
        ReportFormat::Text => {
            if !global.quiet {
                print!("{}", render_text(&analysis));
            }
        }
        ReportFormat::Json => {
            let payload = AnalysisPayload {
                timing_report: &analysis.timing_report,
                paths_report: &analysis.paths_report,
                warnings: &warnings,
            };
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
    }

    let summary = &analysis.timing_report.summary;
    if !global.quiet && settings.format == ReportFormat::Text {
        eprintln!(
            "   Result: {} setup violation(s), {} hold violation(s), {} warning(s)",
            summary.setup_violations,
            summary.hold_violations,
            sink.warning_count()
        );
    }

    Ok(if summary.met { 0 } else { 1 })
}

/// Writes `<design>_timing_report.json` and `<design>_paths_report.json`.
fn write_reports(
    dir: &Path,
    design: &str,
    analysis: &TimingAnalysis,
) -> Result<Vec<PathBuf>, Box<dyn Error>> {
    fs::create_dir_all(dir)
        .map_err(|e| format!("cannot create {}: {e}", dir.display()))?;
    let timing = dir.join(format!("{design}_timing_report.json"));
    fs::write(
        &timing,
        serde_json::to_string_pretty(&analysis.timing_report)?,
    )?;
    let paths = dir.join(format!("{design}_paths_report.json"));
    fs::write(&paths, serde_json::to_string_pretty(&analysis.paths_report)?)?;
    Ok(vec![timing, paths])
}

fn time(value: f64) -> String {
    if value.is_finite() {
        format!("{value:.3}")
    } else {
        "-".to_string()
    }
}

/// Renders the summary and worst paths as plain text.
fn render_text(analysis: &TimingAnalysis) -> String {
    let summary = &analysis.timing_report.summary;
    let mut out = String::new();
    out.push_str(&format!("Design:            {}\n", summary.design));
    out.push_str(&format!(
        "Clock period:      {}\n",
        time(summary.clock_period)
    ));
    out.push_str(&format!("Endpoints:         {}\n", summary.endpoints));
    out.push_str(&format!(
        "Worst setup slack: {}\n",
        summary.worst_slack.map_or_else(|| "-".to_string(), time)
    ));
    out.push_str(&format!(
        "Worst hold slack:  {}\n",
        summary.worst_hold_slack.map_or_else(|| "-".to_string(), time)
    ));
    out.push_str(&format!(
        "Violations:        {} setup, {} hold\n",
        summary.setup_violations, summary.hold_violations
    ));

    for (i, path) in analysis.paths_report.paths.iter().enumerate() {
        out.push_str(&format!("\nPath {}  slack {}\n", i + 1, time(path.slack)));
        out.push_str(&format!(
            "  {:<6} {:<24} {:<12} {:>8} {:>8} {:>8}\n",
            "port", "instance", "cell", "delay", "arrival", "required"
        ));
        for element in &path.elements {
            let gate = &element.gate;
            out.push_str(&format!(
                "  {:<6} {:<24} {:<12} {:>8} {:>8} {:>8}\n",
                element.port,
                gate.name,
                gate.module,
                time(gate.delay.max),
                time(gate.aat.max),
                time(gate.rat)
            ));
        }
    }

    out.push_str(if summary.met {
        "\nTiming met.\n"
    } else {
        "\nTiming VIOLATED.\n"
    });
    out
}
