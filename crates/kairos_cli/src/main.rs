//! Kairos CLI: static timing analysis of gate-level netlists.
//!
//! Provides `kairos analyze` to time a design against its constraints,
//! `kairos library` to list the cells of a library, and `kairos cells` to
//! list the instances of a netlist with their library data.

#![warn(missing_docs)]

mod analyze;
mod inspect;
mod pipeline;

use std::io::IsTerminal;
use std::process;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

/// Kairos: static timing analysis for gate-level netlists.
#[derive(Parser, Debug)]
#[command(name = "kairos", version, about = "Kairos Static Timing Analyzer")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase log verbosity (`-v` info, `-vv` debug, `-vvv` trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Control colored output.
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Path to a custom `kairos.toml` configuration file.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run static timing analysis on a design.
    Analyze(AnalyzeArgs),
    /// List the cells of a library.
    Library(LibraryArgs),
    /// List the instances of a netlist.
    Cells(CellsArgs),
}

/// Arguments for the `kairos analyze` subcommand.
///
/// Any input left out is taken from `kairos.toml`.
#[derive(Parser, Debug)]
pub struct AnalyzeArgs {
    /// Cell library file.
    #[arg(long)]
    pub library: Option<String>,

    /// Gate-level netlist file.
    #[arg(long)]
    pub netlist: Option<String>,

    /// Timing constraints JSON.
    #[arg(long)]
    pub constraints: Option<String>,

    /// Net capacitance JSON (`{wire: {instance: pF}}`).
    #[arg(long)]
    pub net_capacitance: Option<String>,

    /// Clock skew JSON (`{instance: ns}`).
    #[arg(long)]
    pub clock_skew: Option<String>,

    /// Output format for the report printed to stdout.
    #[arg(short, long, value_enum)]
    pub format: Option<ReportFormat>,

    /// Directory to write `timing_report` and `paths_report` JSON into.
    #[arg(short, long)]
    pub output: Option<String>,

    /// Number of worst paths to report.
    #[arg(long)]
    pub max_paths: Option<usize>,
}

/// Arguments for the `kairos library` subcommand.
#[derive(Parser, Debug)]
pub struct LibraryArgs {
    /// Cell library file.
    pub file: String,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Arguments for the `kairos cells` subcommand.
#[derive(Parser, Debug)]
pub struct CellsArgs {
    /// Cell library file.
    #[arg(long)]
    pub library: Option<String>,

    /// Gate-level netlist file.
    #[arg(long)]
    pub netlist: Option<String>,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Controls whether colored output is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Detect from terminal capabilities.
    Auto,
    /// Always produce colored output.
    Always,
    /// Never produce colored output.
    Never,
}

/// Report output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable terminal output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

impl From<kairos_config::ReportFormat> for ReportFormat {
    fn from(format: kairos_config::ReportFormat) -> Self {
        match format {
            kairos_config::ReportFormat::Text => ReportFormat::Text,
            kairos_config::ReportFormat::Json => ReportFormat::Json,
        }
    }
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Number of `-v` flags given.
    pub verbose: u8,
    /// Whether to use colored output.
    pub color: bool,
    /// Optional path to a custom config file.
    pub config: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let color = match cli.color {
        ColorChoice::Auto => std::io::stderr().is_terminal(),
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    };

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        color,
        config: cli.config,
    };
    init_logging(&global);

    let result = match cli.command {
        Command::Analyze(ref args) => analyze::run(args, &global),
        Command::Library(ref args) => inspect::run_library(args, &global),
        Command::Cells(ref args) => inspect::run_cells(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

/// Default log filter for the given flags; `RUST_LOG` takes precedence.
fn log_level(global: &GlobalArgs) -> &'static str {
    if global.quiet {
        return "error";
    }
    match global.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn init_logging(global: &GlobalArgs) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level(global)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn global(quiet: bool, verbose: u8) -> GlobalArgs {
        GlobalArgs {
            quiet,
            verbose,
            color: false,
            config: None,
        }
    }

    #[test]
    fn parse_analyze_default() {
        let cli = Cli::parse_from(["kairos", "analyze"]);
        match cli.command {
            Command::Analyze(ref args) => {
                assert!(args.library.is_none());
                assert!(args.netlist.is_none());
                assert!(args.constraints.is_none());
                assert!(args.net_capacitance.is_none());
                assert!(args.clock_skew.is_none());
                assert!(args.format.is_none());
                assert!(args.output.is_none());
                assert!(args.max_paths.is_none());
            }
            _ => panic!("expected Analyze command"),
        }
    }

    #[test]
    fn parse_analyze_with_args() {
        let cli = Cli::parse_from([
            "kairos",
            "analyze",
            "--library",
            "cells.lib",
            "--netlist",
            "top.v",
            "--constraints",
            "timing.json",
            "--net-capacitance",
            "caps.json",
            "--clock-skew",
            "skew.json",
            "--format",
            "json",
            "--output",
            "out",
            "--max-paths",
            "25",
        ]);
        match cli.command {
            Command::Analyze(ref args) => {
                assert_eq!(args.library.as_deref(), Some("cells.lib"));
                assert_eq!(args.netlist.as_deref(), Some("top.v"));
                assert_eq!(args.constraints.as_deref(), Some("timing.json"));
                assert_eq!(args.net_capacitance.as_deref(), Some("caps.json"));
                assert_eq!(args.clock_skew.as_deref(), Some("skew.json"));
                assert_eq!(args.format, Some(ReportFormat::Json));
                assert_eq!(args.output.as_deref(), Some("out"));
                assert_eq!(args.max_paths, Some(25));
            }
            _ => panic!("expected Analyze command"),
        }
    }

    #[test]
    fn parse_library_command() {
        let cli = Cli::parse_from(["kairos", "library", "cells.lib", "-f", "json"]);
        match cli.command {
            Command::Library(ref args) => {
                assert_eq!(args.file, "cells.lib");
                assert_eq!(args.format, ReportFormat::Json);
            }
            _ => panic!("expected Library command"),
        }
    }

    #[test]
    fn parse_library_requires_file() {
        assert!(Cli::try_parse_from(["kairos", "library"]).is_err());
    }

    #[test]
    fn parse_cells_default() {
        let cli = Cli::parse_from(["kairos", "cells"]);
        match cli.command {
            Command::Cells(ref args) => {
                assert!(args.library.is_none());
                assert!(args.netlist.is_none());
                assert_eq!(args.format, ReportFormat::Text);
            }
            _ => panic!("expected Cells command"),
        }
    }

    #[test]
    fn parse_global_flags() {
        let cli = Cli::parse_from(["kairos", "--quiet", "--color", "never", "analyze"]);
        assert!(cli.quiet);
        assert_eq!(cli.verbose, 0);
        assert_eq!(cli.color, ColorChoice::Never);
    }

    #[test]
    fn parse_verbose_counts() {
        let cli = Cli::parse_from(["kairos", "-vv", "cells"]);
        assert_eq!(cli.verbose, 2);
        let cli = Cli::parse_from(["kairos", "cells", "--verbose"]);
        assert_eq!(cli.verbose, 1);
    }

    #[test]
    fn parse_config_path() {
        let cli = Cli::parse_from(["kairos", "--config", "/path/to/kairos.toml", "analyze"]);
        assert_eq!(cli.config.as_deref(), Some("/path/to/kairos.toml"));
    }

    #[test]
    fn parse_rejects_bad_max_paths() {
        assert!(Cli::try_parse_from(["kairos", "analyze", "--max-paths", "many"]).is_err());
    }

    #[test]
    fn log_level_follows_flags() {
        assert_eq!(log_level(&global(false, 0)), "warn");
        assert_eq!(log_level(&global(false, 1)), "info");
        assert_eq!(log_level(&global(false, 2)), "debug");
        assert_eq!(log_level(&global(false, 5)), "trace");
        assert_eq!(log_level(&global(true, 3)), "error");
    }

    #[test]
    fn config_format_converts() {
        assert_eq!(
            ReportFormat::from(kairos_config::ReportFormat::Json),
            ReportFormat::Json
        );
        assert_eq!(
            ReportFormat::from(kairos_config::ReportFormat::Text),
            ReportFormat::Text
        );
    }
}
