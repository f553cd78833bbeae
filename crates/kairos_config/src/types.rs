//! Configuration types deserialized from `kairos.toml`.

use serde::Deserialize;

/// The top-level project configuration.
#[derive(Debug, Deserialize)]
pub struct ProjectConfig {
    /// Design name and structural inputs.
    pub design: DesignConfig,
    /// Constraint and annotation documents.
    pub constraints: ConstraintConfig,
    /// Report output settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// The `[design]` table.
#[derive(Debug, Deserialize)]
pub struct DesignConfig {
    /// Design name, used in report headers and output file names.
    pub name: String,
    /// Path to the Liberty-style cell library.
    pub library: String,
    /// Path to the flattened gate-level netlist.
    pub netlist: String,
}

/// The `[constraints]` table.
#[derive(Debug, Deserialize)]
pub struct ConstraintConfig {
    /// Path to the timing constraints JSON (`clock`, delays, slews, loads).
    pub timing: String,
    /// Path to the net capacitance JSON (`{wire: {instance: pF}}`).
    #[serde(default)]
    pub net_capacitance: Option<String>,
    /// Path to the clock skew JSON (`{instance: ns}`).
    #[serde(default)]
    pub clock_skew: Option<String>,
}

/// The `[report]` table.
#[derive(Debug, Deserialize)]
pub struct ReportConfig {
    /// Maximum number of timing paths to report.
    #[serde(default = "default_max_paths")]
    pub max_paths: usize,
    /// Directory reports are written into.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    /// Output format.
    #[serde(default)]
    pub format: ReportFormat,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            max_paths: default_max_paths(),
            output_dir: default_output_dir(),
            format: ReportFormat::default(),
        }
    }
}

fn default_max_paths() -> usize {
    10
}

fn default_output_dir() -> String {
    "reports".to_string()
}

/// How reports are written.
#[derive(Debug, Default, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Human-readable summary tables.
    #[default]
    Text,
    /// Pretty-printed JSON documents.
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_config_from_str;

    const BASE: &str = r#"
[design]
name = "counter"
library = "lib/cells.lib"
netlist = "build/counter.v"

[constraints]
timing = "constraints/timing.json"
"#;

    #[test]
    fn report_defaults() {
        let config = load_config_from_str(BASE).unwrap();
        assert_eq!(config.report.max_paths, 10);
        assert_eq!(config.report.output_dir, "reports");
        assert_eq!(config.report.format, ReportFormat::Text);
        assert!(config.constraints.net_capacitance.is_none());
        assert!(config.constraints.clock_skew.is_none());
    }

    #[test]
    fn report_format_values() {
        for (input, expected) in [("json", ReportFormat::Json), ("text", ReportFormat::Text)] {
            let toml = format!("{BASE}\n[report]\nformat = \"{input}\"\n");
            let config = load_config_from_str(&toml).unwrap();
            assert_eq!(config.report.format, expected);
        }
    }

    #[test]
    fn unknown_format_rejected() {
        let toml = format!("{BASE}\n[report]\nformat = \"html\"\n");
        assert!(load_config_from_str(&toml).is_err());
    }
}
