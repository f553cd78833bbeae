//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::ProjectConfig;
use std::path::Path;

/// Name of the project configuration file.
pub const CONFIG_FILE_NAME: &str = "kairos.toml";

/// Loads and validates `<project_dir>/kairos.toml`.
pub fn load_config(project_dir: &Path) -> Result<ProjectConfig, ConfigError> {
    let content = std::fs::read_to_string(project_dir.join(CONFIG_FILE_NAME))?;
    load_config_from_str(&content)
}

/// Parses and validates configuration text.
pub fn load_config_from_str(content: &str) -> Result<ProjectConfig, ConfigError> {
    let config: ProjectConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &ProjectConfig) -> Result<(), ConfigError> {
    let required = [
        ("design.name", &config.design.name),
        ("design.library", &config.design.library),
        ("design.netlist", &config.design.netlist),
        ("constraints.timing", &config.constraints.timing),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(ConfigError::MissingField(field.to_string()));
        }
    }
    for (field, value) in [
        ("constraints.net_capacitance", &config.constraints.net_capacitance),
        ("constraints.clock_skew", &config.constraints.clock_skew),
    ] {
        if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
            return Err(ConfigError::ValidationError(format!(
                "{field} must not be empty when given"
            )));
        }
    }
    if config.report.max_paths == 0 {
        return Err(ConfigError::ValidationError(
            "report.max_paths must be positive".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ReportFormat;

    #[test]
    fn parse_full_config() {
        let toml = r#"
[design]
name = "counter"
library = "lib/cells.lib"
netlist = "build/counter.v"

[constraints]
timing = "constraints/timing.json"
net_capacitance = "constraints/caps.json"
clock_skew = "constraints/skew.json"

[report]
max_paths = 25
output_dir = "out"
format = "json"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.design.name, "counter");
        assert_eq!(config.design.netlist, "build/counter.v");
        assert_eq!(
            config.constraints.clock_skew.as_deref(),
            Some("constraints/skew.json")
        );
        assert_eq!(config.report.max_paths, 25);
        assert_eq!(config.report.output_dir, "out");
        assert_eq!(config.report.format, ReportFormat::Json);
    }

    #[test]
    fn empty_netlist_rejected() {
        let toml = r#"
[design]
name = "counter"
library = "cells.lib"
netlist = ""

[constraints]
timing = "timing.json"
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(f) if f == "design.netlist"));
    }

    #[test]
    fn missing_constraints_table_rejected() {
        let toml = r#"
[design]
name = "counter"
library = "cells.lib"
netlist = "counter.v"
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn zero_max_paths_rejected() {
        let toml = r#"
[design]
name = "counter"
library = "cells.lib"
netlist = "counter.v"

[constraints]
timing = "timing.json"

[report]
max_paths = 0
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn blank_optional_path_rejected() {
        let toml = r#"
[design]
name = "counter"
library = "cells.lib"
netlist = "counter.v"

[constraints]
timing = "timing.json"
clock_skew = " "
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn invalid_toml_errors() {
        let err = load_config_from_str("this is not valid toml {{{}}}").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[design]\nname = \"d\"\nlibrary = \"a.lib\"\nnetlist = \"d.v\"\n\n[constraints]\ntiming = \"t.json\"\n",
        )
        .unwrap();
        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.design.library, "a.lib");
    }

    #[test]
    fn io_error_from_nonexistent_dir() {
        let err = load_config(Path::new("/nonexistent/dir")).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
