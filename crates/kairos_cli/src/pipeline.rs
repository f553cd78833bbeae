//! Shared pipeline helpers for CLI commands.
//!
//! Contains the utilities used by `analyze`, `library`, and `cells`:
//! project root resolution, merging command-line inputs over `kairos.toml`,
//! loading and parsing the input documents, and diagnostic rendering.

use std::error::Error;
use std::path::{Path, PathBuf};

use kairos_common::Interner;
use kairos_config::{ProjectConfig, CONFIG_FILE_NAME};
use kairos_diagnostics::{DiagnosticRenderer, DiagnosticSink, TerminalRenderer};
use kairos_liberty::{parse_library, Library};
use kairos_netlist::{parse_netlist, Annotations, Netlist};
use kairos_source::{FileId, SourceDb, SourceKind};
use tracing::debug;

use crate::GlobalArgs;

/// Walks up from `start` looking for the nearest directory containing `kairos.toml`.
///
/// Returns the directory containing `kairos.toml`, or an error if none is found.
pub fn find_project_root(start: &Path) -> Result<PathBuf, Box<dyn Error>> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(CONFIG_FILE_NAME).exists() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(format!(
                "could not find {CONFIG_FILE_NAME} in {} or any parent directory",
                start.display()
            )
            .into());
        }
    }
}

/// Resolves the project root directory from global CLI args.
///
/// If `--config` is specified, uses that path (file → parent dir, dir → itself).
/// Otherwise walks up from the current directory looking for `kairos.toml`.
pub fn resolve_project_root(global: &GlobalArgs) -> Result<PathBuf, Box<dyn Error>> {
    if let Some(ref config_path) = global.config {
        let p = PathBuf::from(config_path);
        if p.is_file() {
            Ok(p.parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| PathBuf::from(".")))
        } else {
            Ok(p)
        }
    } else {
        find_project_root(&std::env::current_dir()?)
    }
}

/// A loaded `kairos.toml` and the directory its paths are relative to.
pub struct Project {
    /// Directory holding the configuration file.
    pub root: PathBuf,
    /// The parsed configuration.
    pub config: ProjectConfig,
}

impl Project {
    /// Finds and loads the project configuration.
    pub fn load(global: &GlobalArgs) -> Result<Self, Box<dyn Error>> {
        let root = resolve_project_root(global)?;
        let config = kairos_config::load_config(&root)?;
        debug!("loaded {} from {}", CONFIG_FILE_NAME, root.display());
        Ok(Self { root, config })
    }
}

/// Merges command-line paths over the project configuration.
///
/// The configuration is only loaded when a required input is missing from
/// the command line or `--config` was given, so a fully specified command
/// runs outside any project.
pub struct Inputs<'g> {
    global: &'g GlobalArgs,
    project: Option<Project>,
}

impl<'g> Inputs<'g> {
    /// Creates a resolver with no project loaded yet.
    pub fn new(global: &'g GlobalArgs) -> Self {
        Self {
            global,
            project: None,
        }
    }

    /// The project configuration, loading it on first use.
    pub fn project(&mut self) -> Result<&Project, Box<dyn Error>> {
        let project = match self.project.take() {
            Some(project) => project,
            None => Project::load(self.global)?,
        };
        Ok(self.project.insert(project))
    }

    /// The project configuration if it is loaded or was named with `--config`.
    pub fn loaded(&mut self) -> Result<Option<&Project>, Box<dyn Error>> {
        if self.project.is_none() && self.global.config.is_none() {
            return Ok(None);
        }
        self.project().map(Some)
    }

    /// `explicit` if given, otherwise the configured path.
    pub fn required(
        &mut self,
        explicit: Option<&str>,
        configured: impl Fn(&ProjectConfig) -> &str,
    ) -> Result<PathBuf, Box<dyn Error>> {
        if let Some(path) = explicit {
            return Ok(PathBuf::from(path));
        }
        let project = self.project()?;
        Ok(project.root.join(configured(&project.config)))
    }

    /// `explicit` if given, otherwise the configured path when a project is loaded.
    pub fn optional(
        &mut self,
        explicit: Option<&str>,
        configured: impl Fn(&ProjectConfig) -> Option<&str>,
    ) -> Result<Option<PathBuf>, Box<dyn Error>> {
        if let Some(path) = explicit {
            return Ok(Some(PathBuf::from(path)));
        }
        Ok(self
            .loaded()?
            .and_then(|project| configured(&project.config).map(|p| project.root.join(p))))
    }
}

/// Loads `path` into the source database.
pub fn read_source(
    path: &Path,
    kind: SourceKind,
    source_db: &mut SourceDb,
) -> Result<FileId, Box<dyn Error>> {
    let file = source_db
        .load_file(path, kind)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    Ok(file)
}

/// Reads and parses a cell library.
pub fn load_library(
    path: &Path,
    source_db: &mut SourceDb,
    sink: &DiagnosticSink,
) -> Result<Library, Box<dyn Error>> {
    let file = read_source(path, SourceKind::Library, source_db)?;
    let library = parse_library(&source_db.get_file(file).content, file, sink)?;
    debug!(
        "library `{}`: {} cells",
        library.name,
        library.real_cells().count()
    );
    Ok(library)
}

/// Reads the optional net capacitance and clock skew documents.
pub fn load_annotations(
    net_capacitance: Option<&Path>,
    clock_skew: Option<&Path>,
    source_db: &mut SourceDb,
) -> Result<Annotations, Box<dyn Error>> {
    let mut read = |path: Option<&Path>| -> Result<Option<String>, Box<dyn Error>> {
        match path {
            Some(path) => {
                let file = read_source(path, SourceKind::Constraints, source_db)?;
                Ok(Some(source_db.get_file(file).content.clone()))
            }
            None => Ok(None),
        }
    };
    let net_capacitance = read(net_capacitance)?;
    let clock_skew = read(clock_skew)?;
    Ok(Annotations::from_json(
        net_capacitance.as_deref(),
        clock_skew.as_deref(),
    )?)
}

/// Reads and parses a netlist against `library`.
pub fn load_netlist(
    path: &Path,
    library: &Library,
    annotations: &Annotations,
    source_db: &mut SourceDb,
    interner: &Interner,
    sink: &DiagnosticSink,
) -> Result<Netlist, Box<dyn Error>> {
    let file = read_source(path, SourceKind::Netlist, source_db)?;
    let netlist = parse_netlist(
        &source_db.get_file(file).content,
        file,
        library,
        annotations,
        interner,
        sink,
    )?;
    debug!(
        "module `{}`: {} instances",
        netlist.module_name,
        netlist.cells().count()
    );
    Ok(netlist)
}

/// Renders diagnostics from a sink to stderr using the terminal renderer.
///
/// With `--quiet` only errors are rendered. Returns the number rendered.
pub fn render_diagnostics(
    sink: &DiagnosticSink,
    source_db: &SourceDb,
    global: &GlobalArgs,
) -> usize {
    let renderer = TerminalRenderer::new(global.color, 80);
    let mut rendered = 0;
    for diag in sink.diagnostics() {
        if global.quiet && !diag.severity.is_error() {
            continue;
        }
        eprintln!("{}", renderer.render(&diag, source_db));
        rendered += 1;
    }
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const CONFIG: &str = r#"
[design]
name = "top"
library = "lib/cells.lib"
netlist = "top.v"

[constraints]
timing = "timing.json"
clock_skew = "skew.json"
"#;

    fn global(config: Option<&Path>) -> GlobalArgs {
        GlobalArgs {
            quiet: false,
            verbose: 0,
            color: false,
            config: config.map(|p| p.display().to_string()),
        }
    }

    // -- find_project_root tests --

    #[test]
    fn find_project_root_in_current_dir() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("kairos.toml"), CONFIG).unwrap();
        let root = find_project_root(tmp.path()).unwrap();
        assert_eq!(root, tmp.path());
    }

    #[test]
    fn find_project_root_in_parent() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("kairos.toml"), CONFIG).unwrap();
        let sub = tmp.path().join("build").join("netlists");
        fs::create_dir_all(&sub).unwrap();
        let root = find_project_root(&sub).unwrap();
        assert_eq!(root, tmp.path());
    }

    #[test]
    fn find_project_root_not_found() {
        let tmp = TempDir::new().unwrap();
        let result = find_project_root(tmp.path());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("could not find kairos.toml"));
    }

    #[test]
    fn resolve_project_root_from_config_file() {
        let tmp = TempDir::new().unwrap();
        let config = tmp.path().join("kairos.toml");
        fs::write(&config, CONFIG).unwrap();
        let root = resolve_project_root(&global(Some(&config))).unwrap();
        assert_eq!(root, tmp.path());
        let root = resolve_project_root(&global(Some(tmp.path()))).unwrap();
        assert_eq!(root, tmp.path());
    }

    // -- Inputs tests --

    #[test]
    fn explicit_inputs_need_no_project() {
        let global = global(None);
        let mut inputs = Inputs::new(&global);
        let library = inputs
            .required(Some("cells.lib"), |c| c.design.library.as_str())
            .unwrap();
        assert_eq!(library, PathBuf::from("cells.lib"));
        let skew = inputs
            .optional(None, |c| c.constraints.clock_skew.as_deref())
            .unwrap();
        assert!(skew.is_none());
        assert!(inputs.loaded().unwrap().is_none());
    }

    #[test]
    fn missing_inputs_come_from_config() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("kairos.toml"), CONFIG).unwrap();
        let global = global(Some(tmp.path()));
        let mut inputs = Inputs::new(&global);

        let library = inputs.required(None, |c| c.design.library.as_str()).unwrap();
        assert_eq!(library, tmp.path().join("lib/cells.lib"));
        let netlist = inputs
            .required(Some("other.v"), |c| c.design.netlist.as_str())
            .unwrap();
        assert_eq!(netlist, PathBuf::from("other.v"));
        let skew = inputs
            .optional(None, |c| c.constraints.clock_skew.as_deref())
            .unwrap();
        assert_eq!(skew, Some(tmp.path().join("skew.json")));
        let caps = inputs
            .optional(None, |c| c.constraints.net_capacitance.as_deref())
            .unwrap();
        assert!(caps.is_none());
    }

    #[test]
    fn invalid_config_is_an_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("kairos.toml"), "[design]\nname = 1\n").unwrap();
        let global = global(Some(tmp.path()));
        let mut inputs = Inputs::new(&global);
        assert!(inputs.required(None, |c| c.design.library.as_str()).is_err());
    }

    // -- loading tests --

    #[test]
    fn load_library_reports_unreadable_file() {
        let tmp = TempDir::new().unwrap();
        let mut source_db = SourceDb::new();
        let sink = DiagnosticSink::new();
        let err = load_library(&tmp.path().join("missing.lib"), &mut source_db, &sink)
            .err()
            .unwrap();
        assert!(err.to_string().starts_with("cannot read"));
    }

    #[test]
    fn load_design_from_files() {
        let tmp = TempDir::new().unwrap();
        let lib = tmp.path().join("cells.lib");
        let net = tmp.path().join("top.v");
        let skew = tmp.path().join("skew.json");
        fs::write(&lib, include_str!("../tests/data/cells.lib")).unwrap();
        fs::write(&net, include_str!("../tests/data/top.v")).unwrap();
        fs::write(&skew, r#"{"r0": 0.25}"#).unwrap();

        let mut source_db = SourceDb::new();
        let interner = Interner::new();
        let sink = DiagnosticSink::new();
        let library = load_library(&lib, &mut source_db, &sink).unwrap();
        let annotations = load_annotations(None, Some(&skew), &mut source_db).unwrap();
        assert_eq!(annotations.clock_skew.get("r0"), Some(&0.25));
        let netlist = load_netlist(
            &net,
            &library,
            &annotations,
            &mut source_db,
            &interner,
            &sink,
        )
        .unwrap();
        assert_eq!(netlist.module_name, "top");
        assert_eq!(source_db.len(), 3);
        assert!(!sink.has_errors());
        assert_eq!(render_diagnostics(&sink, &source_db, &global(None)), 0);
    }

    #[test]
    fn bad_annotations_are_fatal() {
        let tmp = TempDir::new().unwrap();
        let caps = tmp.path().join("caps.json");
        fs::write(&caps, "[1, 2]").unwrap();
        let mut source_db = SourceDb::new();
        assert!(load_annotations(Some(&caps), None, &mut source_db).is_err());
    }
}
