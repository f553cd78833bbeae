//! Fixtures shared by the unit tests.

use kairos_common::Interner;
use kairos_diagnostics::{DiagnosticCode, DiagnosticSink};
use kairos_liberty::{parse_library, Library};
use kairos_netlist::{parse_netlist, Annotations, CellId, InstanceTiming, Netlist};
use kairos_source::FileId;

/// BUFX1/BUFX2 (load-dependent delay), NAND2X1 and DFFX1.
pub(crate) const CELLS: &str = include_str!("../tests/data/cells.lib");

pub(crate) struct Design {
    pub library: Library,
    pub netlist: Netlist,
    pub interner: Interner,
    pub sink: DiagnosticSink,
}

impl Design {
    pub fn new(verilog: &str) -> Self {
        Self::with_annotations(verilog, &Annotations::default())
    }

    pub fn with_annotations(verilog: &str, annotations: &Annotations) -> Self {
        let sink = DiagnosticSink::new();
        let library = parse_library(CELLS, FileId::from_raw(0), &sink).unwrap();
        let interner = Interner::new();
        let netlist = parse_netlist(
            verilog,
            FileId::from_raw(1),
            &library,
            annotations,
            &interner,
            &sink,
        )
        .unwrap();
        Self {
            library,
            netlist,
            interner,
            sink,
        }
    }

    pub fn cell(&self, name: &str) -> CellId {
        let ident = self.interner.get(name).unwrap();
        self.netlist.find_cell(ident).unwrap()
    }

    pub fn timing(&self, name: &str) -> &InstanceTiming {
        &self.netlist.cell(self.cell(name)).timing
    }

    pub fn has(&self, code: DiagnosticCode) -> bool {
        self.sink.any(|d| d.code == code)
    }
}

pub(crate) fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}
