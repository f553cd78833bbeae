//! Per-design numeric annotations: net capacitance and clock skew.
//!
//! Both come from JSON documents keyed by wire and instance names:
//!
//! ```json
//! { "n1": { "g2": 0.004, "g3": 0.002 } }
//! { "ff1": 0.05 }
//! ```

use crate::error::NetlistError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Net capacitance and clock skew keyed by name.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Annotations {
    /// `wire -> sink instance -> capacitance`.
    #[serde(default)]
    pub net_capacitance: BTreeMap<String, BTreeMap<String, f64>>,
    /// `flip-flop instance -> clock arrival offset`.
    #[serde(default)]
    pub clock_skew: BTreeMap<String, f64>,
}

impl Annotations {
    /// Builds annotations from the two optional JSON documents.
    pub fn from_json(
        net_capacitance: Option<&str>,
        clock_skew: Option<&str>,
    ) -> Result<Self, NetlistError> {
        let mut annotations = Annotations::default();
        if let Some(text) = net_capacitance {
            annotations.net_capacitance = parse_document(text, "net capacitance")?;
        }
        if let Some(text) = clock_skew {
            annotations.clock_skew = parse_document(text, "clock skew")?;
        }
        Ok(annotations)
    }

    /// Capacitance of `wire` as seen by `instance`; 0 if not annotated.
    pub fn net_capacitance_for(&self, wire: &str, instance: &str) -> f64 {
        self.net_capacitance
            .get(wire)
            .and_then(|sinks| sinks.get(instance))
            .copied()
            .unwrap_or(0.0)
    }
}

fn parse_document<T: serde::de::DeserializeOwned>(text: &str, what: &str) -> Result<T, NetlistError> {
    serde_json::from_str(text).map_err(|e| NetlistError::InvalidAnnotations(format!("{what}: {e}")))
}
