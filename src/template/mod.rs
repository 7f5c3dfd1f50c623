//! Cell template: everything about a model that is calibration data rather
//! than construction logic.
//!
//! The built-in template reproduces Allen Cell Types model 472430904. Other
//! parameter sets are loaded from JSON with [`CellTemplate::from_path`].

mod validation;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::neuro::{mechanism::MechanismKind, region::Selector};

pub use validation::validate_template;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("failed to read template {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed template: {0}")]
    Json(#[from] serde_json::Error),
    #[error("template validation failed:\n{0}")]
    Invalid(String),
}

/// One synthetic section of the axon stub.
///
/// `parent` names an existing section (`soma[0]`) or an earlier stub node
/// (`axon[0]`); the node's proximal end is attached at `position` on it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StubNode {
    pub length: f64,
    pub diam: f64,
    #[serde(default = "default_nseg")]
    pub nseg: usize,
    pub parent: String,
    pub position: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InsertGroup {
    pub section: Selector,
    pub names: Vec<MechanismKind>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParameterGroup {
    pub section: Selector,
    pub values: BTreeMap<String, f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CellTemplate {
    /// Name a model gets when the caller does not pick one.
    pub default_name: String,
    /// Printed for a model built without any name.
    pub placeholder: String,
    /// Reconstruction the parameters were fitted against.
    #[serde(default)]
    pub morphology: Option<PathBuf>,
    /// Length (um) per additional pair of segments.
    #[serde(default = "default_segment_length")]
    pub segment_length: f64,
    pub axon_stub: Vec<StubNode>,
    /// Applied in order.
    pub mechanisms: Vec<InsertGroup>,
    /// Applied in order; later groups override earlier ones.
    pub parameters: Vec<ParameterGroup>,
}

fn default_nseg() -> usize {
    1
}

fn default_segment_length() -> f64 {
    40.0
}

fn values<const N: usize>(pairs: [(&str, f64); N]) -> BTreeMap<String, f64> {
    pairs
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect()
}

impl Default for CellTemplate {
    fn default() -> Self {
        CellTemplate {
            default_name: "Neuron472430904".to_string(),
            placeholder: "Neuron472430904_instance".to_string(),
            morphology: Some(PathBuf::from(
                "Ntsr1-Cre_Ai14_GSL_-181184.05.01.01_475124527_m.swc",
            )),
            segment_length: default_segment_length(),
            axon_stub: vec![
                StubNode {
                    length: 30.0,
                    diam: 1.0,
                    nseg: 1,
                    parent: "soma[0]".to_string(),
                    position: 0.5,
                },
                StubNode {
                    length: 30.0,
                    diam: 1.0,
                    nseg: 1,
                    parent: "axon[0]".to_string(),
                    position: 1.0,
                },
            ],
            mechanisms: vec![
                InsertGroup {
                    section: Selector::All,
                    names: vec![MechanismKind::Pas],
                },
                InsertGroup {
                    section: Selector::Soma,
                    names: vec![
                        MechanismKind::CaDynamics,
                        MechanismKind::CaHva,
                        MechanismKind::CaLva,
                        MechanismKind::Ih,
                        MechanismKind::ImV2,
                        MechanismKind::KT,
                        MechanismKind::Kd,
                        MechanismKind::Kv2like,
                        MechanismKind::Kv31,
                        MechanismKind::NaV,
                        MechanismKind::SK,
                    ],
                },
            ],
            parameters: vec![
                ParameterGroup {
                    section: Selector::All,
                    values: values([("Ra", 10.0), ("e_pas", -85.2242126465)]),
                },
                ParameterGroup {
                    section: Selector::Apic,
                    values: values([("cm", 1.54), ("g_pas", 9.39768054181e-06)]),
                },
                ParameterGroup {
                    section: Selector::Axon,
                    values: values([("cm", 1.0), ("g_pas", 0.000760665712443)]),
                },
                ParameterGroup {
                    section: Selector::Dend,
                    values: values([("cm", 1.54), ("g_pas", 0.000518771779351)]),
                },
                ParameterGroup {
                    section: Selector::Soma,
                    values: values([
                        ("cm", 1.0),
                        ("ena", 53.0),
                        ("ek", -107.0),
                        ("gbar_Ih", 0.000810136),
                        ("gbar_NaV", 0.127905),
                        ("gbar_Kd", 0.000209484),
                        ("gbar_Kv2like", 0.0447338),
                        ("gbar_Kv3_1", 0.0700344),
                        ("gbar_K_T", 0.0352815),
                        ("gbar_Im_v2", 0.00410904),
                        ("gbar_SK", 0.00216579),
                        ("gbar_Ca_HVA", 0.000498632),
                        ("gbar_Ca_LVA", 0.000656711),
                        ("gamma_CaDynamics", 0.000659798),
                        ("decay_CaDynamics", 780.842),
                        ("g_pas", 6.20497e-05),
                    ]),
                },
            ],
        }
    }
}

impl CellTemplate {
    /// Parses and validates a JSON template.
    pub fn from_json(text: &str) -> Result<Self, TemplateError> {
        let template: CellTemplate = serde_json::from_str(text)?;
        validate_template(&template)?;
        Ok(template)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, TemplateError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| TemplateError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn to_json(&self) -> Result<String, TemplateError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
