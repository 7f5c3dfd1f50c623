use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ion {
    Na,
    K,
    Ca,
}

impl Ion {
    pub const ALL: [Ion; 3] = [Ion::Na, Ion::K, Ion::Ca];

    /// Name of the reversal potential parameter, e.g. `ena`.
    pub fn reversal_name(self) -> &'static str {
        match self {
            Ion::Na => "ena",
            Ion::K => "ek",
            Ion::Ca => "eca",
        }
    }

    /// Reversal potential (mV) a section starts with once the ion is in use.
    pub fn default_reversal(self) -> f64 {
        match self {
            Ion::Na => 50.0,
            Ion::K => -77.0,
            Ion::Ca => 132.457_934_163_700_9,
        }
    }
}

/// Membrane mechanisms known to the model builder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum MechanismKind {
    Pas,
    CaDynamics,
    CaHva,
    CaLva,
    Ih,
    ImV2,
    KT,
    Kd,
    Kv2like,
    Kv31,
    NaV,
    SK,
}

const GBAR: &[(&str, f64)] = &[("gbar", 0.00001)];

impl MechanismKind {
    pub const CATALOG: [MechanismKind; 12] = [
        MechanismKind::Pas,
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
    ];

    pub fn name(self) -> &'static str {
        match self {
            MechanismKind::Pas => "pas",
            MechanismKind::CaDynamics => "CaDynamics",
            MechanismKind::CaHva => "Ca_HVA",
            MechanismKind::CaLva => "Ca_LVA",
            MechanismKind::Ih => "Ih",
            MechanismKind::ImV2 => "Im_v2",
            MechanismKind::KT => "K_T",
            MechanismKind::Kd => "Kd",
            MechanismKind::Kv2like => "Kv2like",
            MechanismKind::Kv31 => "Kv3_1",
            MechanismKind::NaV => "NaV",
            MechanismKind::SK => "SK",
        }
    }

    /// Declared range parameters with the values a fresh insertion gets.
    pub fn parameters(self) -> &'static [(&'static str, f64)] {
        match self {
            MechanismKind::Pas => &[("g", 0.001), ("e", -70.0)],
            MechanismKind::CaDynamics => &[
                ("gamma", 0.05),
                ("decay", 80.0),
                ("depth", 0.1),
                ("minCai", 1e-4),
            ],
            MechanismKind::Ih => &[("gbar", 0.00001), ("ehcn", -45.0)],
            _ => GBAR,
        }
    }

    pub fn ions(self) -> &'static [Ion] {
        match self {
            MechanismKind::Pas | MechanismKind::Ih => &[],
            MechanismKind::CaDynamics | MechanismKind::CaHva | MechanismKind::CaLva => &[Ion::Ca],
            MechanismKind::ImV2
            | MechanismKind::KT
            | MechanismKind::Kd
            | MechanismKind::Kv2like
            | MechanismKind::Kv31 => &[Ion::K],
            MechanismKind::NaV => &[Ion::Na],
            MechanismKind::SK => &[Ion::K, Ion::Ca],
        }
    }

    fn declared(self, parameter: &str) -> Option<&'static str> {
        self.parameters()
            .iter()
            .map(|(name, _)| *name)
            .find(|name| *name == parameter)
    }
}

impl fmt::Display for MechanismKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MechanismKind {
    type Err = ParameterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MechanismKind::CATALOG
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| ParameterError::UnknownMechanism(s.to_string()))
    }
}

impl TryFrom<String> for MechanismKind {
    type Error = ParameterError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MechanismKind> for String {
    fn from(kind: MechanismKind) -> Self {
        kind.name().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParameterError {
    #[error("unknown mechanism '{0}'")]
    UnknownMechanism(String),
    #[error("unknown parameter '{0}'")]
    UnknownParameter(String),
    #[error("mechanism {mechanism} declares no parameter '{parameter}'")]
    Undeclared {
        mechanism: MechanismKind,
        parameter: String,
    },
    #[error("mechanism {0} is not inserted")]
    NotInserted(MechanismKind),
    #[error("no inserted mechanism uses ion {ion:?}, cannot set {name}")]
    IonNotInUse { ion: Ion, name: &'static str },
    #[error("value {value} for '{name}' is not finite")]
    NotFinite { name: String, value: f64 },
}

/// A parameter name resolved against the mechanism catalog.
///
/// Names follow the `<parameter>_<mechanism>` convention (`gbar_NaV`,
/// `e_pas`); `Ra` and `cm` belong to the section itself and `ena`, `ek`,
/// `eca` are ion reversal potentials.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParameterName {
    Axial,
    Capacitance,
    Reversal(Ion),
    Range {
        mechanism: MechanismKind,
        parameter: &'static str,
    },
}

impl ParameterName {
    pub fn parse(name: &str) -> Result<Self, ParameterError> {
        match name {
            "Ra" => return Ok(ParameterName::Axial),
            "cm" => return Ok(ParameterName::Capacitance),
            _ => {}
        }
        if let Some(ion) = Ion::ALL.into_iter().find(|ion| ion.reversal_name() == name) {
            return Ok(ParameterName::Reversal(ion));
        }

        // Mechanism names may contain underscores themselves (K_T, Kv3_1),
        // so prefer the longest suffix match.
        let mechanism = MechanismKind::CATALOG
            .into_iter()
            .filter(|kind| {
                name.len() > kind.name().len() + 1
                    && name.ends_with(kind.name())
                    && name.as_bytes()[name.len() - kind.name().len() - 1] == b'_'
            })
            .max_by_key(|kind| kind.name().len())
            .ok_or_else(|| ParameterError::UnknownParameter(name.to_string()))?;

        let prefix = &name[..name.len() - mechanism.name().len() - 1];
        let parameter = mechanism
            .declared(prefix)
            .ok_or_else(|| ParameterError::Undeclared {
                mechanism,
                parameter: prefix.to_string(),
            })?;

        Ok(ParameterName::Range {
            mechanism,
            parameter,
        })
    }
}

/// One mechanism inserted into one section, with its current parameter values.
#[derive(Clone, Debug, PartialEq)]
pub struct MechanismInstance {
    pub kind: MechanismKind,
    values: BTreeMap<&'static str, f64>,
}

impl MechanismInstance {
    pub fn new(kind: MechanismKind) -> Self {
        Self {
            kind,
            values: kind.parameters().iter().copied().collect(),
        }
    }

    pub fn get(&self, parameter: &str) -> Option<f64> {
        self.values.get(parameter).copied()
    }

    pub(crate) fn set(&mut self, parameter: &'static str, value: f64) {
        self.values.insert(parameter, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_mechanism_names_with_underscores() {
        assert_eq!(
            ParameterName::parse("gbar_K_T").unwrap(),
            ParameterName::Range {
                mechanism: MechanismKind::KT,
                parameter: "gbar"
            }
        );
        assert_eq!(
            ParameterName::parse("gbar_Kv3_1").unwrap(),
            ParameterName::Range {
                mechanism: MechanismKind::Kv31,
                parameter: "gbar"
            }
        );
        assert_eq!(
            ParameterName::parse("decay_CaDynamics").unwrap(),
            ParameterName::Range {
                mechanism: MechanismKind::CaDynamics,
                parameter: "decay"
            }
        );
    }

    #[test]
    fn resolves_section_and_ion_parameters() {
        assert_eq!(ParameterName::parse("Ra").unwrap(), ParameterName::Axial);
        assert_eq!(ParameterName::parse("cm").unwrap(), ParameterName::Capacitance);
        assert_eq!(
            ParameterName::parse("ek").unwrap(),
            ParameterName::Reversal(Ion::K)
        );
    }

    #[test]
    fn rejects_unknown_names() {
        assert!(matches!(
            ParameterName::parse("gbar_Nav2"),
            Err(ParameterError::UnknownParameter(_))
        ));
        assert!(matches!(
            ParameterName::parse("tau_NaV"),
            Err(ParameterError::Undeclared { .. })
        ));
        assert!(matches!(
            ParameterName::parse("_pas"),
            Err(ParameterError::UnknownParameter(_))
        ));
    }

    #[test]
    fn mechanism_names_round_trip_through_catalog() {
        for kind in MechanismKind::CATALOG {
            assert_eq!(kind.name().parse::<MechanismKind>().unwrap(), kind);
        }
        assert!("hh".parse::<MechanismKind>().is_err());
    }

    #[test]
    fn fresh_instance_has_declared_defaults() {
        let pas = MechanismInstance::new(MechanismKind::Pas);
        assert_eq!(pas.get("g"), Some(0.001));
        assert_eq!(pas.get("e"), Some(-70.0));
        assert_eq!(pas.get("gbar"), None);
    }
}
