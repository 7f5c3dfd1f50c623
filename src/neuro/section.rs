use std::collections::BTreeMap;

use serde::Serialize;

use crate::neuro::{
    mechanism::{Ion, MechanismInstance, MechanismKind, ParameterError, ParameterName},
    region::Region,
};

pub type SectionId = usize;

/// Axial resistivity (ohm cm) of a section nobody has parameterized yet.
pub const DEFAULT_RA: f64 = 35.4;
/// Specific membrane capacitance (uF/cm2) of a fresh section.
pub const DEFAULT_CM: f64 = 1.0;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub diam: f64,
}

impl Point3 {
    pub fn distance(&self, other: &Point3) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// Where the proximal (0) end of a section sits on its parent.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Attachment {
    pub parent: SectionId,
    pub position: f64,
}

/// An unbranched cylindrical cable.
#[derive(Clone, Debug, PartialEq)]
pub struct Section {
    pub name: String,
    pub region: Region,
    pub index: usize,
    pub points: Vec<Point3>,
    /// Length in um.
    pub length: f64,
    /// Diameter in um.
    pub diam: f64,
    pub nseg: usize,
    pub ra: f64,
    pub cm: f64,
    pub parent: Option<Attachment>,
    mechanisms: Vec<MechanismInstance>,
    reversals: BTreeMap<Ion, f64>,
}

impl Section {
    pub fn new(region: Region, index: usize, length: f64, diam: f64) -> Self {
        Section {
            name: format!("{region}[{index}]"),
            region,
            index,
            points: Vec::new(),
            length,
            diam,
            nseg: 1,
            ra: DEFAULT_RA,
            cm: DEFAULT_CM,
            parent: None,
            mechanisms: Vec::new(),
            reversals: BTreeMap::new(),
        }
    }

    /// Builds a section whose length is the 3-D path length through `points`
    /// and whose diameter is the mean point diameter.
    pub fn from_points(region: Region, index: usize, points: Vec<Point3>) -> Self {
        let length = points.windows(2).map(|w| w[0].distance(&w[1])).sum();
        let diam = if points.is_empty() {
            0.0
        } else {
            points.iter().map(|p| p.diam).sum::<f64>() / points.len() as f64
        };

        let mut section = Section::new(region, index, length, diam);
        section.points = points;
        section
    }

    pub(crate) fn relabel(&mut self, index: usize) {
        self.index = index;
        self.name = format!("{}[{index}]", self.region);
    }

    /// Inserts a mechanism. Returns `false` and leaves the section untouched
    /// if the mechanism is already present.
    pub fn insert(&mut self, kind: MechanismKind) -> bool {
        if self.has_mechanism(kind) {
            return false;
        }
        for ion in kind.ions() {
            self.reversals
                .entry(*ion)
                .or_insert_with(|| ion.default_reversal());
        }
        self.mechanisms.push(MechanismInstance::new(kind));
        true
    }

    pub fn has_mechanism(&self, kind: MechanismKind) -> bool {
        self.mechanisms.iter().any(|m| m.kind == kind)
    }

    pub fn mechanism(&self, kind: MechanismKind) -> Option<&MechanismInstance> {
        self.mechanisms.iter().find(|m| m.kind == kind)
    }

    /// Inserted mechanisms in insertion order.
    pub fn mechanisms(&self) -> &[MechanismInstance] {
        &self.mechanisms
    }

    pub fn uses_ion(&self, ion: Ion) -> bool {
        self.reversals.contains_key(&ion)
    }

    pub fn reversal(&self, ion: Ion) -> Option<f64> {
        self.reversals.get(&ion).copied()
    }

    /// Reads a parameter by its conventional name (`Ra`, `cm`, `ek`, `gbar_NaV`).
    pub fn get(&self, name: &str) -> Option<f64> {
        match ParameterName::parse(name).ok()? {
            ParameterName::Axial => Some(self.ra),
            ParameterName::Capacitance => Some(self.cm),
            ParameterName::Reversal(ion) => self.reversal(ion),
            ParameterName::Range {
                mechanism,
                parameter,
            } => self.mechanism(mechanism)?.get(parameter),
        }
    }

    pub fn set(&mut self, name: &str, value: f64) -> Result<(), ParameterError> {
        if !value.is_finite() {
            return Err(ParameterError::NotFinite {
                name: name.to_string(),
                value,
            });
        }

        match ParameterName::parse(name)? {
            ParameterName::Axial => self.ra = value,
            ParameterName::Capacitance => self.cm = value,
            ParameterName::Reversal(ion) => {
                let slot = self
                    .reversals
                    .get_mut(&ion)
                    .ok_or(ParameterError::IonNotInUse {
                        ion,
                        name: ion.reversal_name(),
                    })?;
                *slot = value;
            }
            ParameterName::Range {
                mechanism,
                parameter,
            } => {
                self.mechanisms
                    .iter_mut()
                    .find(|m| m.kind == mechanism)
                    .ok_or(ParameterError::NotInserted(mechanism))?
                    .set(parameter, value);
            }
        }

        Ok(())
    }

    /// Odd segment count growing by two for every `segment_length` um.
    pub fn discretize(&mut self, segment_length: f64) {
        self.nseg = 1 + 2 * (self.length / segment_length).floor() as usize;
    }
}
