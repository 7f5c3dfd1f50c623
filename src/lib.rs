//! Builds parameterized multi-compartment neuron models from morphology
//! reconstructions, ready to hand to a cable-equation simulator.

pub mod morphology;
pub mod neuro;
pub mod template;

pub use morphology::{LoadOptions, Morphology, MorphologyError, MorphologyLoader, Offset, SwcLoader};
pub use neuro::{
    builder::{BuildError, ModelBuilder},
    mechanism::{Ion, MechanismKind, ParameterError},
    model::{Model, ModelSummary},
    region::{Region, Selector},
    section::{Section, SectionId},
};
pub use template::{CellTemplate, TemplateError};
