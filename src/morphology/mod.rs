//! Morphology loading.
//!
//! A loader turns a reconstruction into a topologically ordered list of
//! sections: every parent precedes its children and section names are
//! `<region>[<index>]` with indices counted per region.

pub mod swc;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::neuro::section::Section;

pub use swc::SwcLoader;

/// Shift added to every coordinate at load time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Offset {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Offset {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Offset { x, y, z }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LoadOptions {
    /// Keep axon geometry from the source. The model builder always passes
    /// `false` and attaches its own axon.
    pub use_axon: bool,
    pub offset: Offset,
}

impl Default for LoadOptions {
    fn default() -> Self {
        LoadOptions {
            use_axon: true,
            offset: Offset::default(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Morphology {
    pub sections: Vec<Section>,
}

#[derive(Debug, Error)]
pub enum MorphologyError {
    #[error("failed to read morphology {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("line {line}: {reason}")]
    Parse { line: usize, reason: String },
    #[error("line {line}: sample {id} is defined twice")]
    DuplicateId { line: usize, id: i64 },
    #[error("line {line}: sample {id} refers to parent {parent} which is not defined before it")]
    UnknownParent { line: usize, id: i64, parent: i64 },
    #[error("morphology has no soma samples")]
    MissingSoma,
}

/// Source of cell geometry consumed by the model builder.
pub trait MorphologyLoader {
    fn load(&self, options: &LoadOptions) -> Result<Morphology, MorphologyError>;
}

impl<T: MorphologyLoader + ?Sized> MorphologyLoader for &T {
    fn load(&self, options: &LoadOptions) -> Result<Morphology, MorphologyError> {
        (**self).load(options)
    }
}
