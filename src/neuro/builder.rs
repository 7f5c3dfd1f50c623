use thiserror::Error;
use tracing::{debug, info, warn};

use crate::morphology::{LoadOptions, MorphologyError, MorphologyLoader, Offset};
use crate::neuro::{
    mechanism::ParameterError,
    model::Model,
    region::Region,
    section::{Attachment, Section, SectionId},
};
use crate::template::{CellTemplate, TemplateError, validate_template};

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("failed to load morphology")]
    Morphology(#[from] MorphologyError),
    #[error("section {section} is attached to section id {parent}, which does not precede it")]
    BrokenTopology { section: String, parent: SectionId },
    #[error("stub node {node} attaches to unknown section '{parent}'")]
    UnknownSection { node: usize, parent: String },
    #[error("cannot set {name} on {section}")]
    Parameter {
        section: String,
        name: String,
        #[source]
        source: ParameterError,
    },
}

/// Turns a morphology plus a [`CellTemplate`] into a ready-to-simulate [`Model`].
#[derive(Clone, Debug, Default)]
pub struct ModelBuilder {
    template: CellTemplate,
}

impl ModelBuilder {
    pub fn new(template: CellTemplate) -> Result<Self, TemplateError> {
        validate_template(&template)?;
        Ok(ModelBuilder { template })
    }

    pub fn template(&self) -> &CellTemplate {
        &self.template
    }

    pub fn build<L: MorphologyLoader + ?Sized>(
        &self,
        loader: &L,
        name: Option<&str>,
        offset: Offset,
    ) -> Result<Model, BuildError> {
        let mut model = self.load_geometry(loader, name, offset)?;
        self.attach_stub(&mut model)?;
        self.insert_mechanisms(&mut model);
        self.discretize(&mut model);
        self.assign_parameters(&mut model)?;

        info!(
            model = %model,
            sections = model.sections().len(),
            nseg = model.sections().iter().map(|s| s.nseg).sum::<usize>(),
            "model built"
        );

        Ok(model)
    }

    fn load_geometry<L: MorphologyLoader + ?Sized>(
        &self,
        loader: &L,
        name: Option<&str>,
        offset: Offset,
    ) -> Result<Model, BuildError> {
        let morphology = loader.load(&LoadOptions {
            use_axon: false,
            offset,
        })?;

        for (id, section) in morphology.sections.iter().enumerate() {
            if let Some(attachment) = section.parent.filter(|a| a.parent >= id) {
                return Err(BuildError::BrokenTopology {
                    section: section.name.clone(),
                    parent: attachment.parent,
                });
            }
        }

        let mut model = Model::new(
            name.map(str::to_string),
            self.template.placeholder.clone(),
            offset,
            morphology.sections,
        );

        let dropped = model.remove_region(Region::Axon);
        if dropped > 0 {
            warn!(dropped, "loader returned axon geometry, replacing it with the stub");
        }

        debug!(sections = model.sections().len(), "geometry loaded");
        Ok(model)
    }

    fn attach_stub(&self, model: &mut Model) -> Result<(), BuildError> {
        for (node_index, node) in self.template.axon_stub.iter().enumerate() {
            let parent = model
                .section_id(&node.parent)
                .ok_or_else(|| BuildError::UnknownSection {
                    node: node_index,
                    parent: node.parent.clone(),
                })?;

            let mut section = Section::new(Region::Axon, 0, node.length, node.diam);
            section.nseg = node.nseg;
            section.parent = Some(Attachment {
                parent,
                position: node.position,
            });
            let id = model.push_section(section);

            debug!(
                section = %model.sections()[id].name,
                parent = %node.parent,
                position = node.position,
                "stub section attached"
            );
        }
        Ok(())
    }

    fn insert_mechanisms(&self, model: &mut Model) {
        for group in &self.template.mechanisms {
            for section in model
                .sections_mut()
                .iter_mut()
                .filter(|s| group.section.matches(s.region))
            {
                for kind in &group.names {
                    if !section.insert(*kind) {
                        debug!(section = %section.name, mechanism = %kind, "already inserted");
                    }
                }
            }
        }
    }

    fn discretize(&self, model: &mut Model) {
        for section in model.sections_mut() {
            section.discretize(self.template.segment_length);
        }
    }

    fn assign_parameters(&self, model: &mut Model) -> Result<(), BuildError> {
        for group in &self.template.parameters {
            for section in model
                .sections_mut()
                .iter_mut()
                .filter(|s| group.section.matches(s.region))
            {
                for (name, value) in &group.values {
                    section
                        .set(name, *value)
                        .map_err(|source| BuildError::Parameter {
                            section: section.name.clone(),
                            name: name.clone(),
                            source,
                        })?;
                }
            }
        }
        Ok(())
    }
}

impl Model {
    /// Builds the default cell from an SWC file.
    pub fn from_swc(
        path: impl Into<std::path::PathBuf>,
        name: Option<&str>,
        offset: Offset,
    ) -> Result<Model, BuildError> {
        ModelBuilder::default().build(&crate::morphology::SwcLoader::from_path(path), name, offset)
    }
}
