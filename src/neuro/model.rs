use std::fmt;

use serde::Serialize;

use crate::morphology::Offset;
use crate::neuro::{
    region::{Region, Selector},
    section::{Section, SectionId},
};

/// A fully assembled compartmental cell.
#[derive(Clone, Debug, PartialEq)]
pub struct Model {
    name: Option<String>,
    placeholder: String,
    offset: Offset,
    sections: Vec<Section>,
}

impl Model {
    pub(crate) fn new(
        name: Option<String>,
        placeholder: String,
        offset: Offset,
        sections: Vec<Section>,
    ) -> Self {
        Model {
            name,
            placeholder,
            offset,
            sections,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn offset(&self) -> Offset {
        self.offset
    }

    /// Every section, parents before children.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub(crate) fn sections_mut(&mut self) -> &mut [Section] {
        &mut self.sections
    }

    pub fn section_by_id(&self, id: SectionId) -> Option<&Section> {
        self.sections.get(id)
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    pub fn section_id(&self, name: &str) -> Option<SectionId> {
        self.sections.iter().position(|s| s.name == name)
    }

    /// Sections selected by region tag, or all of them for [`Selector::All`].
    pub fn region(&self, selector: impl Into<Selector>) -> impl Iterator<Item = &Section> {
        let selector = selector.into();
        self.sections
            .iter()
            .filter(move |s| selector.matches(s.region))
    }

    pub fn parent_of(&self, id: SectionId) -> Option<&Section> {
        let attachment = self.sections.get(id)?.parent?;
        self.sections.get(attachment.parent)
    }

    /// Appends a section to its region, naming it after its position there.
    pub(crate) fn push_section(&mut self, mut section: Section) -> SectionId {
        let index = self.region(section.region).count();
        section.relabel(index);
        self.sections.push(section);
        self.sections.len() - 1
    }

    /// Drops every section tagged `region` together with everything attached
    /// below it, then renumbers the survivors. Returns how many were dropped.
    pub(crate) fn remove_region(&mut self, region: Region) -> usize {
        let mut new_id: Vec<Option<SectionId>> = Vec::with_capacity(self.sections.len());
        let mut next = 0;
        for section in &self.sections {
            let orphaned = section
                .parent
                .is_some_and(|attachment| new_id[attachment.parent].is_none());
            if section.region == region || orphaned {
                new_id.push(None);
            } else {
                new_id.push(Some(next));
                next += 1;
            }
        }

        let removed = self.sections.len() - next;
        if removed == 0 {
            return 0;
        }

        let old = std::mem::take(&mut self.sections);
        for (mut section, id) in old.into_iter().zip(&new_id) {
            if id.is_none() {
                continue;
            }
            if let Some(attachment) = section.parent.as_mut() {
                // Parents precede children, so a kept child has a kept parent.
                attachment.parent = new_id[attachment.parent].unwrap_or_default();
            }
            self.push_section(section);
        }

        removed
    }

    pub fn summary(&self) -> ModelSummary {
        let regions = Region::ALL
            .into_iter()
            .map(|region| {
                let mut mechanisms: Vec<String> = Vec::new();
                let mut summary = RegionSummary {
                    region,
                    sections: 0,
                    total_length: 0.0,
                    total_nseg: 0,
                    mechanisms: Vec::new(),
                };
                for section in self.region(region) {
                    summary.sections += 1;
                    summary.total_length += section.length;
                    summary.total_nseg += section.nseg;
                    for mechanism in section.mechanisms() {
                        let name = mechanism.kind.name().to_string();
                        if !mechanisms.contains(&name) {
                            mechanisms.push(name);
                        }
                    }
                }
                summary.mechanisms = mechanisms;
                summary
            })
            .collect();

        ModelSummary {
            name: self.to_string(),
            offset: self.offset,
            regions,
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => f.write_str(name),
            None => f.write_str(&self.placeholder),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RegionSummary {
    pub region: Region,
    pub sections: usize,
    pub total_length: f64,
    pub total_nseg: usize,
    pub mechanisms: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ModelSummary {
    pub name: String,
    pub offset: Offset,
    pub regions: Vec<RegionSummary>,
}
