//! SWC reconstruction reader.
//!
//! Each sample line is `id type x y z radius parent`. Soma samples collapse
//! into `soma[0]`; every other run of samples between branch points (or
//! changes of structure type) becomes one section.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use tracing::debug;

use crate::morphology::{LoadOptions, Morphology, MorphologyError, MorphologyLoader, Offset};
use crate::neuro::{
    region::Region,
    section::{Attachment, Point3, Section, SectionId},
};

/// Position on the soma where its direct children attach.
pub const SOMA_ATTACH_POSITION: f64 = 0.5;

#[derive(Clone, Debug)]
enum SwcSource {
    File(PathBuf),
    Text(String),
}

#[derive(Clone, Debug)]
pub struct SwcLoader {
    source: SwcSource,
}

impl SwcLoader {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        SwcLoader {
            source: SwcSource::File(path.into()),
        }
    }

    pub fn from_text(text: impl Into<String>) -> Self {
        SwcLoader {
            source: SwcSource::Text(text.into()),
        }
    }

    fn read(&self) -> Result<Cow<'_, str>, MorphologyError> {
        match &self.source {
            SwcSource::File(path) => fs::read_to_string(path)
                .map(Cow::Owned)
                .map_err(|source| MorphologyError::Io {
                    path: path.clone(),
                    source,
                }),
            SwcSource::Text(text) => Ok(Cow::Borrowed(text)),
        }
    }
}

impl MorphologyLoader for SwcLoader {
    fn load(&self, options: &LoadOptions) -> Result<Morphology, MorphologyError> {
        let text = self.read()?;
        let samples = parse(&text)?;
        let morphology = assemble(&samples, options)?;

        debug!(
            samples = samples.len(),
            sections = morphology.sections.len(),
            use_axon = options.use_axon,
            "loaded swc morphology"
        );

        Ok(morphology)
    }
}

#[derive(Clone, Copy, Debug)]
struct Sample {
    kind: i32,
    point: Point3,
    parent: Option<usize>,
}

fn field<T: FromStr>(raw: &str, what: &str, line: usize) -> Result<T, MorphologyError> {
    raw.parse().map_err(|_| MorphologyError::Parse {
        line,
        reason: format!("invalid {what} '{raw}'"),
    })
}

fn parse(text: &str) -> Result<Vec<Sample>, MorphologyError> {
    let mut samples = Vec::new();
    let mut index_of: HashMap<i64, usize> = HashMap::new();

    for (n, raw) in text.lines().enumerate() {
        let line = n + 1;
        let content = raw.split('#').next().unwrap_or_default().trim();
        if content.is_empty() {
            continue;
        }

        let fields: Vec<&str> = content.split_whitespace().collect();
        if fields.len() < 7 {
            return Err(MorphologyError::Parse {
                line,
                reason: format!("expected 7 fields, found {}", fields.len()),
            });
        }

        let id: i64 = field(fields[0], "sample id", line)?;
        let kind: i32 = field(fields[1], "structure type", line)?;
        let x: f64 = field(fields[2], "x", line)?;
        let y: f64 = field(fields[3], "y", line)?;
        let z: f64 = field(fields[4], "z", line)?;
        let radius: f64 = field(fields[5], "radius", line)?;
        let parent_id: i64 = field(fields[6], "parent id", line)?;

        if ![x, y, z, radius].iter().all(|v| v.is_finite()) || radius < 0.0 {
            return Err(MorphologyError::Parse {
                line,
                reason: "coordinates must be finite and radius non-negative".to_string(),
            });
        }
        if index_of.contains_key(&id) {
            return Err(MorphologyError::DuplicateId { line, id });
        }

        let parent = if parent_id < 0 {
            None
        } else {
            Some(
                *index_of
                    .get(&parent_id)
                    .ok_or(MorphologyError::UnknownParent {
                        line,
                        id,
                        parent: parent_id,
                    })?,
            )
        };

        index_of.insert(id, samples.len());
        samples.push(Sample {
            kind,
            point: Point3 {
                x,
                y,
                z,
                diam: 2.0 * radius,
            },
            parent,
        });
    }

    Ok(samples)
}

fn shifted(point: Point3, offset: Offset) -> Point3 {
    Point3 {
        x: point.x + offset.x,
        y: point.y + offset.y,
        z: point.z + offset.z,
        diam: point.diam,
    }
}

struct Pending {
    region: Region,
    points: Vec<Point3>,
    parent: Attachment,
}

fn assemble(samples: &[Sample], options: &LoadOptions) -> Result<Morphology, MorphologyError> {
    // None marks a dropped sample; descendants of dropped samples are dropped too.
    let mut regions: Vec<Option<Region>> = Vec::with_capacity(samples.len());
    for sample in samples {
        let parent_kept = sample.parent.is_none_or(|p| regions[p].is_some());
        let region = Region::from_swc_type(sample.kind).unwrap_or_else(|| {
            debug!(kind = sample.kind, "custom swc type treated as basal dendrite");
            Region::Dend
        });
        let keep = parent_kept && (options.use_axon || region != Region::Axon);
        regions.push(keep.then_some(region));
    }

    let soma_points: Vec<Point3> = samples
        .iter()
        .zip(&regions)
        .filter(|(_, region)| **region == Some(Region::Soma))
        .map(|(sample, _)| shifted(sample.point, options.offset))
        .collect();

    let soma = match soma_points.len() {
        0 => return Err(MorphologyError::MissingSoma),
        // A lone soma sample is a sphere: model it as a cylinder with equal
        // length and diameter, which has the same membrane area.
        1 => {
            let diam = soma_points[0].diam;
            let mut soma = Section::new(Region::Soma, 0, diam, diam);
            soma.points = soma_points;
            soma
        }
        // Walk the soma along its tree edges rather than in file order: the
        // three-point convention (centre, -r, +r) then spans 2r.
        count => {
            let length = samples
                .iter()
                .zip(&regions)
                .filter(|(_, region)| **region == Some(Region::Soma))
                .filter_map(|(sample, _)| {
                    let parent = sample.parent?;
                    (regions[parent] == Some(Region::Soma))
                        .then(|| sample.point.distance(&samples[parent].point))
                })
                .sum();
            let diam = soma_points.iter().map(|p| p.diam).sum::<f64>() / count as f64;
            let mut soma = Section::new(Region::Soma, 0, length, diam);
            soma.points = soma_points;
            soma
        }
    };

    let mut children = vec![0usize; samples.len()];
    for (sample, region) in samples.iter().zip(&regions) {
        if let (Some(_), Some(parent)) = (region, sample.parent) {
            children[parent] += 1;
        }
    }

    // Section ids: 0 is the soma, pending[i] becomes id i + 1.
    let mut pending: Vec<Pending> = Vec::new();
    let mut owner: Vec<Option<SectionId>> = vec![None; samples.len()];

    for (i, sample) in samples.iter().enumerate() {
        let Some(region) = regions[i] else { continue };
        if region == Region::Soma {
            owner[i] = Some(0);
            continue;
        }

        let point = shifted(sample.point, options.offset);
        let parent = sample
            .parent
            .filter(|&p| regions[p] != Some(Region::Soma))
            .and_then(|p| owner[p].map(|section| (p, section)));

        match parent {
            Some((p, section)) if children[p] == 1 && regions[p] == Some(region) => {
                pending[section - 1].points.push(point);
                owner[i] = Some(section);
            }
            Some((p, section)) => {
                pending.push(Pending {
                    region,
                    points: vec![shifted(samples[p].point, options.offset), point],
                    parent: Attachment {
                        parent: section,
                        position: 1.0,
                    },
                });
                owner[i] = Some(pending.len());
            }
            None => {
                if sample.parent.is_none() {
                    debug!(?region, "root sample outside the soma attached to soma");
                }
                pending.push(Pending {
                    region,
                    points: vec![point],
                    parent: Attachment {
                        parent: 0,
                        position: SOMA_ATTACH_POSITION,
                    },
                });
                owner[i] = Some(pending.len());
            }
        }
    }

    let mut counts: HashMap<Region, usize> = HashMap::from([(Region::Soma, 1)]);
    let mut sections = vec![soma];
    for item in pending {
        let index = counts.entry(item.region).or_insert(0);
        let mut section = Section::from_points(item.region, *index, item.points);
        section.parent = Some(item.parent);
        sections.push(section);
        *index += 1;
    }

    Ok(Morphology { sections })
}
