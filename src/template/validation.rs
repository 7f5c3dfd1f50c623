//! Template validation
//!
//! Checks that a template can be applied to any morphology that has a soma:
//! stub geometry is physical, stub parents exist before they are used, and
//! every parameter targets something the mechanism groups actually insert.

use std::fmt;

use crate::neuro::{
    mechanism::{MechanismKind, ParameterName},
    region::{Region, Selector},
};
use crate::template::{CellTemplate, TemplateError};

#[derive(Debug, Clone, PartialEq)]
pub enum TemplateIssue {
    InvalidValue { field: String, reason: String },
    UnresolvedParameter { section: Selector, name: String, reason: String },
    NotInserted { section: Selector, name: String, mechanism: MechanismKind },
}

impl fmt::Display for TemplateIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid value for {}: {}", field, reason)
            }
            Self::UnresolvedParameter {
                section,
                name,
                reason,
            } => write!(f, "Parameter {} on {}: {}", name, section, reason),
            Self::NotInserted {
                section,
                name,
                mechanism,
            } => write!(
                f,
                "Parameter {} on {} needs mechanism {} inserted on those sections",
                name, section, mechanism
            ),
        }
    }
}

/// Validate a complete template
///
/// # Errors
///
/// Returns `TemplateError::Invalid` listing every problem found.
pub fn validate_template(template: &CellTemplate) -> Result<(), TemplateError> {
    let mut issues = Vec::new();

    validate_names(template, &mut issues);
    validate_stub(template, &mut issues);
    validate_parameters(template, &mut issues);

    if !issues.is_empty() {
        let messages = issues
            .iter()
            .map(|issue| format!("  - {}", issue))
            .collect::<Vec<_>>()
            .join("\n");
        return Err(TemplateError::Invalid(messages));
    }

    Ok(())
}

fn invalid(field: impl Into<String>, reason: impl Into<String>) -> TemplateIssue {
    TemplateIssue::InvalidValue {
        field: field.into(),
        reason: reason.into(),
    }
}

fn validate_names(template: &CellTemplate, issues: &mut Vec<TemplateIssue>) {
    if template.placeholder.trim().is_empty() {
        issues.push(invalid("placeholder", "must not be empty"));
    }
    if !(template.segment_length.is_finite() && template.segment_length > 0.0) {
        issues.push(invalid(
            "segment_length",
            format!("{} is not a positive length", template.segment_length),
        ));
    }
}

fn validate_stub(template: &CellTemplate, issues: &mut Vec<TemplateIssue>) {
    for (i, node) in template.axon_stub.iter().enumerate() {
        let field = |name: &str| format!("axon_stub[{i}].{name}");

        if !(node.length.is_finite() && node.length > 0.0) {
            issues.push(invalid(field("length"), "must be a positive length"));
        }
        if !(node.diam.is_finite() && node.diam > 0.0) {
            issues.push(invalid(field("diam"), "must be a positive diameter"));
        }
        if node.nseg == 0 {
            issues.push(invalid(field("nseg"), "must be at least 1"));
        }
        if !(0.0..=1.0).contains(&node.position) {
            issues.push(invalid(field("position"), "must lie within [0, 1]"));
        }

        // Stub nodes replace the loaded axon, so an axon parent can only be
        // a stub node that is already attached.
        let axon_prefix = format!("{}[", Region::Axon);
        if let Some(index) = node
            .parent
            .strip_prefix(&axon_prefix)
            .and_then(|rest| rest.strip_suffix(']'))
        {
            match index.parse::<usize>() {
                Ok(index) if index < i => {}
                _ => issues.push(invalid(
                    field("parent"),
                    format!("'{}' is not an earlier stub node", node.parent),
                )),
            }
        } else if node.parent.trim().is_empty() {
            issues.push(invalid(field("parent"), "must name a section"));
        }
    }
}

/// True if some insert group puts `mechanism` on every section `target` selects.
fn covers(template: &CellTemplate, target: Selector, mechanism: MechanismKind) -> bool {
    template.mechanisms.iter().any(|group| {
        (group.section == Selector::All || group.section == target)
            && group.names.contains(&mechanism)
    })
}

fn validate_parameters(template: &CellTemplate, issues: &mut Vec<TemplateIssue>) {
    for group in &template.parameters {
        for (name, value) in &group.values {
            if !value.is_finite() {
                issues.push(invalid(
                    format!("parameters.{}.{}", group.section, name),
                    format!("{value} is not finite"),
                ));
            }

            match ParameterName::parse(name) {
                Err(err) => issues.push(TemplateIssue::UnresolvedParameter {
                    section: group.section,
                    name: name.clone(),
                    reason: err.to_string(),
                }),
                Ok(ParameterName::Axial | ParameterName::Capacitance) => {}
                Ok(ParameterName::Range { mechanism, .. }) => {
                    if !covers(template, group.section, mechanism) {
                        issues.push(TemplateIssue::NotInserted {
                            section: group.section,
                            name: name.clone(),
                            mechanism,
                        });
                    }
                }
                Ok(ParameterName::Reversal(ion)) => {
                    let provided = MechanismKind::CATALOG.into_iter().any(|mechanism| {
                        mechanism.ions().contains(&ion) && covers(template, group.section, mechanism)
                    });
                    if !provided {
                        issues.push(TemplateIssue::UnresolvedParameter {
                            section: group.section,
                            name: name.clone(),
                            reason: format!("no inserted mechanism uses ion {ion:?}"),
                        });
                    }
                }
            }
        }
    }
}
