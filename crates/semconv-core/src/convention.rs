//! Convention model
//!
//! One document declares one or more groups. Each group becomes a
//! [`SemanticConvention`] with its own attributes and constraints; links to
//! other groups (`ref`, `extends`, `include`) stay symbolic until the
//! [`crate::SemanticConventionSet`] resolves them.

use indexmap::IndexMap;
use serde::Serialize;

use crate::attribute::{Required, SemanticAttribute};
use crate::constraint::{AnyOf, Constraint, Include};
use crate::document::{Mapping, Mark, Node};
use crate::error::{Result, ValidationError};
use crate::validate::{check_no_missing_keys, validate_id, validate_keys};

const GROUP_KEYS: &[&str] = &[
    "id",
    "brief",
    "note",
    "prefix",
    "extends",
    "span_kind",
    "attributes",
    "constraints",
];

const CONSTRAINT_KEYS: &[&str] = &["include", "any_of"];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SpanKind {
    #[default]
    Empty,
    Client,
    Server,
    Consumer,
    Producer,
    Internal,
}

impl SpanKind {
    /// `None` for a value outside the vocabulary
    pub fn parse(value: Option<&str>) -> Option<Self> {
        match value {
            None => Some(Self::Empty),
            Some("client") => Some(Self::Client),
            Some("server") => Some(Self::Server),
            Some("producer") => Some(Self::Producer),
            Some("consumer") => Some(Self::Consumer),
            Some("internal") => Some(Self::Internal),
            Some(_) => None,
        }
    }
}

/// A group of attributes and constraints
#[derive(Clone, Debug, Serialize)]
pub struct SemanticConvention {
    pub semconv_id: String,
    pub brief: String,
    pub note: String,
    pub prefix: String,
    /// Parent group id; empty when the group extends nothing
    pub extends: String,
    pub span_kind: SpanKind,
    pub attrs_by_name: IndexMap<String, SemanticAttribute>,
    pub constraints: Vec<Constraint>,
    pub position: Mark,
}

impl SemanticConvention {
    /// Parse every group declared in one document
    pub fn parse(document: &Node) -> Result<Vec<Self>> {
        let root = document
            .as_mapping()
            .ok_or_else(|| ValidationError::at(document.mark, "Missing keys: [groups]"))?;
        check_no_missing_keys(root, &["groups"])?;
        let groups = root
            .get("groups")
            .and_then(Node::as_sequence)
            .ok_or_else(|| ValidationError::at(root.mark_of("groups"), "Invalid value for groups"))?;

        groups
            .iter()
            .map(|node| {
                node.as_mapping()
                    .ok_or_else(|| ValidationError::at(node.mark, "Invalid group declaration"))
                    .and_then(Self::parse_group)
            })
            .collect()
    }

    fn parse_group(group: &Mapping) -> Result<Self> {
        validate_keys(group, GROUP_KEYS, &["id", "brief"])?;

        let semconv_id = text(group, "id");
        validate_id(&semconv_id, group.mark_of("id"))?;

        let span_kind_value = group.get_present("span_kind").map(Node::display_value);
        let span_kind = SpanKind::parse(span_kind_value.as_deref().map(str::trim)).ok_or_else(|| {
            ValidationError::at(
                group.mark_of("span_kind"),
                format!(
                    "Invalid value for span_kind: {}",
                    span_kind_value.as_deref().unwrap_or_default()
                ),
            )
        })?;

        let prefix = text(group, "prefix");
        if !prefix.is_empty() {
            validate_id(&prefix, group.mark_of("prefix"))?;
        }

        let attrs_by_name = match group.get_present("attributes") {
            None => IndexMap::new(),
            Some(node) => {
                let declarations = node.as_sequence().ok_or_else(|| {
                    ValidationError::at(group.mark_of("attributes"), "Invalid value for attributes")
                })?;
                SemanticAttribute::parse(&prefix, declarations)?
            }
        };

        let constraints = match group.get_present("constraints") {
            None => Vec::new(),
            Some(node) => {
                let entries = node.as_sequence().ok_or_else(|| {
                    ValidationError::at(group.mark_of("constraints"), "Invalid value for constraints")
                })?;
                Self::parse_constraints(entries)?
            }
        };

        Ok(Self {
            semconv_id,
            brief: text(group, "brief"),
            note: text(group, "note"),
            prefix,
            extends: text(group, "extends"),
            span_kind,
            attrs_by_name,
            constraints,
            position: group.mark_of("id"),
        })
    }

    fn parse_constraints(entries: &[Node]) -> Result<Vec<Constraint>> {
        let mut constraints = Vec::with_capacity(entries.len());

        for node in entries {
            let entry = node
                .as_mapping()
                .ok_or_else(|| ValidationError::at(node.mark, "Invalid entry in constraint array"))?;
            validate_keys(entry, CONSTRAINT_KEYS, &[])?;
            if entry.len() > 1 {
                let second = entry.keys().nth(1).unwrap_or_default();
                return Err(ValidationError::at(
                    entry.mark_of(second),
                    "Invalid entry in constraint array - multiple top-level keys in entry.",
                ));
            }

            if let Some(target) = entry.get_present("include") {
                constraints.push(Constraint::Include(Include {
                    semconv_id: target.display_value().trim().to_string(),
                }));
            } else if let Some(choices) = entry.get_present("any_of") {
                let alternatives = choices.as_sequence().ok_or_else(|| {
                    ValidationError::at(entry.mark_of("any_of"), "Invalid value for any_of")
                })?;
                let choice_list_ids = alternatives
                    .iter()
                    .map(|alt| match alt.as_sequence() {
                        Some(ids) => ids
                            .iter()
                            .map(|id| id.display_value().trim().to_string())
                            .collect(),
                        None => vec![alt.display_value().trim().to_string()],
                    })
                    .collect();
                constraints.push(Constraint::AnyOf(AnyOf::new(choice_list_ids)));
            } else {
                return Err(ValidationError::at(
                    entry.first_key_mark(),
                    "Invalid entry in constraint array - expected include or any_of.",
                ));
            }
        }

        Ok(constraints)
    }

    // ── Views ────────────────────────────────────────────────────────

    pub fn attributes(&self) -> impl Iterator<Item = &SemanticAttribute> {
        self.attrs_by_name.values()
    }

    pub fn contains_attribute(&self, attr: &SemanticAttribute) -> bool {
        self.attributes().any(|local| {
            (local.attr_id.is_some() && local.fqn == attr.fqn) || local == attr
        })
    }

    /// Required attributes followed by conditional ones, deduplicated by fqn
    pub fn all_attributes(&self) -> Vec<&SemanticAttribute> {
        unique_attr(
            self.required_attributes()
                .into_iter()
                .chain(self.conditional_attributes()),
        )
    }

    pub fn sampling_attributes(&self) -> Vec<&SemanticAttribute> {
        unique_attr(self.attributes().filter(|a| a.sampling_relevant))
    }

    pub fn required_attributes(&self) -> Vec<&SemanticAttribute> {
        unique_attr(self.attributes().filter(|a| a.required == Required::Always))
    }

    pub fn conditional_attributes(&self) -> Vec<&SemanticAttribute> {
        unique_attr(
            self.attributes()
                .filter(|a| matches!(a.required, Required::Conditional(_))),
        )
    }

    pub fn any_of(&self) -> Vec<&AnyOf> {
        self.constraints
            .iter()
            .filter_map(Constraint::as_any_of)
            .collect()
    }

    /// Whether `attr` appears in a resolved `any_of` alternative
    ///
    /// Renderers use this to label attributes that are otherwise not
    /// required as "conditionally required via constraint".
    pub fn has_attribute_constraint(&self, attr: &SemanticAttribute) -> bool {
        self.any_of()
            .into_iter()
            .flat_map(|any_of| any_of.choice_list_attributes())
            .flatten()
            .any(|candidate| candidate.equivalent_to(attr))
    }
}

/// Keep the first attribute seen for each fqn
fn unique_attr<'a>(attrs: impl IntoIterator<Item = &'a SemanticAttribute>) -> Vec<&'a SemanticAttribute> {
    let mut output: Vec<&SemanticAttribute> = Vec::new();
    for attr in attrs {
        if !output.iter().any(|seen| seen.fqn == attr.fqn) {
            output.push(attr);
        }
    }
    output
}

fn text(group: &Mapping, key: &str) -> String {
    group
        .get_present(key)
        .map(|n| n.display_value().trim().to_string())
        .unwrap_or_default()
}
