//! Group constraints: `include` composition and `any_of` requirements.

use std::hash::{Hash, Hasher};

use serde::Serialize;

use crate::attribute::SemanticAttribute;

/// Pull another group's attributes and constraints into this one
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Include {
    pub semconv_id: String,
}

/// At least one of several attribute lists must be set
///
/// `choice_list_ids` is fixed at parse time and is the constraint's identity:
/// equality and hashing look at nothing else, so the same constraint reached
/// through two `include` paths is recognised as one. The resolved attribute
/// lists are filled in after all groups are resolved.
#[derive(Clone, Debug, Serialize)]
pub struct AnyOf {
    choice_list_ids: Vec<Vec<String>>,
    pub imported: bool,
    choice_list_attributes: Vec<Vec<SemanticAttribute>>,
}

impl AnyOf {
    pub fn new(choice_list_ids: Vec<Vec<String>>) -> Self {
        Self {
            choice_list_ids,
            imported: false,
            choice_list_attributes: Vec::new(),
        }
    }

    pub fn choice_list_ids(&self) -> &[Vec<String>] {
        &self.choice_list_ids
    }

    /// Resolved alternatives, in declaration order
    pub fn choice_list_attributes(&self) -> &[Vec<SemanticAttribute>] {
        &self.choice_list_attributes
    }

    pub fn add_attributes(&mut self, attrs: Vec<SemanticAttribute>) {
        self.choice_list_attributes.push(attrs);
    }

    /// Copy marked as imported from another group
    pub fn import_anyof(&self) -> Self {
        Self {
            imported: true,
            ..self.clone()
        }
    }
}

impl PartialEq for AnyOf {
    fn eq(&self, other: &Self) -> bool {
        self.choice_list_ids == other.choice_list_ids
    }
}

impl Eq for AnyOf {}

impl Hash for AnyOf {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.choice_list_ids.hash(state);
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Constraint {
    Include(Include),
    AnyOf(AnyOf),
}

impl Constraint {
    pub fn as_any_of(&self) -> Option<&AnyOf> {
        match self {
            Self::AnyOf(any_of) => Some(any_of),
            Self::Include(_) => None,
        }
    }

    pub fn as_include(&self) -> Option<&Include> {
        match self {
            Self::Include(include) => Some(include),
            Self::AnyOf(_) => None,
        }
    }

    /// Copy marked as imported; includes carry no such flag
    pub fn import_constraint(&self) -> Self {
        match self {
            Self::Include(include) => Self::Include(include.clone()),
            Self::AnyOf(any_of) => Self::AnyOf(any_of.import_anyof()),
        }
    }
}
