//! semconv-core: semantic convention model and resolution engine
//!
//! This crate contains the pure model logic with NO file I/O and no YAML
//! grammar:
//! - Document tree contract (positions attached to every key)
//! - Attribute model: typed attributes, enum types, example checking
//! - Constraint model: `include` and `any_of`
//! - Convention model: groups and their derived attribute views
//! - Resolution engine: `ref`/`include` fixpoint, `extends`, `any_of` binding
//!
//! Turning YAML text into a [`Node`] tree happens in the `semconv` crate.

pub mod attribute;
pub mod constraint;
pub mod convention;
pub mod convention_set;
pub mod document;
pub mod error;
pub mod registry;
pub mod validate;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use attribute::{
    AttributeType, BaseType, EnumAttributeType, EnumMember, Example, Required, Scalar,
    SemanticAttribute, SimpleType,
};
pub use constraint::{AnyOf, Constraint, Include};
pub use convention::{SemanticConvention, SpanKind};
pub use convention_set::{RecordedError, SemanticConventionSet};
pub use document::{Mapping, Mark, Node, Value};
pub use error::ValidationError;
pub use registry::DefinitionIndex;
