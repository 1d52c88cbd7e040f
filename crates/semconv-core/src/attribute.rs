//! Attribute model
//!
//! Parses the `attributes` list of one group into typed [`SemanticAttribute`]
//! records keyed by fully-qualified name. Nothing here knows about other
//! groups: `ref` attributes are left unresolved for the resolution engine.

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

use crate::document::{Mapping, Mark, Node, Value};
use crate::error::{Result, ValidationError};
use crate::validate::{
    check_no_missing_keys, is_bool_word, parse_bool_word, validate_id, validate_keys,
};

const ATTRIBUTE_KEYS: &[&str] = &[
    "id",
    "type",
    "brief",
    "examples",
    "ref",
    "tag",
    "deprecated",
    "required",
    "sampling_relevant",
    "note",
];

const ENUM_KEYS: &[&str] = &["allow_custom_values", "members"];
const MEMBER_KEYS: &[&str] = &["id", "value", "brief", "note"];

// =============================================================================
// Scalar values
// =============================================================================

/// A scalar value as it appears in examples and enum members
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl Scalar {
    pub fn from_node(node: &Node) -> Option<Self> {
        match &node.value {
            Value::Bool(b) => Some(Self::Bool(*b)),
            Value::Int(i) => Some(Self::Int(*i)),
            Value::Float(f) => Some(Self::Float(*f)),
            Value::String(s) => Some(Self::String(s.clone())),
            _ => None,
        }
    }

    /// Base type a value infers to. Strings spelling a YAML boolean word
    /// count as booleans.
    pub fn base_type(&self) -> BaseType {
        match self {
            Self::Int(_) | Self::Float(_) => BaseType::Number,
            Self::Bool(_) => BaseType::Boolean,
            Self::String(s) if is_bool_word(s) => BaseType::Boolean,
            Self::String(_) => BaseType::String,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int(i) => write!(f, "{}", i),
            Self::Float(x) => write!(f, "{}", x),
            Self::String(s) => write!(f, "{}", s),
        }
    }
}

/// One example value: a single scalar or an array of scalars
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Example {
    Scalar(Scalar),
    Array(Vec<Scalar>),
}

// =============================================================================
// Types
// =============================================================================

/// Scalar base of a declared type
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BaseType {
    String,
    Number,
    Boolean,
}

impl BaseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
        }
    }
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scalar and scalar-array type tags
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum SimpleType {
    #[serde(rename = "string")]
    String,
    #[serde(rename = "string[]")]
    StringArray,
    #[serde(rename = "number")]
    Number,
    #[serde(rename = "number[]")]
    NumberArray,
    #[serde(rename = "boolean")]
    Boolean,
    #[serde(rename = "boolean[]")]
    BooleanArray,
}

impl SimpleType {
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "string" => Some(Self::String),
            "string[]" => Some(Self::StringArray),
            "number" => Some(Self::Number),
            "number[]" => Some(Self::NumberArray),
            "boolean" => Some(Self::Boolean),
            "boolean[]" => Some(Self::BooleanArray),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::StringArray => "string[]",
            Self::Number => "number",
            Self::NumberArray => "number[]",
            Self::Boolean => "boolean",
            Self::BooleanArray => "boolean[]",
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(
            self,
            Self::StringArray | Self::NumberArray | Self::BooleanArray
        )
    }

    pub fn base(&self) -> BaseType {
        match self {
            Self::String | Self::StringArray => BaseType::String,
            Self::Number | Self::NumberArray => BaseType::Number,
            Self::Boolean | Self::BooleanArray => BaseType::Boolean,
        }
    }

    /// Whether a value of this scalar base may appear as an example
    fn accepts(&self, value: &Scalar) -> bool {
        match self.base() {
            BaseType::String => matches!(value, Scalar::String(_)),
            BaseType::Number => matches!(value, Scalar::Int(_) | Scalar::Float(_)),
            BaseType::Boolean => true,
        }
    }
}

impl fmt::Display for SimpleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EnumMember {
    pub member_id: String,
    pub value: Scalar,
    pub brief: String,
    pub note: String,
}

/// An enumeration type; equality is structural
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EnumAttributeType {
    pub custom_values: bool,
    pub members: Vec<EnumMember>,
    pub enum_type: BaseType,
}

impl EnumAttributeType {
    /// Parse an enum block. Errors carry only a message; the caller anchors
    /// them at the attribute's `type` key.
    fn parse(block: &Mapping) -> std::result::Result<Self, String> {
        validate_keys(block, ENUM_KEYS, &["members"]).map_err(|e| e.message)?;

        let custom_values = match block.get_present("allow_custom_values") {
            None => false,
            Some(node) => parse_flag(node).ok_or_else(|| {
                format!(
                    "Value '{}' for allow_custom_values field is not allowed",
                    node.display_value()
                )
            })?,
        };

        let member_nodes = match block.get_present("members") {
            None => &[][..],
            Some(node) => node
                .as_sequence()
                .ok_or_else(|| "Invalid value for members".to_string())?,
        };
        if member_nodes.is_empty() {
            return Err("Enumeration without values!".to_string());
        }

        let mut members = Vec::with_capacity(member_nodes.len());
        for node in member_nodes {
            let member = node
                .as_mapping()
                .ok_or_else(|| "Invalid enumeration member".to_string())?;
            validate_keys(member, MEMBER_KEYS, &["id", "value"]).map_err(|e| e.message)?;

            let member_id = member
                .get("id")
                .map(|n| n.display_value().trim().to_string())
                .unwrap_or_default();
            let value = member.get("value").and_then(Scalar::from_node).ok_or_else(|| {
                format!("Invalid value for enumeration member {}", member_id)
            })?;
            let brief = match member.get_present("brief") {
                Some(n) => n.display_value().trim().to_string(),
                None => member_id.clone(),
            };
            let note = member
                .get_present("note")
                .map(|n| n.display_value().trim().to_string())
                .unwrap_or_default();

            members.push(EnumMember {
                member_id,
                value,
                brief,
                note,
            });
        }

        let enum_type = members[0].value.base_type();
        if members.iter().any(|m| m.value.base_type() != enum_type) {
            return Err("Enumeration type inconsistent!".to_string());
        }

        Ok(Self {
            custom_values,
            members,
            enum_type,
        })
    }
}

/// Declared type of an attribute
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AttributeType {
    Simple(SimpleType),
    Enum(EnumAttributeType),
}

impl AttributeType {
    fn parse(node: &Node) -> std::result::Result<Self, String> {
        match &node.value {
            Value::Mapping(block) => EnumAttributeType::parse(block).map(Self::Enum),
            _ => {
                let tag = node.display_value();
                SimpleType::parse(tag.trim())
                    .map(Self::Simple)
                    .ok_or_else(|| format!("Invalid type: {} is not allowed", tag))
            }
        }
    }

    pub fn as_simple(&self) -> Option<SimpleType> {
        match self {
            Self::Simple(t) => Some(*t),
            Self::Enum(_) => None,
        }
    }

    pub fn as_enum(&self) -> Option<&EnumAttributeType> {
        match self {
            Self::Enum(e) => Some(e),
            Self::Simple(_) => None,
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simple(t) => t.fmt(f),
            Self::Enum(e) => e.enum_type.fmt(f),
        }
    }
}

/// Requirement level of an attribute
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "level", content = "message", rename_all = "lowercase")]
pub enum Required {
    Always,
    Conditional(String),
    No,
}

impl Required {
    /// Explanation attached to a conditional requirement
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Conditional(msg) => Some(msg),
            _ => None,
        }
    }
}

// =============================================================================
// Attribute
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SemanticAttribute {
    pub fqn: String,
    pub attr_id: Option<String>,
    #[serde(rename = "ref")]
    pub reference: Option<String>,
    pub attr_type: Option<AttributeType>,
    pub brief: String,
    pub examples: Option<Vec<Example>>,
    pub tag: String,
    pub deprecated: Option<String>,
    pub required: Required,
    pub sampling_relevant: bool,
    pub note: String,
    pub position: Mark,
    pub inherited: bool,
    pub imported: bool,
}

impl SemanticAttribute {
    /// Copy marked as brought in by `ref` resolution or `include`
    pub fn import_attribute(&self) -> Self {
        Self {
            imported: true,
            ..self.clone()
        }
    }

    /// Copy marked as inherited from a parent group
    pub fn inherit_attribute(&self) -> Self {
        Self {
            inherited: true,
            ..self.clone()
        }
    }

    pub fn is_local(&self) -> bool {
        !self.imported && !self.inherited
    }

    /// Whether this attribute declares a `ref` instead of its own definition
    pub fn is_ref(&self) -> bool {
        self.reference.is_some()
    }

    /// Same attribute by fqn once it has an id, structurally otherwise
    pub fn equivalent_to(&self, other: &SemanticAttribute) -> bool {
        if self.attr_id.is_some() {
            self.fqn == other.fqn
        } else {
            self == other
        }
    }

    /// Parse a group's attribute declarations into an fqn-keyed map
    pub fn parse(prefix: &str, declarations: &[Node]) -> Result<IndexMap<String, Self>> {
        let mut attributes: IndexMap<String, Self> = IndexMap::new();

        for node in declarations {
            let decl = node
                .as_mapping()
                .ok_or_else(|| ValidationError::at(node.mark, "Invalid attribute declaration"))?;
            let attr = Self::parse_one(prefix, decl)?;

            if let Some(existing) = attributes.get(&attr.fqn) {
                return Err(ValidationError::at(
                    decl.first_key_mark(),
                    format!(
                        "Attribute id {} is already present at line {}",
                        attr.fqn,
                        existing.position.line + 1
                    ),
                ));
            }
            attributes.insert(attr.fqn.clone(), attr);
        }

        Ok(attributes)
    }

    fn parse_one(prefix: &str, decl: &Mapping) -> Result<Self> {
        validate_keys(decl, ATTRIBUTE_KEYS, &[])?;
        let position = decl.first_key_mark();

        let attr_id = decl
            .get_present("id")
            .map(|n| n.display_value().trim().to_string());
        let reference = decl
            .get_present("ref")
            .map(|n| n.display_value().trim().to_string());

        let (fqn, attr_type, brief, examples) = match (&attr_id, &reference) {
            (None, None) => {
                return Err(ValidationError::at(
                    position,
                    "At least one of id or ref is required.",
                ))
            }
            (Some(_), Some(_)) => {
                return Err(ValidationError::at(
                    position,
                    "Only one of id or ref is allowed.",
                ))
            }
            (Some(id), None) => {
                validate_id(id, decl.mark_of("id"))?;
                let (attr_type, brief, examples) = parse_definition(decl)?;
                let fqn = if prefix.is_empty() {
                    id.clone()
                } else {
                    format!("{}.{}", prefix, id)
                };
                (fqn, Some(attr_type), brief, examples)
            }
            (None, Some(target)) => {
                if decl.contains_key("type") {
                    return Err(ValidationError::at(
                        position,
                        format!("Ref attribute '{}' must not declare a type", target),
                    ));
                }
                let brief = optional_text(decl, "brief");
                let examples = match decl.get_present("examples") {
                    Some(node) => Some(parse_examples(node)?),
                    None => None,
                };
                (target.clone(), None, brief, examples)
            }
        };

        let deprecated = match decl.get_present("deprecated") {
            None => None,
            Some(node) => match node.as_str().map(str::trim) {
                Some(s) if !s.is_empty() && !is_bool_word(s) => Some(s.to_string()),
                _ => {
                    return Err(ValidationError::at(
                        decl.mark_of("deprecated"),
                        "Deprecated field expects a string that specify why the attribute is \
                         deprecated and/or what to use instead!",
                    ))
                }
            },
        };

        let sampling_relevant = match decl.get_present("sampling_relevant") {
            None => false,
            Some(node) => parse_flag(node).ok_or_else(|| {
                ValidationError::at(
                    decl.mark_of("sampling_relevant"),
                    format!(
                        "Value '{}' for sampling_relevant field is not allowed",
                        node.display_value()
                    ),
                )
            })?,
        };

        Ok(Self {
            fqn,
            attr_id,
            reference,
            attr_type,
            brief,
            examples,
            tag: optional_text(decl, "tag"),
            deprecated,
            required: parse_required(decl)?,
            sampling_relevant,
            note: optional_text(decl, "note"),
            position,
            inherited: false,
            imported: false,
        })
    }
}

// ── Field parsers ────────────────────────────────────────────────────

/// Type, brief and type-checked examples of an id declaration
fn parse_definition(decl: &Mapping) -> Result<(AttributeType, String, Option<Vec<Example>>)> {
    check_no_missing_keys(decl, &["type", "brief"])?;

    let type_node = decl
        .get("type")
        .ok_or_else(|| ValidationError::at(decl.first_key_mark(), "Missing keys: [type]"))?;
    let attr_type = AttributeType::parse(type_node)
        .map_err(|msg| ValidationError::at(decl.mark_of("type"), msg))?;
    let brief = optional_text(decl, "brief");

    let Some(simple) = attr_type.as_simple() else {
        let examples = match decl.get_present("examples") {
            Some(node) => Some(parse_examples(node)?),
            None => None,
        };
        return Ok((attr_type, brief, examples));
    };

    let examples_node = decl.get_present("examples");
    if simple.is_array() && examples_node.and_then(Node::as_sequence).is_none() {
        return Err(ValidationError::at(
            decl.first_key_mark(),
            format!("Non array examples for {} are not allowed", simple),
        ));
    }

    let examples = match examples_node {
        Some(node) => parse_examples(node)?,
        None => Vec::new(),
    };
    if simple.base() != BaseType::Boolean {
        if examples.is_empty() {
            return Err(ValidationError::at(
                decl.first_key_mark(),
                format!("Empty examples for {} are not allowed", simple),
            ));
        }
        if let Some(node) = examples_node {
            check_examples_type(simple, node)?;
        }
    }

    Ok((attr_type, brief, examples_node.map(|_| examples)))
}

/// Convert an `examples` value; a lone scalar becomes a one-element list
fn parse_examples(node: &Node) -> Result<Vec<Example>> {
    let items = match node.as_sequence() {
        Some(items) => items,
        None => std::slice::from_ref(node),
    };

    items
        .iter()
        .map(|item| match &item.value {
            Value::Sequence(elements) => elements
                .iter()
                .map(|e| {
                    Scalar::from_node(e)
                        .ok_or_else(|| ValidationError::at(e.mark, "Invalid example value"))
                })
                .collect::<Result<Vec<_>>>()
                .map(Example::Array),
            _ => Scalar::from_node(item)
                .map(Example::Scalar)
                .ok_or_else(|| ValidationError::at(item.mark, "Invalid example value")),
        })
        .collect()
}

/// Every example, element-wise for nested arrays, must match the declared base
fn check_examples_type(simple: SimpleType, node: &Node) -> Result<()> {
    let items = match node.as_sequence() {
        Some(items) => items,
        None => std::slice::from_ref(node),
    };

    for item in items {
        let values = match &item.value {
            Value::Sequence(elements) if simple.is_array() => elements.as_slice(),
            _ => std::slice::from_ref(item),
        };
        for value in values {
            let accepted = Scalar::from_node(value)
                .map(|s| simple.accepts(&s))
                .unwrap_or(false);
            if !accepted {
                return Err(ValidationError::at(
                    value.mark,
                    format!(
                        "Example with wrong type. Expected {} examples but is was {}.",
                        simple,
                        value.kind_name()
                    ),
                ));
            }
        }
    }

    Ok(())
}

fn parse_required(decl: &Mapping) -> Result<Required> {
    let Some(node) = decl.get("required") else {
        return Ok(Required::No);
    };
    let mark = decl.mark_of("required");
    let missing_message =
        || ValidationError::at(mark, "Missing message for conditional required field!");

    match &node.value {
        Value::Null => Ok(Required::No),
        Value::Mapping(m) => {
            validate_keys(m, &["conditional"], &[])?;
            let message = m
                .get_present("conditional")
                .map(|n| n.display_value().trim().to_string())
                .unwrap_or_default();
            if message.is_empty() {
                Err(missing_message())
            } else {
                Ok(Required::Conditional(message))
            }
        }
        Value::String(s) => match s.trim() {
            "always" => Ok(Required::Always),
            "" => Ok(Required::No),
            "conditional" => Err(missing_message()),
            other => Err(ValidationError::at(
                mark,
                format!("Value '{}' for required field is not allowed", other),
            )),
        },
        _ => Err(ValidationError::at(
            mark,
            format!(
                "Value '{}' for required field is not allowed",
                node.display_value()
            ),
        )),
    }
}

/// A boolean given either natively or as a YAML boolean word
fn parse_flag(node: &Node) -> Option<bool> {
    match &node.value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => parse_bool_word(s.trim()),
        _ => None,
    }
}

/// Trimmed text of an optional key, empty when absent or null
fn optional_text(decl: &Mapping, key: &str) -> String {
    decl.get_present(key)
        .map(|n| n.display_value().trim().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;

    fn parse_single(decl: Node) -> Result<SemanticAttribute> {
        SemanticAttribute::parse("http", &[decl]).map(|m| m.into_iter().next().unwrap().1)
    }

    #[test]
    fn test_parse_id_attribute() {
        let attr = parse_single(map(
            1,
            vec![
                ("id", s("method")),
                ("type", s("string")),
                ("brief", s("  HTTP request method. ")),
                ("examples", seq(vec![s("GET"), s("POST")])),
                ("required", s("always")),
            ],
        ))
        .unwrap();

        assert_eq!(attr.fqn, "http.method");
        assert_eq!(attr.attr_id.as_deref(), Some("method"));
        assert!(attr.reference.is_none());
        assert_eq!(attr.attr_type, Some(AttributeType::Simple(SimpleType::String)));
        assert_eq!(attr.brief, "HTTP request method.");
        assert_eq!(attr.required, Required::Always);
        assert_eq!(attr.examples.as_ref().map(Vec::len), Some(2));
        assert!(attr.is_local());
        assert_eq!(attr.position, Mark::new(1, 4));
    }

    #[test]
    fn test_empty_prefix_uses_bare_id() {
        let attrs = SemanticAttribute::parse(
            "",
            &[map(
                0,
                vec![("id", s("enabled")), ("type", s("boolean")), ("brief", s("b"))],
            )],
        )
        .unwrap();
        assert!(attrs.contains_key("enabled"));
    }

    #[test]
    fn test_ref_attribute_left_unresolved() {
        let attr = parse_single(map(
            3,
            vec![("ref", s("net.peer.ip")), ("required", s("always"))],
        ))
        .unwrap();
        assert_eq!(attr.fqn, "net.peer.ip");
        assert!(attr.attr_id.is_none());
        assert!(attr.attr_type.is_none());
        assert_eq!(attr.brief, "");
        assert!(attr.examples.is_none());
    }

    #[test]
    fn test_ref_with_type_rejected() {
        let err = parse_single(map(
            3,
            vec![("ref", s("net.peer.ip")), ("type", s("string"))],
        ))
        .unwrap_err();
        assert_eq!(err.message, "Ref attribute 'net.peer.ip' must not declare a type");
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = parse_single(map(
            2,
            vec![("id", s("method")), ("colour", s("red"))],
        ))
        .unwrap_err();
        assert_eq!(err.message, "Invalid keys: [colour]");
        assert_eq!(err.line, 4);
    }

    #[test]
    fn test_id_or_ref_required() {
        let err = parse_single(map(0, vec![("brief", s("x"))])).unwrap_err();
        assert_eq!(err.message, "At least one of id or ref is required.");
    }

    #[test]
    fn test_both_id_and_ref_rejected() {
        let err = parse_single(map(0, vec![("id", s("method")), ("ref", s("a.b"))])).unwrap_err();
        assert_eq!(err.message, "Only one of id or ref is allowed.");
    }

    #[test]
    fn test_invalid_id() {
        let err = parse_single(map(
            0,
            vec![("id", s("Method")), ("type", s("string")), ("brief", s("b"))],
        ))
        .unwrap_err();
        assert!(err.message.starts_with("Invalid id Method."));
    }

    #[test]
    fn test_missing_type_and_brief() {
        let err = parse_single(map(0, vec![("id", s("method"))])).unwrap_err();
        assert_eq!(err.message, "Missing keys: [type, brief]");
    }

    #[test]
    fn test_invalid_type() {
        let err = parse_single(map(
            0,
            vec![("id", s("method")), ("type", s("text")), ("brief", s("b"))],
        ))
        .unwrap_err();
        assert_eq!(err.message, "Invalid type: text is not allowed");
    }

    #[test]
    fn test_examples_required_for_non_boolean() {
        let err = parse_single(map(
            0,
            vec![("id", s("port")), ("type", s("number")), ("brief", s("b"))],
        ))
        .unwrap_err();
        assert_eq!(err.message, "Empty examples for number are not allowed");

        let ok = parse_single(map(
            0,
            vec![("id", s("flag")), ("type", s("boolean")), ("brief", s("b"))],
        ))
        .unwrap();
        assert!(ok.examples.is_none());
    }

    #[test]
    fn test_array_type_requires_sequence() {
        let err = parse_single(map(
            0,
            vec![
                ("id", s("args")),
                ("type", s("string[]")),
                ("brief", s("b")),
                ("examples", s("a")),
            ],
        ))
        .unwrap_err();
        assert_eq!(err.message, "Non array examples for string[] are not allowed");
    }

    #[test]
    fn test_scalar_example_wrapped() {
        let attr = parse_single(map(
            0,
            vec![
                ("id", s("port")),
                ("type", s("number")),
                ("brief", s("b")),
                ("examples", int(80)),
            ],
        ))
        .unwrap();
        assert_eq!(attr.examples, Some(vec![Example::Scalar(Scalar::Int(80))]));
    }

    #[test]
    fn test_example_type_mismatch() {
        let err = parse_single(map(
            0,
            vec![
                ("id", s("port")),
                ("type", s("number")),
                ("brief", s("b")),
                ("examples", seq(vec![int(80), s("eighty")])),
            ],
        ))
        .unwrap_err();
        assert_eq!(
            err.message,
            "Example with wrong type. Expected number examples but is was str."
        );
    }

    #[test]
    fn test_nested_array_examples_checked_elementwise() {
        let attr = parse_single(map(
            0,
            vec![
                ("id", s("ports")),
                ("type", s("number[]")),
                ("brief", s("b")),
                ("examples", seq(vec![seq(vec![int(1), int(2)]), seq(vec![float(3.5)])])),
            ],
        ))
        .unwrap();
        assert_eq!(
            attr.examples.unwrap()[0],
            Example::Array(vec![Scalar::Int(1), Scalar::Int(2)])
        );

        let err = parse_single(map(
            0,
            vec![
                ("id", s("ports")),
                ("type", s("number[]")),
                ("brief", s("b")),
                ("examples", seq(vec![seq(vec![int(1), s("x")])])),
            ],
        ))
        .unwrap_err();
        assert!(err.message.starts_with("Example with wrong type."));
    }

    #[test]
    fn test_required_conditional() {
        let attr = parse_single(map(
            0,
            vec![
                ("ref", s("net.peer.ip")),
                ("required", map(1, vec![("conditional", s("If available."))])),
            ],
        ))
        .unwrap();
        assert_eq!(attr.required, Required::Conditional("If available.".into()));
        assert_eq!(attr.required.message(), Some("If available."));
    }

    #[test]
    fn test_conditional_without_message() {
        for required in [
            s("conditional"),
            map(1, vec![("conditional", s(""))]),
            map(1, vec![("conditional", null())]),
        ] {
            let err = parse_single(map(
                0,
                vec![("ref", s("net.peer.ip")), ("required", required)],
            ))
            .unwrap_err();
            assert_eq!(err.message, "Missing message for conditional required field!");
        }
    }

    #[test]
    fn test_required_invalid_value() {
        let err = parse_single(map(
            0,
            vec![("ref", s("net.peer.ip")), ("required", s("sometimes"))],
        ))
        .unwrap_err();
        assert_eq!(err.message, "Value 'sometimes' for required field is not allowed");
    }

    #[test]
    fn test_deprecated_and_sampling_relevant() {
        let attr = parse_single(map(
            0,
            vec![
                ("ref", s("net.peer.ip")),
                ("deprecated", s(" Use net.sock.peer.addr instead. ")),
                ("sampling_relevant", s("yes")),
            ],
        ))
        .unwrap();
        assert_eq!(attr.deprecated.as_deref(), Some("Use net.sock.peer.addr instead."));
        assert!(attr.sampling_relevant);

        let err = parse_single(map(
            0,
            vec![("ref", s("net.peer.ip")), ("deprecated", int(1))],
        ))
        .unwrap_err();
        assert!(err.message.starts_with("Deprecated field expects a string"));

        let err = parse_single(map(
            0,
            vec![("ref", s("net.peer.ip")), ("sampling_relevant", s("often"))],
        ))
        .unwrap_err();
        assert_eq!(err.message, "Value 'often' for sampling_relevant field is not allowed");
    }

    #[test]
    fn test_duplicate_fqn_in_group() {
        let decl = |line| {
            map(
                line,
                vec![("id", s("method")), ("type", s("boolean")), ("brief", s("b"))],
            )
        };
        let err = SemanticAttribute::parse("http", &[decl(2), decl(6)]).unwrap_err();
        assert_eq!(err.message, "Attribute id http.method is already present at line 3");
        assert_eq!(err.line, 7);
    }

    fn enum_decl(members: Vec<Node>) -> Node {
        map(
            0,
            vec![
                ("id", s("kind")),
                (
                    "type",
                    map(1, vec![("allow_custom_values", boolean(true)), ("members", seq(members))]),
                ),
                ("brief", s("b")),
            ],
        )
    }

    #[test]
    fn test_enum_type() {
        let attr = parse_single(enum_decl(vec![
            map(2, vec![("id", s("ipv4")), ("value", s("ip_tcp"))]),
            map(3, vec![("id", s("ipv6")), ("value", s("ip_udp")), ("note", s("n"))]),
        ]))
        .unwrap();
        let enum_type = attr.attr_type.as_ref().and_then(AttributeType::as_enum).unwrap();
        assert!(enum_type.custom_values);
        assert_eq!(enum_type.enum_type, BaseType::String);
        assert_eq!(enum_type.members[0].brief, "ipv4");
        assert_eq!(enum_type.members[1].note, "n");
        assert_eq!(attr.attr_type.unwrap().to_string(), "string");
    }

    #[test]
    fn test_enum_inconsistent() {
        let err = parse_single(enum_decl(vec![
            map(2, vec![("id", s("one")), ("value", int(1))]),
            map(3, vec![("id", s("a")), ("value", s("a"))]),
        ]))
        .unwrap_err();
        assert_eq!(err.message, "Enumeration type inconsistent!");
        // anchored at the `type` key
        assert_eq!(err.line, 2);
    }

    #[test]
    fn test_enum_without_members() {
        let err = parse_single(enum_decl(vec![])).unwrap_err();
        assert_eq!(err.message, "Enumeration without values!");
    }

    #[test]
    fn test_enum_member_missing_value() {
        let err = parse_single(enum_decl(vec![map(2, vec![("id", s("one"))])])).unwrap_err();
        assert_eq!(err.message, "Missing keys: [value]");
    }

    #[test]
    fn test_equivalent_to() {
        let a = parse_single(map(
            0,
            vec![("id", s("method")), ("type", s("boolean")), ("brief", s("b"))],
        ))
        .unwrap();
        let mut b = a.import_attribute();
        b.brief = "other".into();
        assert!(a.equivalent_to(&b));

        let r = parse_single(map(0, vec![("ref", s("http.method"))])).unwrap();
        assert!(!r.equivalent_to(&a));
        assert!(r.equivalent_to(&r.clone()));
    }
}
