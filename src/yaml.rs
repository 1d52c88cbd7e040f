//! YAML text to document tree
//!
//! `marked-yaml` keeps the source position of every node but hands scalars
//! back as text. Quoted scalars stay strings; plain scalars are typed here
//! following the YAML 1.2 core schema (null, bool, int, float, otherwise
//! string).

use anyhow::{anyhow, Result};
use marked_yaml::types::{MarkedMappingNode, MarkedScalarNode, MarkedSequenceNode, Span};
use semconv_core::{Mapping, Mark, Node, Value};

/// Parse one YAML document into a [`Node`] tree
pub fn parse_document(text: &str) -> Result<Node> {
    let root = marked_yaml::parse_yaml(0, text).map_err(|e| anyhow!("{}", e))?;
    Ok(convert(&root))
}

fn convert(node: &marked_yaml::Node) -> Node {
    match node {
        marked_yaml::Node::Scalar(scalar) => convert_scalar(scalar),
        marked_yaml::Node::Sequence(sequence) => convert_sequence(sequence),
        marked_yaml::Node::Mapping(mapping) => convert_mapping(mapping),
    }
}

fn convert_scalar(scalar: &MarkedScalarNode) -> Node {
    // only plain scalars may be coerced; quoted ones are always strings
    let value = if scalar.may_coerce() {
        type_scalar(scalar.as_str())
    } else {
        Value::String(scalar.as_str().to_string())
    };
    Node::new(value, mark(scalar.span()))
}

fn convert_sequence(sequence: &MarkedSequenceNode) -> Node {
    let items = sequence.iter().map(convert).collect();
    Node::new(Value::Sequence(items), mark(sequence.span()))
}

fn convert_mapping(mapping: &MarkedMappingNode) -> Node {
    let mut out = Mapping::new();
    for (key, value) in mapping.iter() {
        out.insert(key.as_str(), mark(key.span()), convert(value));
    }
    Node::new(Value::Mapping(out), mark(mapping.span()))
}

/// `marked-yaml` counts from 1; the document tree counts from 0
fn mark(span: &Span) -> Mark {
    span.start()
        .map(|m| Mark::new(m.line().saturating_sub(1), m.column().saturating_sub(1)))
        .unwrap_or_default()
}

/// Type a plain scalar by the YAML 1.2 core schema
pub fn type_scalar(text: &str) -> Value {
    match text {
        "" | "~" | "null" | "Null" | "NULL" => return Value::Null,
        "true" | "True" | "TRUE" => return Value::Bool(true),
        "false" | "False" | "FALSE" => return Value::Bool(false),
        _ => {}
    }
    if let Ok(i) = text.parse::<i64>() {
        return Value::Int(i);
    }
    if looks_like_float(text) {
        if let Ok(f) = text.parse::<f64>() {
            return Value::Float(f);
        }
    }
    Value::String(text.to_string())
}

fn looks_like_float(text: &str) -> bool {
    text.chars().any(|c| c.is_ascii_digit())
        && text
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
}
