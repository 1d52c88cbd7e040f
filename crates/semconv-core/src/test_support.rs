//! Builders for hand-written document trees in unit tests.

use crate::document::{Mapping, Mark, Node, Value};

pub fn s(v: &str) -> Node {
    Node::new(Value::String(v.to_string()), Mark::default())
}

pub fn int(v: i64) -> Node {
    Node::new(Value::Int(v), Mark::default())
}

pub fn float(v: f64) -> Node {
    Node::new(Value::Float(v), Mark::default())
}

pub fn boolean(v: bool) -> Node {
    Node::new(Value::Bool(v), Mark::default())
}

pub fn null() -> Node {
    Node::new(Value::Null, Mark::default())
}

pub fn seq(items: Vec<Node>) -> Node {
    Node::new(Value::Sequence(items), Mark::default())
}

/// Mapping whose i-th key sits at line `line + i`, column 4
pub fn map(line: usize, entries: Vec<(&str, Node)>) -> Node {
    let mut m = Mapping::new();
    for (i, (key, mut value)) in entries.into_iter().enumerate() {
        value.mark = Mark::new(line + i, 4 + key.len() + 2);
        m.insert(key, Mark::new(line + i, 4), value);
    }
    Node::new(Value::Mapping(m), Mark::new(line, 4))
}

/// A document with the given `groups`
pub fn doc(groups: Vec<Node>) -> Node {
    map(0, vec![("groups", seq(groups))])
}
