//! Parsed document tree
//!
//! The input contract for the model: an order-preserving tree of scalars,
//! sequences and mappings where every value and every mapping key carries the
//! position reported by the YAML parser. Positions are 0-indexed here, exactly
//! as the parser produces them; [`crate::ValidationError::at`] converts them
//! to the 1-indexed form shown to users.

use indexmap::IndexMap;
use serde::Serialize;

/// Source position as reported by the parser (0-indexed line and column)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Mark {
    pub line: usize,
    pub column: usize,
}

impl Mark {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// A value in the document tree
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Sequence(Vec<Node>),
    Mapping(Mapping),
}

/// A value together with the position it was read from
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub value: Value,
    pub mark: Mark,
}

impl Node {
    pub fn new(value: Value, mark: Mark) -> Self {
        Self { value, mark }
    }

    pub fn is_null(&self) -> bool {
        matches!(self.value, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match &self.value {
            Value::Mapping(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Node]> {
        match &self.value {
            Value::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Short name of the value's kind, used in error messages
    pub fn kind_name(&self) -> &'static str {
        match self.value {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "str",
            Value::Sequence(_) => "list",
            Value::Mapping(_) => "map",
        }
    }

    /// Render a scalar the way it would appear in the source
    ///
    /// Sequences and mappings render as a compact flow form; this is only
    /// used to echo offending values back in error messages.
    pub fn display_value(&self) -> String {
        match &self.value {
            Value::Null => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::String(s) => s.clone(),
            Value::Sequence(items) => format!(
                "[{}]",
                items
                    .iter()
                    .map(Node::display_value)
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            Value::Mapping(m) => format!(
                "{{{}}}",
                m.iter()
                    .map(|(k, v)| format!("{}: {}", k, v.display_value()))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        }
    }
}

/// A mapping entry: the value plus the position of its key
#[derive(Clone, Debug, PartialEq)]
pub struct Entry {
    pub key_mark: Mark,
    pub value: Node,
}

/// Insertion-ordered mapping with per-key positions
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mapping {
    entries: IndexMap<String, Entry>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a key. A repeated key replaces the earlier value but keeps
    /// the original key position in the iteration order.
    pub fn insert(&mut self, key: impl Into<String>, key_mark: Mark, value: Node) {
        self.entries.insert(key.into(), Entry { key_mark, value });
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.entries.get(key).map(|e| &e.value)
    }

    /// Value for `key`, treating an explicit null the same as a missing key
    pub fn get_present(&self, key: &str) -> Option<&Node> {
        self.get(key).filter(|n| !n.is_null())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn key_mark(&self, key: &str) -> Option<Mark> {
        self.entries.get(key).map(|e| e.key_mark)
    }

    /// Position of the first key, used to anchor errors about the mapping
    /// as a whole
    pub fn first_key_mark(&self) -> Mark {
        self.entries
            .values()
            .next()
            .map(|e| e.key_mark)
            .unwrap_or_default()
    }

    /// Position of `key` if present, otherwise of the first key
    pub fn mark_of(&self, key: &str) -> Mark {
        self.key_mark(key).unwrap_or_else(|| self.first_key_mark())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.entries.iter().map(|(k, e)| (k.as_str(), &e.value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
