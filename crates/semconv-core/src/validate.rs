//! Shared structural checks: identifier grammar and key sets.

use std::sync::LazyLock;

use regex::Regex;

use crate::document::{Mapping, Mark};
use crate::error::{Result, ValidationError};

/// Identifier grammar for group ids, prefixes and attribute ids
pub const ID_PATTERN: &str = r"([a-z](\.?[a-z0-9_-]+)+)";

static ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("^{}$", ID_PATTERN)).unwrap());

static BOOL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(y|Y|yes|Yes|YES|n|N|no|No|NO|true|True|TRUE|false|False|FALSE|on|On|ON|off|Off|OFF)$",
    )
    .unwrap()
});

static BOOL_TRUE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(y|Y|yes|Yes|YES|true|True|TRUE|on|On|ON)$").unwrap());

pub fn is_valid_id(id: &str) -> bool {
    ID_RE.is_match(id)
}

pub fn validate_id(id: &str, mark: Mark) -> Result<()> {
    if is_valid_id(id) {
        Ok(())
    } else {
        Err(ValidationError::at(
            mark,
            format!(
                "Invalid id {}. Semantic Convention ids MUST be {}",
                id, ID_PATTERN
            ),
        ))
    }
}

/// Whether a string spells a YAML 1.1 boolean word
pub fn is_bool_word(s: &str) -> bool {
    BOOL_RE.is_match(s)
}

/// Interpret a YAML 1.1 boolean word
pub fn parse_bool_word(s: &str) -> Option<bool> {
    if !is_bool_word(s) {
        None
    } else {
        Some(BOOL_TRUE_RE.is_match(s))
    }
}

/// Check that `mapping` only uses `allowed` keys and has every `mandatory` one
pub fn validate_keys(mapping: &Mapping, allowed: &[&str], mandatory: &[&str]) -> Result<()> {
    let unwanted: Vec<&str> = mapping.keys().filter(|k| !allowed.contains(k)).collect();
    if let Some(first) = unwanted.first() {
        return Err(ValidationError::at(
            mapping.mark_of(first),
            format!("Invalid keys: {}", format_keys(&unwanted)),
        ));
    }
    check_no_missing_keys(mapping, mandatory)
}

pub fn check_no_missing_keys(mapping: &Mapping, mandatory: &[&str]) -> Result<()> {
    let missing: Vec<&str> = mandatory
        .iter()
        .copied()
        .filter(|k| !mapping.contains_key(k))
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::at(
            mapping.first_key_mark(),
            format!("Missing keys: {}", format_keys(&missing)),
        ))
    }
}

fn format_keys(keys: &[&str]) -> String {
    format!("[{}]", keys.join(", "))
}
