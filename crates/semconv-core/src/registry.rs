//! Lookup of defining attributes by fqn.

use indexmap::IndexMap;

use crate::attribute::SemanticAttribute;
use crate::convention::SemanticConvention;

/// Read-only index of non-ref attributes keyed by fqn
///
/// Built from a snapshot of the groups; later mutation of the groups is not
/// reflected. A group-local definition wins over an imported or inherited
/// copy of the same fqn, otherwise the first one seen in group order wins.
#[derive(Debug, Default)]
pub struct DefinitionIndex {
    by_fqn: IndexMap<String, SemanticAttribute>,
}

impl DefinitionIndex {
    pub fn build<'a>(models: impl IntoIterator<Item = &'a SemanticConvention>) -> Self {
        let mut by_fqn: IndexMap<String, SemanticAttribute> = IndexMap::new();

        for attr in models
            .into_iter()
            .flat_map(SemanticConvention::attributes)
            .filter(|a| !a.is_ref())
        {
            match by_fqn.get(&attr.fqn) {
                Some(existing) if existing.is_local() || !attr.is_local() => {}
                _ => {
                    by_fqn.insert(attr.fqn.clone(), attr.clone());
                }
            }
        }

        Self { by_fqn }
    }

    pub fn get(&self, fqn: &str) -> Option<&SemanticAttribute> {
        self.by_fqn.get(fqn)
    }

    pub fn len(&self) -> usize {
        self.by_fqn.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_fqn.is_empty()
    }
}
