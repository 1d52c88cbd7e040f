//! Resolution engine
//!
//! [`SemanticConventionSet`] collects the groups of every document and links
//! them in [`SemanticConventionSet::finish`]:
//!
//! 1. duplicate definitions across groups are recorded (not fatal)
//! 2. `ref` and `include` are resolved repeatedly until a pass changes nothing
//! 3. `extends` is applied parents-first
//! 4. `any_of` attribute ids are bound to attribute objects
//!
//! Steps 2 and 3 only ever add attributes and constraints or fill empty
//! fields, which is what makes the loop in step 2 terminate.

use std::collections::HashSet;
use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::attribute::SemanticAttribute;
use crate::constraint::Constraint;
use crate::convention::SemanticConvention;
use crate::document::Node;
use crate::error::{Result, ValidationError};
use crate::registry::DefinitionIndex;

/// An error recorded without stopping the run
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RecordedError {
    /// Document the error came from, when it is tied to one
    pub source: Option<String>,
    pub message: String,
}

impl fmt::Display for RecordedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(source) => write!(f, "Error parsing {}: {}", source, self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// All groups of a run, keyed by group id in declaration order
#[derive(Debug, Default, Serialize)]
pub struct SemanticConventionSet {
    #[serde(skip)]
    debug: bool,
    models: IndexMap<String, SemanticConvention>,
    #[serde(skip)]
    errors: Vec<RecordedError>,
    #[serde(skip)]
    finished: bool,
}

impl SemanticConventionSet {
    pub fn new(debug: bool) -> Self {
        Self {
            debug,
            ..Default::default()
        }
    }

    /// Parse one document and add its groups
    ///
    /// A structural error rejects the whole document: it is logged and
    /// recorded, and the set keeps the groups of every other document.
    pub fn parse_document(&mut self, source: &str, document: &Node) {
        match SemanticConvention::parse(document) {
            Ok(conventions) => {
                debug!("{}: parsed {} group(s)", source, conventions.len());
                for convention in conventions {
                    self.add_convention(source, convention);
                }
            }
            Err(e) => self.record_error(Some(source), e.to_string()),
        }
    }

    /// Add an already parsed group; a repeated id replaces the earlier group
    /// and is recorded as an error
    pub fn add_convention(&mut self, source: &str, convention: SemanticConvention) {
        if self.models.contains_key(&convention.semconv_id) {
            self.record_error(
                Some(source),
                format!(
                    "Semantic convention '{}' is already defined.",
                    convention.semconv_id
                ),
            );
        }
        self.models
            .insert(convention.semconv_id.clone(), convention);
    }

    /// Record a non-fatal error, for example a document that failed to load
    pub fn record_error(&mut self, source: Option<&str>, message: impl Into<String>) {
        let recorded = RecordedError {
            source: source.map(str::to_string),
            message: message.into(),
        };
        error!("{}", recorded);
        self.errors.push(recorded);
    }

    pub fn has_error(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn errors(&self) -> &[RecordedError] {
        &self.errors
    }

    pub fn models(&self) -> &IndexMap<String, SemanticConvention> {
        &self.models
    }

    pub fn get(&self, semconv_id: &str) -> Option<&SemanticConvention> {
        self.models.get(semconv_id)
    }

    /// Every attribute of every group, in group order
    pub fn attributes(&self) -> Vec<&SemanticAttribute> {
        self.models
            .values()
            .flat_map(SemanticConvention::attributes)
            .collect()
    }

    /// Resolve `ref`, `include`, `extends` and `any_of` across all groups
    ///
    /// A missing `ref`/`include`/`extends` target or an `extends` cycle is
    /// returned as an error; duplicate definitions are only recorded.
    pub fn finish(&mut self) -> Result<()> {
        if self.finished {
            warn!("convention set already resolved, skipping");
            return Ok(());
        }
        info!("Resolving {} semantic convention group(s)", self.models.len());

        self.check_unique_fqns();

        let ids: Vec<String> = self.models.keys().cloned().collect();
        let index = DefinitionIndex::build(self.models.values());
        let max_passes = 2 * ids.len() + 2;
        let mut passes = 0;
        loop {
            let trace = self.debug && passes == 0;
            // include targets whose extends chain was applied in this pass
            let mut extended = HashSet::new();
            let mut last_changed = None;
            for id in &ids {
                // ref first, include after
                let fixpoint_ref = self.resolve_ref(id, &index)?;
                let fixpoint_inc = self.resolve_include(id, &mut extended, trace)?;
                if !(fixpoint_ref && fixpoint_inc) {
                    last_changed = Some(id.as_str());
                }
            }
            passes += 1;
            let Some(changed) = last_changed else {
                break;
            };
            if passes >= max_passes {
                return Err(self.non_convergence_error(changed, passes));
            }
        }
        debug!("ref/include fixpoint reached after {} pass(es)", passes);

        self.populate_extends()?;
        self.populate_anyof_attributes();
        self.finished = true;

        info!(
            "Resolved {} group(s) with {} attribute(s)",
            self.models.len(),
            self.attributes().len()
        );
        Ok(())
    }

    // ── Phase 1: uniqueness ──────────────────────────────────────────

    fn check_unique_fqns(&mut self) {
        let mut group_by_fqn: IndexMap<String, String> = IndexMap::new();
        let mut duplicates = Vec::new();

        for model in self.models.values() {
            for attr in model.attributes().filter(|a| !a.is_ref()) {
                if let Some(owner) = group_by_fqn.get(&attr.fqn) {
                    duplicates.push(format!(
                        "Attribute {} of Semantic convention '{}' is already defined in {}.",
                        attr.fqn, model.semconv_id, owner
                    ));
                }
                group_by_fqn.insert(attr.fqn.clone(), model.semconv_id.clone());
            }
        }

        for message in duplicates {
            self.record_error(None, message);
        }
    }

    // ── Phase 2: ref and include ─────────────────────────────────────

    /// Resolve unresolved `ref` attributes of one group. Returns `true`
    /// when there was nothing left to resolve.
    fn resolve_ref(&mut self, semconv_id: &str, index: &DefinitionIndex) -> Result<bool> {
        let Some(model) = self.models.get_mut(semconv_id) else {
            return Ok(true);
        };
        let mut fixpoint = true;

        for attr in model.attrs_by_name.values_mut() {
            let Some(target) = attr.reference.clone() else {
                continue;
            };
            if attr.attr_id.is_some() {
                continue;
            }
            fixpoint = false;

            let Some(definition) = index.get(&target) else {
                return Err(ValidationError::at(
                    model.position,
                    format!(
                        "Semantic Convention {} reference `{}` but it cannot be found!",
                        model.semconv_id, target
                    ),
                ));
            };

            attr.attr_type = definition.attr_type.clone();
            if attr.brief.is_empty() {
                attr.brief = definition.brief.clone();
            }
            if attr.note.is_empty() {
                attr.note = definition.note.clone();
            }
            if attr.examples.is_none() {
                attr.examples = definition.examples.clone();
            }
            attr.attr_id = Some(target);
        }

        Ok(fixpoint)
    }

    /// Copy the attributes and non-include constraints of included groups.
    /// Returns `true` when nothing was added.
    fn resolve_include(
        &mut self,
        semconv_id: &str,
        extended: &mut HashSet<String>,
        trace: bool,
    ) -> Result<bool> {
        let Some(model) = self.models.get(semconv_id) else {
            return Ok(true);
        };
        let position = model.position;
        let targets: Vec<String> = model
            .constraints
            .iter()
            .filter_map(Constraint::as_include)
            .map(|include| include.semconv_id.clone())
            .collect();
        let mut fixpoint = true;

        for target_id in targets {
            if !self.models.contains_key(&target_id) {
                return Err(ValidationError::at(
                    position,
                    format!(
                        "Semantic Convention {} includes {} but the latter cannot be found!",
                        semconv_id, target_id
                    ),
                ));
            }

            // attributes have to be inherited before they can be included
            self.populate_extends_single(&target_id, extended, &mut Vec::new())?;

            let (attrs, constraints) = match self.models.get(&target_id) {
                Some(target) => (
                    target.attributes().cloned().collect::<Vec<_>>(),
                    target.constraints.clone(),
                ),
                None => continue,
            };
            let Some(model) = self.models.get_mut(semconv_id) else {
                continue;
            };

            for attr in attrs {
                if model.contains_attribute(&attr) {
                    if trace {
                        debug!(
                            "[Includes] {} already contains attribute {}",
                            semconv_id, attr.fqn
                        );
                    }
                    continue;
                }
                fixpoint = false;
                model
                    .attrs_by_name
                    .insert(attr.fqn.clone(), attr.import_attribute());
            }

            for constraint in constraints {
                if constraint.as_include().is_some() || model.constraints.contains(&constraint) {
                    continue;
                }
                fixpoint = false;
                model.constraints.push(constraint.import_constraint());
            }
        }

        Ok(fixpoint)
    }

    /// Anchored at the group that was still changing in the last pass
    fn non_convergence_error(&self, semconv_id: &str, passes: usize) -> ValidationError {
        let position = self
            .models
            .get(semconv_id)
            .map(|m| m.position)
            .unwrap_or_default();
        ValidationError::at(
            position,
            format!(
                "Resolution of ref/include did not converge after {} passes (last change in {})",
                passes, semconv_id
            ),
        )
    }

    // ── Phase 3: extends ─────────────────────────────────────────────

    fn populate_extends(&mut self) -> Result<()> {
        let ids: Vec<String> = self.models.keys().cloned().collect();
        let mut done = HashSet::new();
        for id in ids {
            self.populate_extends_single(&id, &mut done, &mut Vec::new())?;
        }
        Ok(())
    }

    /// Apply `extends` to one group, resolving its parent chain first
    ///
    /// `done` holds the groups already processed in this sweep and
    /// `resolving` the chain of groups currently waiting on a parent.
    fn populate_extends_single(
        &mut self,
        semconv_id: &str,
        done: &mut HashSet<String>,
        resolving: &mut Vec<String>,
    ) -> Result<()> {
        if done.contains(semconv_id) {
            return Ok(());
        }
        let Some(model) = self.models.get(semconv_id) else {
            return Ok(());
        };
        let position = model.position;
        let parent_id = model.extends.clone();

        if let Some(start) = resolving.iter().position(|id| id == semconv_id) {
            let mut chain = resolving[start..].to_vec();
            chain.push(semconv_id.to_string());
            return Err(ValidationError::at(
                position,
                format!(
                    "Semantic Convention {} is part of an extends cycle: {}",
                    semconv_id,
                    chain.join(" -> ")
                ),
            ));
        }

        if parent_id.is_empty() {
            if let Some(model) = self.models.get_mut(semconv_id) {
                let attrs = std::mem::take(&mut model.attrs_by_name);
                model.attrs_by_name = sort_attributes(attrs);
            }
            done.insert(semconv_id.to_string());
            return Ok(());
        }

        if !self.models.contains_key(&parent_id) {
            return Err(ValidationError::at(
                position,
                format!(
                    "Semantic Convention {} extends {} but the latter cannot be found!",
                    semconv_id, parent_id
                ),
            ));
        }

        resolving.push(semconv_id.to_string());
        self.populate_extends_single(&parent_id, done, resolving)?;
        resolving.pop();

        let (mut merged, parent_prefix, parent_any_of) = match self.models.get(&parent_id) {
            Some(parent) => (
                parent
                    .attributes()
                    .map(|a| (a.fqn.clone(), a.inherit_attribute()))
                    .collect::<IndexMap<_, _>>(),
                parent.prefix.clone(),
                parent
                    .constraints
                    .iter()
                    .filter(|c| c.as_any_of().is_some())
                    .cloned()
                    .collect::<Vec<_>>(),
            ),
            None => return Ok(()),
        };

        if let Some(model) = self.models.get_mut(semconv_id) {
            for constraint in parent_any_of {
                if !model.constraints.contains(&constraint) {
                    model.constraints.push(constraint.import_constraint());
                }
            }
            if model.prefix.is_empty() {
                model.prefix = parent_prefix;
            }
            // parent entries keep their position; own entries override them
            let own = std::mem::take(&mut model.attrs_by_name);
            merged.extend(sort_attributes(own));
            model.attrs_by_name = merged;
        }

        done.insert(semconv_id.to_string());
        Ok(())
    }

    // ── Phase 4: any_of binding ──────────────────────────────────────

    /// Bind `any_of` ids to attributes. Ids that match no definition are
    /// dropped from their alternative, and an alternative left empty is
    /// skipped.
    fn populate_anyof_attributes(&mut self) {
        let index = DefinitionIndex::build(self.models.values());

        for model in self.models.values_mut() {
            for constraint in model.constraints.iter_mut() {
                let Constraint::AnyOf(any_of) = constraint else {
                    continue;
                };
                let choices: Vec<Vec<SemanticAttribute>> = any_of
                    .choice_list_ids()
                    .iter()
                    .map(|ids| {
                        ids.iter()
                            .filter_map(|id| {
                                let found = index.get(id).cloned();
                                if found.is_none() {
                                    debug!(
                                        "{}: any_of id {} matches no attribute",
                                        model.semconv_id, id
                                    );
                                }
                                found
                            })
                            .collect()
                    })
                    .collect();
                for attrs in choices.into_iter().filter(|c| !c.is_empty()) {
                    any_of.add_attributes(attrs);
                }
            }
        }
    }
}

/// Imported attributes first, then the rest, each in first-seen order
fn sort_attributes(
    attrs: IndexMap<String, SemanticAttribute>,
) -> IndexMap<String, SemanticAttribute> {
    let (imported, rest): (Vec<_>, Vec<_>) = attrs.into_iter().partition(|(_, a)| a.imported);
    imported.into_iter().chain(rest).collect()
}
