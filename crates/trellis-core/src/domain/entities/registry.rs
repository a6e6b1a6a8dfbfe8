//! The component registry: every scaffolded component of a project, keyed by
//! identifier.
//!
//! The registry is a pure in-memory map. Loading and saving go through the
//! `RegistryStore` port; the domain never touches the filesystem.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::component::{ComponentId, ComponentRecord};
use crate::domain::error::DomainError;

/// Upper bound on fuzzy "did you mean" candidates.
const MAX_FUZZY_SUGGESTIONS: usize = 3;
const FUZZY_THRESHOLD: f64 = 0.6;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Registry {
    components: BTreeMap<ComponentId, ComponentRecord>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn contains(&self, id: &ComponentId) -> bool {
        self.components.contains_key(id)
    }

    pub fn get(&self, id: &ComponentId) -> Option<&ComponentRecord> {
        self.components.get(id)
    }

    pub fn get_mut(&mut self, id: &ComponentId) -> Option<&mut ComponentRecord> {
        self.components.get_mut(id)
    }

    /// Iterate in identifier order. Ancestors always precede descendants.
    pub fn iter(&self) -> impl Iterator<Item = (&ComponentId, &ComponentRecord)> {
        self.components.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &ComponentId> {
        self.components.keys()
    }

    /// Like [`get`](Self::get) but a miss is a `ComponentNotFound` error
    /// carrying suggestions.
    pub fn lookup(&self, id: &ComponentId) -> Result<&ComponentRecord, DomainError> {
        self.components
            .get(id)
            .ok_or_else(|| self.not_found(id.as_str()))
    }

    pub fn not_found(&self, query: &str) -> DomainError {
        DomainError::ComponentNotFound {
            id: query.to_string(),
            suggestions: self.suggestions_for(query),
        }
    }

    /// Registered identifiers containing `query` as a substring, in
    /// registry order.
    pub fn similar_to(&self, query: &str) -> Vec<ComponentId> {
        let needle = normalize_query(query);
        if needle.is_empty() {
            return Vec::new();
        }
        self.components
            .keys()
            .filter(|id| id.as_str().contains(needle.as_str()))
            .cloned()
            .collect()
    }

    /// Substring matches first; when there are none, the closest identifiers
    /// by edit distance.
    pub fn suggestions_for(&self, query: &str) -> Vec<String> {
        let similar = self.similar_to(query);
        if !similar.is_empty() {
            return similar.into_iter().map(String::from).collect();
        }

        let needle = normalize_query(query);
        let mut scored: Vec<(f64, &ComponentId)> = self
            .components
            .keys()
            .map(|id| {
                let whole = strsim::normalized_levenshtein(&needle, id.as_str());
                let name = strsim::normalized_levenshtein(&needle, id.name());
                (whole.max(name), id)
            })
            .filter(|(score, _)| *score >= FUZZY_THRESHOLD)
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1)));

        scored
            .into_iter()
            .take(MAX_FUZZY_SUGGESTIONS)
            .map(|(_, id)| id.to_string())
            .collect()
    }

    pub fn insert(&mut self, id: ComponentId, record: ComponentRecord) -> Result<(), DomainError> {
        if self.components.contains_key(&id) {
            return Err(DomainError::ComponentExists { id: id.to_string() });
        }
        self.components.insert(id, record);
        Ok(())
    }

    pub fn remove(&mut self, id: &ComponentId) -> Result<ComponentRecord, DomainError> {
        self.components
            .remove(id)
            .ok_or_else(|| self.not_found(id.as_str()))
    }

    /// Move a record to a new key, rebinding self-references in its context.
    /// All other fields are preserved.
    pub fn rekey(&mut self, old: &ComponentId, new: ComponentId) -> Result<(), DomainError> {
        if old == &new {
            return Ok(());
        }
        if self.components.contains_key(&new) {
            return Err(DomainError::ComponentExists {
                id: new.to_string(),
            });
        }
        let mut record = self.remove(old)?;
        record.context_mut().rebind(old, &new);
        self.components.insert(new, record);
        Ok(())
    }

    /// `root` and every identifier nested under it, ancestors first.
    pub fn subtree(&self, root: &ComponentId) -> Vec<ComponentId> {
        self.components
            .keys()
            .filter(|id| id.is_within(root))
            .cloned()
            .collect()
    }
}

fn normalize_query(query: &str) -> String {
    ComponentId::parse(query)
        .map(String::from)
        .unwrap_or_else(|_| query.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::component::ComponentContext;
    use crate::domain::value_objects::ComponentKind;

    fn id(raw: &str) -> ComponentId {
        ComponentId::parse(raw).unwrap()
    }

    fn record(kind: ComponentKind, name: &str) -> ComponentRecord {
        ComponentRecord::new(kind, ComponentContext::new().with("module_name", name))
    }

    fn sample() -> Registry {
        let mut registry = Registry::new();
        registry.insert(id("foo"), record(ComponentKind::PythonModule, "foo")).unwrap();
        registry.insert(id("foo/soup"), record(ComponentKind::PythonModule, "soup")).unwrap();
        registry.insert(id("foo2"), record(ComponentKind::PythonPackage, "foo2")).unwrap();
        registry.insert(id("app"), record(ComponentKind::CliSingleCommand, "app")).unwrap();
        registry
    }

    #[test]
    fn insert_rejects_duplicates() {
        let mut registry = sample();
        let err = registry
            .insert(id("foo"), record(ComponentKind::PythonModule, "foo"))
            .unwrap_err();
        assert_eq!(err, DomainError::ComponentExists { id: "foo".into() });
    }

    #[test]
    fn lookup_miss_suggests_substring_matches() {
        let registry = sample();
        match registry.lookup(&id("soup")).unwrap_err() {
            DomainError::ComponentNotFound { suggestions, .. } => {
                assert_eq!(suggestions, vec!["foo/soup".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn similar_to_is_ordered_and_substring_based() {
        let registry = sample();
        assert_eq!(registry.similar_to("foo"), vec![id("foo"), id("foo/soup"), id("foo2")]);
        assert!(registry.similar_to("zzz").is_empty());
    }

    #[test]
    fn suggestions_fall_back_to_edit_distance() {
        let registry = sample();
        assert_eq!(registry.suggestions_for("soop"), vec!["foo/soup".to_string()]);
        assert!(registry.suggestions_for("completely_unrelated").is_empty());
    }

    #[test]
    fn rekey_preserves_record_and_rebinds_context() {
        let mut registry = sample();
        let before = registry.get(&id("foo/soup")).unwrap().clone();

        registry.rekey(&id("foo/soup"), id("foo/onion_soup")).unwrap();

        assert!(!registry.contains(&id("foo/soup")));
        let after = registry.get(&id("foo/onion_soup")).unwrap();
        assert_eq!(after.kind(), before.kind());
        assert_eq!(after.tracked_files(), before.tracked_files());
        assert_eq!(after.context().text("module_name"), Some("onion_soup"));
    }

    #[test]
    fn rekey_onto_existing_id_fails_without_changes() {
        let mut registry = sample();
        let snapshot = registry.clone();
        assert!(registry.rekey(&id("foo/soup"), id("foo2")).is_err());
        assert_eq!(registry, snapshot);
    }

    #[test]
    fn subtree_includes_root_and_descendants_only() {
        let registry = sample();
        assert_eq!(registry.subtree(&id("foo")), vec![id("foo"), id("foo/soup")]);
        assert_eq!(registry.subtree(&id("foo2")), vec![id("foo2")]);
    }

    #[test]
    fn registry_serializes_as_object_keyed_by_id() {
        let registry = sample();
        let json = serde_json::to_value(&registry).unwrap();
        assert!(json.get("foo/soup").is_some());
        assert_eq!(json["app"]["kind-flags"]["cli"], true);

        let back: Registry = serde_json::from_value(json).unwrap();
        assert_eq!(back, registry);
    }
}
