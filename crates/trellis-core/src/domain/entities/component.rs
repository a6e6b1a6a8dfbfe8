//! Component identity and the per-component record kept in the registry.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize, Serializer};
use tracing::warn;

use super::common::RelativePath;
use crate::domain::error::DomainError;
use crate::domain::value_objects::{ComponentKind, KindFlags};

// ============================================================================
// ComponentId
// ============================================================================

/// Slash-separated path of a component relative to the package root,
/// e.g. `foo/soup`. The last segment is the component's name.
///
/// Construction only normalizes structure (separators, empty segments).
/// Whether each segment is a valid Python identifier is checked by
/// `DomainValidator` where new names enter the registry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ComponentId(String);

impl ComponentId {
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let unified = raw.trim().replace('\\', "/");
        let mut segments = Vec::new();
        for segment in unified.split('/') {
            match segment {
                "" | "." => continue,
                ".." => {
                    return Err(DomainError::InvalidComponentId {
                        id: raw.to_string(),
                        reason: "'..' segments are not allowed".into(),
                    });
                }
                s => segments.push(s),
            }
        }

        if segments.is_empty() {
            return Err(DomainError::InvalidComponentId {
                id: raw.to_string(),
                reason: "identifier is empty".into(),
            });
        }
        Ok(Self(segments.join("/")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }

    /// The component's own name (last segment).
    pub fn name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    pub fn parent(&self) -> Option<ComponentId> {
        self.0
            .rsplit_once('/')
            .map(|(parent, _)| Self(parent.to_string()))
    }

    pub fn child(&self, name: &str) -> ComponentId {
        Self(format!("{}/{}", self.0, name))
    }

    /// Sibling with a different final segment.
    pub fn with_name(&self, name: &str) -> ComponentId {
        match self.parent() {
            Some(parent) => parent.child(name),
            None => Self(name.to_string()),
        }
    }

    /// True for `self == ancestor` or any identifier nested under it.
    /// Segment-aware: `foo2` is not under `foo`.
    pub fn is_within(&self, ancestor: &ComponentId) -> bool {
        self.0 == ancestor.0
            || self
                .0
                .strip_prefix(ancestor.0.as_str())
                .is_some_and(|rest| rest.starts_with('/'))
    }

    /// Replace the `old_root` prefix with `new_root`. Returns `None` when
    /// `self` is not within `old_root`.
    pub fn rebased(&self, old_root: &ComponentId, new_root: &ComponentId) -> Option<ComponentId> {
        if !self.is_within(old_root) {
            return None;
        }
        let rest = &self.0[old_root.0.len()..];
        Some(Self(format!("{}{}", new_root.0, rest)))
    }

    /// Dotted module suffix, e.g. `foo.soup`.
    pub fn dotted(&self) -> String {
        self.0.replace('/', ".")
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ComponentId {
    type Error = DomainError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw)
    }
}

impl From<ComponentId> for String {
    fn from(id: ComponentId) -> Self {
        id.0
    }
}

// ============================================================================
// Context
// ============================================================================

/// A scaffolding parameter remembered with the component.
///
/// `Runtime` values only make sense during the current invocation (an open
/// log sink, an absolute path on this machine). They are never written to
/// the registry: saving drops them with a warning.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ContextValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    List(Vec<ContextValue>),
    Map(BTreeMap<String, ContextValue>),
    #[serde(skip_deserializing)]
    Runtime(String),
}

impl ContextValue {
    pub fn is_persistable(&self) -> bool {
        !matches!(self, Self::Runtime(_))
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl Serialize for ContextValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null | Self::Runtime(_) => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Integer(i) => serializer.serialize_i64(*i),
            Self::Float(f) => serializer.serialize_f64(*f),
            Self::Text(s) => serializer.serialize_str(s),
            Self::List(items) => {
                serializer.collect_seq(items.iter().filter(|v| v.is_persistable()))
            }
            Self::Map(map) => {
                serializer.collect_map(map.iter().filter(|(_, v)| v.is_persistable()))
            }
        }
    }
}

impl From<&str> for ContextValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for ContextValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<bool> for ContextValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for ContextValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

/// Key/value parameters the component was scaffolded with.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct ComponentContext(BTreeMap<String, ContextValue>);

impl ComponentContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<ContextValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ContextValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&ContextValue> {
        self.0.get(key)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(ContextValue::as_text)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ContextValue)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Keys whose values are dropped on save.
    pub fn runtime_keys(&self) -> Vec<&str> {
        self.0
            .iter()
            .filter(|(_, v)| !v.is_persistable())
            .map(|(k, _)| k.as_str())
            .collect()
    }

    /// Point self-references at a new identifier.
    ///
    /// Text values equal to the old identifier or old name are replaced
    /// whole; dotted module paths embedding the old identifier have that
    /// part rewritten. Unrelated text is left alone.
    pub fn rebind(&mut self, old: &ComponentId, new: &ComponentId) {
        let old_dotted = old.dotted();
        let new_dotted = new.dotted();
        for value in self.0.values_mut() {
            if let ContextValue::Text(text) = value {
                if text == old.as_str() {
                    *text = new.as_str().to_string();
                } else if text == old.name() {
                    *text = new.name().to_string();
                } else if let Some(rebound) = rebind_dotted(text, &old_dotted, &new_dotted) {
                    *text = rebound;
                }
            }
        }
    }
}

/// `bar.foo.soup` with `foo.soup -> foo.onion_soup` gives `bar.foo.onion_soup`,
/// only when the match is bounded by dots or the string ends.
fn rebind_dotted(text: &str, old: &str, new: &str) -> Option<String> {
    let mut from = 0;
    while let Some(offset) = text[from..].find(old) {
        let start = from + offset;
        let end = start + old.len();
        let (head, tail) = (&text[..start], &text[end..]);
        if (head.is_empty() || head.ends_with('.')) && (tail.is_empty() || tail.starts_with('.')) {
            return Some(format!("{head}{new}{tail}"));
        }
        from = end;
    }
    None
}

impl Serialize for ComponentContext {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        for key in self.runtime_keys() {
            warn!(key, "Dropping runtime-only context value from the saved registry");
        }
        serializer.collect_map(self.0.iter().filter(|(_, v)| v.is_persistable()))
    }
}

// ============================================================================
// ComponentRecord
// ============================================================================

const KIND_FLAGS_KEY: &str = "kind-flags";
const CONTEXT_KEY: &str = "context";

/// Everything the registry knows about one component.
///
/// `tracked_files` maps project-relative paths of shared files (API
/// reference, packaging config) to the literal that was written into them
/// for this component. Removal strips the literal; renames rewrite it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RecordDocument", into = "RecordDocument")]
pub struct ComponentRecord {
    kind: ComponentKind,
    context: ComponentContext,
    tracked_files: BTreeMap<RelativePath, String>,
}

impl ComponentRecord {
    pub fn new(kind: ComponentKind, context: ComponentContext) -> Self {
        Self {
            kind,
            context,
            tracked_files: BTreeMap::new(),
        }
    }

    pub fn kind(&self) -> ComponentKind {
        self.kind
    }

    pub fn context(&self) -> &ComponentContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut ComponentContext {
        &mut self.context
    }

    pub fn tracked_files(&self) -> &BTreeMap<RelativePath, String> {
        &self.tracked_files
    }

    /// Record that `literal` was written into `path` for this component.
    pub fn track(&mut self, path: RelativePath, literal: impl Into<String>) -> Result<(), DomainError> {
        let key = path.to_slash();
        if key == KIND_FLAGS_KEY || key == CONTEXT_KEY {
            return Err(DomainError::InvalidTrackedPath {
                path: key,
                reason: "name is reserved by the registry format".into(),
            });
        }
        self.tracked_files.insert(path, literal.into());
        Ok(())
    }

    pub fn set_tracked_files(&mut self, tracked: BTreeMap<RelativePath, String>) {
        self.tracked_files = tracked;
    }
}

#[derive(Serialize, Deserialize)]
struct RecordDocument {
    #[serde(rename = "kind-flags")]
    kind_flags: KindFlags,
    #[serde(default)]
    context: ComponentContext,
    #[serde(flatten)]
    tracked: BTreeMap<String, String>,
}

impl TryFrom<RecordDocument> for ComponentRecord {
    type Error = DomainError;

    fn try_from(doc: RecordDocument) -> Result<Self, Self::Error> {
        let mut record = ComponentRecord::new(ComponentKind::try_from(doc.kind_flags)?, doc.context);
        for (path, literal) in doc.tracked {
            record.track(RelativePath::try_new(path)?, literal)?;
        }
        Ok(record)
    }
}

impl From<ComponentRecord> for RecordDocument {
    fn from(record: ComponentRecord) -> Self {
        Self {
            kind_flags: record.kind.into(),
            context: record.context,
            tracked: record
                .tracked_files
                .into_iter()
                .map(|(path, literal)| (path.to_slash(), literal))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: &str) -> ComponentId {
        ComponentId::parse(raw).unwrap()
    }

    #[test]
    fn id_normalizes_separators() {
        assert_eq!(id("foo\\soup/").as_str(), "foo/soup");
        assert_eq!(id("./foo//soup").as_str(), "foo/soup");
        assert!(ComponentId::parse("  /  ").is_err());
        assert!(ComponentId::parse("foo/../soup").is_err());
    }

    #[test]
    fn id_name_and_parent() {
        let soup = id("foo/soup");
        assert_eq!(soup.name(), "soup");
        assert_eq!(soup.parent(), Some(id("foo")));
        assert_eq!(id("foo").parent(), None);
        assert_eq!(soup.with_name("onion_soup"), id("foo/onion_soup"));
        assert_eq!(soup.dotted(), "foo.soup");
    }

    #[test]
    fn is_within_is_segment_aware() {
        assert!(id("foo/soup").is_within(&id("foo")));
        assert!(id("foo").is_within(&id("foo")));
        assert!(!id("foo2").is_within(&id("foo")));
        assert!(!id("foo").is_within(&id("foo/soup")));
    }

    #[test]
    fn rebased_swaps_prefix() {
        assert_eq!(
            id("foo/soup/stock").rebased(&id("foo/soup"), &id("foo2/soup")),
            Some(id("foo2/soup/stock"))
        );
        assert_eq!(id("bar").rebased(&id("foo"), &id("foo2")), None);
    }

    #[test]
    fn context_rebind_touches_only_self_references() {
        let mut ctx = ComponentContext::new()
            .with("component_id", "foo/soup")
            .with("module_name", "soup")
            .with("module_path", "bar.foo.soup")
            .with("description", "soup of the day")
            .with("project_name", "BAR");

        ctx.rebind(&id("foo/soup"), &id("foo/onion_soup"));

        assert_eq!(ctx.text("component_id"), Some("foo/onion_soup"));
        assert_eq!(ctx.text("module_name"), Some("onion_soup"));
        assert_eq!(ctx.text("module_path"), Some("bar.foo.onion_soup"));
        assert_eq!(ctx.text("description"), Some("soup of the day"));
        assert_eq!(ctx.text("project_name"), Some("BAR"));
    }

    #[test]
    fn context_rebind_rewrites_ancestor_segments() {
        let mut ctx = ComponentContext::new().with("module_path", "bar.foo.soup");
        ctx.rebind(&id("foo"), &id("foo3"));
        assert_eq!(ctx.text("module_path"), Some("bar.foo3.soup"));
    }

    #[test]
    fn runtime_values_are_not_serialized() {
        let ctx = ComponentContext::new()
            .with("module_name", "soup")
            .with("project_path", ContextValue::Runtime("/home/me/BAR".into()));

        let json = serde_json::to_value(&ctx).unwrap();
        assert_eq!(json, serde_json::json!({ "module_name": "soup" }));
        assert_eq!(ctx.runtime_keys(), vec!["project_path"]);
    }

    #[test]
    fn record_serializes_tracked_files_inline() {
        let mut record = ComponentRecord::new(
            ComponentKind::PythonModule,
            ComponentContext::new().with("module_name", "soup"),
        );
        record
            .track(RelativePath::try_new("API.rst").unwrap(), "bar.foo.soup")
            .unwrap();

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["kind-flags"]["py"], true);
        assert_eq!(json["kind-flags"]["cli"], false);
        assert_eq!(json["context"]["module_name"], "soup");
        assert_eq!(json["API.rst"], "bar.foo.soup");

        let back: ComponentRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn record_rejects_conflicting_kind_flags() {
        let json = serde_json::json!({
            "kind-flags": { "py": true, "cpp": true },
            "context": {}
        });
        assert!(serde_json::from_value::<ComponentRecord>(json).is_err());
    }

    #[test]
    fn reserved_names_cannot_be_tracked() {
        let mut record = ComponentRecord::new(ComponentKind::PythonModule, ComponentContext::new());
        assert!(record.track(RelativePath::try_new("context").unwrap(), "x").is_err());
    }
}
