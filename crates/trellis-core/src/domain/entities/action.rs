use super::component::ComponentId;
use super::registry::Registry;
use crate::domain::error::DomainError;
use crate::domain::value_objects::ComponentKind;

/// What `mv <component> [<destination>]` does.
///
/// | destination                         | action  |
/// |-------------------------------------|---------|
/// | absent                              | remove  |
/// | empty or blank                      | error   |
/// | a registered component identifier   | move    |
/// | anything else                       | rename  |
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MvAction {
    Remove {
        id: ComponentId,
        kind: ComponentKind,
    },
    Move {
        id: ComponentId,
        kind: ComponentKind,
        into: ComponentId,
    },
    Rename {
        id: ComponentId,
        kind: ComponentKind,
        new_name: String,
    },
}

impl MvAction {
    /// Classify the request. Only the source lookup is checked here; each
    /// action validates its own preconditions when planned.
    pub fn decide(
        registry: &Registry,
        component: &str,
        destination: Option<&str>,
    ) -> Result<Self, DomainError> {
        let id = ComponentId::parse(component)
            .map_err(|_| registry.not_found(component))?;
        let kind = registry.lookup(&id)?.kind();

        let Some(destination) = destination.map(str::trim) else {
            return Ok(Self::Remove { id, kind });
        };
        if destination.is_empty() {
            return Err(DomainError::EmptyDestination { id: id.to_string() });
        }

        let registered = ComponentId::parse(destination)
            .ok()
            .filter(|into| registry.contains(into));
        if let Some(into) = registered {
            return Ok(Self::Move { id, kind, into });
        }

        Ok(Self::Rename {
            id,
            kind,
            new_name: destination.to_string(),
        })
    }

    pub fn id(&self) -> &ComponentId {
        match self {
            Self::Remove { id, .. } | Self::Move { id, .. } | Self::Rename { id, .. } => id,
        }
    }

    pub fn kind(&self) -> ComponentKind {
        match self {
            Self::Remove { kind, .. } | Self::Move { kind, .. } | Self::Rename { kind, .. } => {
                *kind
            }
        }
    }

    pub fn is_destructive(&self) -> bool {
        matches!(self, Self::Remove { .. })
    }

    /// One-line description for confirmation prompts and summaries.
    pub fn describe(&self) -> String {
        match self {
            Self::Remove { id, kind } => format!("remove {} '{}'", kind, id),
            Self::Move { id, kind, into } => format!("move {} '{}' into '{}'", kind, id, into),
            Self::Rename { id, kind, new_name } => {
                format!("rename {} '{}' to '{}'", kind, id, new_name)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{ComponentContext, ComponentRecord};

    fn id(raw: &str) -> ComponentId {
        ComponentId::parse(raw).unwrap()
    }

    fn registry() -> Registry {
        let mut registry = Registry::new();
        for raw in ["foo", "foo/soup", "foo2"] {
            registry
                .insert(
                    id(raw),
                    ComponentRecord::new(ComponentKind::PythonModule, ComponentContext::new()),
                )
                .unwrap();
        }
        registry
    }

    #[test]
    fn no_destination_removes() {
        let action = MvAction::decide(&registry(), "foo/soup", None).unwrap();
        assert!(matches!(action, MvAction::Remove { .. }));
        assert!(action.is_destructive());
    }

    #[test]
    fn empty_destination_is_rejected() {
        for blank in ["", "  "] {
            let err = MvAction::decide(&registry(), "foo/soup", Some(blank)).unwrap_err();
            assert_eq!(
                err,
                DomainError::EmptyDestination {
                    id: "foo/soup".into()
                }
            );
        }
    }

    #[test]
    fn registered_destination_moves() {
        let action = MvAction::decide(&registry(), "foo/soup", Some("foo2")).unwrap();
        assert_eq!(
            action,
            MvAction::Move {
                id: id("foo/soup"),
                kind: ComponentKind::PythonModule,
                into: id("foo2"),
            }
        );
    }

    #[test]
    fn unregistered_destination_renames() {
        let action = MvAction::decide(&registry(), "foo/soup", Some("onion_soup")).unwrap();
        assert_eq!(
            action,
            MvAction::Rename {
                id: id("foo/soup"),
                kind: ComponentKind::PythonModule,
                new_name: "onion_soup".into(),
            }
        );
    }

    #[test]
    fn unknown_source_suggests_similar() {
        let err = MvAction::decide(&registry(), "soup", Some("onion_soup")).unwrap_err();
        assert_eq!(
            err,
            DomainError::ComponentNotFound {
                id: "soup".into(),
                suggestions: vec!["foo/soup".into()],
            }
        );
    }
}
