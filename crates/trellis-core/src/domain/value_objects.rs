//! Domain value objects: ComponentKind, ComponentLayout, KindFlags.
//!
//! These are pure value types, equality-by-value, no identity. They define
//! the component kinds, their string representations and parsers, and the
//! flag set through which a kind is persisted.

use crate::domain::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ── ComponentKind ────────────────────────────────────────────────────────────

/// The category of a scaffolded component. Exactly one applies to every
/// registered component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComponentKind {
    PythonModule,
    PythonPackage,
    FortranExtension,
    CppExtension,
    CliSingleCommand,
    CliWithSubcommands,
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 6] = [
        Self::PythonModule,
        Self::PythonPackage,
        Self::FortranExtension,
        Self::CppExtension,
        Self::CliSingleCommand,
        Self::CliWithSubcommands,
    ];

    /// The command-line flag that selects this kind (without dashes).
    pub const fn flag(&self) -> &'static str {
        match self {
            Self::PythonModule => "py",
            Self::PythonPackage => "package",
            Self::FortranExtension => "f90",
            Self::CppExtension => "cpp",
            Self::CliSingleCommand => "cli",
            Self::CliWithSubcommands => "clisub",
        }
    }

    /// Human-readable description used in operation log lines.
    pub const fn description(&self) -> &'static str {
        match self {
            Self::PythonModule => "Python module",
            Self::PythonPackage => "Python package",
            Self::FortranExtension => "Fortran binary extension module",
            Self::CppExtension => "C++ binary extension module",
            Self::CliSingleCommand => "CLI",
            Self::CliWithSubcommands => "CLI with subcommands",
        }
    }

    /// Name of the builtin template that scaffolds this kind.
    pub const fn template_name(&self) -> &'static str {
        match self {
            Self::PythonModule => "module-py",
            Self::PythonPackage => "package-py",
            Self::FortranExtension => "module-f90",
            Self::CppExtension => "module-cpp",
            Self::CliSingleCommand => "app-single-command",
            Self::CliWithSubcommands => "app-sub-commands",
        }
    }

    pub const fn layout(&self) -> ComponentLayout {
        match self {
            Self::CliSingleCommand | Self::CliWithSubcommands => ComponentLayout::CliLike,
            _ => ComponentLayout::TreeLike,
        }
    }

    /// Whether other components may be nested under this one.
    pub const fn can_contain_components(&self) -> bool {
        matches!(self, Self::PythonModule | Self::PythonPackage)
    }

    pub const fn is_cli(&self) -> bool {
        matches!(self.layout(), ComponentLayout::CliLike)
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

impl FromStr for ComponentKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().trim_start_matches('-').to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|k| k.flag() == normalized)
            .ok_or_else(|| DomainError::KindConflict {
                flags: vec![normalized],
            })
    }
}

// ── ComponentLayout ──────────────────────────────────────────────────────────

/// Where a component's files live relative to the package root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentLayout {
    /// A directory named after the component, nested according to its
    /// identifier, mirrored under `tests/<package>/`.
    TreeLike,
    /// A single `<name>.py` in the package's `cli` directory with a
    /// `test_<name>.py` mirror.
    CliLike,
}

// ── KindFlags ────────────────────────────────────────────────────────────────

/// Persisted form of a [`ComponentKind`]: one boolean per kind.
///
/// Exactly one flag must be true; [`ComponentKind::try_from`] enforces it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KindFlags {
    pub py: bool,
    pub package: bool,
    pub f90: bool,
    pub cpp: bool,
    pub cli: bool,
    pub clisub: bool,
}

impl KindFlags {
    fn selected(&self) -> Vec<ComponentKind> {
        let flags = [
            self.py,
            self.package,
            self.f90,
            self.cpp,
            self.cli,
            self.clisub,
        ];
        ComponentKind::ALL
            .into_iter()
            .zip(flags)
            .filter_map(|(kind, set)| set.then_some(kind))
            .collect()
    }
}

impl From<ComponentKind> for KindFlags {
    fn from(kind: ComponentKind) -> Self {
        let mut flags = KindFlags::default();
        match kind {
            ComponentKind::PythonModule => flags.py = true,
            ComponentKind::PythonPackage => flags.package = true,
            ComponentKind::FortranExtension => flags.f90 = true,
            ComponentKind::CppExtension => flags.cpp = true,
            ComponentKind::CliSingleCommand => flags.cli = true,
            ComponentKind::CliWithSubcommands => flags.clisub = true,
        }
        flags
    }
}

impl TryFrom<KindFlags> for ComponentKind {
    type Error = DomainError;

    fn try_from(flags: KindFlags) -> Result<Self, Self::Error> {
        match flags.selected().as_slice() {
            [kind] => Ok(*kind),
            selected => Err(DomainError::KindConflict {
                flags: selected.iter().map(|k| k.flag().to_string()).collect(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_round_trips_through_flags() {
        for kind in ComponentKind::ALL {
            let flags = KindFlags::from(kind);
            assert_eq!(ComponentKind::try_from(flags).unwrap(), kind);
        }
    }

    #[test]
    fn no_flags_is_a_conflict() {
        let err = ComponentKind::try_from(KindFlags::default()).unwrap_err();
        assert_eq!(err, DomainError::KindConflict { flags: vec![] });
    }

    #[test]
    fn two_flags_is_a_conflict() {
        let flags = KindFlags {
            py: true,
            cli: true,
            ..KindFlags::default()
        };
        let err = ComponentKind::try_from(flags).unwrap_err();
        assert_eq!(
            err,
            DomainError::KindConflict {
                flags: vec!["py".into(), "cli".into()]
            }
        );
    }

    #[test]
    fn cli_kinds_use_cli_layout() {
        assert_eq!(ComponentKind::CliSingleCommand.layout(), ComponentLayout::CliLike);
        assert_eq!(ComponentKind::CliWithSubcommands.layout(), ComponentLayout::CliLike);
        assert_eq!(ComponentKind::CppExtension.layout(), ComponentLayout::TreeLike);
    }

    #[test]
    fn only_python_kinds_contain_components() {
        assert!(ComponentKind::PythonModule.can_contain_components());
        assert!(ComponentKind::PythonPackage.can_contain_components());
        assert!(!ComponentKind::FortranExtension.can_contain_components());
        assert!(!ComponentKind::CliSingleCommand.can_contain_components());
    }

    #[test]
    fn kind_parses_from_flag_names() {
        assert_eq!("--f90".parse::<ComponentKind>().unwrap(), ComponentKind::FortranExtension);
        assert_eq!("Package".parse::<ComponentKind>().unwrap(), ComponentKind::PythonPackage);
        assert!("rust".parse::<ComponentKind>().is_err());
    }
}
