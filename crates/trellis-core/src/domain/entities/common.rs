use super::DomainError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// A filesystem path guaranteed to be relative to the project root.
///
/// Invariant: never absolute, never escapes the root with `..`. Enforced at
/// construction. Serialized with forward slashes on every platform.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RelativePath(PathBuf);

impl RelativePath {
    /// Fallible constructor.
    pub fn try_new(path: impl Into<PathBuf>) -> Result<Self, DomainError> {
        let path = path.into();
        if path.is_absolute() || path.has_root() {
            return Err(DomainError::AbsolutePathNotAllowed {
                path: path.display().to_string(),
            });
        }

        let mut normalized = PathBuf::new();
        for component in path.components() {
            match component {
                Component::Normal(part) => normalized.push(part),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(DomainError::AbsolutePathNotAllowed {
                        path: path.display().to_string(),
                    });
                }
            }
        }

        if normalized.as_os_str().is_empty() {
            return Err(DomainError::InvalidTemplate(format!(
                "'{}' does not name a file",
                path.display()
            )));
        }
        Ok(Self(normalized))
    }

    /// Join a segment, maintaining relative invariant.
    pub fn join(&self, segment: impl AsRef<Path>) -> Result<Self, DomainError> {
        Self::try_new(self.0.join(segment))
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }

    pub fn file_name(&self) -> &str {
        self.0.file_name().and_then(|n| n.to_str()).unwrap_or("")
    }

    pub fn parent(&self) -> Option<RelativePath> {
        self.0
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(|p| Self(p.to_path_buf()))
    }

    /// Same directory, different final component.
    pub fn with_file_name(&self, name: &str) -> Result<Self, DomainError> {
        Self::try_new(self.0.with_file_name(name))
    }

    /// Forward-slash rendering, stable across platforms.
    pub fn to_slash(&self) -> String {
        self.0
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => part.to_str(),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/")
    }
}

impl AsRef<Path> for RelativePath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl TryFrom<&str> for RelativePath {
    type Error = DomainError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::try_new(s)
    }
}

impl fmt::Display for RelativePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_slash())
    }
}

impl Serialize for RelativePath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_slash())
    }
}

impl<'de> Deserialize<'de> for RelativePath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::try_new(raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_current_dir_segments() {
        let path = RelativePath::try_new("./bar/./foo/__init__.py").unwrap();
        assert_eq!(path.to_slash(), "bar/foo/__init__.py");
        assert_eq!(path.file_name(), "__init__.py");
    }

    #[test]
    fn rejects_absolute_and_escaping_paths() {
        assert!(RelativePath::try_new("/etc/passwd").is_err());
        assert!(RelativePath::try_new("../outside").is_err());
        assert!(RelativePath::try_new(".").is_err());
    }

    #[test]
    fn parent_of_top_level_file_is_none() {
        assert_eq!(RelativePath::try_new("API.rst").unwrap().parent(), None);
        assert_eq!(
            RelativePath::try_new("bar/cli/app.py").unwrap().parent(),
            Some(RelativePath::try_new("bar/cli").unwrap())
        );
    }

    #[test]
    fn with_file_name_keeps_directory() {
        let path = RelativePath::try_new("tests/bar/cli/test_app.py").unwrap();
        assert_eq!(
            path.with_file_name("test_tool.py").unwrap().to_slash(),
            "tests/bar/cli/test_tool.py"
        );
    }
}
