//! Literal text replacement used for file names and file contents.
//!
//! The default [`ReplaceMode::Substring`] replaces every occurrence of the
//! old literal, including inside longer identifiers (renaming `app` also
//! touches `application`). [`ReplaceMode::Identifier`] only replaces
//! occurrences that are not embedded in a longer identifier.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use regex::{NoExpand, Regex};
use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplaceMode {
    #[default]
    Substring,
    Identifier,
}

/// Result of a replacement: the new text and how many occurrences changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replaced<'a> {
    pub text: Cow<'a, str>,
    pub count: usize,
}

impl Replaced<'_> {
    pub fn changed(&self) -> bool {
        self.count > 0
    }
}

impl ReplaceMode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Substring => "substring",
            Self::Identifier => "identifier",
        }
    }

    /// Replace every occurrence of `old` in `text` with `new`.
    ///
    /// An empty `old` never matches.
    pub fn replace_literal_occurrences<'a>(
        self,
        text: &'a str,
        old: &str,
        new: &str,
    ) -> Result<Replaced<'a>, DomainError> {
        if old.is_empty() {
            return Ok(Replaced {
                text: Cow::Borrowed(text),
                count: 0,
            });
        }

        match self {
            Self::Substring => {
                let count = text.matches(old).count();
                let text = if count == 0 {
                    Cow::Borrowed(text)
                } else {
                    Cow::Owned(text.replace(old, new))
                };
                Ok(Replaced { text, count })
            }
            Self::Identifier => {
                let pattern = identifier_pattern(old)?;
                let count = pattern.find_iter(text).count();
                let text = pattern.replace_all(text, NoExpand(new));
                Ok(Replaced { text, count })
            }
        }
    }

    /// Whether `text` contains at least one replaceable occurrence of `old`.
    pub fn contains(self, text: &str, old: &str) -> Result<bool, DomainError> {
        if old.is_empty() {
            return Ok(false);
        }
        match self {
            Self::Substring => Ok(text.contains(old)),
            Self::Identifier => Ok(identifier_pattern(old)?.is_match(text)),
        }
    }
}

/// `\b` is only meaningful next to a word character, so boundaries are
/// anchored only on the ends of `literal` that are word characters.
fn identifier_pattern(literal: &str) -> Result<Regex, DomainError> {
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    let leading = literal.chars().next().is_some_and(is_word);
    let trailing = literal.chars().last().is_some_and(is_word);

    let pattern = format!(
        "{}{}{}",
        if leading { r"\b" } else { "" },
        regex::escape(literal),
        if trailing { r"\b" } else { "" },
    );

    Regex::new(&pattern).map_err(|e| DomainError::InvalidPattern {
        literal: literal.to_string(),
        reason: e.to_string(),
    })
}

impl fmt::Display for ReplaceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReplaceMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "substring" => Ok(Self::Substring),
            "identifier" | "whole-identifier" | "word" => Ok(Self::Identifier),
            other => Err(format!(
                "unknown match mode '{}' (expected 'substring' or 'identifier')",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substring_mode_replaces_inside_longer_words() {
        let out = ReplaceMode::Substring
            .replace_literal_occurrences("app = application", "app", "tool")
            .unwrap();
        assert_eq!(out.text, "tool = toollication");
        assert_eq!(out.count, 2);
    }

    #[test]
    fn identifier_mode_leaves_longer_words_alone() {
        let out = ReplaceMode::Identifier
            .replace_literal_occurrences("app = application; import app", "app", "tool")
            .unwrap();
        assert_eq!(out.text, "tool = application; import tool");
        assert_eq!(out.count, 2);
    }

    #[test]
    fn identifier_mode_treats_dots_as_boundaries() {
        let out = ReplaceMode::Identifier
            .replace_literal_occurrences(
                "bar.foo.soup bar.food",
                "bar.foo",
                "bar.foo3",
            )
            .unwrap();
        assert_eq!(out.text, "bar.foo3.soup bar.food");
    }

    #[test]
    fn identifier_mode_handles_non_word_edges() {
        let text = "[project.scripts]\napp = \"bar.cli.app:main\"\n";
        let out = ReplaceMode::Identifier
            .replace_literal_occurrences(text, "app = \"bar.cli.app:main\"", "")
            .unwrap();
        assert_eq!(out.text, "[project.scripts]\n\n");
    }

    #[test]
    fn empty_literal_never_matches() {
        let out = ReplaceMode::Substring
            .replace_literal_occurrences("abc", "", "x")
            .unwrap();
        assert_eq!(out.text, "abc");
        assert!(!out.changed());
        assert!(!ReplaceMode::Identifier.contains("abc", "").unwrap());
    }

    #[test]
    fn replacement_text_is_not_expanded() {
        let out = ReplaceMode::Identifier
            .replace_literal_occurrences("soup", "soup", "$1_soup")
            .unwrap();
        assert_eq!(out.text, "$1_soup");
    }

    #[test]
    fn mode_parses_aliases() {
        assert_eq!("Identifier".parse::<ReplaceMode>().unwrap(), ReplaceMode::Identifier);
        assert_eq!("substring".parse::<ReplaceMode>().unwrap(), ReplaceMode::Substring);
        assert!("fuzzy".parse::<ReplaceMode>().is_err());
    }
}
