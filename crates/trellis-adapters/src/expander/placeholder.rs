//! `{{tmpl.<name>}}` substitution into file names and contents.

use std::path::Path;

use trellis_core::{
    application::ports::TemplateExpander,
    domain::{
        DomainValidator as validator, ProjectStructure, RelativePath, Template, TemplateContent,
        TemplateNode, TemplateParameters,
    },
    error::TrellisResult,
};
use tracing::{instrument, trace};

/// Strict placeholder expander: every placeholder in every path and
/// parameterized content must have a value.
///
/// The whole template is rendered in memory first, so a missing parameter
/// never leaves a partially written destination behind.
pub struct PlaceholderExpander;

impl PlaceholderExpander {
    /// Create a new placeholder expander.
    pub fn new() -> Self {
        Self
    }
}

impl Default for PlaceholderExpander {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateExpander for PlaceholderExpander {
    #[instrument(skip_all, fields(template = %template.id))]
    fn expand(
        &self,
        template: &Template,
        parameters: &TemplateParameters,
        destination: &Path,
    ) -> TrellisResult<ProjectStructure> {
        validator::validate_template(template)?;

        let mut structure = ProjectStructure::new(destination);
        for node in &template.tree.nodes {
            let pattern = node.path();
            let path = RelativePath::try_new(parameters.render(pattern, pattern)?)?;
            match node {
                TemplateNode::File(spec) => {
                    let content = match &spec.content {
                        TemplateContent::Literal(source) => source.as_str().to_string(),
                        TemplateContent::Parameterized(source) => {
                            parameters.render(source.as_str(), pattern)?
                        }
                    };
                    trace!(%path, bytes = content.len(), "expanded file");
                    structure.add_file(path, content, spec.policy);
                }
                TemplateNode::Directory(_) => structure.add_directory(path),
            }
        }

        validator::validate_project_structure(&structure)?;
        Ok(structure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_core::{
        domain::{DomainError, WritePolicy},
        error::TrellisError,
    };

    fn parameters() -> TemplateParameters {
        TemplateParameters::new()
            .with("package_name", "bar")
            .with("component_path", "foo/soup")
            .with("component_name", "soup")
    }

    #[test]
    fn expands_names_and_contents() {
        let template = Template::new("module-py", "Python module")
            .with_file(
                "{{tmpl.package_name}}/{{tmpl.component_path}}/__init__.py",
                "\"\"\"Module {{ tmpl.package_name }}.{{tmpl.component_name}}\"\"\"\n",
            )
            .with_shared_file("{{tmpl.package_name}}/__init__.py", "");

        let structure = PlaceholderExpander::new()
            .expand(&template, &parameters(), Path::new("/work/BAR"))
            .unwrap();

        let files: Vec<_> = structure.files().collect();
        assert_eq!(files[0].path.to_string(), "bar/foo/soup/__init__.py");
        assert_eq!(files[0].content, "\"\"\"Module bar.soup\"\"\"\n");
        assert_eq!(files[1].policy, WritePolicy::KeepExisting);
    }

    #[test]
    fn missing_parameter_names_the_placeholder() {
        let template = Template::new("t", "t").with_file("README.md", "by {{tmpl.author_full_name}}");

        let err = PlaceholderExpander::new()
            .expand(&template, &parameters(), Path::new("/work/BAR"))
            .unwrap_err();
        match err {
            TrellisError::Domain(DomainError::MissingParameter { name, location }) => {
                assert_eq!(name, "author_full_name");
                assert_eq!(location, "README.md");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_parameter_in_file_name_fails() {
        let template = Template::new("t", "t").with_file("{{tmpl.module_name}}.py", "");
        assert!(matches!(
            PlaceholderExpander::new().expand(&template, &parameters(), Path::new("/w")),
            Err(TrellisError::Domain(DomainError::MissingParameter { .. }))
        ));
    }
}
