//! Implementation of the `trellis list` command.

use trellis_core::{application::ComponentInfo, domain::ReplaceMode};

use crate::{
    cli::{ListArgs, ListFormat, global::GlobalArgs},
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

pub fn execute(
    args: ListArgs,
    global: GlobalArgs,
    _config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let mut project = super::open_project(&global)?;
    let service = super::component_service(ReplaceMode::default());
    let components = service.list(&mut project)?;

    match args.format {
        ListFormat::Table => {
            if components.is_empty() {
                output.info(&format!("No components registered in '{}'", project.name()))?;
                return Ok(());
            }
            output.header(&format!("Components in '{}':", project.name()))?;
            for line in table_rows(&components) {
                output.data(&line)?;
            }
        }
        ListFormat::List => {
            for component in &components {
                output.data(&component.id)?;
            }
        }
        ListFormat::Json => output.json(&components)?,
        ListFormat::Csv => {
            output.data("id,kind,source,test")?;
            for c in &components {
                output.data(&[&c.id, &c.flag, &c.source, &c.test].map(|f| csv_field(f)).join(","))?;
            }
        }
    }

    Ok(())
}

fn table_rows(components: &[ComponentInfo]) -> Vec<String> {
    let id_width = components.iter().map(|c| c.id.len()).max().unwrap_or(0);
    let kind_width = components.iter().map(|c| c.kind.len()).max().unwrap_or(0);
    components
        .iter()
        .map(|c| {
            format!(
                "  {:<id_width$}  {:<kind_width$}  {}",
                c.id, c.kind, c.source
            )
        })
        .collect()
}

/// Quote a CSV field when it needs it.
pub(crate) fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use trellis_core::domain::ComponentContext;

    fn info(id: &str, kind: &str, source: &str) -> ComponentInfo {
        ComponentInfo {
            id: id.into(),
            kind: kind.into(),
            flag: "py".into(),
            source: source.into(),
            test: String::new(),
            module: String::new(),
            tracked_files: BTreeMap::new(),
            context: ComponentContext::new(),
        }
    }

    #[test]
    fn table_columns_are_aligned() {
        let rows = table_rows(&[
            info("foo", "Python module", "bar/foo"),
            info("foo/soup", "Python package", "bar/foo/soup"),
        ]);
        assert_eq!(rows[0], "  foo       Python module   bar/foo");
        assert_eq!(rows[1], "  foo/soup  Python package  bar/foo/soup");
    }

    #[test]
    fn csv_fields_are_quoted_when_needed() {
        assert_eq!(csv_field("bar/foo"), "bar/foo");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
