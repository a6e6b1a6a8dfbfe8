//! Implementation of the `trellis templates` command.

use crate::{
    cli::{ListFormat, TemplatesArgs, global::GlobalArgs},
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

pub fn execute(
    args: TemplatesArgs,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let service = super::scaffold_service(&global, &config)?;
    let templates = service.list_templates()?;

    match args.format {
        ListFormat::Table => {
            output.header("Available Templates:")?;
            let width = templates.iter().map(|t| t.id.len()).max().unwrap_or(0);
            for t in &templates {
                output.data(&format!("  {:<width$}  {}", t.id, t.description))?;
            }
        }
        ListFormat::List => {
            for t in &templates {
                output.data(&t.id)?;
            }
        }
        ListFormat::Json => {
            let docs: Vec<_> = templates
                .iter()
                .map(|t| {
                    serde_json::json!({
                        "id": t.id,
                        "description": t.description,
                        "parameters": t.parameters,
                    })
                })
                .collect();
            output.json(&docs)?;
        }
        ListFormat::Csv => {
            output.data("id,description")?;
            for t in &templates {
                output.data(&format!(
                    "{},{}",
                    super::list::csv_field(&t.id),
                    super::list::csv_field(&t.description)
                ))?;
            }
        }
    }

    Ok(())
}
