//! Implementation of the `trellis add` command.

use tracing::instrument;
use trellis_core::application::AddOptions;

use crate::{
    cli::{AddArgs, OutputFormat, global::GlobalArgs},
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

#[instrument(skip_all, fields(component = %args.name))]
pub fn execute(
    args: AddArgs,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let kind = args.kind().ok_or_else(|| CliError::InvalidInput {
        message: "select a component kind with one of --py, --package, --f90, --cpp, --cli, --clisub"
            .into(),
    })?;

    let mut project = super::open_project(&global)?;
    let service = super::scaffold_service(&global, &config)?;
    let options = AddOptions {
        overwrite: args.overwrite,
        defaults: config.defaults.template_parameters(),
    };

    let id = service.add_component(&mut project, &args.name, kind, &options)?;

    if output.format() == OutputFormat::Json {
        output.json(&serde_json::json!({
            "id": id.as_str(),
            "kind": kind.flag(),
        }))?;
        return Ok(());
    }

    output.success(&format!("Added {kind} '{id}' to '{}'", project.name()))?;
    Ok(())
}
