//! Implementation of the `trellis create` command.

use tracing::{info, instrument};
use trellis_core::application::CreateOptions;

use crate::{
    cli::{CreateArgs, OutputFormat, global::GlobalArgs},
    config::AppConfig,
    error::{CliResult, IntoCli as _},
    output::OutputManager,
};

#[instrument(skip_all, fields(project = %args.name))]
pub fn execute(
    args: CreateArgs,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let parent = match args.dir {
        Some(dir) => dir,
        None => std::env::current_dir().with_cli_context(|| "Cannot determine the current directory")?,
    };

    let service = super::scaffold_service(&global, &config)?;
    let options = CreateOptions {
        package_name: args.package_name,
        allow_nesting: args.allow_nesting,
        defaults: config.defaults.template_parameters(),
    };

    output.header(&format!("Creating '{}'...", args.name))?;
    let project = service.create_project(&args.name, &parent, &options)?;
    info!(root = %project.root().display(), "Project ready");

    if output.format() == OutputFormat::Json {
        output.json(&serde_json::json!({
            "name": project.name(),
            "package": project.package_name(),
            "root": project.root(),
        }))?;
        return Ok(());
    }

    output.success(&format!(
        "Project '{}' created with package '{}'",
        project.name(),
        project.package_name()
    ))?;
    output.print("")?;
    output.print("Next steps:")?;
    output.print(&format!("  cd {}", super::display_path(project.root())))?;
    output.print("  trellis add <name> --py")?;

    Ok(())
}
