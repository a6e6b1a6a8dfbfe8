//! Implementation of the `trellis info` command.

use trellis_core::domain::ReplaceMode;

use crate::{
    cli::{InfoArgs, OutputFormat, global::GlobalArgs},
    error::CliResult,
    output::OutputManager,
};

pub fn execute(args: InfoArgs, global: GlobalArgs, output: OutputManager) -> CliResult<()> {
    let mut project = super::open_project(&global)?;
    let service = super::component_service(ReplaceMode::default());
    let info = service.info(&mut project, &args.component)?;

    if output.format() == OutputFormat::Json {
        output.json(&info)?;
        return Ok(());
    }

    output.header(&info.id)?;
    output.data(&format!("  kind:    {} (--{})", info.kind, info.flag))?;
    output.data(&format!("  source:  {}", info.source))?;
    output.data(&format!("  test:    {}", info.test))?;
    output.data(&format!("  module:  {}", info.module))?;
    if !info.tracked_files.is_empty() {
        output.data("  tracked files:")?;
        for (path, literal) in &info.tracked_files {
            output.data(&format!("    {path}: {literal}"))?;
        }
    }
    Ok(())
}
