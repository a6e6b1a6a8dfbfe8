//! Implementation of the `trellis mv` command.
//!
//! Rename, move or remove, decided by the destination argument. Removal
//! asks for confirmation unless `--yes` is given.

use tracing::instrument;
use trellis_core::domain::{MvAction, ReplaceMode};

use crate::{
    cli::{MvArgs, OutputFormat, global::GlobalArgs},
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

#[instrument(skip_all, fields(component = %args.component))]
pub fn execute(
    args: MvArgs,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let mut project = super::open_project(&global)?;
    let mode = args
        .match_mode
        .map(ReplaceMode::from)
        .unwrap_or(config.rename.mode);
    let service = super::component_service(mode);

    let action = service.prepare(&mut project, &args.component, args.destination.as_deref())?;

    if let MvAction::Remove { id, .. } = &action {
        if !args.yes {
            let nested = project.registry()?.subtree(id).len().saturating_sub(1);
            if nested > 0 {
                output.warning(&format!(
                    "'{id}' contains {nested} nested component(s) that will be removed too"
                ))?;
            }
            if !output.confirm(&format!("Remove '{id}' and its files?"))? {
                return Err(CliError::Cancelled);
            }
        }
    }

    let report = service.execute(&mut project, &action)?;

    if output.format() == OutputFormat::Json {
        output.json(&serde_json::json!({
            "action": action.describe(),
            "applied": report.applied,
            "skipped": report.skipped,
        }))?;
        return Ok(());
    }

    for step in &report.applied {
        output.print(&format!("  {step}"))?;
    }
    for step in &report.skipped {
        output.warning(&format!("skipped: {step}"))?;
    }
    output.success(&capitalize(&action.describe()))?;
    Ok(())
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capitalizes_first_letter() {
        assert_eq!(capitalize("rename module 'foo'"), "Rename module 'foo'");
        assert_eq!(capitalize(""), "");
    }
}
