//! # Trellis CLI
//!
//! Scaffold Python packages and rename, move or remove their components.
//!
//! ## Startup sequence
//!
//! 1. Parse CLI arguments (clap handles `--help` / `--version` early-exit).
//! 2. Load configuration (defaults + files + env).
//! 3. Initialise the tracing subscriber, with the project operation log for
//!    commands that change an existing project.
//! 4. Build the [`OutputManager`].
//! 5. Dispatch to the appropriate command handler.
//! 6. Translate any [`CliError`] into a user-facing message and exit code.
//!
//! ## Exit codes
//!
//! | Code | Meaning                               |
//! |------|---------------------------------------|
//! |  0   | Success                               |
//! |  1   | Internal / system error               |
//! |  2   | User / input error                    |
//! |  3   | Component not found                   |
//! |  4   | Configuration or registry format error|

use std::{io::IsTerminal as _, path::PathBuf, process::ExitCode};

use clap::Parser;
use tracing::{debug, info, instrument};
use trellis_adapters::find_project_root;

use crate::{
    cli::{Cli, Commands},
    config::AppConfig,
    error::{CliError, CliResult},
    logging::init_logging,
    output::OutputManager,
};

mod cli;
mod commands;
mod config;
mod error;
mod logging;
mod output;

fn main() -> ExitCode {
    // Silently ignored if .env doesn't exist.
    let _ = dotenvy::dotenv();

    // ── 1. Parse arguments ────────────────────────────────────────────────
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version arrive here too, with exit code 0.
            let _ = e.print();
            return ExitCode::from(u8::try_from(e.exit_code()).unwrap_or(2));
        }
    };
    let verbose = cli.global.verbose > 0;

    // ── 2. Load configuration ─────────────────────────────────────────────
    let config = match AppConfig::load(cli.global.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            return handle_error(
                CliError::ConfigError {
                    message: format!("{e:#}"),
                    source: None,
                },
                verbose,
            );
        }
    };

    // ── 3. Initialise tracing ─────────────────────────────────────────────
    let log_dir = operation_log_dir(&cli, &config);
    if let Err(e) = init_logging(&cli.global, log_dir.as_deref()) {
        eprintln!("Failed to initialise logging: {e:#}");
        return ExitCode::from(1);
    }

    debug!(
        verbose = cli.global.verbose,
        quiet = cli.global.quiet,
        no_color = cli.global.no_color,
        log_dir = ?log_dir,
        "CLI started"
    );

    // ── 4. Build output manager ───────────────────────────────────────────
    let output = OutputManager::new(&cli.global, &config);

    // ── 5. Dispatch + 6. Error handling ──────────────────────────────────
    match run(cli, config, output) {
        Ok(()) => {
            info!("Trellis completed successfully");
            ExitCode::SUCCESS
        }
        Err(e) => handle_error(e, verbose),
    }
}

/// Dispatch to the correct command handler.
#[instrument(skip_all)]
fn run(cli: Cli, config: AppConfig, output: OutputManager) -> CliResult<()> {
    match cli.command {
        Commands::Create(cmd) => commands::create::execute(cmd, cli.global, config, output),
        Commands::Add(cmd) => commands::add::execute(cmd, cli.global, config, output),
        Commands::Mv(cmd) => commands::mv::execute(cmd, cli.global, config, output),
        Commands::List(cmd) => commands::list::execute(cmd, cli.global, config, output),
        Commands::Templates(cmd) => commands::templates::execute(cmd, cli.global, config, output),
        Commands::Info(cmd) => commands::info::execute(cmd, cli.global, output),
        Commands::Completions(cmd) => commands::completions::execute(cmd),
        Commands::Config(cmd) => commands::config::execute(cmd, config, output),
    }
}

/// Project root receiving `trellis.log`, for commands that change a project.
///
/// `create` has no project yet when logging starts; its files are recorded
/// from the first command run inside the new project.
fn operation_log_dir(cli: &Cli, config: &AppConfig) -> Option<PathBuf> {
    if !config.log.file || !matches!(cli.command, Commands::Add(_) | Commands::Mv(_)) {
        return None;
    }
    let start = cli.global.start_dir().ok()?;
    find_project_root(&start)
}

/// Translate a `CliError` into a user message and an appropriate exit code.
fn handle_error(err: CliError, verbose: bool) -> ExitCode {
    err.log();

    let msg = if std::io::stderr().is_terminal() {
        err.format_colored(verbose)
    } else {
        err.format_plain(verbose)
    };
    eprint!("{msg}");

    ExitCode::from(err.exit_code())
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_version_matches_cargo() {
        let cmd = Cli::command();
        assert_eq!(cmd.get_version(), Some(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn cli_has_author() {
        let cmd = Cli::command();
        assert!(cmd.get_author().is_some());
    }

    #[test]
    fn only_mutating_commands_get_an_operation_log() {
        let config = AppConfig::default();
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::write(tmp.path().join("pyproject.toml"), "").unwrap();
        let dir = tmp.path().to_str().unwrap();

        let mv = Cli::parse_from(["trellis", "-p", dir, "mv", "foo", "food"]);
        assert_eq!(operation_log_dir(&mv, &config).as_deref(), Some(tmp.path()));

        let list = Cli::parse_from(["trellis", "-p", dir, "list"]);
        assert!(operation_log_dir(&list, &config).is_none());

        let mut disabled = AppConfig::default();
        disabled.log.file = false;
        assert!(operation_log_dir(&mv, &disabled).is_none());
    }
}
