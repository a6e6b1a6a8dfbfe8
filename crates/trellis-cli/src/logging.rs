//! Tracing subscriber initialisation.
//!
//! Only the CLI crate is allowed to call [`init_logging`]; `trellis-core`
//! and `trellis-adapters` only *emit* spans and events.
//!
//! # Verbosity mapping
//!
//! | Flag(s)  | Filter level |
//! |----------|--------------|
//! | (none)   | WARN         |
//! | `-v`     | INFO         |
//! | `-vv`    | DEBUG        |
//! | `-vvv`   | TRACE        |
//! | `--quiet`| ERROR        |
//!
//! `RUST_LOG` overrides all of the above if set.
//!
//! # Operation log
//!
//! When a project directory is known, a second layer appends INFO-and-above
//! events of the trellis crates to `<project>/trellis.log`, independent of
//! the console verbosity. Every structural mutation logs its intent before
//! it runs, so an interrupted command can be reconciled from this file.

use std::{io::IsTerminal as _, path::Path};

use anyhow::Context as _;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    EnvFilter, Layer as _, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::cli::GlobalArgs;

/// File name of the per-project operation log.
pub const OPERATION_LOG_FILE: &str = "trellis.log";

const CRATES: [&str; 3] = ["trellis", "trellis_core", "trellis_adapters"];

/// Initialise the global tracing subscriber.
///
/// Must be called exactly once, before any tracing macros fire.
/// `log_dir` is the project root when the command runs inside a project
/// and the operation log is enabled.
pub fn init_logging(args: &GlobalArgs, log_dir: Option<&Path>) -> anyhow::Result<()> {
    let level = derive_level(args);

    // RUST_LOG wins; otherwise each trellis crate gets the same level.
    let console_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(crate_directives(level)));

    let use_ansi = !args.no_color && std::io::stderr().is_terminal();

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_ansi(use_ansi)
        .with_writer(std::io::stderr)
        .with_filter(console_filter);

    let file_layer = match log_dir {
        Some(dir) => {
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::NEVER)
                .filename_prefix(OPERATION_LOG_FILE)
                .build(dir)
                .with_context(|| format!("Cannot open {}", dir.join(OPERATION_LOG_FILE).display()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_target(true)
                    .with_writer(appender)
                    .with_filter(EnvFilter::new(crate_directives("info"))),
            )
        }
        None => None,
    };

    // `try_init` returns an error instead of panicking if a subscriber is
    // already set.
    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialise tracing: {e}"))?;

    Ok(())
}

/// Translate the verbosity counter + quiet flag to a level string.
fn derive_level(args: &GlobalArgs) -> &'static str {
    if args.quiet {
        return "error";
    }
    match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn crate_directives(level: &str) -> String {
    CRATES
        .iter()
        .map(|krate| format!("{krate}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}
