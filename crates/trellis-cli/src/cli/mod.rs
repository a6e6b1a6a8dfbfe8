//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums. No business logic lives here.

use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};
use trellis_core::domain::{ComponentKind, ReplaceMode};

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "trellis",
    bin_name = "trellis",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Scaffold Python packages and keep their components in shape",
    long_about = "Trellis creates Python project skeletons, adds modules, packages, \
                  binary extensions and CLIs from templates, and renames, moves or \
                  removes them again while keeping every reference in sync.",
    after_help = "EXAMPLES:\n\
        \x20 trellis create BAR\n\
        \x20 trellis -p BAR add foo --py\n\
        \x20 trellis -p BAR add foo/soup --py\n\
        \x20 trellis -p BAR mv foo/soup onion_soup\n\
        \x20 trellis -p BAR mv foo/onion_soup          # remove\n\
        \x20 trellis completions bash > /usr/share/bash-completion/completions/trellis",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create a new project.
    #[command(
        about = "Create a new Python project",
        after_help = "EXAMPLES:\n\
            \x20 trellis create BAR                      # package 'bar'\n\
            \x20 trellis create my-tool --dir ~/work     # package 'my_tool'\n\
            \x20 trellis create BAR --package-name barlib"
    )]
    Create(CreateArgs),

    /// Add a component to the project.
    #[command(
        about = "Add a component",
        after_help = "EXAMPLES:\n\
            \x20 trellis add foo --py           # Python module bar/foo\n\
            \x20 trellis add foo/soup --package # nested Python package\n\
            \x20 trellis add fast --cpp         # C++ binary extension\n\
            \x20 trellis add app --cli          # CLI bar/cli/app.py"
    )]
    Add(AddArgs),

    /// Rename, move or remove a component.
    #[command(
        about = "Rename, move or remove a component",
        long_about = "Rename, move or remove a component.\n\n\
            With no DESTINATION the component (and everything nested in it) is \
            removed. When DESTINATION is a registered component the component is \
            moved into it; otherwise it is renamed to DESTINATION within its \
            current namespace.",
        after_help = "EXAMPLES:\n\
            \x20 trellis mv foo/soup onion_soup   # rename\n\
            \x20 trellis mv foo/soup foo2         # move into foo2\n\
            \x20 trellis mv foo/soup --yes        # remove without asking"
    )]
    Mv(MvArgs),

    /// List registered components.
    #[command(
        visible_alias = "ls",
        about = "List registered components",
        after_help = "EXAMPLES:\n\
            \x20 trellis list\n\
            \x20 trellis list --format json"
    )]
    List(ListArgs),

    /// List available templates.
    #[command(about = "List built-in and user templates")]
    Templates(TemplatesArgs),

    /// Show one registered component.
    #[command(about = "Show a component's registry record")]
    Info(InfoArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 trellis completions bash > ~/.local/share/bash-completion/completions/trellis\n\
            \x20 trellis completions zsh  > ~/.zfunc/_trellis\n\
            \x20 trellis completions fish > ~/.config/fish/completions/trellis.fish"
    )]
    Completions(CompletionsArgs),

    /// Manage the Trellis configuration.
    #[command(
        about = "Configuration management",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 trellis config init\n\
            \x20 trellis config get defaults.author_full_name\n\
            \x20 trellis config list"
    )]
    Config(ConfigCommands),
}

// ── create ────────────────────────────────────────────────────────────────────

/// Arguments for `trellis create`.
#[derive(Debug, Args)]
pub struct CreateArgs {
    #[arg(value_name = "PROJECT_NAME", help = "Name of the project directory")]
    pub name: String,

    /// Parent directory of the new project.
    #[arg(
        long = "dir",
        value_name = "DIR",
        help = "Where to create the project (default: current directory)"
    )]
    pub dir: Option<PathBuf>,

    #[arg(
        long = "package-name",
        value_name = "NAME",
        help = "Top-level package name (default: derived from PROJECT_NAME)"
    )]
    pub package_name: Option<String>,

    #[arg(
        long = "allow-nesting",
        help = "Allow creating a project inside another project"
    )]
    pub allow_nesting: bool,
}

// ── add ───────────────────────────────────────────────────────────────────────

/// Arguments for `trellis add`. Exactly one kind flag is required.
#[derive(Debug, Args)]
#[command(group(
    ArgGroup::new("kind")
        .required(true)
        .multiple(false)
        .args(["py", "package", "f90", "cpp", "cli", "clisub"])
))]
pub struct AddArgs {
    #[arg(
        value_name = "NAME",
        help = "Component identifier, e.g. foo or foo/soup"
    )]
    pub name: String,

    #[arg(long, help = "Python module")]
    pub py: bool,

    #[arg(long, help = "Python package with a core module")]
    pub package: bool,

    #[arg(long, help = "Fortran binary extension module")]
    pub f90: bool,

    #[arg(long, help = "C++ binary extension module")]
    pub cpp: bool,

    #[arg(long, help = "CLI with a single command")]
    pub cli: bool,

    #[arg(long, help = "CLI with sub-commands")]
    pub clisub: bool,

    #[arg(long, help = "Write over untracked files at the component's location")]
    pub overwrite: bool,
}

impl AddArgs {
    /// The selected kind. clap guarantees exactly one flag is set.
    pub fn kind(&self) -> Option<ComponentKind> {
        let flags = [
            (self.py, ComponentKind::PythonModule),
            (self.package, ComponentKind::PythonPackage),
            (self.f90, ComponentKind::FortranExtension),
            (self.cpp, ComponentKind::CppExtension),
            (self.cli, ComponentKind::CliSingleCommand),
            (self.clisub, ComponentKind::CliWithSubcommands),
        ];
        flags
            .into_iter()
            .find_map(|(set, kind)| set.then_some(kind))
    }
}

// ── mv ────────────────────────────────────────────────────────────────────────

/// Arguments for `trellis mv`.
#[derive(Debug, Args)]
pub struct MvArgs {
    #[arg(value_name = "COMPONENT", help = "Registered component identifier")]
    pub component: String,

    #[arg(
        value_name = "DESTINATION",
        help = "New name, or a registered component to move into; omit to remove"
    )]
    pub destination: Option<String>,

    #[arg(
        short = 'y',
        long = "yes",
        visible_alias = "silent",
        help = "Do not ask for confirmation"
    )]
    pub yes: bool,

    #[arg(
        long = "match",
        value_enum,
        value_name = "MODE",
        help = "How old names are matched in file names and contents"
    )]
    pub match_mode: Option<MatchMode>,
}

/// How the old name is recognised during rename and move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MatchMode {
    /// Every occurrence, also inside longer words.
    Substring,
    /// Only occurrences that are not part of a longer identifier.
    Identifier,
}

impl From<MatchMode> for ReplaceMode {
    fn from(mode: MatchMode) -> Self {
        match mode {
            MatchMode::Substring => ReplaceMode::Substring,
            MatchMode::Identifier => ReplaceMode::Identifier,
        }
    }
}

// ── list / info ───────────────────────────────────────────────────────────────

/// Arguments for `trellis list`.
#[derive(Debug, Args)]
pub struct ListArgs {
    #[arg(
        long = "format",
        value_enum,
        default_value = "table",
        help = "Output format"
    )]
    pub format: ListFormat,
}

/// Output format for the `list` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListFormat {
    /// Human-readable table.
    Table,
    /// One identifier per line.
    List,
    /// JSON array.
    Json,
    /// CSV rows.
    Csv,
}

/// Arguments for `trellis templates`.
#[derive(Debug, Args)]
pub struct TemplatesArgs {
    #[arg(
        long = "format",
        value_enum,
        default_value = "table",
        help = "Output format"
    )]
    pub format: ListFormat,
}

/// Arguments for `trellis info`.
#[derive(Debug, Args)]
pub struct InfoArgs {
    #[arg(value_name = "COMPONENT", help = "Registered component identifier")]
    pub component: String,
}

// ── completions ───────────────────────────────────────────────────────────────

/// Arguments for `trellis completions`.
#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── config subcommands ────────────────────────────────────────────────────────

/// Subcommands for `trellis config`.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the value of a configuration key.
    Get {
        /// Dotted key path, e.g. `rename.mode`.
        key: String,
    },
    /// Print all configuration values.
    List,
    /// Print the path to the user configuration file.
    Path,
    /// Write a configuration file with the default values.
    Init {
        /// Write `.trellis.toml` in the current directory instead.
        #[arg(long = "local", help = "Create local configuration in current directory")]
        local: bool,

        /// Overwrite an existing config file.
        #[arg(short = 'f', long = "force", help = "Overwrite existing configuration")]
        force: bool,
    },
}

// ── tests ─────────────────────────────────────────────────────────────────────
