//! CLI argument definitions for the migration driver.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use vetmig_model::{ModuleKind, SourceSystem};

#[derive(Parser)]
#[command(
    name = "vetmig",
    version,
    about = "Veterinary record migration - convert clinic exports to the unified import format",
    long_about = "Convert veterinary practice-management exports to the unified import format.\n\n\
                  Each client owns a configuration under the clients directory; processing runs\n\
                  the analyze, merge, organize, extract, and transform stages per module and\n\
                  writes import files plus per-bucket reports."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Directory holding per-client configurations.
    #[arg(long = "clients-dir", value_name = "DIR", default_value = "clients", global = true)]
    pub clients_dir: PathBuf,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// List configured clients and their status.
    List,

    /// Create a client configuration scaffold.
    Create(CreateArgs),

    /// Run the migration pipeline for a client.
    Process(ProcessArgs),
}

#[derive(Parser)]
pub struct CreateArgs {
    /// Client display name; the folder name is derived from it.
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Source practice-management system.
    #[arg(long = "system", value_enum)]
    pub system: SystemArg,

    /// Workbook directory with one CSV file per sheet.
    #[arg(long = "source", value_name = "DIR")]
    pub source: PathBuf,
}

#[derive(Parser)]
pub struct ProcessArgs {
    /// Client folder name under the clients directory.
    #[arg(value_name = "CLIENT")]
    pub client: String,

    /// Workbook directory, overriding the configured source path.
    #[arg(long = "source", value_name = "DIR")]
    pub source: Option<PathBuf>,

    /// Output directory (default: <client folder>/output).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Restrict the run to these modules (default: modules from the
    /// client configuration).
    #[arg(long = "modules", value_enum, value_delimiter = ',')]
    pub modules: Vec<ModuleArg>,

    /// Run the pipeline and print the summary without writing files.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum SystemArg {
    Veterinary,
    Qvet,
    Gvet,
    Cuvet,
}

impl From<SystemArg> for SourceSystem {
    fn from(arg: SystemArg) -> Self {
        match arg {
            SystemArg::Veterinary => SourceSystem::Veterinary,
            SystemArg::Qvet => SourceSystem::Qvet,
            SystemArg::Gvet => SourceSystem::Gvet,
            SystemArg::Cuvet => SourceSystem::Cuvet,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ModuleArg {
    Control,
    Consulta,
    Vacuna,
    Nota,
}

impl From<ModuleArg> for ModuleKind {
    fn from(arg: ModuleArg) -> Self {
        match arg {
            ModuleArg::Control => ModuleKind::Control,
            ModuleArg::Consulta => ModuleKind::Consulta,
            ModuleArg::Vacuna => ModuleKind::Vacuna,
            ModuleArg::Nota => ModuleKind::Nota,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
