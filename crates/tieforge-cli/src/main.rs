use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod reporter;

use commands::CompileFlags;

/// Tieforge build driver for Tiecode projects.
///
/// Drives the external `tmake` build tool and the `tiecc` compiler behind
/// it: resolves the project's toolchain, launches builds, and renders the
/// classified output stream.
///
/// EXAMPLES:
///     tieforge compile                 Compile the current project
///     tieforge compile -p android      Compile for Android
///     tieforge build --release         Clean build in release mode
///     tieforge create my-app           Scaffold a new project
///
/// ENVIRONMENT VARIABLES:
///     TIECC_DIR         Fallback toolchain directory
///     TIEFORGE_LOG      Log filter (e.g. 'debug', 'tieforge_build=trace')
///     NO_COLOR          Set to disable colored output
#[derive(Parser)]
#[command(name = "tieforge")]
#[command(version)]
#[command(propagate_version = true)]
#[command(disable_help_subcommand = true)]
struct Cli {
    /// Project directory (defaults to the current directory)
    #[arg(long, global = true)]
    project_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile the project
    ///
    /// Resolves the project configuration, fills unset options from the
    /// build script, and delegates to the build tool's compile subcommand.
    ///
    /// EXAMPLES:
    ///     tieforge compile                    Compile with project defaults
    ///     tieforge compile -p linux           Target Linux
    ///     tieforge compile --watch            Recompile on changes
    #[command(visible_alias = "c")]
    Compile {
        #[command(flatten)]
        flags: CompileFlags,
    },

    /// Clean and build the project
    #[command(visible_alias = "b")]
    Build {
        #[command(flatten)]
        flags: CompileFlags,
    },

    /// Remove build artifacts
    Clean,

    /// Precompile the project sources
    Precompile,

    /// Scaffold a new project
    Create {
        /// Project name
        name: String,
    },

    /// Scaffold a new plugin
    Plugin {
        /// Plugin name
        name: String,
    },

    /// Print the toolchain version
    Version,

    /// Print the build tool's own help text
    Help,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("TIEFORGE_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let project_dir = match cli.project_dir {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Compile { flags } => commands::compile::run(project_dir, flags).await,
        Commands::Build { flags } => commands::build::run(project_dir, flags).await,
        Commands::Clean => commands::tool::clean(project_dir).await,
        Commands::Precompile => commands::tool::precompile(project_dir).await,
        Commands::Create { name } => commands::create::project(project_dir, &name).await,
        Commands::Plugin { name } => commands::create::plugin(project_dir, &name).await,
        Commands::Version => commands::tool::version(project_dir).await,
        Commands::Help => commands::tool::help(project_dir).await,
    }
}
