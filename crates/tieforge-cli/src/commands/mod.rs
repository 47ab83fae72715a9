//! Command implementations
//!
//! Each command resolves a [`BuildFacade`] over the project directory,
//! delegates to it, and maps the run outcome to an exit code. Output
//! rendering lives in the reporter, not here.

pub mod build;
pub mod compile;
pub mod create;
pub mod tool;

use crate::reporter::ConsoleReporter;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use tieforge_build::{BuildError, BuildFacade, BuildResult, RunResult};
use tieforge_config::{CompileRequest, LogLevel, Platform};

/// Options shared by the compile and build commands
#[derive(Args, Debug)]
pub struct CompileFlags {
    /// Target platform
    #[arg(long, short = 'p', default_value = "windows")]
    pub platform: Platform,

    /// Output directory
    #[arg(long, short = 'o')]
    pub output: Option<String>,

    /// Package name
    #[arg(long)]
    pub package: Option<String>,

    /// Build in release mode
    #[arg(long, conflicts_with = "debug")]
    pub release: bool,

    /// Build in debug mode
    #[arg(long)]
    pub debug: bool,

    /// Optimization level
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=3))]
    pub optimize: Option<u8>,

    /// Compiler log level
    #[arg(long)]
    pub log_level: Option<LogLevel>,

    /// Toolchain directory override
    #[arg(long)]
    pub tiecc_dir: Option<PathBuf>,

    /// Build tool configuration file
    #[arg(long)]
    pub config: Option<String>,

    /// Rebuild on source changes
    #[arg(long, short = 'w')]
    pub watch: bool,

    /// Extra arguments forwarded to the build tool verbatim
    #[arg(last = true)]
    pub extra: Vec<String>,
}

impl CompileFlags {
    pub fn into_request(self) -> CompileRequest {
        let mut request = CompileRequest::new(self.platform);
        request.output_path = self.output;
        request.package = self.package;
        request.release = if self.release {
            Some(true)
        } else if self.debug {
            Some(false)
        } else {
            None
        };
        request.optimize = self.optimize;
        request.log_level = self.log_level;
        request.toolchain_dir = self.tiecc_dir;
        request.config_file = self.config;
        request.watch = self.watch;
        request.extra_args = self.extra;
        request
    }
}

pub(crate) fn new_facade(project_dir: PathBuf) -> Arc<BuildFacade> {
    Arc::new(BuildFacade::new(project_dir, Arc::new(ConsoleReporter)))
}

/// Wire Ctrl-C to terminate the active toolchain process
pub(crate) fn install_stop_handler(facade: &Arc<BuildFacade>) {
    let facade = Arc::clone(facade);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            facade.supervisor().stop();
        }
    });
}

/// Map a run outcome to the process exit code
///
/// A toolchain failure exits 1 without an extra error line; the reporter has
/// already rendered the transcript and terminal status.
pub(crate) fn finish(result: BuildResult<RunResult>) -> Result<()> {
    match result {
        Ok(run) if run.succeeded => Ok(()),
        Ok(run) => {
            if let Some(hint) = run.hint() {
                eprintln!("{}", hint.yellow());
            }
            std::process::exit(1);
        }
        Err(BuildError::ConfigurationMissing) => std::process::exit(1),
        Err(error) => Err(error.into()),
    }
}
