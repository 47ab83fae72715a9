//! Build lifecycle facade
//!
//! Thin composition of the configuration resolver and the process
//! supervisor: one entry point per build lifecycle action, each resolving
//! the toolchain, building the delegated argument list, supervising the run
//! and mapping its result to a status transition. The facade owns no retry
//! logic; a failed build simply reports failure.

use crate::reporter::{BuildReporter, BuildStatus};
use crate::supervisor::{ProcessSupervisor, ResolvedInvocation, RunResult};
use crate::{BuildError, BuildResult};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tieforge_config::resolver;
use tieforge_config::CompileRequest;
use tracing::info;

/// Default interval before a terminal status reverts to idle
const DEFAULT_STATUS_REVERT: Duration = Duration::from_secs(5);

/// Entry point for build lifecycle operations
///
/// Constructed once per session; the supervisor handle it owns is the only
/// process state in the system.
pub struct BuildFacade {
    project_dir: PathBuf,
    supervisor: ProcessSupervisor,
    reporter: Arc<dyn BuildReporter>,
    status_revert: Duration,
}

impl BuildFacade {
    pub fn new(project_dir: impl Into<PathBuf>, reporter: Arc<dyn BuildReporter>) -> Self {
        Self {
            project_dir: project_dir.into(),
            supervisor: ProcessSupervisor::new(),
            reporter,
            status_revert: DEFAULT_STATUS_REVERT,
        }
    }

    /// Override the terminal-status display interval
    pub fn with_status_revert(mut self, interval: Duration) -> Self {
        self.status_revert = interval;
        self
    }

    /// Project root this facade operates on
    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    /// Supervisor handle, for callers that need `stop()`
    pub fn supervisor(&self) -> &ProcessSupervisor {
        &self.supervisor
    }

    /// Compile the project
    pub async fn compile(&self, request: CompileRequest) -> BuildResult<RunResult> {
        self.run_build("compile", request).await
    }

    /// Clean and build the project
    pub async fn full_build(&self, request: CompileRequest) -> BuildResult<RunResult> {
        self.run_build("build", request).await
    }

    /// Remove build artifacts
    pub async fn clean(&self) -> BuildResult<RunResult> {
        self.run_plain("clean", Vec::new()).await
    }

    /// Precompile the project sources
    pub async fn precompile(&self) -> BuildResult<RunResult> {
        self.run_plain("precompile", Vec::new()).await
    }

    /// Scaffold a new project through the build tool
    pub async fn create_project(&self, name: &str) -> BuildResult<RunResult> {
        self.run_plain("create", vec![name.to_string()]).await
    }

    /// Scaffold a new plugin through the build tool
    pub async fn create_plugin(&self, name: &str) -> BuildResult<RunResult> {
        self.run_plain("plugin", vec![name.to_string()]).await
    }

    /// Print the toolchain version
    pub async fn version(&self) -> BuildResult<RunResult> {
        self.run_plain("version", Vec::new()).await
    }

    /// Print the build tool's own help
    pub async fn help(&self) -> BuildResult<RunResult> {
        self.run_plain("help", Vec::new()).await
    }

    /// Compile/build path: merge settings, fill the toolchain directory and
    /// emit the delegated flag subset.
    async fn run_build(&self, subcommand: &str, mut request: CompileRequest) -> BuildResult<RunResult> {
        let settings = resolver::read_settings(&self.project_dir);
        let build_tool = self.require_build_tool(settings.as_ref())?;

        if request.toolchain_dir.is_none() {
            request.toolchain_dir = resolver::resolve_toolchain_dir(&self.project_dir);
        }

        let effective = resolver::merge_compile_request(settings.as_ref(), &request);
        let mut args = vec![subcommand.to_string()];
        args.extend(resolver::build_tool_arguments(&effective, &self.project_dir));

        let cwd = effective
            .working_dir
            .clone()
            .unwrap_or_else(|| self.project_dir.clone());

        self.execute(ResolvedInvocation::new(build_tool, args, cwd))
            .await
    }

    /// Non-compile path: just the subcommand and its positional arguments.
    async fn run_plain(&self, subcommand: &str, extra: Vec<String>) -> BuildResult<RunResult> {
        let settings = resolver::read_settings(&self.project_dir);
        let build_tool = self.require_build_tool(settings.as_ref())?;

        let mut args = vec![subcommand.to_string()];
        args.extend(extra);

        self.execute(ResolvedInvocation::new(build_tool, args, self.project_dir.clone()))
            .await
    }

    fn require_build_tool(
        &self,
        settings: Option<&tieforge_config::ProjectBuildSettings>,
    ) -> BuildResult<PathBuf> {
        match resolver::resolve_build_tool(&self.project_dir, settings) {
            Some(tool) => Ok(tool),
            None => {
                self.reporter.notify_configuration_missing();
                Err(BuildError::ConfigurationMissing)
            }
        }
    }

    async fn execute(&self, invocation: ResolvedInvocation) -> BuildResult<RunResult> {
        info!(
            executable = %invocation.executable.display(),
            args = ?invocation.args,
            cwd = %invocation.cwd.display(),
            "starting toolchain run"
        );
        self.reporter.report_status(BuildStatus::Running);

        let result = self.supervisor.run(invocation, self.reporter.as_ref()).await;

        let status = match &result {
            Ok(run) if run.succeeded => BuildStatus::Succeeded,
            _ => BuildStatus::Failed,
        };
        self.reporter.report_status(status);
        self.schedule_status_revert();

        result
    }

    /// Terminal statuses auto-revert to idle after the display interval so
    /// the system never appears stuck.
    fn schedule_status_revert(&self) {
        let reporter = Arc::clone(&self.reporter);
        let interval = self.status_revert;
        tokio::spawn(async move {
            tokio::time::sleep(interval).await;
            reporter.report_status(BuildStatus::Idle);
        });
    }
}
