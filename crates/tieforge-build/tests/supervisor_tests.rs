//! Integration tests for process supervision and the build facade
//!
//! These spawn real processes through `sh`, so the process-level tests are
//! unix-only. The spawn-failure and configuration paths run everywhere.

use std::sync::{Arc, Mutex};
use std::time::Duration;
use tieforge_build::{
    BuildError, BuildFacade, BuildReporter, BuildStatus, FailureKind, OutputLine,
    ProcessSupervisor, ResolvedInvocation, RunState,
};
use tieforge_config::CompileRequest;

/// Reporter that records every event for later assertions
#[derive(Default)]
struct RecordingReporter {
    statuses: Mutex<Vec<BuildStatus>>,
    lines: Mutex<Vec<OutputLine>>,
    configuration_missing: Mutex<bool>,
}

impl RecordingReporter {
    fn statuses(&self) -> Vec<BuildStatus> {
        self.statuses.lock().unwrap().clone()
    }

    fn lines(&self) -> Vec<OutputLine> {
        self.lines.lock().unwrap().clone()
    }

    fn configuration_missing(&self) -> bool {
        *self.configuration_missing.lock().unwrap()
    }
}

impl BuildReporter for RecordingReporter {
    fn report_status(&self, status: BuildStatus) {
        self.statuses.lock().unwrap().push(status);
    }

    fn stream_output_line(&self, line: &OutputLine) {
        self.lines.lock().unwrap().push(line.clone());
    }

    fn notify_configuration_missing(&self) {
        *self.configuration_missing.lock().unwrap() = true;
    }
}

fn sh(script: &str, cwd: &std::path::Path) -> ResolvedInvocation {
    ResolvedInvocation::new(
        "sh",
        vec!["-c".to_string(), script.to_string()],
        cwd,
    )
}

#[tokio::test]
async fn test_spawn_failure_resolves_without_output() {
    let dir = tempfile::tempdir().unwrap();
    let supervisor = ProcessSupervisor::new();
    let reporter = RecordingReporter::default();

    let invocation = ResolvedInvocation::new(
        dir.path().join("no-such-tool"),
        vec!["compile".to_string()],
        dir.path(),
    );
    let result = supervisor.run(invocation, &reporter).await.unwrap();

    assert!(!result.succeeded);
    assert_eq!(result.exit_code, None);
    assert_eq!(result.failure, Some(FailureKind::SpawnFailed));
    assert!(reporter.lines().is_empty());
    assert_eq!(supervisor.state(), RunState::Idle);
    assert_eq!(supervisor.last_outcome(), RunState::Errored);
}

#[cfg(unix)]
#[tokio::test]
async fn test_successful_run_streams_every_line() {
    let dir = tempfile::tempdir().unwrap();
    let supervisor = ProcessSupervisor::new();
    let reporter = RecordingReporter::default();

    // Trailing line has no terminator; it must still arrive.
    let invocation = sh("printf 'Compiling a.t\\nCompiling b.t'", dir.path());
    let result = supervisor.run(invocation, &reporter).await.unwrap();

    assert!(result.succeeded);
    assert_eq!(result.exit_code, Some(0));
    assert_eq!(result.failure, None);

    let lines = reporter.lines();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].raw, "Compiling a.t");
    assert_eq!(lines[1].raw, "Compiling b.t");
    assert_eq!(supervisor.last_outcome(), RunState::Succeeded);
}

#[cfg(unix)]
#[tokio::test]
async fn test_nonzero_exit_is_a_toolchain_failure() {
    let dir = tempfile::tempdir().unwrap();
    let supervisor = ProcessSupervisor::new();
    let reporter = RecordingReporter::default();

    let invocation = sh("echo 'error: bad source' >&2; exit 2", dir.path());
    let result = supervisor.run(invocation, &reporter).await.unwrap();

    assert!(!result.succeeded);
    assert_eq!(result.exit_code, Some(2));
    assert_eq!(result.failure, Some(FailureKind::ToolchainFailure));
    assert!(result.stderr.contains("error: bad source"));
    assert_eq!(supervisor.last_outcome(), RunState::Failed);
}

#[cfg(unix)]
#[tokio::test]
async fn test_stop_terminates_the_active_run_as_failed() {
    let dir = tempfile::tempdir().unwrap();
    let supervisor = Arc::new(ProcessSupervisor::new());
    let reporter = Arc::new(RecordingReporter::default());

    let run = {
        let supervisor = Arc::clone(&supervisor);
        let reporter = Arc::clone(&reporter);
        // exec so the kill reaches the process holding the pipe
        let invocation = sh("echo started; exec sleep 30", dir.path());
        tokio::spawn(async move { supervisor.run(invocation, reporter.as_ref()).await })
    };

    // Wait until the first line proves the process is up.
    for _ in 0..200 {
        if !reporter.lines().is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(!reporter.lines().is_empty(), "process never produced output");

    supervisor.stop();
    let result = run.await.unwrap().unwrap();

    assert!(!result.succeeded);
    assert_eq!(supervisor.last_outcome(), RunState::Failed);
    assert_eq!(supervisor.state(), RunState::Idle);
}

#[cfg(unix)]
#[tokio::test]
async fn test_second_run_rejected_while_active() {
    let dir = tempfile::tempdir().unwrap();
    let supervisor = Arc::new(ProcessSupervisor::new());
    let reporter = Arc::new(RecordingReporter::default());

    let first = {
        let supervisor = Arc::clone(&supervisor);
        let reporter = Arc::clone(&reporter);
        let invocation = sh("echo up; exec sleep 30", dir.path());
        tokio::spawn(async move { supervisor.run(invocation, reporter.as_ref()).await })
    };

    for _ in 0..200 {
        if !reporter.lines().is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let second = supervisor
        .run(sh("echo second", dir.path()), reporter.as_ref())
        .await;
    assert!(matches!(second, Err(BuildError::RunInProgress)));

    supervisor.stop();
    first.await.unwrap().unwrap();
}

#[cfg(unix)]
mod facade {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    /// Drop a fake `tmake` executable into the project root that echoes its
    /// arguments and emits a short toolchain transcript.
    fn install_fake_build_tool(project_dir: &std::path::Path, exit_code: i32) {
        let tool = project_dir.join("tmake");
        fs::write(
            &tool,
            format!(
                "#!/bin/sh\necho \"args: $*\"\necho 'Compiling main.t'\necho '编译完成'\nexit {exit_code}\n"
            ),
        )
        .unwrap();
        fs::set_permissions(&tool, fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[tokio::test]
    async fn test_compile_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        install_fake_build_tool(dir.path(), 0);
        fs::write(
            dir.path().join("build.tmake"),
            "SetVariable(\"name\", \"demo\")\nSetOptimizeLevel(2)\n",
        )
        .unwrap();

        let reporter = Arc::new(RecordingReporter::default());
        let facade = BuildFacade::new(dir.path(), reporter.clone())
            .with_status_revert(Duration::from_secs(60));

        let mut request = CompileRequest::default();
        request.output_path = Some("dist/windows".to_string());
        let result = facade.compile(request).await.unwrap();

        assert!(result.succeeded);
        assert!(result.stdout.contains("args: compile --output dist/windows"));
        assert!(result.stdout.contains("编译完成"));
        assert_eq!(
            reporter.statuses(),
            vec![BuildStatus::Running, BuildStatus::Succeeded]
        );
    }

    #[tokio::test]
    async fn test_failed_build_reports_failed_status() {
        let dir = tempfile::tempdir().unwrap();
        install_fake_build_tool(dir.path(), 3);

        let reporter = Arc::new(RecordingReporter::default());
        let facade = BuildFacade::new(dir.path(), reporter.clone())
            .with_status_revert(Duration::from_secs(60));

        let result = facade.full_build(CompileRequest::default()).await.unwrap();

        assert!(!result.succeeded);
        assert_eq!(result.failure, Some(FailureKind::ToolchainFailure));
        assert_eq!(
            reporter.statuses(),
            vec![BuildStatus::Running, BuildStatus::Failed]
        );
    }

    #[tokio::test]
    async fn test_unconfigured_project_is_a_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let reporter = Arc::new(RecordingReporter::default());
        let facade = BuildFacade::new(dir.path(), reporter.clone());

        let result = facade.compile(CompileRequest::default()).await;

        assert!(matches!(result, Err(BuildError::ConfigurationMissing)));
        assert!(reporter.configuration_missing());
        assert!(reporter.statuses().is_empty());
    }

    #[tokio::test]
    async fn test_local_toolchain_dir_is_passed_relative() {
        let dir = tempfile::tempdir().unwrap();
        install_fake_build_tool(dir.path(), 0);
        fs::create_dir(dir.path().join(".tiecode")).unwrap();

        let reporter = Arc::new(RecordingReporter::default());
        let facade = BuildFacade::new(dir.path(), reporter.clone())
            .with_status_revert(Duration::from_secs(60));

        let result = facade.compile(CompileRequest::default()).await.unwrap();

        assert!(result.stdout.contains("--tiecc-dir .tiecode"));
        assert!(!result.stdout.contains(&dir.path().display().to_string()));
    }

    #[tokio::test]
    async fn test_terminal_status_reverts_to_idle() {
        let dir = tempfile::tempdir().unwrap();
        install_fake_build_tool(dir.path(), 0);

        let reporter = Arc::new(RecordingReporter::default());
        let facade = BuildFacade::new(dir.path(), reporter.clone())
            .with_status_revert(Duration::from_millis(50));

        facade.clean().await.unwrap();

        for _ in 0..100 {
            if reporter.statuses().last() == Some(&BuildStatus::Idle) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(
            reporter.statuses(),
            vec![BuildStatus::Running, BuildStatus::Succeeded, BuildStatus::Idle]
        );
    }
}
