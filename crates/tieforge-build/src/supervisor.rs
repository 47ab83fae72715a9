//! External process supervision
//!
//! Owns at most one active toolchain process at a time. A run feeds raw
//! stdout/stderr bytes through one [`LineAssembler`] per stream, forwards
//! every assembled line to the reporter immediately, and resolves a
//! [`RunResult`] from the exit status only after both pending buffers have
//! been flushed — no line is dropped or delivered after the terminal result.
//!
//! There are no retries: every failure is terminal for its run.

use crate::reporter::BuildReporter;
use crate::stream::LineAssembler;
use crate::{BuildError, BuildResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Mutex;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tokio::sync::Notify;
use tracing::{debug, warn};

/// Run state machine
///
/// `Idle → Starting → Running → {Succeeded, Failed, Errored} → Idle`; the
/// terminal states are observable through [`ProcessSupervisor::last_outcome`]
/// while the supervisor itself returns to `Idle` after every run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Starting,
    Running,
    Succeeded,
    Failed,
    Errored,
}

/// One fully-resolved toolchain invocation
///
/// Computed by the configuration layer, immutable, consumed by exactly one
/// run.
#[derive(Debug, Clone)]
pub struct ResolvedInvocation {
    /// Executable to spawn
    pub executable: PathBuf,
    /// Argument list, already in portable form
    pub args: Vec<String>,
    /// Working directory
    pub cwd: PathBuf,
    /// Extra environment variables layered over the inherited environment
    pub env: HashMap<String, String>,
}

impl ResolvedInvocation {
    pub fn new(executable: impl Into<PathBuf>, args: Vec<String>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            args,
            cwd: cwd.into(),
            env: HashMap::new(),
        }
    }
}

/// Classification of a failed run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FailureKind {
    /// The executable could not be spawned at all
    SpawnFailed,
    /// The toolchain ran and exited non-zero
    ToolchainFailure,
    /// Exit code magnitude matching a native access violation
    NativeCrash,
}

/// Windows access-violation style exit codes observed from the toolchain.
/// The unsigned and sign-extended spellings both occur depending on how the
/// host reports the status.
const NATIVE_CRASH_CODES: [i64; 4] = [3221225477, -1073741819, 3221225781, -1073741571];

/// Terminal value of one supervised run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunResult {
    /// True only for a clean zero exit
    pub succeeded: bool,
    /// Exit code; `None` when the process never ran or died to a signal
    pub exit_code: Option<i32>,
    /// Accumulated stdout text (whole-run view; the line stream is separate)
    pub stdout: String,
    /// Accumulated stderr text
    pub stderr: String,
    /// Failure classification, `None` on success
    pub failure: Option<FailureKind>,
}

impl RunResult {
    fn from_exit(exit_code: Option<i32>, stopped: bool, stdout: String, stderr: String) -> Self {
        let succeeded = exit_code == Some(0) && !stopped;
        let failure = if succeeded {
            None
        } else if NATIVE_CRASH_CODES.contains(&i64::from(exit_code.unwrap_or(0))) {
            Some(FailureKind::NativeCrash)
        } else {
            Some(FailureKind::ToolchainFailure)
        };
        Self {
            succeeded,
            exit_code,
            stdout,
            stderr,
            failure,
        }
    }

    fn spawn_failed(message: String) -> Self {
        Self {
            succeeded: false,
            exit_code: None,
            stdout: String::new(),
            stderr: message,
            failure: Some(FailureKind::SpawnFailed),
        }
    }

    /// Diagnostic hint for distinguishable failure classes
    pub fn hint(&self) -> Option<&'static str> {
        match self.failure {
            Some(FailureKind::NativeCrash) => Some(
                "the toolchain crashed with an access violation; check that its \
                 shared libraries are present next to the executable",
            ),
            _ => None,
        }
    }
}

/// Supervisor for the single active toolchain process
///
/// Constructed once per session and passed by handle to every operation;
/// there is no module-level shared process state.
pub struct ProcessSupervisor {
    state: Mutex<RunState>,
    last_outcome: Mutex<RunState>,
    stop: Notify,
}

impl ProcessSupervisor {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RunState::Idle),
            last_outcome: Mutex::new(RunState::Idle),
            stop: Notify::new(),
        }
    }

    /// Current state
    pub fn state(&self) -> RunState {
        *self.state.lock().expect("supervisor state lock")
    }

    /// Terminal state of the most recent run
    pub fn last_outcome(&self) -> RunState {
        *self.last_outcome.lock().expect("supervisor outcome lock")
    }

    fn transition(&self, next: RunState) {
        let mut state = self.state.lock().expect("supervisor state lock");
        debug!(from = ?*state, to = ?next, "run state transition");
        if matches!(
            next,
            RunState::Succeeded | RunState::Failed | RunState::Errored
        ) {
            *self.last_outcome.lock().expect("supervisor outcome lock") = next;
            *state = RunState::Idle;
        } else {
            *state = next;
        }
    }

    /// Run one invocation to completion
    ///
    /// Rejects with [`BuildError::RunInProgress`] while another run is
    /// active; two runs' output streams are never interleaved. A spawn
    /// failure is not an `Err`: it resolves to a `RunResult` with
    /// [`FailureKind::SpawnFailed`], no exit code and zero output lines.
    pub async fn run(
        &self,
        invocation: ResolvedInvocation,
        reporter: &dyn BuildReporter,
    ) -> BuildResult<RunResult> {
        {
            let mut state = self.state.lock().expect("supervisor state lock");
            if !matches!(*state, RunState::Idle) {
                return Err(BuildError::RunInProgress);
            }
            *state = RunState::Starting;
        }

        let mut command = Command::new(&invocation.executable);
        command
            .args(&invocation.args)
            .current_dir(&invocation.cwd)
            .envs(&invocation.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // Co-located shared libraries must be discoverable without a
        // system-wide install.
        if let Some(dir) = invocation.executable.parent().filter(|d| !d.as_os_str().is_empty()) {
            let (var, sep) = library_search_var();
            let existing = std::env::var(var).unwrap_or_default();
            let value = if existing.is_empty() {
                dir.display().to_string()
            } else {
                format!("{}{}{}", dir.display(), sep, existing)
            };
            command.env(var, value);
        }

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(error) => {
                warn!(executable = %invocation.executable.display(), %error, "failed to spawn toolchain");
                self.transition(RunState::Errored);
                return Ok(RunResult::spawn_failed(format!(
                    "failed to spawn {}: {error}",
                    invocation.executable.display()
                )));
            }
        };
        self.transition(RunState::Running);

        let (mut stdout, mut stderr) = match (child.stdout.take(), child.stderr.take()) {
            (Some(out), Some(err)) => (out, err),
            _ => {
                self.transition(RunState::Errored);
                return Err(stream_unavailable());
            }
        };

        let mut out_assembler = LineAssembler::new();
        let mut err_assembler = LineAssembler::new();
        let mut out_text = String::new();
        let mut err_text = String::new();
        let mut out_buf = [0u8; 4096];
        let mut err_buf = [0u8; 4096];
        let mut out_done = false;
        let mut err_done = false;
        let mut stopped = false;

        while !(out_done && err_done) {
            tokio::select! {
                read = stdout.read(&mut out_buf), if !out_done => {
                    match read {
                        Ok(0) => out_done = true,
                        Ok(n) => {
                            for line in out_assembler.feed(&out_buf[..n]) {
                                out_text.push_str(&line.raw);
                                out_text.push('\n');
                                reporter.stream_output_line(&line);
                            }
                        }
                        Err(error) => {
                            self.transition(RunState::Errored);
                            return Err(error.into());
                        }
                    }
                }
                read = stderr.read(&mut err_buf), if !err_done => {
                    match read {
                        Ok(0) => err_done = true,
                        Ok(n) => {
                            for line in err_assembler.feed(&err_buf[..n]) {
                                err_text.push_str(&line.raw);
                                err_text.push('\n');
                                reporter.stream_output_line(&line);
                            }
                        }
                        Err(error) => {
                            self.transition(RunState::Errored);
                            return Err(error.into());
                        }
                    }
                }
                _ = self.stop.notified(), if !stopped => {
                    stopped = true;
                    debug!("stop requested, killing toolchain process");
                    let _ = child.start_kill();
                }
            }
        }

        let status = match child.wait().await {
            Ok(status) => status,
            Err(error) => {
                self.transition(RunState::Errored);
                return Err(error.into());
            }
        };

        // Flush pending fragments before the terminal result.
        if let Some(line) = out_assembler.finish() {
            out_text.push_str(&line.raw);
            reporter.stream_output_line(&line);
        }
        if let Some(line) = err_assembler.finish() {
            err_text.push_str(&line.raw);
            reporter.stream_output_line(&line);
        }

        let result = RunResult::from_exit(status.code(), stopped, out_text, err_text);
        self.transition(if result.succeeded {
            RunState::Succeeded
        } else {
            RunState::Failed
        });
        Ok(result)
    }

    /// Force-terminate the active process, if any
    ///
    /// Idempotent; there is no graceful-shutdown protocol to attempt. A
    /// stopped run terminates as `Failed`, never `Succeeded`.
    pub fn stop(&self) {
        self.stop.notify_waiters();
    }
}

impl Default for ProcessSupervisor {
    fn default() -> Self {
        Self::new()
    }
}

fn stream_unavailable() -> BuildError {
    BuildError::Io(std::io::Error::other("child stream unavailable"))
}

/// Library-search environment variable and its separator for this host
fn library_search_var() -> (&'static str, char) {
    if cfg!(windows) {
        ("PATH", ';')
    } else if cfg!(target_os = "macos") {
        ("DYLD_LIBRARY_PATH", ':')
    } else {
        ("LD_LIBRARY_PATH", ':')
    }
}
