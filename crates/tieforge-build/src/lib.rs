//! Tieforge build orchestration engine
//!
//! Supervises one external build-tool process end to end: spawns it with
//! resolved arguments, decodes its mixed-encoding output stream
//! incrementally, classifies every line by originating sub-tool and
//! severity, and reduces the run to a structured result.
//!
//! Components:
//! - [`classify`] — pure stage/severity classification of output lines
//! - [`decode`] — per-line encoding heuristic (UTF-8, legacy double-byte)
//! - [`stream`] — incremental line assembly across arbitrary chunk
//!   boundaries with the sticky stage carry
//! - [`supervisor`] — single-process run state machine
//! - [`facade`] — the build lifecycle entry points (`compile`, `build`,
//!   `clean`, ...)
//!
//! No component retries anything: every failure is terminal for its run and
//! must be re-triggered by the caller.

pub mod classify;
pub mod decode;
pub mod facade;
pub mod reporter;
pub mod stream;
pub mod supervisor;

use thiserror::Error;

/// Build orchestration errors
///
/// Spawn and toolchain failures are not errors in this taxonomy: they travel
/// as a terminal [`supervisor::RunResult`] so the full diagnostic stream
/// stays attached. Validation problems are recovered locally and never
/// thrown.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Toolchain not configured for this project")]
    ConfigurationMissing,

    #[error("Invalid configuration for {field}: {reason}")]
    ConfigurationInvalid { field: String, reason: String },

    #[error("A build is already running; stop it before starting another")]
    RunInProgress,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for build operations
pub type BuildResult<T> = Result<T, BuildError>;

// Re-export main types
pub use classify::{Severity, Stage};
pub use facade::BuildFacade;
pub use reporter::{BuildReporter, BuildStatus, NullReporter};
pub use stream::{LineAssembler, OutputLine};
pub use supervisor::{FailureKind, ProcessSupervisor, ResolvedInvocation, RunResult, RunState};
