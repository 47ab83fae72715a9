//! Collaborator boundary
//!
//! The presentation layer (status indicator, output panel, webview) sits
//! outside this crate and receives a closed set of strongly-typed events
//! through [`BuildReporter`]. Dispatch is exhaustive matching on these
//! types, never string comparison on ad-hoc envelopes.

use crate::stream::OutputLine;
use serde::{Deserialize, Serialize};

/// User-facing build status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildStatus {
    Idle,
    Running,
    Succeeded,
    Failed,
}

/// Outbound interface to the status/UI collaborator
///
/// Lines are forwarded as they are assembled (streaming, not buffered for
/// later); the terminal status arrives only after the pending-line flush.
pub trait BuildReporter: Send + Sync {
    /// Report a status transition
    fn report_status(&self, status: BuildStatus);

    /// Forward one classified output line
    fn stream_output_line(&self, line: &OutputLine);

    /// Signal that no toolchain location could be resolved
    fn notify_configuration_missing(&self);
}

/// Reporter that discards everything
pub struct NullReporter;

impl BuildReporter for NullReporter {
    fn report_status(&self, _status: BuildStatus) {}

    fn stream_output_line(&self, _line: &OutputLine) {}

    fn notify_configuration_missing(&self) {}
}
