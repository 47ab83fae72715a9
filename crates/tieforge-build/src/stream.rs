//! Incremental line assembly
//!
//! Raw bytes arrive in arbitrary chunks; complete lines must come out the
//! same no matter where the chunks were cut. The assembler therefore buffers
//! pending bytes, splits on line terminators at the byte level, and decodes
//! each complete line independently. One assembler exists per stream per
//! run; it also owns the sticky stage carry for that stream.

use crate::classify::{self, Severity, Stage};
use crate::decode::decode_line;
use serde::{Deserialize, Serialize};

/// One classified line of toolchain output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputLine {
    /// Decoded line text without the terminator
    pub raw: String,
    /// Originating sub-tool (sticky carry applied)
    pub stage: Stage,
    /// Derived severity
    pub severity: Severity,
    /// Annotated display form
    pub rendered: String,
}

/// Per-run, per-stream line assembler
///
/// Stack traces and continuation lines do not repeat the stage marker, so a
/// line that matches the compiler or the native backend makes that stage the
/// default for subsequent unmarked lines until another stage matches.
#[derive(Debug)]
pub struct LineAssembler {
    pending: Vec<u8>,
    sticky: Stage,
}

impl LineAssembler {
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
            sticky: Stage::Orchestrator,
        }
    }

    /// Feed a chunk of raw bytes, emitting every line it completes
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<OutputLine> {
        self.pending.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            let mut line: Vec<u8> = self.pending.drain(..=pos).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            lines.push(self.emit(&line));
        }
        lines
    }

    /// Flush the trailing fragment at end of run, if any
    pub fn finish(&mut self) -> Option<OutputLine> {
        if self.pending.is_empty() {
            return None;
        }
        let mut line = std::mem::take(&mut self.pending);
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        Some(self.emit(&line))
    }

    fn emit(&mut self, bytes: &[u8]) -> OutputLine {
        let (raw, _fallback) = decode_line(bytes);

        let stage = match classify::classify_stage(&raw) {
            Some(marked) => {
                self.sticky = marked;
                marked
            }
            None => self.sticky,
        };
        let severity = classify::classify_severity(&raw);
        let rendered = classify::render(stage, severity, &raw);

        OutputLine {
            raw,
            stage,
            severity,
            rendered,
        }
    }
}

impl Default for LineAssembler {
    fn default() -> Self {
        Self::new()
    }
}
