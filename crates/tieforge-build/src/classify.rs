//! Output line classification
//!
//! String-pattern classification of toolchain output is inherently heuristic
//! and brittle against upstream message changes, so it lives here as pure
//! functions with the marker tables in one place. The streaming layer owns
//! the sticky-stage carry; these functions look at one line only.
//!
//! Keyword sets are bilingual: the toolchain mixes English and Chinese
//! diagnostics depending on which sub-tool produced the line.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Originating sub-tool of an output line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Stage {
    /// Front-end compiler (tiecc)
    Compiler,
    /// Native backend (g++)
    NativeBackend,
    /// Build orchestrator (tmake)
    Orchestrator,
}

impl Stage {
    /// Display tag prefixed to rendered lines
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Compiler => "[Tiecc]",
            Self::NativeBackend => "[G++]",
            Self::Orchestrator => "[TMake]",
        }
    }
}

/// Severity of an output line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
    Success,
}

impl Severity {
    /// Glyph prefixed to rendered lines; info lines carry none
    pub fn glyph(&self) -> Option<&'static str> {
        match self {
            Self::Info => None,
            Self::Warning => Some("⚠"),
            Self::Error => Some("✗"),
            Self::Success => Some("✓"),
        }
    }
}

static COMPILER_MARKERS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)tiecc(\.exe)?|\S+\.t\b|执行结绳编译命令|结绳编译|添加源文件|开始编译|目标平台|输出目录")
        .expect("compiler marker pattern")
});

static NATIVE_MARKERS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)g\+\+|\.cpp:|In function|note:|warning:|error:|使用编译器|编译参数")
        .expect("native backend marker pattern")
});

static ERROR_KEYWORDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\[ERROR\]|error:|错误|失败").expect("error keyword pattern"));

static WARNING_KEYWORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\[WARNING\]|warning:|警告").expect("warning keyword pattern")
});

static SUCCESS_KEYWORDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)success|成功|完成").expect("success keyword pattern"));

/// Classify the originating stage of a line
///
/// Ordered rules: compiler markers win over native-backend markers. `None`
/// means the line carries no stage marker at all; the caller applies the
/// sticky carry (orchestrator before any marker has been seen).
pub fn classify_stage(line: &str) -> Option<Stage> {
    if COMPILER_MARKERS.is_match(line) {
        Some(Stage::Compiler)
    } else if NATIVE_MARKERS.is_match(line) {
        Some(Stage::NativeBackend)
    } else {
        None
    }
}

/// Classify the severity of a line
///
/// Error takes precedence over warning, warning over success; a line that
/// matches nothing is info.
pub fn classify_severity(line: &str) -> Severity {
    if ERROR_KEYWORDS.is_match(line) {
        Severity::Error
    } else if WARNING_KEYWORDS.is_match(line) {
        Severity::Warning
    } else if SUCCESS_KEYWORDS.is_match(line) {
        Severity::Success
    } else {
        Severity::Info
    }
}

/// Render a classified line for display
pub fn render(stage: Stage, severity: Severity, raw: &str) -> String {
    match severity.glyph() {
        Some(glyph) => format!("{glyph} {} {raw}", stage.tag()),
        None => format!("{} {raw}", stage.tag()),
    }
}
