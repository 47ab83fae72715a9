//! Tieforge configuration system
//!
//! Resolves the layered project configuration of a Tiecode project into the
//! concrete values a toolchain invocation needs:
//! - Declarative build script (`build.tmake` at the project root)
//! - Toolchain location side-file (`.tiecode.json`, hidden, paths only)
//! - Per-invocation compile requests layered on top of both
//!
//! # Precedence
//!
//! Later sources override earlier ones:
//! 1. Declarative script fields
//! 2. Side-file toolchain paths
//! 3. Explicit `CompileRequest` fields
//!
//! Fields with no value anywhere resolve to a fixed baseline
//! (`optimize = 1`, `log_level = info`, `release = false`).

pub mod resolver;
pub mod script;
pub mod settings;
pub mod sidecar;
pub mod validate;

use std::path::PathBuf;
use thiserror::Error;

/// Declarative build script file name at the project root.
pub const SCRIPT_FILE: &str = "build.tmake";

/// Hidden JSON side-file holding toolchain locations.
pub const SIDECAR_FILE: &str = ".tiecode.json";

/// Project-local hidden toolchain directory.
pub const TOOLCHAIN_DIR_NAME: &str = ".tiecode";

/// Environment variable naming a machine-wide toolchain directory.
pub const TOOLCHAIN_ENV_VAR: &str = "TIECC_DIR";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error at {path}: {error}")]
    Io {
        path: PathBuf,
        error: std::io::Error,
    },

    #[error("Invalid JSON in {path}: {error}")]
    Json {
        path: PathBuf,
        error: serde_json::Error,
    },

    #[error("Failed to write both configuration documents: script: {script}; side-file: {sidecar}")]
    BothWritesFailed { script: String, sidecar: String },
}

impl ConfigError {
    /// Create an I/O error with path context
    pub fn io(path: impl Into<PathBuf>, error: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            error,
        }
    }
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

// Re-export main types
pub use resolver::{CompileRequest, EffectiveConfig};
pub use settings::{
    BasicInfo, CompilerSettings, LinkerSettings, LogLevel, Platform, ProjectBuildSettings,
};
pub use sidecar::ToolchainLocation;
pub use validate::ValidationOutcome;
