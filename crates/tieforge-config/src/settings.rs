//! Project build settings
//!
//! The merged view of the declarative build script and the toolchain
//! side-file. Sections are partial: a document that is absent on disk simply
//! contributes nothing.

use crate::sidecar::ToolchainLocation;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Compiler log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    /// Get the token passed to the compiler
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warning" | "warn" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            other => Err(format!("unknown log level: {other}")),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compilation target platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Windows,
    Linux,
    Apple,
    Android,
    Harmony,
    Ios,
    Html,
}

impl Platform {
    /// Get the token the compiler recognizes for this platform
    pub fn token(&self) -> &'static str {
        match self {
            Self::Windows => "windows",
            Self::Linux => "linux",
            Self::Apple => "apple",
            Self::Android => "android",
            Self::Harmony => "harmony",
            Self::Ios => "ios",
            Self::Html => "html",
        }
    }

    /// All supported platforms
    pub fn all() -> [Platform; 7] {
        [
            Self::Windows,
            Self::Linux,
            Self::Apple,
            Self::Android,
            Self::Harmony,
            Self::Ios,
            Self::Html,
        ]
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "windows" => Ok(Self::Windows),
            "linux" => Ok(Self::Linux),
            "apple" | "macos" => Ok(Self::Apple),
            "android" => Ok(Self::Android),
            "harmony" | "harmonyos" => Ok(Self::Harmony),
            "ios" => Ok(Self::Ios),
            "html" | "web" => Ok(Self::Html),
            other => Err(format!("unknown platform: {other}")),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Basic project information from the declarative script
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BasicInfo {
    /// Project name
    pub name: Option<String>,
    /// Project version
    pub version: Option<String>,
    /// Default output directory
    pub output_dir: Option<String>,
    /// Output file name
    pub output_file: Option<String>,
}

/// Compiler section of the declarative script
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompilerSettings {
    /// Native backend compiler name (e.g. "g++")
    pub compiler: Option<String>,
    /// Optimization level, 0..=3
    pub optimize_level: Option<u8>,
    /// Compiler log level
    pub log_level: Option<LogLevel>,
    /// Release mode marker
    pub release_mode: bool,
    /// Extra compiler arguments, passed through verbatim
    pub extra_args: Vec<String>,
}

/// Linker section of the declarative script
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkerSettings {
    /// Libraries to link against
    pub libraries: Vec<String>,
    /// Library search paths
    pub library_paths: Vec<String>,
    /// Extra linker arguments
    pub linker_args: Vec<String>,
}

/// Merged project build settings
///
/// Produced by [`crate::resolver::read_settings`]; the toolchain section comes
/// from the side-file and takes precedence over any path the script mentions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectBuildSettings {
    /// Basic project information
    pub basic: BasicInfo,
    /// Compiler settings
    pub compiler: CompilerSettings,
    /// Linker settings
    pub linker: LinkerSettings,
    /// Toolchain locations from the side-file
    pub toolchain: ToolchainLocation,
    /// Source root from the `Build(ReadSourceFileList(..), ..)` directive
    pub source_root: Option<String>,
    /// Directive lines not in the known grammar, preserved verbatim
    pub unknown_directives: Vec<String>,
}

impl ProjectBuildSettings {
    /// Check whether any declarative field is set
    pub fn has_script_fields(&self) -> bool {
        self.basic != BasicInfo::default()
            || self.compiler != CompilerSettings::default()
            || self.linker != LinkerSettings::default()
            || self.source_root.is_some()
            || !self.unknown_directives.is_empty()
    }
}
