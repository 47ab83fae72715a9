//! Toolchain location side-file (`.tiecode.json`)
//!
//! A flat JSON object at the project root holding only filesystem locations,
//! kept out of the portable build script on purpose. Absent keys mean
//! "unset", never "default".

use crate::{ConfigError, ConfigResult, SIDECAR_FILE};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Toolchain filesystem locations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ToolchainLocation {
    /// Directory containing the compiler
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compiler_dir: Option<PathBuf>,

    /// Path to the build tool executable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_tool_path: Option<PathBuf>,

    /// Path to the linker executable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linker_path: Option<PathBuf>,
}

impl ToolchainLocation {
    /// Check whether any location is set
    pub fn is_empty(&self) -> bool {
        self.compiler_dir.is_none() && self.build_tool_path.is_none() && self.linker_path.is_none()
    }
}

/// Path of the side-file for a project root
pub fn sidecar_path(project_dir: &Path) -> PathBuf {
    project_dir.join(SIDECAR_FILE)
}

/// Load the side-file, `Ok(None)` if it does not exist
pub fn load(project_dir: &Path) -> ConfigResult<Option<ToolchainLocation>> {
    let path = sidecar_path(project_dir);
    if !path.exists() {
        return Ok(None);
    }

    let text = fs::read_to_string(&path).map_err(|e| ConfigError::io(&path, e))?;
    let location =
        serde_json::from_str(&text).map_err(|error| ConfigError::Json { path, error })?;
    Ok(Some(location))
}

/// Save the side-file, overwriting any previous content
pub fn save(project_dir: &Path, location: &ToolchainLocation) -> ConfigResult<()> {
    let path = sidecar_path(project_dir);
    let text = serde_json::to_string_pretty(location).map_err(|error| ConfigError::Json {
        path: path.clone(),
        error,
    })?;
    fs::write(&path, text).map_err(|e| ConfigError::io(&path, e))
}
