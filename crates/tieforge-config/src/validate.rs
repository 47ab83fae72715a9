//! Path validation
//!
//! Pure checks used by batched form validation: every check returns a
//! structured outcome instead of an error so one bad field never aborts
//! validation of the others.

use std::path::Path;

/// Result of a single validation check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOutcome {
    /// Whether the check passed
    pub valid: bool,
    /// Human-readable reason when it did not
    pub error: Option<String>,
}

impl ValidationOutcome {
    /// Passing outcome
    pub fn ok() -> Self {
        Self {
            valid: true,
            error: None,
        }
    }

    /// Failing outcome with a reason
    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            valid: false,
            error: Some(error.into()),
        }
    }
}

/// Check that the path exists and is a directory
pub fn directory_exists(path: &Path) -> ValidationOutcome {
    match path.metadata() {
        Ok(meta) if meta.is_dir() => ValidationOutcome::ok(),
        Ok(_) => ValidationOutcome::fail(format!("{} is not a directory", path.display())),
        Err(_) => ValidationOutcome::fail(format!("directory not found: {}", path.display())),
    }
}

/// Check that the path exists and is a regular file
pub fn file_exists(path: &Path) -> ValidationOutcome {
    match path.metadata() {
        Ok(meta) if meta.is_file() => ValidationOutcome::ok(),
        Ok(_) => ValidationOutcome::fail(format!("{} is not a file", path.display())),
        Err(_) => ValidationOutcome::fail(format!("file not found: {}", path.display())),
    }
}

/// Check that the path is an existing file with the given extension
pub fn file_has_extension(path: &Path, extension: &str) -> ValidationOutcome {
    let existing = file_exists(path);
    if !existing.valid {
        return existing;
    }
    match path.extension().and_then(|e| e.to_str()) {
        Some(actual) if actual.eq_ignore_ascii_case(extension) => ValidationOutcome::ok(),
        _ => ValidationOutcome::fail(format!(
            "{} does not have the .{extension} extension",
            path.display()
        )),
    }
}
