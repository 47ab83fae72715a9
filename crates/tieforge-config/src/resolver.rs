//! Configuration resolution
//!
//! Merges the two on-disk configuration documents and a per-invocation
//! [`CompileRequest`] into one [`EffectiveConfig`], and turns that into the
//! argument lists the external toolchain understands.
//!
//! Failure semantics: a malformed document degrades to "absent" for that
//! document only; the other still contributes a partial configuration.

use crate::settings::{LogLevel, Platform, ProjectBuildSettings};
use crate::{script, sidecar, ConfigError, ConfigResult, SCRIPT_FILE, TOOLCHAIN_DIR_NAME, TOOLCHAIN_ENV_VAR};
use std::env;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::warn;

/// One build invocation as requested by the caller
///
/// Ephemeral: created per invocation and never persisted as-is. Unset fields
/// fall back to the project settings during [`merge_compile_request`].
#[derive(Debug, Clone, PartialEq)]
pub struct CompileRequest {
    /// Target platform
    pub platform: Platform,
    /// Output directory
    pub output_path: Option<String>,
    /// Package name
    pub package: Option<String>,
    /// Release mode (debug when unset and settings carry no marker)
    pub release: Option<bool>,
    /// Hard output mode
    pub hard_output: Option<bool>,
    /// Optimization level, 0..=3
    pub optimize: Option<u8>,
    /// Lint checks to disable
    pub disabled_lints: Vec<String>,
    /// Compiler log level
    pub log_level: Option<LogLevel>,
    /// Line map output path
    pub line_map: Option<String>,
    /// Toolchain directory passed as `--tiecc-dir`
    pub toolchain_dir: Option<PathBuf>,
    /// Build tool configuration file passed as `--config`
    pub config_file: Option<String>,
    /// Watch mode
    pub watch: bool,
    /// Extra arguments forwarded verbatim
    pub extra_args: Vec<String>,
    /// Working directory for the build tool
    pub working_dir: Option<PathBuf>,
}

impl CompileRequest {
    /// Create a request for the given platform with every override unset
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            output_path: None,
            package: None,
            release: None,
            hard_output: None,
            optimize: None,
            disabled_lints: Vec::new(),
            log_level: None,
            line_map: None,
            toolchain_dir: None,
            config_file: None,
            watch: false,
            extra_args: Vec::new(),
            working_dir: None,
        }
    }
}

impl Default for CompileRequest {
    fn default() -> Self {
        Self::new(Platform::Windows)
    }
}

/// Fully-defaulted merge of settings and a request
///
/// Computed, immutable, consumed by the argument builders and the supervisor.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveConfig {
    pub platform: Platform,
    pub output_path: Option<String>,
    pub package: Option<String>,
    pub release: bool,
    pub hard_output: bool,
    pub optimize: u8,
    pub disabled_lints: Vec<String>,
    pub log_level: LogLevel,
    pub line_map: Option<String>,
    pub toolchain_dir: Option<PathBuf>,
    pub config_file: Option<String>,
    pub watch: bool,
    pub extra_args: Vec<String>,
    pub working_dir: Option<PathBuf>,
}

/// Read and merge both configuration documents
///
/// Returns `None` when neither document exists at the project root. Side-file
/// toolchain fields are layered onto the parsed script fields. A document
/// that cannot be read or parsed is logged and treated as absent.
pub fn read_settings(project_dir: &Path) -> Option<ProjectBuildSettings> {
    let script_path = project_dir.join(SCRIPT_FILE);
    let script_settings = if script_path.exists() {
        match fs::read_to_string(&script_path) {
            Ok(text) => Some(script::parse(&text)),
            Err(error) => {
                warn!(path = %script_path.display(), %error, "unreadable build script, treating as absent");
                None
            }
        }
    } else {
        None
    };

    let toolchain = match sidecar::load(project_dir) {
        Ok(location) => location,
        Err(error) => {
            warn!(%error, "malformed toolchain side-file, treating as absent");
            None
        }
    };

    match (script_settings, toolchain) {
        (None, None) => None,
        (script_settings, toolchain) => {
            let mut settings = script_settings.unwrap_or_default();
            if let Some(location) = toolchain {
                settings.toolchain = location;
            }
            Some(settings)
        }
    }
}

/// Write both configuration documents
///
/// The declarative subset is regenerated into the script file and the
/// toolchain subset into the side-file. Both writes are attempted even when
/// the first fails; a partial failure is reported as the failing document's
/// error.
pub fn write_settings(project_dir: &Path, settings: &ProjectBuildSettings) -> ConfigResult<()> {
    let script_path = project_dir.join(SCRIPT_FILE);
    let script_result = fs::write(&script_path, script::generate(settings))
        .map_err(|e| ConfigError::io(&script_path, e));

    let sidecar_result = sidecar::save(project_dir, &settings.toolchain);

    match (script_result, sidecar_result) {
        (Ok(()), Ok(())) => Ok(()),
        (Err(script), Err(sidecar)) => Err(ConfigError::BothWritesFailed {
            script: script.to_string(),
            sidecar: sidecar.to_string(),
        }),
        (Err(e), Ok(())) | (Ok(()), Err(e)) => Err(e),
    }
}

/// Resolve the toolchain directory for a project
///
/// Precedence, first existing candidate wins:
/// 1. The project-local hidden toolchain directory, returned as the relative
///    token so later invocations stay portable across machines.
/// 2. The side-file compiler directory, resolved against the project root
///    when relative; kept relative when it points inside the project.
/// 3. The `TIECC_DIR` environment variable, resolved against the process
///    working directory when relative.
///
/// `None` means not configured: the caller must surface a configuration
/// error, never guess.
pub fn resolve_toolchain_dir(project_dir: &Path) -> Option<PathBuf> {
    let local = project_dir.join(TOOLCHAIN_DIR_NAME);
    if local.is_dir() {
        return Some(PathBuf::from(TOOLCHAIN_DIR_NAME));
    }

    if let Ok(Some(location)) = sidecar::load(project_dir) {
        if let Some(dir) = location.compiler_dir {
            let absolute = if dir.is_absolute() {
                dir.clone()
            } else {
                project_dir.join(&dir)
            };
            if absolute.is_dir() {
                return Some(match absolute.strip_prefix(project_dir) {
                    Ok(relative) => relative.to_path_buf(),
                    Err(_) => absolute,
                });
            }
        }
    }

    if let Ok(dir) = env::var(TOOLCHAIN_ENV_VAR) {
        let path = PathBuf::from(dir);
        // A relative value is anchored to the process cwd, not the project.
        let path = if path.is_absolute() {
            path
        } else {
            match env::current_dir() {
                Ok(cwd) => cwd.join(path),
                Err(_) => path,
            }
        };
        if path.is_dir() {
            return Some(path);
        }
    }

    None
}

/// Resolve the build tool executable for a project
///
/// The side-file location wins when it exists; otherwise a `tmake` binary in
/// the project root is accepted. `None` means not configured.
pub fn resolve_build_tool(
    project_dir: &Path,
    settings: Option<&ProjectBuildSettings>,
) -> Option<PathBuf> {
    if let Some(recorded) = settings.and_then(|s| s.toolchain.build_tool_path.as_ref()) {
        let absolute = if recorded.is_absolute() {
            recorded.clone()
        } else {
            project_dir.join(recorded)
        };
        if absolute.is_file() {
            return Some(absolute);
        }
    }

    for name in ["tmake", "tmake.exe"] {
        let candidate = project_dir.join(name);
        if candidate.is_file() {
            return Some(candidate);
        }
    }

    None
}

/// Merge a request onto project settings
///
/// Per field, an explicit request value always wins; unset request fields
/// fall back to the settings; fields with no default anywhere resolve to the
/// fixed baseline (`optimize = 1`, `log_level = info`, `release = false`).
pub fn merge_compile_request(
    settings: Option<&ProjectBuildSettings>,
    request: &CompileRequest,
) -> EffectiveConfig {
    let compiler = settings.map(|s| &s.compiler);
    let basic = settings.map(|s| &s.basic);

    EffectiveConfig {
        platform: request.platform,
        output_path: request
            .output_path
            .clone()
            .or_else(|| basic.and_then(|b| b.output_dir.clone())),
        package: request.package.clone(),
        release: request
            .release
            .unwrap_or_else(|| compiler.is_some_and(|c| c.release_mode)),
        hard_output: request.hard_output.unwrap_or(false),
        optimize: request
            .optimize
            .or_else(|| compiler.and_then(|c| c.optimize_level))
            .unwrap_or(1),
        disabled_lints: request.disabled_lints.clone(),
        log_level: request
            .log_level
            .or_else(|| compiler.and_then(|c| c.log_level))
            .unwrap_or(LogLevel::Info),
        line_map: request.line_map.clone(),
        toolchain_dir: request.toolchain_dir.clone(),
        config_file: request.config_file.clone(),
        watch: request.watch,
        extra_args: if request.extra_args.is_empty() {
            compiler.map(|c| c.extra_args.clone()).unwrap_or_default()
        } else {
            request.extra_args.clone()
        },
        working_dir: request.working_dir.clone(),
    }
}

/// Build the direct compiler argument list
///
/// Exactly one of `--debug`/`--release` is emitted; optional fields are
/// omitted entirely when absent, never emitted empty.
pub fn compiler_arguments(config: &EffectiveConfig, project_dir: &Path) -> Vec<String> {
    let mut args = Vec::new();

    let output = config
        .output_path
        .clone()
        .unwrap_or_else(|| format!("dist/{}", config.platform.token()));
    args.push("-o".to_string());
    args.push(portable_path_arg(Path::new(&output), project_dir));

    if let Some(package) = &config.package {
        args.push("-p".to_string());
        args.push(package.clone());
    }

    args.push(if config.release { "--release" } else { "--debug" }.to_string());

    if config.hard_output {
        args.push("--hard-mode".to_string());
    }

    args.push("--optimize".to_string());
    args.push(config.optimize.to_string());

    for lint in &config.disabled_lints {
        args.push("--disable-lint".to_string());
        args.push(lint.clone());
    }

    args.push("--log-level".to_string());
    args.push(config.log_level.as_str().to_string());

    args.push("--platform".to_string());
    args.push(config.platform.token().to_string());

    if let Some(line_map) = &config.line_map {
        args.push("--line-map".to_string());
        args.push(portable_path_arg(Path::new(line_map), project_dir));
    }

    args.extend(config.extra_args.iter().cloned());

    args
}

/// Build the argument list for the build-tool-delegated path
///
/// Only the flags the external build tool accepts on its command line are
/// emitted; optimize level, log level, platform, debug/release and hard
/// output mode must live in the declarative script file instead. This is a
/// hard external contract, not an oversight.
pub fn build_tool_arguments(config: &EffectiveConfig, project_dir: &Path) -> Vec<String> {
    let mut args = Vec::new();

    if let Some(output) = &config.output_path {
        args.push("--output".to_string());
        args.push(portable_path_arg(Path::new(output), project_dir));
    }

    if let Some(package) = &config.package {
        args.push("--package".to_string());
        args.push(package.clone());
    }

    if let Some(dir) = &config.toolchain_dir {
        args.push("--tiecc-dir".to_string());
        args.push(portable_path_arg(dir, project_dir));
    }

    if let Some(config_file) = &config.config_file {
        args.push("--config".to_string());
        args.push(portable_path_arg(Path::new(config_file), project_dir));
    }

    if config.watch {
        args.push("--watch".to_string());
    }

    args.extend(config.extra_args.iter().cloned());

    args
}

/// Render a path argument in portable form
///
/// An absolute path inside the project root is rewritten project-relative
/// with forward-slash separators; any path containing a space is quoted.
pub fn portable_path_arg(path: &Path, project_dir: &Path) -> String {
    let portable = match path.strip_prefix(project_dir) {
        Ok(relative) if path.is_absolute() => forward_slashes(relative),
        _ => {
            if path.is_absolute() {
                path.display().to_string()
            } else {
                forward_slashes(path)
            }
        }
    };

    if portable.contains(' ') {
        format!("\"{portable}\"")
    } else {
        portable
    }
}

fn forward_slashes(path: &Path) -> String {
    let mut out = String::new();
    for component in path.components() {
        match component {
            Component::CurDir => continue,
            other => {
                if !out.is_empty() {
                    out.push('/');
                }
                out.push_str(&other.as_os_str().to_string_lossy());
            }
        }
    }
    if out.is_empty() {
        ".".to_string()
    } else {
        out
    }
}
