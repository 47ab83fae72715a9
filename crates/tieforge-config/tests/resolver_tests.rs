//! Configuration resolution tests against a real project tree

use pretty_assertions::assert_eq;
use serial_test::serial;
use std::fs;
use std::path::{Path, PathBuf};
use tieforge_config::resolver::{
    self, build_tool_arguments, merge_compile_request, read_settings, resolve_build_tool,
    resolve_toolchain_dir, write_settings,
};
use tieforge_config::{
    CompileRequest, Platform, ProjectBuildSettings, ToolchainLocation, SCRIPT_FILE, SIDECAR_FILE,
    TOOLCHAIN_DIR_NAME, TOOLCHAIN_ENV_VAR,
};
use tempfile::TempDir;

fn write_script(dir: &Path, content: &str) {
    fs::write(dir.join(SCRIPT_FILE), content).unwrap();
}

fn write_sidecar(dir: &Path, content: &str) {
    fs::write(dir.join(SIDECAR_FILE), content).unwrap();
}

#[test]
fn test_read_settings_neither_document_is_none() {
    let dir = TempDir::new().unwrap();
    assert!(read_settings(dir.path()).is_none());
}

#[test]
fn test_read_settings_sidecar_only() {
    // Scenario A: only the side-file exists; only toolchain fields populated.
    let dir = TempDir::new().unwrap();
    write_sidecar(dir.path(), r#"{"compilerDir": ".tiecode", "buildToolPath": "./tmake.exe"}"#);

    let settings = read_settings(dir.path()).unwrap();
    assert_eq!(settings.toolchain.compiler_dir, Some(PathBuf::from(".tiecode")));
    assert_eq!(
        settings.toolchain.build_tool_path,
        Some(PathBuf::from("./tmake.exe"))
    );
    assert!(!settings.has_script_fields());
}

#[test]
fn test_read_settings_script_only() {
    let dir = TempDir::new().unwrap();
    write_script(dir.path(), "SetVariable(\"name\", \"demo\")\nSetOptimizeLevel(3)\n");

    let settings = read_settings(dir.path()).unwrap();
    assert_eq!(settings.basic.name.as_deref(), Some("demo"));
    assert_eq!(settings.compiler.optimize_level, Some(3));
    assert!(settings.toolchain.is_empty());
}

#[test]
fn test_read_settings_sidecar_overlays_script() {
    let dir = TempDir::new().unwrap();
    write_script(dir.path(), "SetVariable(\"name\", \"demo\")\n");
    write_sidecar(dir.path(), r#"{"compilerDir": "tools/tiecc"}"#);

    let settings = read_settings(dir.path()).unwrap();
    assert_eq!(settings.basic.name.as_deref(), Some("demo"));
    assert_eq!(
        settings.toolchain.compiler_dir,
        Some(PathBuf::from("tools/tiecc"))
    );
}

#[test]
fn test_read_settings_malformed_sidecar_degrades() {
    let dir = TempDir::new().unwrap();
    write_script(dir.path(), "SetVariable(\"name\", \"demo\")\n");
    write_sidecar(dir.path(), "{broken");

    let settings = read_settings(dir.path()).unwrap();
    assert_eq!(settings.basic.name.as_deref(), Some("demo"));
    assert!(settings.toolchain.is_empty());
}

#[test]
fn test_write_then_read_is_idempotent() {
    let dir = TempDir::new().unwrap();
    write_script(
        dir.path(),
        "SetVariable(\"name\", \"demo\")\nSetVariable(\"version\", \"0.3.1\")\nSetOutputFile(\"demo\")\nSetOptimizeLevel(2)\nSetLogLevel(\"error\")\nSetCompiler(\"g++\")\nFutureDirective(\"kept\")\n\nBuild(ReadSourceFileList(\"./\"), OutputFile)\nReleaseMode()\n",
    );
    write_sidecar(dir.path(), r#"{"buildToolPath": "./tmake"}"#);

    let first = read_settings(dir.path()).unwrap();
    write_settings(dir.path(), &first).unwrap();
    let second = read_settings(dir.path()).unwrap();
    assert_eq!(first, second);

    write_settings(dir.path(), &second).unwrap();
    let third = read_settings(dir.path()).unwrap();
    assert_eq!(second, third);
    assert_eq!(third.unknown_directives, vec!["FutureDirective(\"kept\")"]);
}

#[test]
fn test_write_settings_creates_both_documents() {
    let dir = TempDir::new().unwrap();
    let mut settings = ProjectBuildSettings::default();
    settings.basic.name = Some("demo".to_string());
    settings.toolchain = ToolchainLocation {
        compiler_dir: Some(PathBuf::from(".tiecode")),
        build_tool_path: None,
        linker_path: None,
    };

    write_settings(dir.path(), &settings).unwrap();
    assert!(dir.path().join(SCRIPT_FILE).is_file());
    assert!(dir.path().join(SIDECAR_FILE).is_file());
}

#[test]
fn test_local_toolchain_dir_wins_and_is_relative() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join(TOOLCHAIN_DIR_NAME)).unwrap();
    // A recorded side-file path would otherwise win.
    write_sidecar(dir.path(), r#"{"compilerDir": "/nonexistent"}"#);

    let resolved = resolve_toolchain_dir(dir.path()).unwrap();
    assert_eq!(resolved, PathBuf::from(TOOLCHAIN_DIR_NAME));
    assert!(resolved.is_relative());
}

#[test]
fn test_sidecar_toolchain_dir_must_exist() {
    let dir = TempDir::new().unwrap();
    write_sidecar(dir.path(), r#"{"compilerDir": "missing/dir"}"#);
    assert!(resolve_toolchain_dir(dir.path()).is_none());
}

#[test]
fn test_sidecar_toolchain_dir_relative_resolution() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("tools/tiecc")).unwrap();
    write_sidecar(dir.path(), r#"{"compilerDir": "tools/tiecc"}"#);

    let resolved = resolve_toolchain_dir(dir.path()).unwrap();
    assert_eq!(resolved, PathBuf::from("tools/tiecc"));
}

#[test]
#[serial]
fn test_env_toolchain_dir_is_last_resort() {
    let dir = TempDir::new().unwrap();
    let toolchain = TempDir::new().unwrap();
    std::env::set_var(TOOLCHAIN_ENV_VAR, toolchain.path());

    let resolved = resolve_toolchain_dir(dir.path()).unwrap();
    assert_eq!(resolved, toolchain.path().to_path_buf());

    std::env::remove_var(TOOLCHAIN_ENV_VAR);
}

#[test]
#[serial]
fn test_env_toolchain_dir_relative_value_anchored_to_cwd() {
    let project = TempDir::new().unwrap();
    let cwd = TempDir::new().unwrap();
    fs::create_dir(cwd.path().join("toolchain")).unwrap();

    let previous = std::env::current_dir().unwrap();
    std::env::set_current_dir(cwd.path()).unwrap();
    let expected = std::env::current_dir().unwrap().join("toolchain");
    std::env::set_var(TOOLCHAIN_ENV_VAR, "toolchain");

    let resolved = resolve_toolchain_dir(project.path());

    std::env::remove_var(TOOLCHAIN_ENV_VAR);
    std::env::set_current_dir(previous).unwrap();

    let resolved = resolved.unwrap();
    assert!(resolved.is_absolute());
    assert_eq!(resolved, expected);
}

#[test]
#[serial]
fn test_env_toolchain_dir_must_exist() {
    let dir = TempDir::new().unwrap();
    std::env::set_var(TOOLCHAIN_ENV_VAR, "/no/such/toolchain");

    assert!(resolve_toolchain_dir(dir.path()).is_none());

    std::env::remove_var(TOOLCHAIN_ENV_VAR);
}

#[test]
fn test_resolve_build_tool_from_sidecar() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("bin")).unwrap();
    fs::write(dir.path().join("bin/tmake"), "").unwrap();
    write_sidecar(dir.path(), r#"{"buildToolPath": "bin/tmake"}"#);

    let settings = read_settings(dir.path()).unwrap();
    let tool = resolve_build_tool(dir.path(), Some(&settings)).unwrap();
    assert_eq!(tool, dir.path().join("bin/tmake"));
}

#[test]
fn test_resolve_build_tool_falls_back_to_project_root() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("tmake"), "").unwrap();

    let tool = resolve_build_tool(dir.path(), None).unwrap();
    assert_eq!(tool, dir.path().join("tmake"));
}

#[test]
fn test_resolve_build_tool_not_configured() {
    let dir = TempDir::new().unwrap();
    assert!(resolve_build_tool(dir.path(), None).is_none());
}

#[test]
fn test_scenario_b_default_output_flows_to_build_tool_args() {
    // Scenario B: platform windows, no explicit output, settings default
    // dist/win -> exactly one --output pair with the relative form.
    let dir = TempDir::new().unwrap();
    write_script(dir.path(), "SetVariable(\"output_dir\", \"dist/win\")\n");

    let settings = read_settings(dir.path()).unwrap();
    let request = CompileRequest::new(Platform::Windows);
    let config = merge_compile_request(Some(&settings), &request);
    let args = build_tool_arguments(&config, dir.path());

    assert_eq!(args, vec!["--output", "dist/win"]);
    assert_eq!(args.iter().filter(|a| a.contains("output")).count(), 1);
}

#[test]
fn test_local_toolchain_always_emitted_relative() {
    // The project-local toolchain dir must never appear as an absolute path,
    // regardless of the current working directory.
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join(TOOLCHAIN_DIR_NAME)).unwrap();

    let mut request = CompileRequest::new(Platform::Windows);
    request.toolchain_dir = resolve_toolchain_dir(dir.path());
    let config = merge_compile_request(None, &request);
    let args = build_tool_arguments(&config, dir.path());

    let at = args.iter().position(|a| a == "--tiecc-dir").unwrap();
    assert_eq!(args[at + 1], TOOLCHAIN_DIR_NAME);

    // An absolute spelling of the same directory is rewritten too.
    let absolute = dir.path().join(TOOLCHAIN_DIR_NAME);
    assert_eq!(
        resolver::portable_path_arg(&absolute, dir.path()),
        TOOLCHAIN_DIR_NAME
    );
}
