//! Declarative build script parsing and generation
//!
//! The script is line-oriented: one directive per line in fixed-name
//! function-call syntax with string and integer literal arguments. Blank
//! lines and lines starting with `//` or `#` are comments and are dropped on
//! regeneration. Directive lines outside the known grammar are preserved
//! verbatim and re-emitted on save, so a round trip never silently loses a
//! foreign directive.
//!
//! Parsing is tolerant: a malformed line degrades to a preserved unknown
//! line, never an error. Generation is deterministic (fixed directive order,
//! not a diff of the previous file).

use crate::settings::{LogLevel, ProjectBuildSettings};

/// One parsed directive argument
#[derive(Debug, Clone, PartialEq)]
enum Arg {
    Str(String),
    Int(i64),
    /// Bare identifier or nested call, kept raw
    Raw(String),
}

impl Arg {
    fn as_str(&self) -> Option<&str> {
        match self {
            Arg::Str(s) => Some(s),
            _ => None,
        }
    }

    fn as_int(&self) -> Option<i64> {
        match self {
            Arg::Int(n) => Some(*n),
            _ => None,
        }
    }
}

/// Parse a script document into settings
///
/// Only the declarative sections are populated; the toolchain side-file
/// section is left at its default.
pub fn parse(text: &str) -> ProjectBuildSettings {
    let mut settings = ProjectBuildSettings::default();

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with("//") || trimmed.starts_with('#') {
            continue;
        }

        if !apply_directive(&mut settings, trimmed) {
            settings.unknown_directives.push(trimmed.to_string());
        }
    }

    settings
}

/// Apply one directive line; false means the line is not in the known grammar
fn apply_directive(settings: &mut ProjectBuildSettings, line: &str) -> bool {
    let Some((name, inner)) = split_call(line) else {
        return false;
    };
    let args = split_args(inner);

    match name {
        "SetVariable" => {
            let (Some(key), Some(value)) = (
                args.first().and_then(Arg::as_str),
                args.get(1).and_then(Arg::as_str),
            ) else {
                return false;
            };
            let slot = match key {
                "name" => &mut settings.basic.name,
                "version" => &mut settings.basic.version,
                "output_dir" => &mut settings.basic.output_dir,
                _ => return false,
            };
            *slot = Some(value.to_string());
            true
        }
        "SetOutputFile" => set_string(&args, |v| settings.basic.output_file = Some(v)),
        "SetCompiler" => set_string(&args, |v| settings.compiler.compiler = Some(v)),
        "SetOptimizeLevel" => {
            let Some(level) = args.first().and_then(Arg::as_int) else {
                return false;
            };
            if !(0..=3).contains(&level) {
                return false;
            }
            settings.compiler.optimize_level = Some(level as u8);
            true
        }
        "SetLogLevel" => {
            let Some(level) = args
                .first()
                .and_then(Arg::as_str)
                .and_then(|s| s.parse::<LogLevel>().ok())
            else {
                return false;
            };
            settings.compiler.log_level = Some(level);
            true
        }
        "AddCompilerArg" => set_string(&args, |v| settings.compiler.extra_args.push(v)),
        "AddLibrary" => set_string(&args, |v| settings.linker.libraries.push(v)),
        "AddLibraryPath" => set_string(&args, |v| settings.linker.library_paths.push(v)),
        "AddLinkerArg" => set_string(&args, |v| settings.linker.linker_args.push(v)),
        "ReleaseMode" => {
            if !args.is_empty() {
                return false;
            }
            settings.compiler.release_mode = true;
            true
        }
        "Build" => {
            // Fixed form: Build(ReadSourceFileList("<dir>"), OutputFile)
            let Some(Arg::Raw(list_call)) = args.first() else {
                return false;
            };
            let Some(("ReadSourceFileList", list_inner)) = split_call(list_call) else {
                return false;
            };
            let Some(dir) = split_args(list_inner).first().and_then(Arg::as_str).map(String::from)
            else {
                return false;
            };
            settings.source_root = Some(dir);
            true
        }
        _ => false,
    }
}

fn set_string(args: &[Arg], apply: impl FnOnce(String)) -> bool {
    match args.first().and_then(Arg::as_str) {
        Some(value) => {
            apply(value.to_string());
            true
        }
        None => false,
    }
}

/// Split `Name(inner)` into the directive name and its raw argument text
fn split_call(line: &str) -> Option<(&str, &str)> {
    let open = line.find('(')?;
    let name = line[..open].trim();
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return None;
    }
    let rest = line[open + 1..].trim_end();
    let inner = rest.strip_suffix(')')?;
    Some((name, inner))
}

/// Split top-level comma-separated arguments, respecting strings and nesting
fn split_args(inner: &str) -> Vec<Arg> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut in_string = false;

    for c in inner.chars() {
        match c {
            '"' => {
                in_string = !in_string;
                current.push(c);
            }
            '(' if !in_string => {
                depth += 1;
                current.push(c);
            }
            ')' if !in_string => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            ',' if !in_string && depth == 0 => {
                push_arg(&mut args, &current);
                current.clear();
            }
            _ => current.push(c),
        }
    }
    push_arg(&mut args, &current);
    args
}

fn push_arg(args: &mut Vec<Arg>, raw: &str) {
    let raw = raw.trim();
    if raw.is_empty() {
        return;
    }
    if let Some(stripped) = raw.strip_prefix('"').and_then(|s| s.strip_suffix('"')) {
        args.push(Arg::Str(stripped.to_string()));
    } else if let Ok(n) = raw.parse::<i64>() {
        args.push(Arg::Int(n));
    } else {
        args.push(Arg::Raw(raw.to_string()));
    }
}

/// Generate the script document for the given settings
///
/// Deterministic: known directives in fixed order, preserved unknown lines,
/// then the fixed build directive and the release-mode marker.
pub fn generate(settings: &ProjectBuildSettings) -> String {
    let mut lines: Vec<String> = Vec::new();

    if let Some(name) = &settings.basic.name {
        lines.push(format!("SetVariable(\"name\", \"{name}\")"));
    }
    if let Some(version) = &settings.basic.version {
        lines.push(format!("SetVariable(\"version\", \"{version}\")"));
    }
    if let Some(dir) = &settings.basic.output_dir {
        lines.push(format!("SetVariable(\"output_dir\", \"{dir}\")"));
    }
    if let Some(file) = &settings.basic.output_file {
        lines.push(format!("SetOutputFile(\"{file}\")"));
    }
    if let Some(level) = settings.compiler.optimize_level {
        lines.push(format!("SetOptimizeLevel({level})"));
    }
    if let Some(level) = settings.compiler.log_level {
        lines.push(format!("SetLogLevel(\"{level}\")"));
    }
    if let Some(compiler) = &settings.compiler.compiler {
        lines.push(format!("SetCompiler(\"{compiler}\")"));
    }
    for arg in &settings.compiler.extra_args {
        lines.push(format!("AddCompilerArg(\"{arg}\")"));
    }
    for lib in &settings.linker.libraries {
        lines.push(format!("AddLibrary(\"{lib}\")"));
    }
    for path in &settings.linker.library_paths {
        lines.push(format!("AddLibraryPath(\"{path}\")"));
    }
    for arg in &settings.linker.linker_args {
        lines.push(format!("AddLinkerArg(\"{arg}\")"));
    }

    for line in &settings.unknown_directives {
        lines.push(line.clone());
    }

    lines.push(String::new());
    let source_root = settings.source_root.as_deref().unwrap_or("./");
    lines.push(format!(
        "Build(ReadSourceFileList(\"{source_root}\"), OutputFile)"
    ));
    if settings.compiler.release_mode {
        lines.push("ReleaseMode()".to_string());
    }

    let mut text = lines.join("\n");
    text.push('\n');
    text
}
