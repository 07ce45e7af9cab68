//! The tools file.
//!
//! Tracked tools live in a generated Go source file (`tools.go` by default)
//! as blank imports behind a `tools` build constraint, so `go mod tidy` keeps
//! their modules in `go.mod`. Per-tool metadata rides along as a JSON comment
//! on the import line:
//!
//! ```go
//! import (
//! 	_ "golang.org/x/tools/cmd/stringer"
//! 	_ "github.com/golangci/golangci-lint/cmd/golangci-lint" // {"build_flags":"-tags=netgo"}
//! )
//! ```
//!
//! The file is regenerated from scratch on every write.

use std::collections::HashSet;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;
use std::sync::LazyLock;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use crate::error::{Error, Result};
use crate::process::{run_captured, Invocation, ProcessRunner};
use crate::sink::Logger;

const HEADER: &str = "//go:build tools
// +build tools

// Code generated by toolbox. DO NOT EDIT.
// Use `toolbox add` and `toolbox remove` to change the tracked tools.

package tools
";

/// One import spec: optional import name, quoted path, optional line comment.
static IMPORT_SPEC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^(?:[\p{L}_.][\p{L}\p{N}_]*\s+)?(?:"([^"]*)"|`([^`]*)`)\s*(?://(.*))?$"#)
        .expect("import spec pattern is valid")
});

/// A tracked tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tool {
    /// Go package path of the main package, e.g. `golang.org/x/tools/cmd/stringer`.
    pub package: String,
    /// Extra flags for `go get`/`go install`, split with shell-word rules.
    pub build_flags: String,
}

impl Tool {
    pub fn new(package: impl Into<String>, build_flags: impl Into<String>) -> Self {
        Tool {
            package: package.into(),
            build_flags: build_flags.into(),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Annotation {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    build_flags: String,
}

/// Checks that `package` can be written as a Go import path.
pub fn validate_package(package: &str) -> Result<(), String> {
    if package.is_empty() {
        return Err("package path is empty".to_string());
    }
    if let Some(c) = package
        .chars()
        .find(|c| c.is_whitespace() || *c == '"' || *c == '`' || *c == '\\')
    {
        return Err(format!("package path {package:?} contains invalid character {c:?}"));
    }
    if package.contains('@') {
        return Err(format!(
            "package path {package:?} contains a version; pass it as pkg@version or as the version argument"
        ));
    }
    if package.ends_with('/') {
        return Err(format!("package path {package:?} ends with '/'"));
    }
    Ok(())
}

/// Reads the tracked tools in file order. A missing file means no tools.
pub fn read_tools(path: &Path) -> Result<Vec<Tool>> {
    let src = match fs::read_to_string(path) {
        Ok(src) => src,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(Error::io(
                format!("error reading tools file {}", path.display()),
                e,
            ))
        }
    };
    parse_tools(&src, path)
}

/// Parses the import declarations of a tools file. `path` is only used in
/// error messages.
pub fn parse_tools(src: &str, path: &Path) -> Result<Vec<Tool>> {
    let corrupt = |lineno: usize, reason: String| Error::ManifestCorrupt {
        path: path.to_path_buf(),
        reason: format!("line {}: {reason}", lineno + 1),
    };

    let mut tools = Vec::new();
    let mut seen = HashSet::new();
    let mut in_block = false;

    for (lineno, raw) in src.lines().enumerate() {
        let line = raw.trim();
        let spec = if in_block {
            if line.is_empty() || line.starts_with("//") {
                continue;
            }
            if line == ")" {
                in_block = false;
                continue;
            }
            line
        } else {
            let Some(rest) = line.strip_prefix("import") else {
                continue;
            };
            if !rest.starts_with(|c: char| c.is_whitespace() || c == '(') {
                continue;
            }
            let rest = rest.trim_start();
            match rest.strip_prefix('(') {
                Some(inner) => {
                    let inner = inner.trim();
                    if inner.is_empty() {
                        in_block = true;
                        continue;
                    }
                    if inner == ")" {
                        continue;
                    }
                    return Err(corrupt(lineno, "import block must start on its own line".to_string()));
                }
                None => rest,
            }
        };

        let tool = parse_spec(spec).map_err(|reason| corrupt(lineno, reason))?;
        if !seen.insert(tool.package.clone()) {
            return Err(corrupt(lineno, format!("package {} is listed twice", tool.package)));
        }
        tools.push(tool);
    }

    if in_block {
        return Err(Error::ManifestCorrupt {
            path: path.to_path_buf(),
            reason: "unterminated import block".to_string(),
        });
    }
    Ok(tools)
}

fn parse_spec(spec: &str) -> Result<Tool, String> {
    let captures = IMPORT_SPEC
        .captures(spec)
        .ok_or_else(|| format!("not an import spec: {spec}"))?;
    let package = captures
        .get(1)
        .or_else(|| captures.get(2))
        .map(|m| m.as_str())
        .unwrap_or_default();
    validate_package(package)?;

    let comment = captures.get(3).map(|m| m.as_str().trim()).unwrap_or_default();
    let annotation = if comment.is_empty() {
        Annotation::default()
    } else {
        serde_json::from_str::<Annotation>(comment)
            .map_err(|e| format!("undecodable metadata for {package}: {e}"))?
    };

    Ok(Tool::new(package, annotation.build_flags))
}

/// Renders the tools file for `tools`, in the given order.
pub fn render_tools(tools: &[Tool]) -> String {
    let mut out = String::from(HEADER);
    if tools.is_empty() {
        return out;
    }
    out.push_str("\nimport (\n");
    for tool in tools {
        out.push_str(&format!("\t_ \"{}\"", tool.package));
        if !tool.build_flags.is_empty() {
            let annotation = Annotation {
                build_flags: tool.build_flags.clone(),
            };
            let json = serde_json::to_string(&annotation)
                .expect("an annotation with one string field always serializes");
            out.push_str(&format!(" // {json}"));
        }
        out.push('\n');
    }
    out.push_str(")\n");
    out
}

/// Regenerates the tools file at `path`.
///
/// The new content goes to a temp file next to `path` which is then renamed
/// over it. Afterwards `formatter -w path` runs if the formatter can be
/// found on the search path.
pub fn write_tools(
    path: &Path,
    tools: &[Tool],
    formatter: Option<&str>,
    runner: &dyn ProcessRunner,
    logger: &Logger,
) -> Result<()> {
    for tool in tools {
        validate_package(&tool.package).map_err(Error::Config)?;
    }
    logger.log(format!("writing {} tool(s) to {}", tools.len(), path.display()));

    let dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let context = || format!("error writing tools file {}", path.display());

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| Error::io(context(), e))?;
    tmp.write_all(render_tools(tools).as_bytes())
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| Error::io(context(), e))?;
    let permissions = match fs::metadata(path) {
        Ok(meta) => Some(meta.permissions()),
        Err(_) => default_permissions(),
    };
    if let Some(permissions) = permissions {
        tmp.as_file()
            .set_permissions(permissions)
            .map_err(|e| Error::io(context(), e))?;
    }
    tmp.persist(path).map_err(|e| Error::io(context(), e.error))?;

    if let Some(formatter) = formatter {
        match which::which(formatter) {
            Ok(found) => {
                let invocation = Invocation::new(found)
                    .arg("-w")
                    .arg(path.to_string_lossy());
                run_captured(runner, &invocation, logger).map_err(|e| Error::Formatter {
                    path: path.to_path_buf(),
                    source: Box::new(e),
                })?;
            }
            Err(_) => logger.log(format!("{formatter} not found, leaving tools file unformatted")),
        }
    }
    Ok(())
}

#[cfg(unix)]
fn default_permissions() -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn default_permissions() -> Option<fs::Permissions> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{Captured, Exit, SystemRunner};
    use std::path::PathBuf;

    fn tools() -> Vec<Tool> {
        vec![
            Tool::new("golang.org/x/tools/cmd/stringer", ""),
            Tool::new("github.com/golangci/golangci-lint/cmd/golangci-lint", "-tags \"netgo osusergo\""),
            Tool::new("example.com/a", ""),
        ]
    }

    #[test]
    fn test_render_omits_annotation_for_empty_flags() {
        let out = render_tools(&[Tool::new("example.com/tool", "")]);
        assert!(out.starts_with("//go:build tools\n// +build tools\n"));
        assert!(out.contains("\t_ \"example.com/tool\"\n"));
        assert!(!out.contains("build_flags"));
    }

    #[test]
    fn test_render_annotation() {
        let out = render_tools(&[Tool::new("example.com/tool", "-ldflags=-s")]);
        assert!(out.contains("\t_ \"example.com/tool\" // {\"build_flags\":\"-ldflags=-s\"}\n"));
    }

    #[test]
    fn test_render_empty_has_no_import_block() {
        let out = render_tools(&[]);
        assert!(!out.contains("import"));
        assert!(parse_tools(&out, Path::new("tools.go")).unwrap().is_empty());
    }

    #[test]
    fn test_parse_keeps_order_and_flags() {
        let parsed = parse_tools(&render_tools(&tools()), Path::new("tools.go")).unwrap();
        assert_eq!(parsed, tools());
    }

    #[test]
    fn test_parse_gofmt_variants() {
        let src = r#"//go:build tools

package tools

import _ "example.com/single" // {"build_flags": "-a"}

import (
    // a comment line

    tool `example.com/raw`
    _ "example.com/plain"   //
)
"#;
        let parsed = parse_tools(src, Path::new("tools.go")).unwrap();
        assert_eq!(
            parsed,
            vec![
                Tool::new("example.com/single", "-a"),
                Tool::new("example.com/raw", ""),
                Tool::new("example.com/plain", ""),
            ]
        );
    }

    #[test]
    fn test_parse_rejects_bad_annotation() {
        let src = "package tools\n\nimport (\n\t_ \"example.com/tool\" // not json\n)\n";
        match parse_tools(src, Path::new("tools.go")).unwrap_err() {
            Error::ManifestCorrupt { path, reason } => {
                assert_eq!(path, PathBuf::from("tools.go"));
                assert!(reason.starts_with("line 4:"), "{reason}");
                assert!(reason.contains("example.com/tool"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_rejects_duplicates_and_empty_paths() {
        let dup = "import (\n\t_ \"example.com/a\"\n\t_ \"example.com/a\"\n)\n";
        assert!(matches!(
            parse_tools(dup, Path::new("tools.go")),
            Err(Error::ManifestCorrupt { .. })
        ));
        let empty = "import _ \"\"\n";
        assert!(matches!(
            parse_tools(empty, Path::new("tools.go")),
            Err(Error::ManifestCorrupt { .. })
        ));
        let open = "import (\n\t_ \"example.com/a\"\n";
        assert!(matches!(
            parse_tools(open, Path::new("tools.go")),
            Err(Error::ManifestCorrupt { .. })
        ));
    }

    #[test]
    fn test_read_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_tools(&dir.path().join("tools.go")).unwrap().is_empty());
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tools.go");
        write_tools(&path, &tools(), None, &SystemRunner, &Logger::default()).unwrap();
        assert_eq!(read_tools(&path).unwrap(), tools());

        write_tools(&path, &tools()[..1], None, &SystemRunner, &Logger::default()).unwrap();
        assert_eq!(read_tools(&path).unwrap(), tools()[..1].to_vec());
        let leftovers = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn test_write_rejects_unquotable_package() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tools.go");
        let err = write_tools(&path, &[Tool::new("bad \"pkg\"", "")], None, &SystemRunner, &Logger::default())
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(!path.exists());
    }

    #[test]
    fn test_validate_package() {
        assert!(validate_package("golang.org/x/tools/cmd/stringer").is_ok());
        assert!(validate_package("").is_err());
        assert!(validate_package("example.com/tool@v1").is_err());
        assert!(validate_package("example.com/tool/").is_err());
    }

    #[test]
    fn test_parse_rejects_versioned_import_path() {
        let src = "package tools\n\nimport _ \"example.com/tool@v1\"\n";
        let err = parse_tools(src, Path::new("tools.go")).unwrap_err();
        assert!(matches!(err, Error::ManifestCorrupt { .. }));
    }

    struct FailingFormatter;

    impl ProcessRunner for FailingFormatter {
        fn capture(&self, _invocation: &Invocation) -> std::io::Result<Captured> {
            Ok(Captured {
                exit: Exit::code(2),
                stdout: Vec::new(),
                stderr: b"tools.go:3:1: expected 'package'".to_vec(),
            })
        }

        fn attach(&self, _invocation: &Invocation) -> std::io::Result<Exit> {
            unreachable!()
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_formatter_failure_is_reported() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let formatter = dir.path().join("fake-goimports");
        fs::write(&formatter, "#!/bin/sh\nexit 0\n").unwrap();
        fs::set_permissions(&formatter, fs::Permissions::from_mode(0o755)).unwrap();

        let path = dir.path().join("tools.go");
        let err = write_tools(
            &path,
            &tools(),
            formatter.to_str(),
            &FailingFormatter,
            &Logger::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Formatter { .. }));
        assert!(path.exists());
    }

    #[test]
    fn test_missing_formatter_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tools.go");
        write_tools(
            &path,
            &tools(),
            Some("toolbox-no-such-formatter"),
            &FailingFormatter,
            &Logger::default(),
        )
        .unwrap();
        assert_eq!(read_tools(&path).unwrap(), tools());
    }
}
