use std::path::Path;
use std::sync::LazyLock;
use regex::Regex;
use crate::error::{Error, Result};

static REQUIRE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^(?:"([^"]+)"|(\S+))\s+(\S+)"#).expect("require pattern is valid")
});

/// A `require` directive from `go.mod`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub path: String,
    pub version: String,
}

/// Extracts every requirement from `go.mod` source, both the single-line
/// `require mod v1.0.0` form and `require ( ... )` blocks. Other directives
/// are ignored.
pub fn parse_requirements(src: &str) -> Vec<Requirement> {
    let mut requirements = Vec::new();
    let mut in_block = false;
    for raw in src.lines() {
        let line = strip_comment(raw).trim();
        let entry = if in_block {
            if line == ")" {
                in_block = false;
                continue;
            }
            line
        } else if let Some(rest) = line.strip_prefix("require") {
            let rest = rest.trim_start();
            if rest.starts_with('(') {
                in_block = true;
                continue;
            }
            rest
        } else {
            continue;
        };
        if let Some(captures) = REQUIRE_LINE.captures(entry) {
            let path = captures.get(1).or_else(|| captures.get(2)).map(|m| m.as_str());
            if let (Some(path), Some(version)) = (path, captures.get(3)) {
                requirements.push(Requirement {
                    path: path.to_string(),
                    version: version.as_str().to_string(),
                });
            }
        }
    }
    requirements
}

fn strip_comment(line: &str) -> &str {
    match line.find("//") {
        Some(idx) => &line[..idx],
        None => line,
    }
}

/// Finds the version of the module providing `package`: the requirement with
/// the longest path that is `package` itself or one of its parents.
pub fn version_for<'a>(requirements: &'a [Requirement], package: &str) -> Option<&'a str> {
    requirements
        .iter()
        .filter(|req| {
            package == req.path
                || package
                    .strip_prefix(req.path.as_str())
                    .is_some_and(|rest| rest.starts_with('/'))
        })
        .max_by_key(|req| req.path.len())
        .map(|req| req.version.as_str())
}

/// Reads and parses the `go.mod` at `path`.
pub fn read_requirements(path: &Path) -> Result<Vec<Requirement>> {
    let src = std::fs::read_to_string(path)
        .map_err(|e| Error::ModFile(format!("error reading modfile {}: {e}", path.display())))?;
    Ok(parse_requirements(&src))
}

#[cfg(test)]
mod tests {
    use super::*;

    const GO_MOD: &str = r#"module example.com/project

go 1.22

require github.com/spf13/cobra v1.8.0

require (
	golang.org/x/tools v0.20.0
	golang.org/x/tools/gopls v0.15.3 // indirect
	"github.com/quoted/mod" v1.0.0
)

replace example.com/old => ../old
"#;

    #[test]
    fn test_parse_requirements() {
        let reqs = parse_requirements(GO_MOD);
        let paths: Vec<_> = reqs.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "github.com/spf13/cobra",
                "golang.org/x/tools",
                "golang.org/x/tools/gopls",
                "github.com/quoted/mod",
            ]
        );
        assert_eq!(reqs[2].version, "v0.15.3");
    }

    #[test]
    fn test_version_for_prefers_longest_module() {
        let reqs = parse_requirements(GO_MOD);
        assert_eq!(version_for(&reqs, "golang.org/x/tools/cmd/stringer"), Some("v0.20.0"));
        assert_eq!(version_for(&reqs, "golang.org/x/tools/gopls"), Some("v0.15.3"));
        assert_eq!(version_for(&reqs, "golang.org/x/toolsmith"), None);
        assert_eq!(version_for(&reqs, "example.com/old"), None);
    }

    #[test]
    fn test_read_missing_modfile() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_requirements(&dir.path().join("go.mod")).unwrap_err();
        assert!(matches!(err, Error::ModFile(_)));
    }
}
