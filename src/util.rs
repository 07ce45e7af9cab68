use std::path::{Path, PathBuf};
use crate::error::{Error, Result};

#[cfg(windows)]
pub const EXEC_EXT: &str = "exe";
#[cfg(not(windows))]
pub const EXEC_EXT: &str = "";

/// Returns the file name `go install` gives the binary built from `package`.
///
/// This is the last path element, unless that element is a major version
/// suffix like `v2`, in which case the element before it is used.
pub fn binary_name(package: &str) -> String {
    let mut segments = package.trim_end_matches('/').rsplit('/');
    let last = segments.next().unwrap_or_default();
    let name = match segments.next() {
        Some(parent) if is_major_version(last) => parent,
        _ => last,
    };
    executable_name(name)
}

/// Appends the platform executable extension, if there is one.
pub fn executable_name(name: &str) -> String {
    if EXEC_EXT.is_empty() || name.ends_with(&format!(".{EXEC_EXT}")) {
        name.to_string()
    } else {
        format!("{name}.{EXEC_EXT}")
    }
}

fn is_major_version(segment: &str) -> bool {
    match segment.strip_prefix('v') {
        Some(digits) => !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()),
        None => false,
    }
}

/// Makes `path` absolute against the current directory without touching the
/// filesystem.
pub fn absolutize<P: AsRef<Path>>(path: P) -> Result<PathBuf> {
    let path = path.as_ref();
    std::path::absolute(path).map_err(|e| {
        Error::Config(format!(
            "error finding absolute path to {}: {e}",
            path.display()
        ))
    })
}

/// Splits `pkg@version` into its parts. A string without `@` has no version.
pub fn split_package_version(spec: &str) -> (&str, Option<&str>) {
    match spec.split_once('@') {
        Some((package, version)) if !version.is_empty() => (package, Some(version)),
        Some((package, _)) => (package, None),
        None => (spec, None),
    }
}

/// Joins a package and an optional version into a `go get` argument.
pub fn package_spec(package: &str, version: Option<&str>) -> String {
    match version {
        Some(version) if !version.is_empty() => format!("{package}@{version}"),
        _ => package.to_string(),
    }
}

/// Whether `name` names a path rather than a command to look up.
pub fn has_path_separator(name: &str) -> bool {
    name.contains('/') || name.contains(std::path::MAIN_SEPARATOR)
}
