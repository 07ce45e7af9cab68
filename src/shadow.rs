use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use crate::error::{Error, Result};
use crate::options::ResolvedOptions;
use crate::process::Invocation;
use crate::util::{executable_name, has_path_separator};

/// Resolves `name` the way `toolbox do` would.
///
/// A name with a path separator is taken as is. Otherwise a file of that name
/// in the tool directory wins over anything on the search path, and `None`
/// means the search path decides.
pub fn vendored_program(options: &ResolvedOptions, name: &str) -> Option<PathBuf> {
    if has_path_separator(name) {
        return None;
    }
    [name.to_string(), executable_name(name)]
        .into_iter()
        .map(|candidate| options.tools_dir.join(candidate))
        .find(|candidate| candidate.is_file())
}

/// The inherited search path with the tool directory in front.
pub fn shadowed_path(options: &ResolvedOptions) -> Result<OsString> {
    prepend_path(&options.tools_dir, &std::env::var_os("PATH").unwrap_or_default())
}

/// `dir` followed by the entries of `inherited`. Empty entries are dropped,
/// they would put the working directory on the search path.
fn prepend_path(dir: &Path, inherited: &OsStr) -> Result<OsString> {
    let dirs = std::iter::once(dir.to_path_buf())
        .chain(std::env::split_paths(inherited).filter(|entry| !entry.as_os_str().is_empty()));
    std::env::join_paths(dirs).map_err(|e| {
        Error::Config(format!("tools directory {} can't be put on PATH: {e}", dir.display()))
    })
}

/// Builds an invocation of `name` that prefers vendored tools.
///
/// `GOBIN` points at the tool directory so tools that install other tools
/// still vendor them.
pub fn build_command(options: &ResolvedOptions, name: &str, args: &[String]) -> Result<Invocation> {
    let program = vendored_program(options, name).unwrap_or_else(|| PathBuf::from(name));
    Ok(Invocation::new(program)
        .args(args.iter().cloned())
        .env("GOBIN", options.tools_dir.as_os_str())
        .env("PATH", shadowed_path(options)?))
}
