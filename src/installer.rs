use crate::error::{Error, Result};
use crate::manifest::Tool;
use crate::options::ResolvedOptions;
use crate::process::{run_captured, Invocation, ProcessRunner};

/// Passed to every `go install` during sync.
pub const SYNC_FLAG: &str = "-v";

/// Which `go` subcommand fetches the package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subcommand {
    /// `go get`: resolves the version and records it in `go.mod`.
    Get,
    /// `go install`: builds the package into `GOBIN`.
    Install,
}

impl Subcommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            Subcommand::Get => "get",
            Subcommand::Install => "install",
        }
    }
}

/// Splits a build-flag string the way a POSIX shell would.
pub fn split_build_flags(flags: &str) -> Result<Vec<String>> {
    shlex::split(flags).ok_or_else(|| Error::BuildFlags {
        flags: flags.to_string(),
    })
}

/// Builds the `go` invocation for one package without running it.
///
/// `GOBIN` always points at the absolute tool directory, whatever the caller's
/// environment says, and `go` runs from the base directory.
pub fn install_invocation(
    options: &ResolvedOptions,
    subcommand: Subcommand,
    spec: &str,
    build_flags: &str,
    extra: &[&str],
) -> Result<Invocation> {
    Ok(Invocation::new(&options.go)
        .arg(subcommand.as_str())
        .args(extra.iter().copied())
        .args(split_build_flags(build_flags)?)
        .arg(spec)
        .env("GOBIN", options.tools_dir.as_os_str())
        .current_dir(&options.base_dir))
}

/// Runs `go get` or `go install` for `spec` (`package` or `package@version`).
/// Safe to repeat; `go` does nothing when the binary is already current.
pub fn install(
    runner: &dyn ProcessRunner,
    options: &ResolvedOptions,
    subcommand: Subcommand,
    spec: &str,
    build_flags: &str,
    extra: &[&str],
) -> Result<()> {
    let invocation = install_invocation(options, subcommand, spec, build_flags, extra)?;
    run_captured(runner, &invocation, &options.logger)?;
    Ok(())
}

/// Installs every tool in order with its own stored flags. Stops at the first
/// failure; tools installed before it stay installed.
pub fn install_all(
    runner: &dyn ProcessRunner,
    options: &ResolvedOptions,
    tools: &[Tool],
) -> Result<()> {
    for tool in tools {
        install(
            runner,
            options,
            Subcommand::Install,
            &tool.package,
            &tool.build_flags,
            &[SYNC_FLAG],
        )?;
    }
    Ok(())
}

/// Runs `go mod tidy` in the base directory.
pub fn tidy(runner: &dyn ProcessRunner, options: &ResolvedOptions) -> Result<()> {
    let invocation = Invocation::new(&options.go)
        .args(["mod", "tidy"])
        .current_dir(&options.base_dir);
    run_captured(runner, &invocation, &options.logger)?;
    Ok(())
}
