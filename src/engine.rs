//! Add, remove, sync and run vendored tools.
//!
//! Each operation reads the tools file, changes the in-memory list, drives
//! `go`, and writes the tools file back only when the list changed. Nothing is
//! kept between calls, and nothing is rolled back on failure.

use std::io::ErrorKind;
use std::path::PathBuf;
use crate::error::{Error, Result};
use crate::installer::{self, Subcommand};
use crate::manifest::{self, validate_package, Tool};
use crate::modfile;
use crate::options::ResolvedOptions;
use crate::process::{Exit, ProcessRunner, SystemRunner};
use crate::shadow;
use crate::util::{binary_name, package_spec, split_package_version};

/// A tool as reported by [`Toolbox::list`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedTool {
    pub package: String,
    /// Version of the providing module, from `go.mod`.
    pub version: String,
    pub build_flags: String,
}

/// The vendoring engine for one resolved configuration.
#[derive(Debug)]
pub struct Toolbox<R = SystemRunner> {
    options: ResolvedOptions,
    runner: R,
}

impl Toolbox<SystemRunner> {
    pub fn new(options: ResolvedOptions) -> Self {
        Toolbox::with_runner(options, SystemRunner)
    }
}

impl<R: ProcessRunner> Toolbox<R> {
    pub fn with_runner(options: ResolvedOptions, runner: R) -> Self {
        Toolbox { options, runner }
    }

    pub fn options(&self) -> &ResolvedOptions {
        &self.options
    }

    /// Starts tracking `package` and installs it into the tool directory.
    ///
    /// `package` may carry its version as `pkg@version` when `version` is
    /// `None`. The global build flags are stored with the tool. Adding a tool
    /// that is already tracked with the same flags leaves the tools file alone;
    /// different flags replace the stored ones.
    pub fn add(&self, package: &str, version: Option<&str>) -> Result<()> {
        let (package, version) = match version.filter(|v| !v.is_empty()) {
            Some(version) => (package, Some(version)),
            None => split_package_version(package),
        };
        validate_package(package).map_err(Error::Config)?;
        let flags = &self.options.build_flags;

        installer::install(
            &self.runner,
            &self.options,
            Subcommand::Get,
            &package_spec(package, version),
            flags,
            &[],
        )?;
        installer::install(&self.runner, &self.options, Subcommand::Install, package, flags, &[])?;

        let mut tools = manifest::read_tools(&self.options.tools_file)?;
        match tools.iter_mut().find(|tool| tool.package == package) {
            Some(tool) if tool.build_flags == *flags => {
                self.options
                    .logger
                    .log(format!("{package} is already tracked"));
                return Ok(());
            }
            Some(tool) => tool.build_flags = flags.clone(),
            None => tools.push(Tool::new(package, flags.as_str())),
        }
        self.write(&tools)
    }

    /// Stops tracking `package`, deletes its binary, and tidies `go.mod`.
    ///
    /// An untracked package or a missing binary is not an error. The order of
    /// the remaining tools may change. A binary that another tracked tool
    /// also installs is kept.
    pub fn remove(&self, package: &str) -> Result<()> {
        validate_package(package).map_err(Error::Config)?;
        let mut tools = manifest::read_tools(&self.options.tools_file)?;
        match tools.iter().position(|tool| tool.package == package) {
            Some(index) => {
                tools.swap_remove(index);
                self.write(&tools)?;
            }
            None => self
                .options
                .logger
                .log(format!("{package} is not tracked in {}", self.options.tools_file.display())),
        }

        let binary = self.binary_path(package);
        match tools.iter().find(|tool| self.binary_path(&tool.package) == binary) {
            Some(owner) => self.options.logger.log(format!(
                "keeping {}, {} installs it too",
                binary.display(),
                owner.package
            )),
            None => match std::fs::remove_file(&binary) {
                Ok(()) => self.options.logger.log(format!("deleted {}", binary.display())),
                Err(e) if e.kind() == ErrorKind::NotFound => self
                    .options
                    .logger
                    .log(format!("{} does not exist, nothing to delete", binary.display())),
                Err(source) => return Err(Error::RemoveBinary { path: binary, source }),
            },
        }

        installer::tidy(&self.runner, &self.options)
    }

    /// Installs every tracked tool in tools-file order with its stored flags.
    pub fn sync(&self) -> Result<()> {
        let tools = manifest::read_tools(&self.options.tools_file)?;
        self.options
            .logger
            .log(format!("syncing {} tool(s)", tools.len()));
        installer::install_all(&self.runner, &self.options, &tools)
    }

    /// Runs `command_line` attached to the console with vendored tools first
    /// on `PATH`.
    ///
    /// The command's own failure is not an error; its exit is returned for the
    /// caller to forward. An empty command line does nothing.
    pub fn run(&self, command_line: &[String]) -> Result<Exit> {
        let Some((name, args)) = command_line.split_first() else {
            return Ok(Exit::code(0));
        };
        let invocation = shadow::build_command(&self.options, name, args)?;
        self.options.logger.log(format!("running {invocation}"));
        self.runner.attach(&invocation).map_err(|source| Error::Spawn {
            program: invocation.program_name(),
            source,
        })
    }

    /// Tracked tools with the versions `go.mod` pins them to.
    pub fn list(&self) -> Result<Vec<TrackedTool>> {
        let tools = manifest::read_tools(&self.options.tools_file)?;
        let gomod = self.options.base_dir.join("go.mod");
        let requirements = modfile::read_requirements(&gomod)?;
        tools
            .into_iter()
            .map(|tool| {
                let version = modfile::version_for(&requirements, &tool.package).ok_or_else(|| {
                    Error::ModFile(format!(
                        "no version for package {} found in {}",
                        tool.package,
                        gomod.display()
                    ))
                })?;
                Ok(TrackedTool {
                    version: version.to_string(),
                    package: tool.package,
                    build_flags: tool.build_flags,
                })
            })
            .collect()
    }

    /// The vendored binary `name` would run as, if there is one.
    pub fn which(&self, name: &str) -> Option<PathBuf> {
        shadow::vendored_program(&self.options, name)
    }

    /// A ready-to-spawn command for `name` with the shadowed environment.
    pub fn command(&self, name: &str, args: &[String]) -> Result<std::process::Command> {
        Ok(shadow::build_command(&self.options, name, args)?.to_command())
    }

    fn binary_path(&self, package: &str) -> PathBuf {
        self.options.tools_dir.join(binary_name(package))
    }

    fn write(&self, tools: &[Tool]) -> Result<()> {
        manifest::write_tools(
            &self.options.tools_file,
            tools,
            self.options.goimports.as_deref(),
            &self.runner,
            &self.options.logger,
        )
    }
}
