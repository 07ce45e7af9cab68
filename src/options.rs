//! Option resolution.
//!
//! [`Options`] holds whatever the caller set explicitly. [`Options::resolve`]
//! fills in the rest and returns an immutable [`ResolvedOptions`].

use std::path::{Path, PathBuf};
use crate::error::{Error, Result};
use crate::process::{run_captured, Invocation, ProcessRunner};
use crate::sink::Logger;
use crate::util::absolutize;

pub const DEFAULT_GO: &str = "go";
pub const DEFAULT_GOIMPORTS: &str = "goimports";
pub const DEFAULT_TOOLS_FILE: &str = "tools.go";
pub const DEFAULT_TOOLS_DIR: &str = "_tools";

/// Explicit overrides. Unset fields get defaults during resolution.
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// The `go` executable.
    pub go: Option<String>,
    /// Formatter run on the tools file after every write. An empty string
    /// disables formatting.
    pub goimports: Option<String>,
    /// Directory the tools file and tools directory default into. When unset,
    /// the directory holding `go.mod`.
    pub base_dir: Option<PathBuf>,
    pub tools_file: Option<PathBuf>,
    pub tools_dir: Option<PathBuf>,
    /// Flags passed to `go get`/`go install` when adding a tool. Stored per
    /// tool and reused by sync.
    pub build_flags: Option<String>,
    pub logger: Option<Logger>,
}

/// Configuration snapshot for one invocation. All paths are absolute.
#[derive(Debug, Clone)]
pub struct ResolvedOptions {
    pub go: String,
    pub goimports: Option<String>,
    pub base_dir: PathBuf,
    pub tools_file: PathBuf,
    pub tools_dir: PathBuf,
    pub build_flags: String,
    pub logger: Logger,
}

impl Options {
    /// Fills every unset field from `other`.
    pub fn or(self, other: Options) -> Options {
        Options {
            go: self.go.or(other.go),
            goimports: self.goimports.or(other.goimports),
            base_dir: self.base_dir.or(other.base_dir),
            tools_file: self.tools_file.or(other.tools_file),
            tools_dir: self.tools_dir.or(other.tools_dir),
            build_flags: self.build_flags.or(other.build_flags),
            logger: self.logger.or(other.logger),
        }
    }

    /// Applies defaults. The only side effect is asking `go` where the module
    /// root is, and only when no base directory was given.
    pub fn resolve(self, runner: &dyn ProcessRunner) -> Result<ResolvedOptions> {
        let logger = self.logger.unwrap_or_default();
        let go = self
            .go
            .filter(|go| !go.is_empty())
            .unwrap_or_else(|| DEFAULT_GO.to_string());
        let goimports = match self.goimports {
            None => Some(DEFAULT_GOIMPORTS.to_string()),
            Some(goimports) if goimports.is_empty() => None,
            Some(goimports) => Some(goimports),
        };

        let base_dir = match self.base_dir {
            Some(dir) => absolutize(dir)?,
            None => module_root(runner, &go, &logger)?,
        };
        let tools_file = match self.tools_file {
            Some(file) => absolutize(file)?,
            None => base_dir.join(DEFAULT_TOOLS_FILE),
        };
        let tools_dir = match self.tools_dir {
            Some(dir) => absolutize(dir)?,
            None => base_dir.join(DEFAULT_TOOLS_DIR),
        };

        Ok(ResolvedOptions {
            go,
            goimports,
            base_dir,
            tools_file,
            tools_dir,
            build_flags: self.build_flags.unwrap_or_default(),
            logger,
        })
    }
}

/// Asks `go env GOMOD` for the active `go.mod` and returns its directory.
fn module_root(runner: &dyn ProcessRunner, go: &str, logger: &Logger) -> Result<PathBuf> {
    let invocation = Invocation::new(go).args(["env", "GOMOD"]);
    let stdout = run_captured(runner, &invocation, logger)?;
    let gomod = String::from_utf8_lossy(&stdout).trim().to_string();
    if gomod.is_empty() || gomod == "/dev/null" || gomod.eq_ignore_ascii_case("NUL") {
        return Err(Error::Config(
            "no go.mod file found: run `go mod init <module>` in your project root, or pass --base_dir"
                .to_string(),
        ));
    }
    let dir = Path::new(&gomod)
        .parent()
        .ok_or_else(|| Error::Config(format!("go.mod path {gomod} has no parent directory")))?;
    logger.log(format!("using module root {}", dir.display()));
    absolutize(dir)
}
