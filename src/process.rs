//! External process execution.
//!
//! Everything that spawns a process goes through [`ProcessRunner`], so the
//! reconciler can be driven by a fake in tests.

use std::ffi::OsString;
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use crate::error::{Error, Result};
use crate::sink::Logger;

/// A fully described process launch: program, arguments, environment
/// overrides and working directory. The inherited environment is kept and the
/// overrides are applied on top of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub envs: Vec<(String, OsString)>,
    pub current_dir: Option<PathBuf>,
}

impl Invocation {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Invocation {
            program: program.into(),
            args: Vec::new(),
            envs: Vec::new(),
            current_dir: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<OsString>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Last value set for `key`, if any.
    pub fn env_value(&self, key: &str) -> Option<&OsString> {
        self.envs.iter().rev().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn program_name(&self) -> String {
        self.program.display().to_string()
    }

    /// Builds the equivalent `std::process::Command`.
    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        for (key, value) in &self.envs {
            cmd.env(key, value);
        }
        if let Some(dir) = &self.current_dir {
            cmd.current_dir(dir);
        }
        cmd
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// How a process ended. `code` is `None` when it was killed by a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exit {
    pub code: Option<i32>,
}

impl Exit {
    pub fn code(code: i32) -> Self {
        Exit { code: Some(code) }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl fmt::Display for Exit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "exit status {code}"),
            None => f.write_str("terminated by signal"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Captured {
    pub exit: Exit,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

/// Runs external processes.
///
/// `Err` from either method means the process could not be started. A process
/// that started and failed is reported through [`Exit`].
pub trait ProcessRunner {
    /// Runs to completion with stdout and stderr captured.
    fn capture(&self, invocation: &Invocation) -> io::Result<Captured>;
    /// Runs to completion attached to the caller's stdin, stdout and stderr.
    fn attach(&self, invocation: &Invocation) -> io::Result<Exit>;
}

impl<T: ProcessRunner + ?Sized> ProcessRunner for &T {
    fn capture(&self, invocation: &Invocation) -> io::Result<Captured> {
        (**self).capture(invocation)
    }

    fn attach(&self, invocation: &Invocation) -> io::Result<Exit> {
        (**self).attach(invocation)
    }
}

/// Spawns real processes with `std::process`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn capture(&self, invocation: &Invocation) -> io::Result<Captured> {
        let output = invocation
            .to_command()
            .stdin(Stdio::null())
            .output()?;
        Ok(Captured {
            exit: Exit { code: output.status.code() },
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }

    fn attach(&self, invocation: &Invocation) -> io::Result<Exit> {
        let status = invocation.to_command().status()?;
        Ok(Exit { code: status.code() })
    }
}

/// Runs `invocation` with output captured, turning spawn failures and
/// unsuccessful exits into errors. Returns captured stdout.
pub fn run_captured(
    runner: &dyn ProcessRunner,
    invocation: &Invocation,
    logger: &Logger,
) -> Result<Vec<u8>> {
    logger.log(format!("running {invocation}"));
    let captured = runner.capture(invocation).map_err(|source| Error::Spawn {
        program: invocation.program_name(),
        source,
    })?;
    if !captured.exit.success() {
        return Err(Error::Exit {
            program: invocation.program_name(),
            status: captured.exit.to_string(),
            stderr: String::from_utf8_lossy(&captured.stderr).trim().to_string(),
        });
    }
    Ok(captured.stdout)
}
