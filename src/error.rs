use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors returned by the toolbox engine.
///
/// Every component returns these instead of logging them. Mapping an error to
/// an exit code is up to the caller.
#[derive(Debug, Error)]
pub enum Error {
    /// Options could not be resolved (e.g. no `go.mod` was found).
    #[error("{0}")]
    Config(String),

    /// The tools file exists but can't be understood. Metadata is never
    /// silently dropped.
    #[error("tools file {} is corrupt: {reason}", path.display())]
    ManifestCorrupt { path: PathBuf, reason: String },

    /// An external process could not be started at all.
    #[error("error calling {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    /// An external process ran and exited unsuccessfully.
    #[error("error calling {program}: {status}: {stderr}")]
    Exit {
        program: String,
        status: String,
        stderr: String,
    },

    /// A vendored binary exists but could not be deleted.
    #[error("error deleting dependency executable {}: {source}", path.display())]
    RemoveBinary {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The formatter is installed but failed on the tools file.
    #[error("error formatting tools file {}: {source}", path.display())]
    Formatter {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },

    #[error("invalid build flags {flags:?}: unbalanced quotes or escapes")]
    BuildFlags { flags: String },

    #[error("{0}")]
    ModFile(String),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
}

impl Error {
    pub(crate) fn io(context: impl Into<String>, source: io::Error) -> Self {
        Error::Io {
            context: context.into(),
            source,
        }
    }

    /// Returns `true` for failures of external processes or of the binary
    /// cleanup that accompanies them.
    pub fn is_execution(&self) -> bool {
        matches!(
            self,
            Error::Spawn { .. } | Error::Exit { .. } | Error::RemoveBinary { .. }
        )
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_message_includes_stderr() {
        let err = Error::Exit {
            program: "go".to_string(),
            status: "exit status 1".to_string(),
            stderr: "cannot find module".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "error calling go: exit status 1: cannot find module"
        );
        assert!(err.is_execution());
    }

    #[test]
    fn test_formatter_is_not_execution() {
        let inner = Error::Exit {
            program: "goimports".to_string(),
            status: "exit status 2".to_string(),
            stderr: String::new(),
        };
        let err = Error::Formatter {
            path: PathBuf::from("tools.go"),
            source: Box::new(inner),
        };
        assert!(!err.is_execution());
        assert!(err.to_string().starts_with("error formatting tools file tools.go"));
    }
}
