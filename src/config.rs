//! Config file loading.
//!
//! Settings can live in `.toolbox.toml` or `.toolbox.json` in the current
//! directory, or in `config.toml` under the per-user config directory. Keys
//! match the command-line flags.

use std::path::{Path, PathBuf};
use directories::ProjectDirs;
use serde::Deserialize;
use crate::error::{Error, Result};
use crate::options::Options;

const LOCAL_CANDIDATES: [&str; 2] = [".toolbox.toml", ".toolbox.json"];

/// Contents of a config file. Every key is optional.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub go: Option<String>,
    pub goimports: Option<String>,
    pub base_dir: Option<PathBuf>,
    pub tools_file: Option<PathBuf>,
    pub tools_directory: Option<PathBuf>,
    pub build_flags: Option<String>,
    pub verbose: Option<bool>,
}

impl FileConfig {
    /// Parses `path` as TOML or JSON depending on its extension.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<FileConfig> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("error reading config file {}: {e}", path.display()))
        })?;
        let invalid = |e: String| Error::Config(format!("invalid config file {}: {e}", path.display()));
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::from_str(&content).map_err(|e| invalid(e.to_string())),
            Some("toml") => toml::from_str(&content).map_err(|e| invalid(e.to_string())),
            _ => Err(Error::Config(format!(
                "unsupported config file {}: expected a .toml or .json extension",
                path.display()
            ))),
        }
    }

    /// Loads `explicit` if given; it must exist. Otherwise loads the first
    /// config file found in `cwd`, then in the user config directory. No file
    /// at all gives an empty config.
    pub fn discover(explicit: Option<&Path>, cwd: &Path) -> Result<FileConfig> {
        if let Some(path) = explicit {
            return FileConfig::load(path);
        }
        let global = global_config_file();
        let found = LOCAL_CANDIDATES
            .iter()
            .map(|name| cwd.join(name))
            .chain(global)
            .find(|path| path.is_file());
        match found {
            Some(path) => FileConfig::load(path),
            None => Ok(FileConfig::default()),
        }
    }

    /// Converts to engine options. Relative paths stay as written and resolve
    /// against the current directory.
    pub fn into_options(self) -> Options {
        Options {
            go: self.go,
            goimports: self.goimports,
            base_dir: self.base_dir,
            tools_file: self.tools_file,
            tools_dir: self.tools_directory,
            build_flags: self.build_flags,
            logger: None,
        }
    }
}

/// `config.toml` in the per-user config directory, e.g.
/// `~/.config/toolbox/config.toml` on Linux.
pub fn global_config_file() -> Option<PathBuf> {
    ProjectDirs::from("org", "toolbox", "toolbox").map(|dirs| dirs.config_dir().join("config.toml"))
}
