use std::path::PathBuf;
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser, Clone)]
#[command(
    author,
    version,
    about = "Toolbox is a tool vendoring helper",
    long_about = "Toolbox sits on top of go's module engine, and leverages it to vendor your executables"
)]
pub struct CLI {
    #[command(flatten)]
    pub(crate) global: GlobalArgs,
    #[command(subcommand)]
    pub(crate) command: ToolboxCommand,
}

#[derive(Debug, Args, Clone, Default)]
pub struct GlobalArgs {
    /// The "go" executable to use
    #[arg(long, global = true, env = "TOOLBOX_GO")]
    pub go: Option<String>,
    /// The "goimports" executable to use. Pass an empty value to skip formatting
    #[arg(long, global = true, env = "TOOLBOX_GOIMPORTS")]
    pub goimports: Option<String>,
    /// Base directory for the tools file and tools directory. Defaults to the directory
    /// holding go.mod
    #[arg(long = "base_dir", global = true, env = "TOOLBOX_BASE_DIR")]
    pub base_dir: Option<PathBuf>,
    /// File in which to store tool data. Should end in ".go" so go's module system
    /// picks it up. Defaults to "tools.go" in the base directory
    #[arg(long = "tools_file", global = true, env = "TOOLBOX_TOOLS_FILE")]
    pub tools_file: Option<PathBuf>,
    /// Directory where tool binaries are stored. Defaults to "_tools" in the base directory
    #[arg(long = "tools_directory", global = true, env = "TOOLBOX_TOOLS_DIRECTORY")]
    pub tools_directory: Option<PathBuf>,
    /// Build flags to use when adding a new tool. Stored and reused when syncing
    #[arg(long = "build_flags", global = true, env = "TOOLBOX_BUILD_FLAGS", allow_hyphen_values = true)]
    pub build_flags: Option<String>,
    /// Print every external command and file operation
    #[arg(short, long, global = true, env = "TOOLBOX_VERBOSE")]
    pub verbose: bool,
    /// Config file to load. Defaults to ".toolbox.toml" or ".toolbox.json" in the
    /// current directory, then the user config directory
    #[arg(long = "config_file", global = true)]
    pub config_file: Option<PathBuf>,
}

#[derive(Debug, Subcommand, Clone, PartialEq)]
pub enum ToolboxCommand {
    /// Add a new dependency. If a version is provided, adds that version as well
    Add {
        /// Package path of the tool, optionally as <package>@<version>
        dependency: String,
        version: Option<String>,
    },
    /// Remove a dependency, and its executable from the tools directory
    Remove {
        dependency: String,
    },
    /// Make sure all dependencies are installed at the version in go.mod
    Sync,
    /// Run a command using the vendored version of tools
    Do {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },
    /// List tracked tools with their versions
    List,
    /// Print the vendored binary a command name resolves to
    Which {
        name: String,
    },
}
