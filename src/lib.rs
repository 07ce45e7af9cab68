//! # Toolbox Core Library
//!
//! This crate contains the engine of the `toolbox` tool, a vendoring helper for Go
//! developer tools.
//!
//! `toolbox` tracks tool packages in a generated `tools.go` file, so Go modules pin
//! their versions in `go.mod`, and installs the binaries into a private `_tools`
//! directory. Commands run through [`Toolbox::run`] see that directory first on `PATH`.
//!
//! This library is built for the `toolbox` CLI, but you can also reuse it as a backend in
//! other tools.
//!
//! ## Modules Overview
//! - [`options`] – Explicit options and the resolved configuration snapshot
//! - [`manifest`] – Reading and regenerating the tools file
//! - [`installer`] – `go get` / `go install` / `go mod tidy` invocations
//! - [`engine`] – Add, remove, sync, run and list
//! - [`shadow`] – Command resolution that prefers vendored binaries
//! - [`process`] – The process runner seam and its system implementation
//! - [`modfile`] – Requirement lookup in `go.mod`
//! - [`config`] – Config file discovery and parsing
//! - [`sink`] – Injectable trace output
//! - [`util`] – Shared helpers (binary names, paths)

pub mod error;
pub mod sink;
pub mod process;
pub mod options;
pub mod manifest;
pub mod modfile;
pub mod installer;
pub mod shadow;
pub mod engine;
pub mod config;
pub mod util;

pub use error::{Error, Result};
pub use sink::{Discard, LogSink, Logger, TracingSink};
pub use process::{Captured, Exit, Invocation, ProcessRunner, SystemRunner};
pub use options::{Options, ResolvedOptions};
pub use manifest::Tool;
pub use engine::{Toolbox, TrackedTool};
pub use config::FileConfig;
