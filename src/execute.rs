use std::process::ExitCode;
use anyhow::{Context, Result};
use colored::Colorize;
use toolbox::{FileConfig, Logger, Options, SystemRunner, Toolbox};
use crate::cli::{GlobalArgs, ToolboxCommand, CLI};

pub fn execute(cli: CLI) -> Result<ExitCode> {
    let toolbox = build_toolbox(&cli.global)?;
    match cli.command {
        ToolboxCommand::Add { dependency, version } => {
            execute_add(&toolbox, &dependency, version.as_deref())
        }
        ToolboxCommand::Remove { dependency } => {
            execute_remove(&toolbox, &dependency)
        }
        ToolboxCommand::Sync => {
            execute_sync(&toolbox)
        }
        ToolboxCommand::Do { command } => {
            execute_do(&toolbox, &command)
        }
        ToolboxCommand::List => {
            execute_list(&toolbox)
        }
        ToolboxCommand::Which { name } => {
            execute_which(&toolbox, &name)
        }
    }
}

/// Whether `--verbose` was asked for on the command line, environment or
/// config file. Needed before logging is set up.
pub fn verbose_requested(global: &GlobalArgs) -> bool {
    if global.verbose {
        return true;
    }
    let Ok(cwd) = std::env::current_dir() else {
        return false;
    };
    FileConfig::discover(global.config_file.as_deref(), &cwd)
        .ok()
        .and_then(|config| config.verbose)
        .unwrap_or(false)
}

fn build_toolbox(global: &GlobalArgs) -> Result<Toolbox> {
    let cwd = std::env::current_dir()?;
    let file = FileConfig::discover(global.config_file.as_deref(), &cwd)
        .context("Could not load config file")?;
    let verbose = global.verbose || file.verbose.unwrap_or(false);

    let explicit = Options {
        go: global.go.clone(),
        goimports: global.goimports.clone(),
        base_dir: global.base_dir.clone(),
        tools_file: global.tools_file.clone(),
        tools_dir: global.tools_directory.clone(),
        build_flags: global.build_flags.clone(),
        logger: verbose.then(Logger::tracing),
    };
    let resolved = explicit
        .or(file.into_options())
        .resolve(&SystemRunner)
        .context("Could not resolve options")?;
    Ok(Toolbox::new(resolved))
}

pub fn execute_add(toolbox: &Toolbox, dependency: &str, version: Option<&str>) -> Result<ExitCode> {
    toolbox
        .add(dependency, version)
        .with_context(|| format!("Could not add {dependency}"))?;
    Ok(ExitCode::SUCCESS)
}

pub fn execute_remove(toolbox: &Toolbox, dependency: &str) -> Result<ExitCode> {
    toolbox
        .remove(dependency)
        .with_context(|| format!("Could not remove {dependency}"))?;
    Ok(ExitCode::SUCCESS)
}

pub fn execute_sync(toolbox: &Toolbox) -> Result<ExitCode> {
    toolbox.sync().context("Sync failed")?;
    Ok(ExitCode::SUCCESS)
}

pub fn execute_do(toolbox: &Toolbox, command: &[String]) -> Result<ExitCode> {
    let exit = toolbox.run(command)?;
    if exit.success() {
        return Ok(ExitCode::SUCCESS);
    }
    let code = exit.code.and_then(|code| u8::try_from(code).ok()).unwrap_or(1);
    Ok(ExitCode::from(code))
}

pub fn execute_list(toolbox: &Toolbox) -> Result<ExitCode> {
    let tools = toolbox.list()?;
    if tools.is_empty() {
        println!("No dependencies");
        return Ok(ExitCode::SUCCESS);
    }
    for tool in tools {
        println!("{} {}", tool.package.bold(), tool.version);
        if !tool.build_flags.is_empty() {
            println!("  build flags: {}", tool.build_flags);
        }
    }
    Ok(ExitCode::SUCCESS)
}

pub fn execute_which(toolbox: &Toolbox, name: &str) -> Result<ExitCode> {
    match toolbox.which(name) {
        Some(path) => {
            println!("{}", path.display());
            Ok(ExitCode::SUCCESS)
        }
        None => {
            eprintln!("{name} is not vendored in {}", toolbox.options().tools_dir.display());
            Ok(ExitCode::FAILURE)
        }
    }
}
