#![forbid(unsafe_code)]

use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::Parser;
use clap::error::ErrorKind;
use moviedash::cli::app::{Cli, Command, RuntimeArgs};
use moviedash::cli::commands;
use moviedash::config::RuntimePaths;
use tracing_subscriber::EnvFilter;

const EXIT_SUCCESS: i32 = 0;
const EXIT_RUNTIME_FAILURE: i32 = 1;
const EXIT_USAGE_ERROR: i32 = 64;

fn main() {
    std::process::exit(run());
}

fn run() -> i32 {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(error) => return exit_code_for_parse_error(error),
    };
    init_tracing();

    let command_name = command_name(&cli.command);
    tracing::info!("moviedash: starting `{command_name}`");

    match execute(cli) {
        Ok(()) => {
            tracing::info!("moviedash: completed `{command_name}` (exit_code={EXIT_SUCCESS})");
            EXIT_SUCCESS
        }
        Err(error) => {
            eprintln!("moviedash: failed `{command_name}` (exit_code={EXIT_RUNTIME_FAILURE})");
            eprintln!("{error:#}");
            EXIT_RUNTIME_FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn execute(cli: Cli) -> Result<()> {
    let json = cli.runtime.json;
    match cli.command {
        Command::Visualize(args) => {
            let runtime_paths = resolve_runtime_paths(&cli.runtime)?;
            commands::visualize::run(&args, &runtime_paths, json)
        }
        Command::Filter(args) => {
            let runtime_paths = resolve_runtime_paths(&cli.runtime)?;
            commands::filter::run(&args, &runtime_paths, json)
        }
        Command::MultiFilter(args) => {
            let runtime_paths = resolve_runtime_paths(&cli.runtime)?;
            commands::multi_filter::run(&args, &runtime_paths, json)
        }
        Command::Schema(args) => commands::schema::run(&args),
    }
}

fn exit_code_for_parse_error(error: clap::Error) -> i32 {
    match error.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            let _ = error.print();
            EXIT_SUCCESS
        }
        _ => {
            let _ = error.print();
            EXIT_USAGE_ERROR
        }
    }
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Visualize(_) => "visualize",
        Command::Filter(_) => "filter",
        Command::MultiFilter(_) => "multi-filter",
        Command::Schema(_) => "schema",
    }
}

fn resolve_runtime_paths(args: &RuntimeArgs) -> Result<RuntimePaths> {
    let home_dir = match &args.home_dir {
        Some(path) => path.clone(),
        None => std::env::var_os("HOME")
            .map(PathBuf::from)
            .ok_or_else(|| anyhow!("HOME is not set; pass --home-dir"))?,
    };

    let cwd = match &args.cwd {
        Some(path) => path.clone(),
        None => std::env::current_dir()?,
    };

    moviedash::config::resolve_runtime_paths(&home_dir, &cwd, args.db.as_deref())
}
