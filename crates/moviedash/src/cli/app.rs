use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use super::commands::{
    filter::FilterArgs, multi_filter::MultiFilterArgs, schema::SchemaArgs,
    visualize::VisualizeArgs,
};

#[derive(Debug, Parser)]
#[command(
    name = "moviedash",
    version,
    about = "Read-only analytics dashboard over a movie ratings database"
)]
pub struct Cli {
    #[command(flatten)]
    pub runtime: RuntimeArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Args)]
pub struct RuntimeArgs {
    #[arg(long, global = true, value_name = "PATH")]
    pub home_dir: Option<PathBuf>,

    #[arg(long, global = true, value_name = "PATH")]
    pub cwd: Option<PathBuf>,

    /// SQLite file holding the `Movies` table (default: ./IMDB.db)
    #[arg(long, global = true, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// Print the page as a JSON envelope instead of text
    #[arg(long, global = true, default_value_t = false)]
    pub json: bool,
}

/// Navigation choice: one subcommand per dashboard page.
#[derive(Debug, Subcommand)]
pub enum Command {
    Visualize(VisualizeArgs),
    Filter(FilterArgs),
    MultiFilter(MultiFilterArgs),
    Schema(SchemaArgs),
}
