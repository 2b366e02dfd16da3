use anyhow::Result;
use clap::Args;

use crate::config::RuntimePaths;
use crate::source::Database;

#[derive(Debug, Clone, Args)]
pub struct VisualizeArgs {
    /// Render only this report slot (repeatable); all ten by default
    #[arg(
        long = "only",
        value_name = "SLOT",
        value_parser = clap::value_parser!(u8).range(1..=10)
    )]
    pub slots: Vec<u8>,
}

pub fn run(args: &VisualizeArgs, runtime_paths: &RuntimePaths, json: bool) -> Result<()> {
    let database = Database::open(&runtime_paths.db_path);
    let page = crate::reports::build_visualizations_page(&database, &args.slots);
    tracing::info!(
        sections = page.sections.len(),
        warnings = page.warnings().count(),
        "visualization page built"
    );
    super::emit_page("visualize", &page, &database, json)
}
