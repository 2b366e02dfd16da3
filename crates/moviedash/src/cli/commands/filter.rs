use anyhow::Result;
use clap::Args;

use super::FilterControlArgs;
use crate::config::RuntimePaths;
use crate::source::Database;

#[derive(Debug, Clone, Args)]
pub struct FilterArgs {
    #[command(flatten)]
    pub controls: FilterControlArgs,
}

pub fn run(args: &FilterArgs, runtime_paths: &RuntimePaths, json: bool) -> Result<()> {
    let database = Database::open(&runtime_paths.db_path);
    let page = crate::filters::build_filter_page(
        &database,
        &args.controls.selection(),
        args.controls.row_cap(),
    );
    tracing::info!(
        warnings = page.warnings().count(),
        "filter page built"
    );
    super::emit_page("filter", &page, &database, json)
}
