use anyhow::Result;
use clap::Args;

use super::FilterControlArgs;
use crate::config::RuntimePaths;
use crate::source::Database;

#[derive(Debug, Clone, Args)]
pub struct MultiFilterArgs {
    #[command(flatten)]
    pub controls: FilterControlArgs,
}

pub fn run(args: &MultiFilterArgs, runtime_paths: &RuntimePaths, json: bool) -> Result<()> {
    let selection = args.controls.selection();
    let database = Database::open(&runtime_paths.db_path);
    let page =
        crate::filters::build_multi_filter_page(&database, &selection, args.controls.row_cap());
    tracing::info!(
        complete = selection.complete().is_some(),
        warnings = page.warnings().count(),
        "multi-filter page built"
    );
    super::emit_page("multi-filter", &page, &database, json)
}
