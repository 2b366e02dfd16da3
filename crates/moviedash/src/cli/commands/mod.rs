pub mod filter;
pub mod multi_filter;
pub mod schema;
pub mod visualize;

use anyhow::{Error, Result};
use clap::Args;
use serde_json::json;

use crate::models::{
    DurationBucket, Genre, Page, QueryEnvelope, QueryEnvelopeCommandFailure, RatingThreshold,
    VotesBucket,
};
use crate::source::Database;

/// The four filter controls shared by `filter` and `multi-filter`.
#[derive(Debug, Clone, Args)]
pub struct FilterControlArgs {
    #[arg(long, value_enum, value_name = "RANGE")]
    pub duration: Option<DurationBucket>,

    #[arg(long, value_name = "MIN", default_value = "5.0")]
    pub rating: RatingThreshold,

    #[arg(long, value_enum, value_name = "RANGE")]
    pub votes: Option<VotesBucket>,

    #[arg(long, value_enum)]
    pub genre: Option<Genre>,

    /// Maximum rows shown per table; 0 shows every row
    #[arg(long, default_value_t = crate::filters::DEFAULT_ROW_CAP)]
    pub row_cap: usize,
}

impl FilterControlArgs {
    #[must_use]
    pub fn selection(&self) -> crate::filters::FilterSelection {
        crate::filters::FilterSelection {
            duration: self.duration,
            rating: self.rating,
            votes: self.votes,
            genre: self.genre,
        }
    }

    #[must_use]
    pub fn row_cap(&self) -> Option<usize> {
        (self.row_cap > 0).then_some(self.row_cap)
    }
}

pub(crate) fn emit_page(command: &str, page: &Page, database: &Database, json: bool) -> Result<()> {
    if !json {
        print!("{}", crate::render::render_text_page(page));
        return Ok(());
    }

    let database_path = database
        .path()
        .map(|path| path.display().to_string());
    let envelope = QueryEnvelope::for_page(command, page)
        .map_err(|error| envelope_failure(command, &error))?
        .with_meta("database_path", json!(database_path))
        .with_meta("database_available", json!(database.unavailable_cause().is_none()));

    let encoded =
        serde_json::to_string(&envelope).map_err(|error| envelope_failure(command, &error.into()))?;
    println!("{encoded}");
    Ok(())
}

fn envelope_failure(command: &str, error: &Error) -> Error {
    Error::new(QueryEnvelopeCommandFailure::new(
        QueryEnvelope::error(
            command,
            "page_encode_failed",
            "failed to encode page response",
        )
        .with_error_details(json!({ "cause": format!("{error:#}") })),
    ))
}
