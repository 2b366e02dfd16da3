//! Single- and multi-dimension filtering over `Movies`.
//!
//! Bucket predicates are fixed SQL fragments owned by the bucket enums; user
//! supplied values (rating threshold, genre) are always bound as parameters.

use rusqlite::types::Value as SqlValue;

use crate::models::{
    Block, DurationBucket, Genre, Page, PageKind, RatingThreshold, ResultTable, Section,
    VotesBucket,
};
use crate::source::{MovieQuery, MovieSource};

pub const FILTER_PAGE_TITLE: &str = "Filtering page";
pub const MULTI_FILTER_PAGE_TITLE: &str = "Filtering Page";
pub const DEFAULT_ROW_CAP: usize = 1_000;

/// Current state of the four filter controls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterSelection {
    pub duration: Option<DurationBucket>,
    pub rating: RatingThreshold,
    pub votes: Option<VotesBucket>,
    pub genre: Option<Genre>,
}

/// Selection with every control set; the only input the combined query accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompleteSelection {
    pub duration: DurationBucket,
    pub rating: RatingThreshold,
    pub votes: VotesBucket,
    pub genre: Genre,
}

impl FilterSelection {
    #[must_use]
    pub fn complete(&self) -> Option<CompleteSelection> {
        Some(CompleteSelection {
            duration: self.duration?,
            rating: self.rating,
            votes: self.votes?,
            genre: self.genre?,
        })
    }

    #[must_use]
    pub fn missing_controls(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.duration.is_none() {
            missing.push("duration");
        }
        if self.votes.is_none() {
            missing.push("votes");
        }
        if self.genre.is_none() {
            missing.push("genre");
        }
        missing
    }
}

impl CompleteSelection {
    #[must_use]
    pub fn describe(&self) -> String {
        format!(
            "Your condition: [Genre-{}], [Rating-{} : 10.0], [Duration - {}], [Votes: {}]",
            self.genre,
            self.rating,
            self.duration.label(),
            self.votes.label()
        )
    }
}

#[must_use]
pub fn duration_query(bucket: DurationBucket) -> MovieQuery {
    MovieQuery::new(format!(
        "SELECT Title, Genre, Duration FROM Movies WHERE {};",
        bucket.predicate()
    ))
}

#[must_use]
pub fn rating_query(rating: RatingThreshold) -> MovieQuery {
    MovieQuery::new("SELECT Title, Genre, Rating FROM Movies WHERE Rating >= ?1;")
        .bind(rating.value())
}

#[must_use]
pub fn votes_query(bucket: VotesBucket) -> MovieQuery {
    MovieQuery::new(format!(
        "SELECT Title, Genre, Votes FROM Movies WHERE {};",
        bucket.predicate()
    ))
}

#[must_use]
pub fn genre_query(genre: Genre) -> MovieQuery {
    MovieQuery::new(
        "SELECT Title, Genre, Rating, Votes, Duration FROM Movies WHERE Genre = ?1;",
    )
    .bind(genre_param(genre))
}

#[must_use]
pub fn combined_query(selection: &CompleteSelection) -> MovieQuery {
    MovieQuery::new(format!(
        "SELECT Title, Genre, Rating, Votes, Duration FROM Movies \
         WHERE Genre = ?1 AND Rating >= ?2 AND {} AND {};",
        selection.duration.predicate(),
        selection.votes.predicate()
    ))
    .bind(genre_param(selection.genre))
    .bind(selection.rating.value())
}

fn genre_param(genre: Genre) -> SqlValue {
    SqlValue::Text(genre.as_str().to_string())
}

/// Runs each selected control independently. One failing control never
/// affects the others.
#[must_use]
pub fn build_filter_page(
    source: &dyn MovieSource,
    selection: &FilterSelection,
    row_cap: Option<usize>,
) -> Page {
    let mut page = Page::new(PageKind::Filter, FILTER_PAGE_TITLE);

    let duration = selection.duration.map(|bucket| {
        (
            duration_query(bucket),
            format!("Movie list with duration {}", bucket.label()),
        )
    });
    page.sections.push(run_filter_section(
        source,
        Section::new("duration", "1. Filtered Movies Based on Duration"),
        duration,
        row_cap,
    ));

    let rating = Some((
        rating_query(selection.rating),
        format!("Movie list with Rating >= {}", selection.rating),
    ));
    page.sections.push(run_filter_section(
        source,
        Section::new("rating", "2. Filtered Movies Based on Rating"),
        rating,
        row_cap,
    ));

    let votes = selection.votes.map(|bucket| {
        (
            votes_query(bucket),
            format!("Movie list with Votes {}", bucket.label()),
        )
    });
    page.sections.push(run_filter_section(
        source,
        Section::new("votes", "3. Filtered Movies based on voting"),
        votes,
        row_cap,
    ));

    let genre = selection.genre.map(|genre| {
        (
            genre_query(genre),
            format!("Movie list with genre {genre}"),
        )
    });
    page.sections.push(run_filter_section(
        source,
        Section::new("genre", "4. Filter Movies by Genre"),
        genre,
        row_cap,
    ));

    page
}

fn run_filter_section(
    source: &dyn MovieSource,
    mut section: Section,
    control: Option<(MovieQuery, String)>,
    row_cap: Option<usize>,
) -> Section {
    if !source.is_available() {
        section.push(Block::source_unavailable());
        return section;
    }

    let Some((query, summary)) = control else {
        return section;
    };

    match source.fetch(&query.with_row_cap(row_cap)) {
        Ok(table) => {
            section.push(Block::text(format!(
                "{summary}, Total Count: {}",
                table.total_rows
            )));
            push_rows(&mut section, table);
        }
        Err(error) => {
            let cause = format!("{error:#}");
            tracing::warn!(filter = %section.key, %cause, "filter query failed");
            section.push(Block::query_failed(format!("Error -> query part {cause}")));
        }
    }

    section
}

/// Runs the conjunctive query once duration, votes and genre are all chosen.
#[must_use]
pub fn build_multi_filter_page(
    source: &dyn MovieSource,
    selection: &FilterSelection,
    row_cap: Option<usize>,
) -> Page {
    let mut page = Page::new(PageKind::MultiFilter, MULTI_FILTER_PAGE_TITLE);
    let mut section = Section::new("multi_filter", "Select Filters");

    if !source.is_available() {
        section.push(Block::source_unavailable());
        page.sections.push(section);
        return page;
    }

    let Some(complete) = selection.complete() else {
        section.push(Block::text(format!(
            "Waiting for a selection on: {}",
            selection.missing_controls().join(", ")
        )));
        page.sections.push(section);
        return page;
    };

    match source.fetch(&combined_query(&complete).with_row_cap(row_cap)) {
        Ok(table) => {
            section.push(Block::text(complete.describe()));
            section.push(Block::text(format!(
                "Total movie count: {}",
                table.total_rows
            )));
            push_rows(&mut section, table);
        }
        Err(error) => {
            let cause = format!("{error:#}");
            tracing::warn!(%cause, "combined filter query failed");
            section.push(Block::query_failed(format!("Error -> query part {cause}")));
        }
    }

    page.sections.push(section);
    page
}

fn push_rows(section: &mut Section, table: ResultTable) {
    if table.truncated {
        section.push(Block::text(format!(
            "Showing the first {} of {} rows",
            table.rows.len(),
            table.total_rows
        )));
    }
    section.push(Block::table_or_no_results(table));
}
