use std::collections::BTreeSet;

use moviedash::models::{Block, Chart, Page, ResultTable, Section, WarningCode};
use moviedash::reports::{REPORT_COUNT, build_visualizations_page};
use moviedash::source::Database;
use rusqlite::{Connection, params};
use serde_json::{Value, json};

type MovieRow = (&'static str, &'static str, Option<f64>, Option<i64>, Option<f64>);

const MOVIES: &[MovieRow] = &[
    ("Heat", "Crime", Some(8.3), Some(700_000), Some(2.50)),
    ("Heat", "Crime", Some(7.0), Some(1_200), Some(2.10)),
    ("Twin", "Crime", Some(6.0), Some(5_000), Some(1.55)),
    ("Twin", "Crime", Some(7.0), Some(5_000), Some(1.55)),
    ("Up", "Animation", Some(8.3), Some(1_100_000), Some(1.36)),
    ("Coco", "Animation", Some(8.3), Some(600_000), Some(1.45)),
    ("Airplane", "Comedy", Some(7.7), Some(250_000), Some(1.28)),
    ("Cats", "Comedy", Some(2.8), Some(50_000), Some(1.50)),
    ("Taxi", "Comedy", Some(6.1), Some(90_000), Some(1.37)),
    ("Ran", "Action", Some(8.2), Some(130_000), Some(2.42)),
    ("Ben", "Adventure", Some(8.1), Some(250_000), Some(3.32)),
    ("Unrated", "Adventure", None, None, None),
];

fn movie_database(schema: &str, rows: &[MovieRow]) -> Database {
    let connection = Connection::open_in_memory().expect("in-memory database should open");
    connection
        .execute_batch(schema)
        .expect("fixture schema should apply");
    let with_duration = schema.contains("Duration");
    for (title, genre, rating, votes, duration) in rows {
        if with_duration {
            connection
                .execute(
                    "INSERT INTO Movies (Title, Genre, Rating, Votes, Duration) VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![title, genre, rating, votes, duration],
                )
                .expect("fixture row should insert");
        } else {
            connection
                .execute(
                    "INSERT INTO Movies (Title, Genre, Rating, Votes) VALUES (?1, ?2, ?3, ?4)",
                    params![title, genre, rating, votes],
                )
                .expect("fixture row should insert");
        }
    }
    Database::from_connection(connection)
}

fn full_page() -> Page {
    let database = movie_database(
        "CREATE TABLE Movies (Title TEXT, Genre TEXT, Rating REAL, Votes INTEGER, Duration REAL);",
        MOVIES,
    );
    build_visualizations_page(&database, &[])
}

fn section(page: &Page, slot: u8) -> &Section {
    let prefix = format!("report_{slot:02}_");
    page.sections
        .iter()
        .find(|section| section.key.starts_with(&prefix))
        .unwrap_or_else(|| panic!("report {slot} should be on the page"))
}

fn only_table(section: &Section) -> &ResultTable {
    let tables = section.tables();
    assert_eq!(tables.len(), 1, "section {} should hold one table", section.key);
    tables[0]
}

fn column(table: &ResultTable, name: &str) -> Vec<Value> {
    let index = table.column_index(name).expect("column should exist");
    table.rows.iter().map(|row| row[index].clone()).collect()
}

#[test]
fn renders_all_ten_reports_without_warnings() {
    let page = full_page();
    assert_eq!(page.sections.len(), REPORT_COUNT);
    assert_eq!(page.warnings().count(), 0);
    assert_eq!(
        page.sections[0].title,
        "1. Top 10 Movies by Rating and Voting Counts"
    );
}

#[test]
fn top_movies_keep_one_row_per_title_with_most_votes() {
    let page = full_page();
    let top = section(&page, 1);
    let table = only_table(top);

    assert_eq!(table.columns, vec!["Title", "Rating", "Votes"]);
    assert_eq!(table.rows.len(), 10);

    let titles = column(table, "Title");
    let unique = titles
        .iter()
        .filter_map(Value::as_str)
        .collect::<BTreeSet<_>>();
    assert_eq!(unique.len(), titles.len(), "titles must not repeat");
    assert_eq!(titles[0], json!("Up"));

    let heat = table
        .rows
        .iter()
        .find(|row| row[0] == json!("Heat"))
        .expect("Heat should be listed");
    assert_eq!(heat[1], json!(8.3));
    assert_eq!(heat[2], json!(700_000));

    let twin = table
        .rows
        .iter()
        .find(|row| row[0] == json!("Twin"))
        .expect("Twin should be listed");
    assert_eq!(twin[1], json!(7.0), "vote ties fall back to the higher rating");

    match top.charts()[0] {
        Chart::Bar(chart) => {
            assert_eq!(chart.categories.len(), 10);
            assert_eq!(chart.values[0], Some(1_100_000.0));
        }
        other => panic!("expected bar chart, got {other:?}"),
    }
}

#[test]
fn genre_distribution_counts_rows_per_genre() {
    let page = full_page();
    let table = only_table(section(&page, 2));
    assert_eq!(table.rows.first(), Some(&vec![json!("Crime"), json!(4)]));
    assert_eq!(table.rows.last(), Some(&vec![json!("Action"), json!(1)]));
}

#[test]
fn average_duration_reads_digits_after_the_point_as_minutes() {
    let page = full_page();
    let report = section(&page, 3);

    match report.charts()[0] {
        Chart::HorizontalBar(chart) => {
            assert_eq!(
                chart.categories,
                vec!["Comedy", "Animation", "Crime", "Action", "Adventure"]
            );
            // 1.36 -> 96 min, 1.45 -> 105 min
            assert_eq!(chart.values[1], Some(100.5));
            // 2.5 -> 125 min, 2.1 -> 121 min, 1.55 -> 115 min twice
            assert_eq!(chart.values[2], Some(119.0));
        }
        other => panic!("expected horizontal bar chart, got {other:?}"),
    }
}

#[test]
fn voting_trends_divide_total_votes_by_title_count() {
    let page = full_page();
    let table = only_table(section(&page, 4));
    assert_eq!(table.rows[0], vec![json!("Animation"), json!(850_000.0)]);

    let adventure = table
        .rows
        .iter()
        .find(|row| row[0] == json!("Adventure"))
        .expect("Adventure should be listed");
    assert_eq!(adventure[1], json!(125_000.0));
}

#[test]
fn rating_histogram_partitions_every_rating() {
    let page = full_page();
    let report = section(&page, 5);
    let table = only_table(report);

    assert_eq!(table.columns, vec!["Bin Range", "Frequency"]);
    assert_eq!(table.rows.len(), 10);
    assert_eq!(table.rows[0][0], json!("0 - 1"));
    assert_eq!(table.rows[9][0], json!("9 - 10"));

    let frequencies = column(table, "Frequency")
        .iter()
        .filter_map(Value::as_u64)
        .collect::<Vec<_>>();
    assert_eq!(frequencies, vec![0, 0, 1, 0, 0, 0, 2, 3, 5, 0]);
    assert_eq!(frequencies.iter().sum::<u64>(), 11);

    match report.charts()[0] {
        Chart::Histogram(chart) => assert_eq!(chart.counts, frequencies),
        other => panic!("expected histogram, got {other:?}"),
    }
}

#[test]
fn genre_leaders_keep_every_tied_top_rating() {
    let page = full_page();
    let table = only_table(section(&page, 6));
    assert_eq!(table.columns, vec!["Genre", "Title", "Rating"]);
    assert_eq!(table.rows.len(), 6);

    let animation = table
        .rows
        .iter()
        .filter(|row| row[0] == json!("Animation"))
        .filter_map(|row| row[1].as_str())
        .collect::<BTreeSet<_>>();
    assert_eq!(animation, BTreeSet::from(["Coco", "Up"]));

    let genres = column(table, "Genre");
    let mut sorted = genres.clone();
    sorted.sort_by(|left, right| left.as_str().cmp(&right.as_str()));
    assert_eq!(genres, sorted, "leaders are ordered by genre");
}

#[test]
fn vote_share_reports_percentages_of_the_grand_total() {
    let page = full_page();
    let report = section(&page, 7);
    let table = only_table(report);
    assert_eq!(
        table.rows[0],
        vec![json!("Animation"), json!(1_700_000), json!(53.4)]
    );

    match report.charts()[0] {
        Chart::Pie(chart) => {
            assert_eq!(chart.slices.len(), 5);
            assert_eq!(chart.slices[0].label, "Animation");
            assert_eq!(chart.slices[0].percent_label, "53.4%");
        }
        other => panic!("expected pie chart, got {other:?}"),
    }
}

#[test]
fn duration_extremes_read_the_fraction_as_hundredths() {
    let page = full_page();
    let report = section(&page, 8);
    assert!(report.charts().is_empty());

    let table = only_table(report);
    assert_eq!(table.columns, vec!["Label", "Title", "Genre", "Duration"]);
    assert_eq!(
        table.rows,
        vec![
            vec![
                json!("Shortest Movie"),
                json!("Airplane"),
                json!("Comedy"),
                json!("1 hr 28 min")
            ],
            vec![
                json!("Longest Movie"),
                json!("Ben"),
                json!("Adventure"),
                json!("3 hr 32 min")
            ],
        ]
    );
}

#[test]
fn rating_heatmap_is_keyed_by_genre() {
    let page = full_page();
    let report = section(&page, 9);
    let table = only_table(report);
    assert_eq!(table.columns, vec!["Genre", "Avg Rating"]);
    assert_eq!(table.rows[0], vec![json!("Animation"), json!(8.3)]);

    match report.charts()[0] {
        Chart::Heatmap(chart) => {
            assert_eq!(
                chart.row_labels,
                vec!["Action", "Adventure", "Animation", "Comedy", "Crime"]
            );
            assert_eq!(chart.cells[2], 8.3);
            assert_eq!(chart.annotation_format, ".2f");
        }
        other => panic!("expected heatmap, got {other:?}"),
    }
}

#[test]
fn correlation_plots_every_rated_and_voted_movie() {
    let page = full_page();
    let report = section(&page, 10);
    assert!(report.tables().is_empty());

    match report.charts()[0] {
        Chart::Scatter(chart) => {
            assert_eq!(chart.points.len(), 11);
            assert_eq!(chart.points[0].x, 8.3);
            assert_eq!(chart.points[0].y, 1_100_000.0);
        }
        other => panic!("expected scatter chart, got {other:?}"),
    }
}

#[test]
fn failing_reports_are_isolated_to_their_own_section() {
    let database = movie_database(
        "CREATE TABLE Movies (Title TEXT, Genre TEXT, Rating REAL, Votes INTEGER);",
        MOVIES,
    );
    let page = build_visualizations_page(&database, &[]);
    assert_eq!(page.sections.len(), REPORT_COUNT);

    for section in &page.sections {
        let failed = section.key.starts_with("report_03_") || section.key.starts_with("report_08_");
        if failed {
            assert_eq!(section.warning_codes(), vec![WarningCode::QueryFailed]);
            match &section.blocks[0] {
                Block::Warning { message, .. } => {
                    assert!(message.starts_with("Error -> "), "got {message}");
                    assert!(message.contains("Duration"), "got {message}");
                }
                other => panic!("expected warning block, got {other:?}"),
            }
        } else {
            assert!(
                section.warning_codes().is_empty(),
                "section {} should render",
                section.key
            );
        }
    }
}

#[test]
fn slot_selection_limits_the_page() {
    let database = movie_database(
        "CREATE TABLE Movies (Title TEXT, Genre TEXT, Rating REAL, Votes INTEGER, Duration REAL);",
        MOVIES,
    );
    let page = build_visualizations_page(&database, &[8, 2]);
    let keys = page
        .sections
        .iter()
        .map(|section| section.key.as_str())
        .collect::<Vec<_>>();
    assert_eq!(
        keys,
        vec!["report_02_genre_distribution", "report_08_duration_extremes"]
    );
}
