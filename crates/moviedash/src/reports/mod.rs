//! The ten fixed reports of the visualization page.
//!
//! Each report owns one read-only statement and a renderer turning the result
//! into tables and chart specifications. Slots are independent: a failing
//! statement becomes an inline warning in its own section and the page moves on.

pub mod histogram;

use anyhow::{Result, bail};

use crate::models::{
    BarChart, Block, Chart, HeatmapChart, Page, PageKind, PieChart, PieSlice, ResultTable,
    ScatterChart, ScatterPoint, Section,
};
use crate::source::{MovieQuery, MovieSource};

use histogram::RatingHistogram;

pub const REPORT_COUNT: usize = 10;
pub const VISUALIZATIONS_PAGE_TITLE: &str = "Data Visualizations";

#[derive(Debug, Clone, Copy)]
pub struct ReportDefinition {
    pub slot: u8,
    pub key: &'static str,
    pub title: &'static str,
    pub subtitle: &'static str,
    pub sql: &'static str,
    render: fn(&ResultTable) -> Result<Vec<Block>>,
}

impl ReportDefinition {
    #[must_use]
    pub fn section_key(&self) -> String {
        format!("report_{:02}_{}", self.slot, self.key)
    }
}

pub const REPORTS: [ReportDefinition; REPORT_COUNT] = [
    ReportDefinition {
        slot: 1,
        key: "top_movies",
        title: "1. Top 10 Movies by Rating and Voting Counts",
        subtitle: "Highest Ratings and Significant Voting engagement",
        sql: SQL_TOP_UNIQUE_MOVIES,
        render: render_top_movies,
    },
    ReportDefinition {
        slot: 2,
        key: "genre_distribution",
        title: "2. Genre Distribution",
        subtitle: "Movie Count by Genre",
        sql: SQL_GENRE_DISTRIBUTION,
        render: render_genre_distribution,
    },
    ReportDefinition {
        slot: 3,
        key: "average_duration",
        title: "3. Average Duration of movies",
        subtitle: "Average Movie Duration per Genre",
        sql: SQL_AVERAGE_DURATION,
        render: render_average_duration,
    },
    ReportDefinition {
        slot: 4,
        key: "voting_trends",
        title: "4. Voting Trends by Genre",
        subtitle: "Average Voting Counts per Genre",
        sql: SQL_AVERAGE_VOTES,
        render: render_voting_trends,
    },
    ReportDefinition {
        slot: 5,
        key: "rating_distribution",
        title: "5. Rating Distribution",
        subtitle: "Histogram chart for Movie Ratings",
        sql: SQL_RATINGS,
        render: render_rating_distribution,
    },
    ReportDefinition {
        slot: 6,
        key: "genre_rating_leaders",
        title: "6. Genre-Based Rating Leaders",
        subtitle: "Top-Rated movie for each Genre",
        sql: SQL_GENRE_LEADERS,
        render: render_genre_leaders,
    },
    ReportDefinition {
        slot: 7,
        key: "popular_genres",
        title: "7. Most Popular Genres by Voting",
        subtitle: "Highest Total Voting counts in a Pie-Chart",
        sql: SQL_VOTE_SHARE,
        render: render_vote_share,
    },
    ReportDefinition {
        slot: 8,
        key: "duration_extremes",
        title: "8. Duration Extremes",
        subtitle: "Shortest and Longest Movies in Table view",
        sql: SQL_DURATION_EXTREMES,
        render: render_duration_extremes,
    },
    ReportDefinition {
        slot: 9,
        key: "ratings_by_genre",
        title: "9. Ratings by Genre",
        subtitle: "Heatmap to compare Average Ratings across Genres",
        sql: SQL_AVERAGE_RATING,
        render: render_rating_heatmap,
    },
    ReportDefinition {
        slot: 10,
        key: "correlation",
        title: "10. Correlation Analysis",
        subtitle: "Relationship between Ratings and Voting Counts",
        sql: SQL_RATING_VOTES,
        render: render_correlation,
    },
];

const SQL_TOP_UNIQUE_MOVIES: &str = r#"
WITH ranked_movies AS (
    SELECT *, ROW_NUMBER() OVER (PARTITION BY Title ORDER BY Votes DESC, Rating DESC) AS rn
    FROM Movies
)
SELECT * FROM ranked_movies
WHERE rn = 1
ORDER BY Votes DESC, Rating DESC
LIMIT 10;
"#;

const SQL_GENRE_DISTRIBUTION: &str = r#"
SELECT Genre, COUNT(*) AS Count
FROM Movies
GROUP BY Genre
ORDER BY Count DESC;
"#;

// Duration text `H.MM`: digits after the point are whole minutes.
const SQL_AVERAGE_DURATION: &str = r#"
WITH converted_duration AS (
    SELECT
        Genre,
        (CAST(SUBSTR(Duration, 1, INSTR(Duration, '.') - 1) AS INTEGER) * 60
            + CAST(SUBSTR(Duration, INSTR(Duration, '.') + 1) AS INTEGER)) AS Duration_in_minutes
    FROM Movies
    WHERE Duration LIKE '%.%'
)
SELECT Genre, ROUND(AVG(Duration_in_minutes), 2) AS "Avg Duration (min)"
FROM converted_duration
GROUP BY Genre
ORDER BY "Avg Duration (min)";
"#;

const SQL_AVERAGE_VOTES: &str = r#"
SELECT Genre, ROUND(SUM(Votes) * 1.0 / COUNT(Title), 2) AS "Avg Votes Per Movie"
FROM Movies
GROUP BY Genre
ORDER BY "Avg Votes Per Movie" DESC;
"#;

const SQL_RATINGS: &str = r#"
SELECT Rating FROM Movies WHERE Rating IS NOT NULL;
"#;

const SQL_GENRE_LEADERS: &str = r#"
WITH ranked_movies AS (
    SELECT Genre, Title, Rating,
        RANK() OVER (PARTITION BY Genre ORDER BY Rating DESC) AS rank
    FROM Movies
    WHERE Rating IS NOT NULL
)
SELECT Genre, Title, Rating
FROM ranked_movies
WHERE rank = 1
ORDER BY Genre;
"#;

const SQL_VOTE_SHARE: &str = r#"
WITH genre_votes AS (
    SELECT Genre, SUM(Votes) AS total_votes
    FROM Movies
    WHERE Votes IS NOT NULL
    GROUP BY Genre
),
total AS (SELECT SUM(total_votes) AS grand_total FROM genre_votes)
SELECT
    gv.Genre,
    gv.total_votes AS "Total Votes",
    ROUND((gv.total_votes * 100.0) / t.grand_total, 1) AS "Percentage (%)"
FROM genre_votes gv, total t
ORDER BY gv.total_votes DESC;
"#;

// Duration number `H.ff`: the fraction counts hundredths, read as minutes.
const SQL_DURATION_EXTREMES: &str = r#"
WITH converted_duration AS (
    SELECT Title, Genre,
        CAST(Duration AS INTEGER) * 60
            + ROUND((Duration - CAST(Duration AS INTEGER)) * 100, 0) AS Duration_Minutes
    FROM Movies
),
shortest AS (
    SELECT 'Shortest Movie' AS Label, Title, Genre, Duration_Minutes
    FROM converted_duration
    WHERE Duration_Minutes = (SELECT MIN(Duration_Minutes) FROM converted_duration)
),
longest AS (
    SELECT 'Longest Movie' AS Label, Title, Genre, Duration_Minutes
    FROM converted_duration
    WHERE Duration_Minutes = (SELECT MAX(Duration_Minutes) FROM converted_duration)
)
SELECT Label, Title, Genre,
    CAST(Duration_Minutes / 60 AS INTEGER) || ' hr ' || CAST(Duration_Minutes % 60 AS INTEGER) || ' min' AS Duration
FROM shortest
UNION ALL
SELECT Label, Title, Genre,
    CAST(Duration_Minutes / 60 AS INTEGER) || ' hr ' || CAST(Duration_Minutes % 60 AS INTEGER) || ' min' AS Duration
FROM longest;
"#;

const SQL_AVERAGE_RATING: &str = r#"
SELECT Genre, ROUND(AVG(Rating), 2) AS "Avg Rating"
FROM Movies
GROUP BY Genre
ORDER BY "Avg Rating" DESC;
"#;

const SQL_RATING_VOTES: &str = r#"
SELECT Rating, Votes FROM Movies ORDER BY Rating DESC, Votes DESC;
"#;

#[must_use]
pub fn report(slot: u8) -> Option<&'static ReportDefinition> {
    REPORTS.iter().find(|report| report.slot == slot)
}

/// Builds the visualization page. An empty `slots` selection means every report.
#[must_use]
pub fn build_visualizations_page(source: &dyn MovieSource, slots: &[u8]) -> Page {
    let mut page = Page::new(PageKind::Visualizations, VISUALIZATIONS_PAGE_TITLE);
    for report in REPORTS
        .iter()
        .filter(|report| slots.is_empty() || slots.contains(&report.slot))
    {
        page.sections.push(run_report(source, report));
    }
    page
}

#[must_use]
pub fn run_report(source: &dyn MovieSource, report: &ReportDefinition) -> Section {
    let mut section = Section::new(report.section_key(), report.title).with_subtitle(report.subtitle);

    if !source.is_available() {
        section.push(Block::source_unavailable());
        return section;
    }

    let outcome = source
        .fetch(&MovieQuery::new(report.sql))
        .and_then(|table| (report.render)(&table));
    match outcome {
        Ok(blocks) => {
            tracing::debug!(slot = report.slot, blocks = blocks.len(), "report rendered");
            section.blocks = blocks;
        }
        Err(error) => {
            let cause = format!("{error:#}");
            tracing::warn!(slot = report.slot, %cause, "report query failed");
            section.push(Block::query_failed(format!("Error -> {cause}")));
        }
    }

    section
}

fn render_top_movies(table: &ResultTable) -> Result<Vec<Block>> {
    let chart = bar_chart(
        table,
        ("Title", "Movie Title"),
        ("Votes", "Votes"),
        "Top 10 Unique Movies by Votes and Rating",
    )?;
    Ok(vec![
        Block::table(table.project(&["Title", "Rating", "Votes"])?),
        Block::chart(Chart::Bar(chart)),
    ])
}

fn render_genre_distribution(table: &ResultTable) -> Result<Vec<Block>> {
    let chart = bar_chart(
        table,
        ("Genre", "Genre"),
        ("Count", "Number of Movies"),
        "Genre Distribution",
    )?;
    Ok(vec![Block::table(table.clone()), Block::chart(Chart::Bar(chart))])
}

fn render_average_duration(table: &ResultTable) -> Result<Vec<Block>> {
    let chart = bar_chart(
        table,
        ("Genre", "Genre"),
        ("Avg Duration (min)", "Average Duration (in minutes)"),
        "Average Movie Duration by Genre",
    )?;
    Ok(vec![
        Block::table(table.clone()),
        Block::chart(Chart::HorizontalBar(chart)),
    ])
}

fn render_voting_trends(table: &ResultTable) -> Result<Vec<Block>> {
    let chart = bar_chart(
        table,
        ("Genre", "Genre"),
        ("Avg Votes Per Movie", "Average Votes Per Movie"),
        "Voting Trends by Genre",
    )?;
    Ok(vec![Block::table(table.clone()), Block::chart(Chart::Bar(chart))])
}

fn render_rating_distribution(table: &ResultTable) -> Result<Vec<Block>> {
    let ratings = table.number_column("Rating")?;
    let histogram = RatingHistogram::from_ratings(ratings.into_iter().flatten());

    let mut blocks = vec![
        Block::table(histogram.frequency_table()),
        Block::chart(Chart::Histogram(histogram.chart())),
    ];
    if histogram.out_of_range > 0 {
        blocks.push(Block::text(format!(
            "{} rating(s) outside 0-10 were left out of the histogram",
            histogram.out_of_range
        )));
    }
    Ok(blocks)
}

fn render_genre_leaders(table: &ResultTable) -> Result<Vec<Block>> {
    let chart = bar_chart(
        table,
        ("Genre", "Genre"),
        ("Rating", "Rating"),
        "Top-Rated Movie by Genre",
    )?;
    Ok(vec![
        Block::table(table.clone()),
        Block::chart(Chart::HorizontalBar(chart)),
    ])
}

fn render_vote_share(table: &ResultTable) -> Result<Vec<Block>> {
    let labels = table.text_column("Genre")?;
    let values = table
        .number_column("Total Votes")?
        .into_iter()
        .map(|value| value.unwrap_or(0.0))
        .collect::<Vec<_>>();
    let total = values.iter().sum::<f64>();

    let slices = labels
        .into_iter()
        .zip(values)
        .map(|(label, value)| PieSlice {
            percent_label: if total > 0.0 {
                format!("{:.1}%", value * 100.0 / total)
            } else {
                "0.0%".to_string()
            },
            label,
            value,
        })
        .collect();

    Ok(vec![
        Block::table(table.clone()),
        Block::chart(Chart::Pie(PieChart {
            title: "Most Popular Genres by Voting".to_string(),
            slices,
        })),
    ])
}

fn render_duration_extremes(table: &ResultTable) -> Result<Vec<Block>> {
    table.column_index("Duration")?;
    Ok(vec![Block::table(table.clone())])
}

fn render_rating_heatmap(table: &ResultTable) -> Result<Vec<Block>> {
    let genres = table.text_column("Genre")?;
    let averages = table.number_column("Avg Rating")?;

    let mut cells = genres
        .into_iter()
        .zip(averages)
        .filter_map(|(genre, average)| average.map(|average| (genre, average)))
        .collect::<Vec<_>>();
    cells.sort_by(|left, right| left.0.cmp(&right.0));

    let (row_labels, cells): (Vec<_>, Vec<_>) = cells.into_iter().unzip();
    Ok(vec![
        Block::table(table.clone()),
        Block::chart(Chart::Heatmap(HeatmapChart {
            title: "Average Ratings Across Genres".to_string(),
            row_labels,
            column_label: "Avg Rating".to_string(),
            cells,
            annotation_format: ".2f".to_string(),
        })),
    ])
}

fn render_correlation(table: &ResultTable) -> Result<Vec<Block>> {
    let ratings = table.number_column("Rating")?;
    let votes = table.number_column("Votes")?;
    let points = ratings
        .into_iter()
        .zip(votes)
        .filter_map(|(rating, votes)| Some(ScatterPoint { x: rating?, y: votes? }))
        .collect();

    Ok(vec![Block::chart(Chart::Scatter(ScatterChart {
        title: "Relationship Between Ratings and Voting Counts".to_string(),
        x_label: "Movie Ratings".to_string(),
        y_label: "Total Votes".to_string(),
        points,
    }))])
}

fn bar_chart(
    table: &ResultTable,
    (category_column, category_label): (&str, &str),
    (value_column, value_label): (&str, &str),
    title: &str,
) -> Result<BarChart> {
    let categories = table.text_column(category_column)?;
    let values = table.number_column(value_column)?;
    if categories.len() != values.len() {
        bail!("bar chart columns have mismatched lengths");
    }

    Ok(BarChart {
        title: title.to_string(),
        category_label: category_label.to_string(),
        value_label: value_label.to_string(),
        categories,
        values,
    })
}
