//! Plain-text rendering of a page for terminals.

use serde_json::Value;

use crate::models::{BarChart, Block, Chart, Page, ResultTable, Section};

const BAR_WIDTH: usize = 30;

#[must_use]
pub fn render_text_page(page: &Page) -> String {
    let mut lines = vec![format!("# {}", page.title)];
    for section in &page.sections {
        lines.push(String::new());
        render_section(section, &mut lines);
    }

    let mut rendered = lines
        .into_iter()
        .map(|line| line.trim_end().to_string())
        .collect::<Vec<_>>()
        .join("\n");
    rendered.push('\n');
    rendered
}

fn render_section(section: &Section, lines: &mut Vec<String>) {
    lines.push(format!("## {}", section.title));
    if let Some(subtitle) = &section.subtitle {
        lines.push(subtitle.clone());
    }

    for block in &section.blocks {
        match block {
            Block::Text { text } => lines.push(text.clone()),
            Block::Table { table } => render_table(table, lines),
            Block::Chart { chart } => render_chart(chart, lines),
            Block::NoResults { message } => lines.push(format!("({message})")),
            Block::Warning { message, .. } => lines.push(format!("warning: {message}")),
        }
    }
}

fn render_table(table: &ResultTable, lines: &mut Vec<String>) {
    let cells = table
        .rows
        .iter()
        .map(|row| row.iter().map(cell_text).collect::<Vec<_>>())
        .collect::<Vec<_>>();

    let mut widths = table
        .columns
        .iter()
        .map(|column| column.chars().count())
        .collect::<Vec<_>>();
    for row in &cells {
        for (index, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(index) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    lines.push(join_padded(&table.columns, &widths));
    lines.push(
        widths
            .iter()
            .map(|width| "-".repeat(*width))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    for row in &cells {
        lines.push(join_padded(row, &widths));
    }
}

fn join_padded(cells: &[String], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join(" | ")
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn render_chart(chart: &Chart, lines: &mut Vec<String>) {
    match chart {
        Chart::Bar(bar) => render_bars("bar", bar, lines),
        Chart::HorizontalBar(bar) => render_bars("horizontal bar", bar, lines),
        Chart::Histogram(histogram) => {
            lines.push(format!("[histogram] {}", histogram.title));
            let labels = histogram
                .bin_edges
                .windows(2)
                .map(|edges| format!("{}-{}", format_number(edges[0]), format_number(edges[1])))
                .collect::<Vec<_>>();
            let values = histogram
                .counts
                .iter()
                .map(|count| Some(*count as f64))
                .collect::<Vec<_>>();
            render_scaled_rows(&labels, &values, lines);
        }
        Chart::Pie(pie) => {
            lines.push(format!("[pie] {}", pie.title));
            let width = label_width(pie.slices.iter().map(|slice| slice.label.as_str()));
            for slice in &pie.slices {
                lines.push(format!(
                    "  {:<width$} | {}",
                    slice.label, slice.percent_label
                ));
            }
        }
        Chart::Heatmap(heatmap) => {
            lines.push(format!(
                "[heatmap] {} ({})",
                heatmap.title, heatmap.column_label
            ));
            let width = label_width(heatmap.row_labels.iter().map(String::as_str));
            for (label, value) in heatmap.row_labels.iter().zip(&heatmap.cells) {
                lines.push(format!("  {label:<width$} | {value:.2}"));
            }
        }
        Chart::Scatter(scatter) => {
            lines.push(format!(
                "[scatter] {} ({} points, x={}, y={})",
                scatter.title,
                scatter.points.len(),
                scatter.x_label,
                scatter.y_label
            ));
        }
    }
}

fn render_bars(kind: &str, chart: &BarChart, lines: &mut Vec<String>) {
    lines.push(format!("[{kind}] {}", chart.title));
    render_scaled_rows(&chart.categories, &chart.values, lines);
}

fn render_scaled_rows(labels: &[String], values: &[Option<f64>], lines: &mut Vec<String>) {
    let width = label_width(labels.iter().map(String::as_str));
    let max = values
        .iter()
        .flatten()
        .fold(0.0_f64, |max, value| max.max(*value));

    for (label, value) in labels.iter().zip(values) {
        let (bar, shown) = match value {
            Some(value) if max > 0.0 && *value > 0.0 => {
                let length = ((value / max) * BAR_WIDTH as f64).round().max(1.0) as usize;
                ("#".repeat(length), format_number(*value))
            }
            Some(value) => (String::new(), format_number(*value)),
            None => (String::new(), "-".to_string()),
        };
        lines.push(format!("  {label:<width$} | {bar} {shown}"));
    }
}

fn label_width<'a>(labels: impl Iterator<Item = &'a str>) -> usize {
    labels.map(|label| label.chars().count()).max().unwrap_or(0)
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value:.2}")
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::render_text_page;
    use crate::models::{BarChart, Block, Chart, Page, PageKind, ResultTable, Section};

    #[test]
    fn renders_tables_charts_and_indicators() {
        let mut section = Section::new("genre_distribution", "2. Genre Distribution")
            .with_subtitle("Movie Count by Genre");
        section.push(Block::table(ResultTable::new(
            vec!["Genre".to_string(), "Count".to_string()],
            vec![
                vec![json!("Comedy"), json!(4)],
                vec![json!("Crime"), json!(2)],
            ],
        )));
        section.push(Block::chart(Chart::Bar(BarChart {
            title: "Genre Distribution".to_string(),
            category_label: "Genre".to_string(),
            value_label: "Number of Movies".to_string(),
            categories: vec!["Comedy".to_string(), "Crime".to_string()],
            values: vec![Some(4.0), Some(2.0)],
        })));

        let mut empty = Section::new("genre", "4. Filter Movies by Genre");
        empty.push(Block::text("Movie list with genre Action, Total Count: 0"));
        empty.push(Block::no_results());

        let mut failed = Section::new("votes", "3. Filtered Movies based on voting");
        failed.push(Block::source_unavailable());

        let mut page = Page::new(PageKind::Visualizations, "Data Visualizations");
        page.sections = vec![section, empty, failed];

        insta::assert_snapshot!(render_text_page(&page).trim_end(), @r"
        # Data Visualizations

        ## 2. Genre Distribution
        Movie Count by Genre
        Genre  | Count
        -------+------
        Comedy | 4
        Crime  | 2
        [bar] Genre Distribution
          Comedy | ############################## 4
          Crime  | ############### 2

        ## 4. Filter Movies by Genre
        Movie list with genre Action, Total Count: 0
        (No Result Found)

        ## 3. Filtered Movies based on voting
        warning: Database Connection is stopped
        ");
    }
}
