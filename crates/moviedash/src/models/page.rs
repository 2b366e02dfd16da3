use anyhow::{Result, anyhow, bail};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const SOURCE_UNAVAILABLE_MESSAGE: &str = "Database Connection is stopped";
pub const NO_RESULTS_MESSAGE: &str = "No Result Found";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PageKind {
    Visualizations,
    Filter,
    MultiFilter,
}

impl PageKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Visualizations => "visualizations",
            Self::Filter => "filter",
            Self::MultiFilter => "multi_filter",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Page {
    pub kind: PageKind,
    pub title: String,
    pub sections: Vec<Section>,
}

impl Page {
    #[must_use]
    pub fn new(kind: PageKind, title: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            sections: Vec::new(),
        }
    }

    pub fn warnings(&self) -> impl Iterator<Item = (&Section, WarningCode, &str)> {
        self.sections.iter().flat_map(|section| {
            section.blocks.iter().filter_map(move |block| match block {
                Block::Warning { code, message } => Some((section, *code, message.as_str())),
                _ => None,
            })
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Section {
    pub key: String,
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,

    pub blocks: Vec<Block>,
}

impl Section {
    #[must_use]
    pub fn new(key: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            subtitle: None,
            blocks: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    #[must_use]
    pub fn tables(&self) -> Vec<&ResultTable> {
        self.blocks
            .iter()
            .filter_map(|block| match block {
                Block::Table { table } => Some(table),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn charts(&self) -> Vec<&Chart> {
        self.blocks
            .iter()
            .filter_map(|block| match block {
                Block::Chart { chart } => Some(chart),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn warning_codes(&self) -> Vec<WarningCode> {
        self.blocks
            .iter()
            .filter_map(|block| match block {
                Block::Warning { code, .. } => Some(*code),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn has_no_results(&self) -> bool {
        self.blocks
            .iter()
            .any(|block| matches!(block, Block::NoResults { .. }))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum WarningCode {
    SourceUnavailable,
    QueryFailed,
}

impl WarningCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SourceUnavailable => "source_unavailable",
            Self::QueryFailed => "query_failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Block {
    Text { text: String },
    Table { table: ResultTable },
    Chart { chart: Chart },
    NoResults { message: String },
    Warning { code: WarningCode, message: String },
}

impl Block {
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    #[must_use]
    pub fn table(table: ResultTable) -> Self {
        Self::Table { table }
    }

    #[must_use]
    pub fn chart(chart: Chart) -> Self {
        Self::Chart { chart }
    }

    #[must_use]
    pub fn no_results() -> Self {
        Self::NoResults {
            message: NO_RESULTS_MESSAGE.to_string(),
        }
    }

    #[must_use]
    pub fn source_unavailable() -> Self {
        Self::Warning {
            code: WarningCode::SourceUnavailable,
            message: SOURCE_UNAVAILABLE_MESSAGE.to_string(),
        }
    }

    #[must_use]
    pub fn query_failed(message: impl Into<String>) -> Self {
        Self::Warning {
            code: WarningCode::QueryFailed,
            message: message.into(),
        }
    }

    /// Row table when the result has rows, the empty-result indicator otherwise.
    #[must_use]
    pub fn table_or_no_results(table: ResultTable) -> Self {
        if table.is_empty() {
            Self::no_results()
        } else {
            Self::table(table)
        }
    }
}

/// Tabular query result with column order preserved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ResultTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,

    /// Rows matched by the query; larger than `rows.len()` when truncated.
    pub total_rows: usize,
    pub truncated: bool,
}

impl ResultTable {
    #[must_use]
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        let total_rows = rows.len();
        Self {
            columns,
            rows,
            total_rows,
            truncated: false,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total_rows == 0
    }

    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|column| column == name)
            .ok_or_else(|| {
                anyhow!(
                    "column `{name}` missing from result (columns: {})",
                    self.columns.join(", ")
                )
            })
    }

    /// Keeps only the named columns, in the given order.
    pub fn project(&self, names: &[&str]) -> Result<Self> {
        let indexes = names
            .iter()
            .map(|name| self.column_index(name))
            .collect::<Result<Vec<_>>>()?;
        let rows = self
            .rows
            .iter()
            .map(|row| {
                indexes
                    .iter()
                    .map(|index| row.get(*index).cloned().unwrap_or(Value::Null))
                    .collect()
            })
            .collect();

        Ok(Self {
            columns: names.iter().map(ToString::to_string).collect(),
            rows,
            total_rows: self.total_rows,
            truncated: self.truncated,
        })
    }

    pub fn text_column(&self, name: &str) -> Result<Vec<String>> {
        let index = self.column_index(name)?;
        Ok(self
            .rows
            .iter()
            .map(|row| match row.get(index) {
                Some(Value::String(text)) => text.clone(),
                Some(Value::Null) | None => String::new(),
                Some(other) => other.to_string(),
            })
            .collect())
    }

    pub fn number_column(&self, name: &str) -> Result<Vec<Option<f64>>> {
        let index = self.column_index(name)?;
        self.rows
            .iter()
            .enumerate()
            .map(|(row_number, row)| {
                numeric_cell(row.get(index).unwrap_or(&Value::Null)).map_err(|error| {
                    anyhow!("column `{name}` row {row_number}: {error}")
                })
            })
            .collect()
    }
}

fn numeric_cell(value: &Value) -> Result<Option<f64>> {
    match value {
        Value::Null => Ok(None),
        Value::Number(number) => number
            .as_f64()
            .map(Some)
            .ok_or_else(|| anyhow!("number out of range: {number}")),
        Value::String(text) if text.trim().is_empty() => Ok(None),
        Value::String(text) => match text.trim().parse::<f64>() {
            Ok(parsed) => Ok(Some(parsed)),
            Err(_) => bail!("cannot convert `{text}` to a number"),
        },
        other => bail!("cannot convert {other} to a number"),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Chart {
    Bar(BarChart),
    HorizontalBar(BarChart),
    Histogram(HistogramChart),
    Pie(PieChart),
    Heatmap(HeatmapChart),
    Scatter(ScatterChart),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BarChart {
    pub title: String,
    pub category_label: String,
    pub value_label: String,
    pub categories: Vec<String>,
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct HistogramChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub bin_edges: Vec<f64>,
    pub counts: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PieChart {
    pub title: String,
    pub slices: Vec<PieSlice>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PieSlice {
    pub label: String,
    pub value: f64,
    pub percent_label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct HeatmapChart {
    pub title: String,
    pub row_labels: Vec<String>,
    pub column_label: String,
    pub cells: Vec<f64>,
    pub annotation_format: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ScatterChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub points: Vec<ScatterPoint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
}

#[must_use]
pub fn json_schema() -> Value {
    let schema = schemars::schema_for!(Page);
    match serde_json::to_value(schema) {
        Ok(value) => value,
        Err(error) => {
            panic!("failed to serialize generated page schema: {error}");
        }
    }
}
