//! Read-only access to the `Movies` dataset.
//!
//! Pages never talk to SQLite directly; they go through [`MovieSource`] so a
//! source that failed to open can be detected before any statement is issued.

pub mod guardrail;

use std::path::{Path, PathBuf};

use anyhow::{Context, Error, Result};
use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, OpenFlags, params_from_iter};
use serde_json::{Value, json};

use crate::models::ResultTable;

pub use guardrail::{GuardrailReason, GuardrailViolation, validate_read_only_sql};

/// One parameterized read statement. Parameters bind positionally (`?1`, `?2`, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct MovieQuery {
    pub sql: String,
    pub params: Vec<SqlValue>,
    pub row_cap: Option<usize>,
}

impl MovieQuery {
    #[must_use]
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
            row_cap: None,
        }
    }

    #[must_use]
    pub fn bind(mut self, value: impl Into<SqlValue>) -> Self {
        self.params.push(value.into());
        self
    }

    #[must_use]
    pub fn with_row_cap(mut self, row_cap: Option<usize>) -> Self {
        self.row_cap = row_cap;
        self
    }
}

pub trait MovieSource {
    /// False once the startup connection failed; callers must not issue queries then.
    fn is_available(&self) -> bool;

    fn fetch(&self, query: &MovieQuery) -> Result<ResultTable>;
}

#[derive(Debug)]
enum ConnectionState {
    Open(Connection),
    Unavailable { cause: String },
}

#[derive(Debug)]
pub struct Database {
    path: Option<PathBuf>,
    state: ConnectionState,
}

impl Database {
    /// Opens the dataset read-only. A failure is logged and leaves the handle
    /// unavailable instead of aborting the page.
    #[must_use]
    pub fn open(path: &Path) -> Self {
        let state = match open_read_only(path) {
            Ok(connection) => {
                tracing::debug!(path = %path.display(), "opened movie database read-only");
                ConnectionState::Open(connection)
            }
            Err(error) => {
                let cause = format!("{error:#}");
                tracing::error!(path = %path.display(), %cause, "database connection failed");
                ConnectionState::Unavailable { cause }
            }
        };

        Self {
            path: Some(path.to_path_buf()),
            state,
        }
    }

    #[must_use]
    pub fn from_connection(connection: Connection) -> Self {
        Self {
            path: None,
            state: ConnectionState::Open(connection),
        }
    }

    #[must_use]
    pub fn unavailable(cause: impl Into<String>) -> Self {
        Self {
            path: None,
            state: ConnectionState::Unavailable {
                cause: cause.into(),
            },
        }
    }

    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    #[must_use]
    pub fn unavailable_cause(&self) -> Option<&str> {
        match &self.state {
            ConnectionState::Open(_) => None,
            ConnectionState::Unavailable { cause } => Some(cause),
        }
    }
}

impl MovieSource for Database {
    fn is_available(&self) -> bool {
        matches!(self.state, ConnectionState::Open(_))
    }

    fn fetch(&self, query: &MovieQuery) -> Result<ResultTable> {
        let connection = match &self.state {
            ConnectionState::Open(connection) => connection,
            ConnectionState::Unavailable { cause } => {
                anyhow::bail!("database connection is unavailable: {cause}")
            }
        };

        validate_read_only_sql(&query.sql)?;
        execute_read_only_query(connection, query)
    }
}

fn open_read_only(path: &Path) -> Result<Connection> {
    let connection = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .with_context(|| format!("failed to open sqlite database: {}", path.display()))?;

    // SQLite defers reading the header until first use; touch it so a
    // non-database file fails here rather than on every report.
    connection
        .query_row("SELECT COUNT(*) FROM sqlite_master", [], |row| {
            row.get::<usize, i64>(0)
        })
        .with_context(|| format!("file is not a readable sqlite database: {}", path.display()))?;

    Ok(connection)
}

fn execute_read_only_query(connection: &Connection, query: &MovieQuery) -> Result<ResultTable> {
    let mut statement = connection
        .prepare(&query.sql)
        .map_err(|error| Error::new(error).context("failed to prepare query"))?;
    let columns = statement
        .column_names()
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>();

    let mut rows = statement
        .query(params_from_iter(query.params.iter()))
        .map_err(|error| Error::new(error).context("failed to execute query"))?;
    let mut result_rows = Vec::new();
    let mut total_rows = 0_usize;
    while let Some(row) = rows
        .next()
        .map_err(|error| Error::new(error).context("failed to fetch query row"))?
    {
        total_rows += 1;
        if query.row_cap.is_some_and(|cap| result_rows.len() >= cap) {
            continue;
        }

        let mut record = Vec::with_capacity(columns.len());
        for index in 0..columns.len() {
            let value = row
                .get::<usize, SqlValue>(index)
                .map_err(|error| Error::new(error).context("failed to decode query column"))?;
            record.push(json_value_from_sql(value));
        }
        result_rows.push(record);
    }

    Ok(ResultTable {
        columns,
        truncated: total_rows > result_rows.len(),
        rows: result_rows,
        total_rows,
    })
}

fn json_value_from_sql(value: SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::Null,
        SqlValue::Integer(value) => json!(value),
        SqlValue::Real(value) => json!(value),
        SqlValue::Text(value) => json!(value),
        SqlValue::Blob(value) => json!(format!("<{} byte blob>", value.len())),
    }
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use serde_json::json;

    use super::{Database, MovieQuery, MovieSource};

    fn fixture() -> Database {
        let connection = Connection::open_in_memory().expect("in-memory db");
        connection
            .execute_batch(
                "CREATE TABLE Movies (Title TEXT, Genre TEXT, Rating REAL, Votes INTEGER, Duration REAL);
                 INSERT INTO Movies VALUES ('Heat', 'Crime', 8.3, 700000, 2.5);
                 INSERT INTO Movies VALUES ('Up', 'Animation', 8.2, 1100000, 1.36);
                 INSERT INTO Movies VALUES ('Cats', 'Comedy', NULL, NULL, NULL);",
            )
            .expect("fixture rows");
        Database::from_connection(connection)
    }

    #[test]
    fn fetch_preserves_column_order_and_binds_params() {
        let table = fixture()
            .fetch(
                &MovieQuery::new("SELECT Votes, Title FROM Movies WHERE Rating >= ?1 ORDER BY Votes")
                    .bind(8.25),
            )
            .expect("query runs");

        assert_eq!(table.columns, vec!["Votes", "Title"]);
        assert_eq!(table.rows, vec![vec![json!(700000), json!("Heat")]]);
        assert_eq!(table.total_rows, 1);
        assert!(!table.truncated);
    }

    #[test]
    fn row_cap_truncates_rows_but_counts_every_match() {
        let table = fixture()
            .fetch(&MovieQuery::new("SELECT Title FROM Movies ORDER BY Title").with_row_cap(Some(1)))
            .expect("query runs");

        assert_eq!(table.rows, vec![vec![json!("Cats")]]);
        assert_eq!(table.total_rows, 3);
        assert!(table.truncated);
    }

    #[test]
    fn mutating_sql_never_reaches_the_engine() {
        let database = fixture();
        let error = database
            .fetch(&MovieQuery::new("DELETE FROM Movies"))
            .expect_err("delete is rejected");
        assert!(format!("{error:#}").contains("mutating_statement"));

        let remaining = database
            .fetch(&MovieQuery::new("SELECT COUNT(*) AS n FROM Movies"))
            .expect("count runs");
        assert_eq!(remaining.rows, vec![vec![json!(3)]]);
    }

    #[test]
    fn unavailable_database_refuses_queries() {
        let database = Database::unavailable("no such file");
        assert!(!database.is_available());
        assert_eq!(database.unavailable_cause(), Some("no such file"));
        assert!(database.fetch(&MovieQuery::new("SELECT 1")).is_err());
    }

    #[test]
    fn opening_a_missing_file_yields_unavailable_source() {
        let path = std::env::temp_dir().join(format!(
            "moviedash-missing-{}.db",
            std::process::id()
        ));
        let database = Database::open(&path);
        assert!(!database.is_available());
        assert_eq!(database.path(), Some(path.as_path()));
    }
}
