use std::fmt::{Display, Formatter};
use std::sync::OnceLock;

use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardrailReason {
    EmptyStatement,
    MultiStatement,
    MutatingStatement,
    UnsupportedStatement,
}

impl GuardrailReason {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EmptyStatement => "empty_statement",
            Self::MultiStatement => "multi_statement",
            Self::MutatingStatement => "mutating_statement",
            Self::UnsupportedStatement => "unsupported_statement",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardrailViolation {
    pub reason: GuardrailReason,
    pub message: String,
    pub keyword: Option<String>,
}

impl Display for GuardrailViolation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.reason.as_str())
    }
}

impl std::error::Error for GuardrailViolation {}

/// Accepts exactly one `SELECT` or `WITH ... SELECT` statement.
pub fn validate_read_only_sql(raw_sql: &str) -> Result<(), GuardrailViolation> {
    let candidate = strip_trailing_semicolons(raw_sql);
    if candidate.is_empty() {
        return Err(violation(
            GuardrailReason::EmptyStatement,
            "SQL statement is empty",
            None,
        ));
    }

    if candidate.contains(';') {
        return Err(violation(
            GuardrailReason::MultiStatement,
            "multi-statement SQL is not allowed against the movie dataset",
            None,
        ));
    }

    let normalized = candidate.to_ascii_lowercase();
    if let Some(found) = mutating_keyword_regex().find(&normalized) {
        let keyword = found.as_str().to_string();
        return Err(violation(
            GuardrailReason::MutatingStatement,
            format!("mutating SQL keyword `{keyword}` is not allowed; the dataset is read-only"),
            Some(keyword),
        ));
    }

    if !(normalized.starts_with("select") || normalized.starts_with("with")) {
        let leading = normalized
            .split(|ch: char| !ch.is_ascii_alphanumeric() && ch != '_')
            .find(|token| !token.is_empty())
            .unwrap_or("unknown")
            .to_string();
        return Err(violation(
            GuardrailReason::UnsupportedStatement,
            "only SELECT and WITH ... SELECT statements are allowed",
            Some(leading),
        ));
    }

    Ok(())
}

fn strip_trailing_semicolons(raw_sql: &str) -> &str {
    let mut candidate = raw_sql.trim();
    while let Some(stripped) = candidate.strip_suffix(';') {
        candidate = stripped.trim_end();
    }
    candidate
}

fn violation(
    reason: GuardrailReason,
    message: impl Into<String>,
    keyword: Option<String>,
) -> GuardrailViolation {
    GuardrailViolation {
        reason,
        message: message.into(),
        keyword,
    }
}

fn mutating_keyword_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(
            r"\b(insert|update|delete|create|alter|drop|replace|truncate|attach|detach|pragma|vacuum|reindex|analyze|begin|commit|rollback)\b",
        )
        .expect("mutating keyword regex should compile")
    })
}
