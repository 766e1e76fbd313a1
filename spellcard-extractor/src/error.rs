use std::borrow::Cow;
use std::fmt;
use thiserror::Error;

use crate::record::RecordKind;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid input: {0}")]
    InvalidInput(Cow<'static, str>),
    /// More than one entry was found on the page. Nothing is extracted.
    #[error("ambiguous document: found {entries} entries on one page, extract them individually")]
    AmbiguousDocument { entries: usize },
    #[error(transparent)]
    Validation(#[from] ValidationReport),
    #[error("failed to fetch `{url}`: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("malformed record: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Config(#[from] serde_yaml_ng::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// One reason a record could not be assembled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Problem {
    /// No strategy located the field.
    FieldMissing { field: &'static str },
    /// The field was located but its value is empty after normalization.
    FieldBlank { field: &'static str },
    /// The value holds TeX syntax that normalization would have escaped.
    Unescaped { field: &'static str },
    /// A variant group rule is unsatisfied. `found` lists the members that were
    /// located at all, including blank ones.
    VariantGroupViolation {
        group: &'static str,
        found: Vec<&'static str>,
    },
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Problem::FieldMissing { field } => write!(f, "field `{}` is missing", field),
            Problem::FieldBlank { field } => write!(f, "field `{}` is blank", field),
            Problem::Unescaped { field } => {
                write!(f, "field `{}` contains unescaped TeX syntax", field)
            }
            Problem::VariantGroupViolation { group, found } if found.is_empty() => {
                write!(f, "group `{}` is unsatisfied, no member was found", group)
            }
            Problem::VariantGroupViolation { group, found } => write!(
                f,
                "group `{}` is unsatisfied, found only: {}",
                group,
                found.join(", ")
            ),
        }
    }
}

/// Every problem found while assembling one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub kind: RecordKind,
    pub problems: Vec<Problem>,
}

impl ValidationReport {
    pub fn names_field(&self, field: &str) -> bool {
        self.problems.iter().any(|p| match p {
            Problem::FieldMissing { field: f }
            | Problem::FieldBlank { field: f }
            | Problem::Unescaped { field: f } => *f == field,
            Problem::VariantGroupViolation { .. } => false,
        })
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} record is incomplete ({} problem{}):",
            self.kind,
            self.problems.len(),
            if self.problems.len() == 1 { "" } else { "s" }
        )?;
        for problem in &self.problems {
            write!(f, "\n  - {}", problem)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationReport {}
