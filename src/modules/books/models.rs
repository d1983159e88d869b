use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A persisted row of the `books` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Book {
    /// Auto-increment primary key
    pub id: u32,
    pub title: String,
    pub author: String,
    pub year: i32,
    /// Stamped by the server on insert, never updated
    pub created_at: DateTime<Utc>,
}

/// Column values written by insert and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub year: i32,
}

/// Raw form fields as submitted. Absent fields deserialize to `None`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookForm {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub year: Option<String>,
}

/// A submission that passed validation. `id` is `None` for an insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedBook {
    pub id: Option<u32>,
    pub book: NewBook,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("All fields are required ({field} is missing)")]
    Missing { field: &'static str },

    #[error("{field} must be a whole number, got '{value}'")]
    NotANumber { field: &'static str, value: String },
}

impl BookForm {
    /// Trim and parse the submission.
    ///
    /// A year of `0` counts as missing. An empty or `0` id means insert.
    pub fn validate(&self) -> Result<ValidatedBook, ValidationError> {
        let title = required_text(self.title.as_deref(), "title")?;
        let author = required_text(self.author.as_deref(), "author")?;

        let year = match parse_number::<i32>(self.year.as_deref(), "year")? {
            None | Some(0) => return Err(ValidationError::Missing { field: "year" }),
            Some(year) => year,
        };

        let id = parse_number::<u32>(self.id.as_deref(), "id")?.filter(|id| *id > 0);

        Ok(ValidatedBook {
            id,
            book: NewBook {
                title,
                author,
                year,
            },
        })
    }
}

fn required_text(value: Option<&str>, field: &'static str) -> Result<String, ValidationError> {
    match value.map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text.to_string()),
        _ => Err(ValidationError::Missing { field }),
    }
}

fn parse_number<T: std::str::FromStr>(
    value: Option<&str>,
    field: &'static str,
) -> Result<Option<T>, ValidationError> {
    let Some(raw) = value.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Ok(None);
    };

    raw.parse::<T>()
        .map(Some)
        .map_err(|_| ValidationError::NotANumber {
            field,
            value: raw.to_string(),
        })
}
