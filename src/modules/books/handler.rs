//! Per-request state machine for the inventory page.
//!
//! `bootstrap -> [POST: validate + write -> Redirect] -> [delete -> Redirect]
//! -> [edit: load row] -> list -> Render`. No HTTP types appear here.

use inventory_db::DbError;

use super::models::{Book, BookForm, ValidatedBook};
use super::store::BookStore;

/// Where every successful write sends the browser.
pub const REDIRECT_LOCATION: &str = "/";

/// A `?action=..&id=..` pair that named a known action and a numeric id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageAction {
    Delete(u32),
    Edit(u32),
}

impl PageAction {
    /// Returns `None` for unknown actions or when `id` is absent or not a number.
    pub fn from_query(action: Option<&str>, id: Option<&str>) -> Option<Self> {
        let id = id?.trim().parse::<u32>().ok()?;

        match action? {
            "delete" => Some(Self::Delete(id)),
            "edit" => Some(Self::Edit(id)),
            _ => None,
        }
    }
}

/// Everything the state machine reads from one HTTP request.
#[derive(Debug, Clone, Default)]
pub struct PageRequest {
    /// Present only for POST.
    pub submission: Option<BookForm>,
    pub action: Option<PageAction>,
}

/// Data for one rendering of the page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    pub books: Vec<Book>,
    /// Set in edit mode.
    pub editing: Option<Book>,
    /// Validation message from a rejected POST.
    pub error: Option<String>,
}

/// Terminal state of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Redirect,
    Render(Page),
}

/// Run one request against an already opened store.
pub async fn process(store: &mut dyn BookStore, request: PageRequest) -> Result<Outcome, DbError> {
    store.bootstrap().await?;

    let mut error = None;

    if let Some(form) = request.submission {
        match form.validate() {
            Ok(valid) => {
                write(store, valid).await?;
                return Ok(Outcome::Redirect);
            }
            Err(rejected) => {
                tracing::warn!(error = %rejected, outcome = "rejected", "book submission failed validation");
                error = Some(rejected.to_string());
            }
        }
    }

    let mut editing = None;

    match request.action {
        Some(PageAction::Delete(id)) => {
            let affected = store.delete(id).await?;
            tracing::info!(book_id = id, action = "delete", affected, "book deleted");
            return Ok(Outcome::Redirect);
        }
        Some(PageAction::Edit(id)) => {
            editing = store.find(id).await?;
            tracing::debug!(
                book_id = id,
                action = "edit",
                found = editing.is_some(),
                "loaded book for editing"
            );
        }
        None => {}
    }

    let books = store.list_all().await?;
    tracing::debug!(count = books.len(), "listed books");

    Ok(Outcome::Render(Page {
        books,
        editing,
        error,
    }))
}

async fn write(store: &mut dyn BookStore, valid: ValidatedBook) -> Result<(), DbError> {
    match valid.id {
        Some(id) => {
            let affected = store.update(id, &valid.book).await?;
            tracing::info!(book_id = id, action = "update", affected, "book updated");
        }
        None => {
            let id = store.insert(&valid.book).await?;
            tracing::info!(book_id = id, action = "create", "book created");
        }
    }
    Ok(())
}
