//! HTML rendering of the combined form and table.

use super::handler::{Page, REDIRECT_LOCATION};
use super::models::Book;
use crate::utils::escape_html;

const STYLE: &str = r#"
        body { font-family: Arial, sans-serif; margin: 20px; }
        .container { max-width: 800px; margin: auto; }
        h2 { border-bottom: 2px solid #ccc; padding-bottom: 5px; }
        .error { color: red; font-weight: bold; }
        table { width: 100%; border-collapse: collapse; margin-top: 20px; }
        th, td { border: 1px solid #ddd; padding: 8px; text-align: left; }
        th { background-color: #f2f2f2; }
        .form-group { margin-bottom: 15px; }
        .form-group label { display: block; margin-bottom: 5px; font-weight: bold; }
        .form-group input[type="text"], .form-group input[type="number"] { width: 90%; padding: 8px; }
        .btn { padding: 8px 15px; border: none; cursor: pointer; border-radius: 4px; color: white; text-decoration: none; }
        .btn-primary { background-color: #007bff; }
        .btn-success { background-color: #28a745; }
        .btn-danger { background-color: #dc3545; }
        .btn-warning { background-color: #ffc107; color: black; }
"#;

/// Render the whole document for `page`.
pub fn render_page(page: &Page) -> String {
    let editing = page.editing.as_ref();

    let heading = if editing.is_some() {
        "Edit Book"
    } else {
        "Add Book"
    };

    let error = page
        .error
        .as_deref()
        .map(|message| format!(r#"    <p class="error">{}</p>"#, escape_html(message)))
        .unwrap_or_default();

    let rows = if page.books.is_empty() {
        r#"            <tr><td colspan="6">No books yet</td></tr>"#.to_string()
    } else {
        page.books
            .iter()
            .map(render_row)
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Book Inventory</title>
    <style>{STYLE}    </style>
</head>
<body>
<div class="container">
    <h1>Book Inventory</h1>
    <hr>
    <h2>{heading}</h2>
{error}
{form}
    <h2>Books</h2>
    <table>
        <thead>
            <tr><th>ID</th><th>Title</th><th>Author</th><th>Year</th><th>Created</th><th>Actions</th></tr>
        </thead>
        <tbody>
{rows}
        </tbody>
    </table>
</div>
</body>
</html>
"#,
        form = render_form(editing),
    )
}

fn render_form(editing: Option<&Book>) -> String {
    let id = editing.map(|book| book.id.to_string()).unwrap_or_default();
    let title = editing.map(|book| escape_html(&book.title)).unwrap_or_default();
    let author = editing.map(|book| escape_html(&book.author)).unwrap_or_default();
    let year = editing.map(|book| book.year.to_string()).unwrap_or_default();

    let (submit_class, submit_label) = if editing.is_some() {
        ("btn-success", "Update")
    } else {
        ("btn-primary", "Save")
    };

    let cancel = if editing.is_some() {
        format!(r#" <a class="btn btn-warning" href="{REDIRECT_LOCATION}">Cancel</a>"#)
    } else {
        String::new()
    };

    format!(
        r#"    <form method="POST" action="{REDIRECT_LOCATION}">
        <input type="hidden" name="id" value="{id}">
        <div class="form-group">
            <label for="title">Title:</label>
            <input type="text" id="title" name="title" value="{title}" required>
        </div>
        <div class="form-group">
            <label for="author">Author:</label>
            <input type="text" id="author" name="author" value="{author}" required>
        </div>
        <div class="form-group">
            <label for="year">Year:</label>
            <input type="number" id="year" name="year" value="{year}" required>
        </div>
        <button type="submit" class="btn {submit_class}">{submit_label}</button>{cancel}
    </form>"#
    )
}

fn render_row(book: &Book) -> String {
    format!(
        r#"            <tr>
                <td>{id}</td>
                <td>{title}</td>
                <td>{author}</td>
                <td>{year}</td>
                <td>{created_at}</td>
                <td>
                    <a class="btn btn-warning" href="?action=edit&amp;id={id}">Edit</a>
                    <a class="btn btn-danger" href="?action=delete&amp;id={id}" onclick="return confirm('Delete this book?');">Delete</a>
                </td>
            </tr>"#,
        id = book.id,
        title = escape_html(&book.title),
        author = escape_html(&book.author),
        year = book.year,
        created_at = book.created_at.format("%Y-%m-%d %H:%M:%S"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn book(id: u32, title: &str) -> Book {
        Book {
            id,
            title: title.to_string(),
            author: "Herbert".to_string(),
            year: 1965,
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap(),
        }
    }

    #[test]
    fn add_mode_has_empty_hidden_id() {
        let html = render_page(&Page::default());

        assert!(html.contains("<h2>Add Book</h2>"));
        assert!(html.contains(r#"<input type="hidden" name="id" value="">"#));
        assert!(html.contains(r#"<form method="POST" action="/">"#));
        assert!(html.contains("No books yet"));
        assert!(!html.contains(r#"class="error""#));
    }

    #[test]
    fn edit_mode_prefills_form() {
        let html = render_page(&Page {
            books: vec![book(3, "Dune")],
            editing: Some(book(3, "Dune")),
            error: None,
        });

        assert!(html.contains("<h2>Edit Book</h2>"));
        assert!(html.contains(r#"<input type="hidden" name="id" value="3">"#));
        assert!(html.contains(r#"name="title" value="Dune""#));
        assert!(html.contains(r#"name="year" value="1965""#));
        assert!(html.contains(">Update</button>"));
    }

    #[test]
    fn rows_link_to_edit_and_delete() {
        let html = render_page(&Page {
            books: vec![book(5, "Dune")],
            ..Page::default()
        });

        assert!(html.contains(r#"href="?action=edit&amp;id=5""#));
        assert!(html.contains(r#"href="?action=delete&amp;id=5""#));
        assert!(html.contains("<td>2024-03-01 12:30:00</td>"));
    }

    #[test]
    fn error_line_is_escaped() {
        let html = render_page(&Page {
            error: Some("<script>".to_string()),
            ..Page::default()
        });

        assert!(html.contains(r#"<p class="error">&lt;script&gt;</p>"#));
    }

    #[test]
    fn book_text_is_escaped() {
        let html = render_page(&Page {
            books: vec![book(1, "Tom & Jerry <3")],
            ..Page::default()
        });

        assert!(html.contains("<td>Tom &amp; Jerry &lt;3</td>"));
    }
}
