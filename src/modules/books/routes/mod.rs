use std::sync::Arc;

use axum::{
    extract::{
        rejection::{FormRejection, QueryRejection},
        Query, State,
    },
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Form, Router,
};
use inventory_db::DbError;
use inventory_http::error::FatalError;
use serde::Deserialize;

use super::handler::{self, Outcome, PageAction, PageRequest, REDIRECT_LOCATION};
use super::models::BookForm;
use super::store::Connector;
use super::view;

#[derive(Clone)]
struct BooksState {
    connector: Arc<dyn Connector>,
}

/// `?action=<delete|edit>&id=<n>`
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
}

impl PageQuery {
    fn action(&self) -> Option<PageAction> {
        PageAction::from_query(self.action.as_deref(), self.id.as_deref())
    }

    /// A query string that does not parse carries no action.
    fn or_default(query: Result<Query<Self>, QueryRejection>) -> Self {
        match query {
            Ok(Query(query)) => query,
            Err(rejection) => {
                tracing::debug!(error = %rejection, "ignoring unparsable query string");
                Self::default()
            }
        }
    }
}

/// Routes for the single inventory page.
pub fn router(connector: Arc<dyn Connector>) -> Router {
    Router::new()
        .route("/", get(show_page).post(submit_form))
        .with_state(BooksState { connector })
}

async fn show_page(
    State(state): State<BooksState>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Response, FatalError> {
    let request = PageRequest {
        submission: None,
        action: PageQuery::or_default(query).action(),
    };
    respond(&state, request).await
}

async fn submit_form(
    State(state): State<BooksState>,
    query: Result<Query<PageQuery>, QueryRejection>,
    form: Result<Form<BookForm>, FormRejection>,
) -> Result<Response, FatalError> {
    // Any body that is not a form reads as an empty submission and fails validation.
    let form = match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "treating unreadable form body as empty");
            BookForm::default()
        }
    };
    let request = PageRequest {
        submission: Some(form),
        action: PageQuery::or_default(query).action(),
    };
    respond(&state, request).await
}

async fn respond(state: &BooksState, request: PageRequest) -> Result<Response, FatalError> {
    let mut store = state.connector.connect().await.map_err(fatal)?;

    let result = handler::process(store.as_mut(), request).await;
    store.close().await;
    let outcome = result.map_err(fatal)?;

    Ok(match outcome {
        Outcome::Redirect => (
            StatusCode::FOUND,
            [(header::LOCATION, REDIRECT_LOCATION)],
        )
            .into_response(),
        Outcome::Render(page) => Html(view::render_page(&page)).into_response(),
    })
}

fn fatal(error: DbError) -> FatalError {
    if error.is_connection_failure() {
        FatalError::connection(error.to_string())
    } else {
        FatalError::database(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::books::store::MemoryConnector;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    async fn body_text(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn get_renders_html() {
        let app = router(Arc::new(MemoryConnector::new()));

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response
            .headers()
            .get(header::CONTENT_TYPE)
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("text/html"));
        assert!(body_text(response).await.contains("<h1>Book Inventory</h1>"));
    }

    #[tokio::test]
    async fn post_redirects_with_found() {
        let app = router(Arc::new(MemoryConnector::new()));

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from("id=&title=Dune&author=Herbert&year=1965"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/");
    }

    #[tokio::test]
    async fn post_without_form_content_type_is_rejected_by_validation() {
        let app = router(Arc::new(MemoryConnector::new()));

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("All fields are required"));
    }

    #[tokio::test]
    async fn post_with_json_body_is_rejected_by_validation() {
        let connector = MemoryConnector::new();
        let app = router(Arc::new(connector.clone()));

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"title":"Dune"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("All fields are required"));

        let mut store = connector.connect().await.unwrap();
        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn repeated_query_keys_render_the_page() {
        let app = router(Arc::new(MemoryConnector::new()));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/?action=edit&action=edit&id=1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("<h1>Book Inventory</h1>"));
    }

    #[tokio::test]
    async fn every_request_closes_its_connection() {
        let connector = MemoryConnector::new();

        for request in [
            Request::builder().uri("/").body(Body::empty()).unwrap(),
            Request::builder()
                .method("POST")
                .uri("/")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("id=&title=Dune&author=Herbert&year=1965"))
                .unwrap(),
            Request::builder()
                .uri("/?action=delete&id=1")
                .body(Body::empty())
                .unwrap(),
        ] {
            let response = router(Arc::new(connector.clone()))
                .oneshot(request)
                .await
                .unwrap();
            assert!(response.status() == StatusCode::OK || response.status() == StatusCode::FOUND);
        }

        assert_eq!(connector.open_connections(), 0);
    }

    #[tokio::test]
    async fn refused_connection_is_fatal_plain_text() {
        let app = router(Arc::new(MemoryConnector::refusing(
            "Can't connect to MySQL server on 'localhost'",
        )));

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let body = body_text(response).await;
        assert_eq!(
            body,
            "Database connection failed: Can't connect to MySQL server on 'localhost'"
        );
        assert!(!body.contains("<html"));
    }
}
