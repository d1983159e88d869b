//! Fatal request errors for the inventory HTTP layer

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;
use uuid::{NoContext, Timestamp, Uuid};

/// A failure that aborts the request before any page is rendered.
///
/// The body is the bare message as `text/plain`; no partial page is sent.
#[derive(Error, Debug)]
#[error("{context}: {message}")]
pub struct FatalError {
    pub context: &'static str,
    pub message: String,
}

impl FatalError {
    /// Connection or schema bootstrap failed
    pub fn connection(message: impl Into<String>) -> Self {
        Self {
            context: "Database connection failed",
            message: message.into(),
        }
    }

    /// A statement failed after the connection was established
    pub fn database(message: impl Into<String>) -> Self {
        Self {
            context: "Database error",
            message: message.into(),
        }
    }
}

impl IntoResponse for FatalError {
    fn into_response(self) -> Response {
        let error_id = Uuid::new_v7(Timestamp::now(NoContext));

        tracing::error!(
            error_id = %error_id,
            context = self.context,
            error = %self.message,
            "request aborted"
        );

        (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.to_string(),
        )
            .into_response()
    }
}
