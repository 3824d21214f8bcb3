use crate::templates;
use crate::views::render_page;
use gotham::helpers::http::response::create_response;
use gotham::state::State;
use hyper::{Body, Response, StatusCode};
use std::fmt;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Debug, Error)]
pub enum Error {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i32 },
    #[error("{0}")]
    Validation(FieldErrors),
    #[error("Database connection error")]
    DatabaseConnection(#[from] diesel::ConnectionError),
    #[error("Database error")]
    Database(#[from] diesel::result::Error),
    #[error("Database migration error")]
    Migration(#[from] diesel_migrations::RunMigrationsError),
    #[error("Configuration error")]
    Config(#[from] config::ConfigError),
    #[error("Error rendering page")]
    Render(#[from] std::io::Error),
    #[error("Unexpected error")]
    Inner(Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    pub fn not_found(entity: &'static str, id: i32) -> Error {
        Error::NotFound { entity, id }
    }

    pub fn invalid(field: &'static str, message: impl Into<String>) -> Error {
        Error::Validation(FieldErrors(vec![FieldError::new(field, message)]))
    }

    pub fn status_code(&self) -> StatusCode {
        use Error::*;
        match self {
            NotFound { .. } => StatusCode::NOT_FOUND,
            Validation(..) => StatusCode::BAD_REQUEST,
            DatabaseConnection(..) | Database(..) | Migration(..) | Config(..) | Render(..)
            | Inner(..) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Logs the error and renders the matching error page.
    pub fn as_response(&self, state: &State) -> Response<Body> {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = ?self, "request failed");
        } else {
            warn!(error = %self, "request rejected");
        }
        let message = self.to_string();
        let rendered = match status {
            StatusCode::NOT_FOUND => {
                render_page("Not found", |out| templates::not_found(out, &message))
            }
            StatusCode::BAD_REQUEST => {
                render_page("Bad request", |out| templates::bad_request(out, &message))
            }
            _ => render_page("Server error", |out| templates::server_error(out)),
        };
        match rendered {
            Ok(body) => create_response(state, status, mime::TEXT_HTML_UTF_8, body),
            Err(_) => create_response(
                state,
                status,
                mime::TEXT_PLAIN_UTF_8,
                format!("Error: {}", self),
            ),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> FieldError {
        FieldError {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Every problem found in one submitted form.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FieldErrors(pub Vec<FieldError>);

impl FieldErrors {
    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError::new(field, message));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    #[cfg(test)]
    pub fn has(&self, field: &str) -> bool {
        self.0.iter().any(|err| err.field == field)
    }

    /// `Ok(value)` when nothing was reported, otherwise a validation error.
    pub fn into_result<T>(self, value: T) -> Result<T, Error> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(Error::Validation(self))
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid field{}: ",
            if self.0.len() == 1 { "" } else { "s" }
        )?;
        let messages: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        f.write_str(&messages.join("; "))
    }
}
