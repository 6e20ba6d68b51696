//! Errors surfaced by the HTTP API, and their JSON rendering.
#![allow(clippy::module_name_repetitions)]
use actix_web::{
    http::{header, StatusCode},
    HttpResponse, ResponseError,
};
use derive_more::Display;
use serde_json::{json, Map, Value};

use super::headers::WWW_AUTHENTICATE_BASIC;

/// Field name under which errors that belong to no single field are reported.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// Every failure an API handler can report.
///
/// Each variant maps to exactly one status code; the body is always JSON.
#[derive(Debug, Display)]
pub enum ApiError {
    /// Request body failed validation. Maps field name to its messages.
    #[display(fmt = "Invalid input.")]
    Validation(Map<String, Value>),
    /// Request body is not valid JSON.
    #[display(fmt = "JSON parse error - {}", _0)]
    Parse(String),
    /// Anonymous caller attempted something that needs credentials.
    #[display(fmt = "Authentication credentials were not provided.")]
    NotAuthenticated,
    /// Credentials were supplied but are malformed or wrong.
    #[display(fmt = "{}", _0)]
    AuthenticationFailed(String),
    /// Authenticated caller is not allowed to perform the action.
    #[display(fmt = "You do not have permission to perform this action.")]
    PermissionDenied,
    /// No such record, route or format.
    #[display(fmt = "Not found.")]
    NotFound,
    /// Page number is out of range or malformed.
    #[display(fmt = "Invalid page.")]
    InvalidPage,
    /// Verb is not supported on this resource.
    #[display(fmt = "Method \"{}\" not allowed.", _0)]
    MethodNotAllowed(String),
    /// Anything else; details are logged, not returned.
    #[display(fmt = "A server error occurred.")]
    Internal(anyhow::Error),
}

impl ApiError {
    /// Validation error for a single field.
    #[must_use]
    pub fn field(name: &str, message: &str) -> Self {
        let mut errors = Map::new();
        errors.insert(name.to_owned(), json!([message]));
        Self::Validation(errors)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match *self {
            Self::Validation(_) | Self::Parse(_) => StatusCode::BAD_REQUEST,
            Self::NotAuthenticated | Self::AuthenticationFailed(_) => StatusCode::UNAUTHORIZED,
            Self::PermissionDenied => StatusCode::FORBIDDEN,
            Self::NotFound | Self::InvalidPage => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut response = HttpResponse::build(self.status_code());
        match *self {
            Self::Validation(ref errors) => return response.json(errors),
            Self::NotAuthenticated | Self::AuthenticationFailed(_) => {
                response.insert_header((header::WWW_AUTHENTICATE, WWW_AUTHENTICATE_BASIC));
            }
            Self::Internal(ref err) => {
                tracing::error!("Internal server error: {err:?}");
            }
            Self::Parse(_)
            | Self::PermissionDenied
            | Self::NotFound
            | Self::InvalidPage
            | Self::MethodNotAllowed(_) => {}
        }
        response.json(json!({ "detail": self.to_string() }))
    }
}
