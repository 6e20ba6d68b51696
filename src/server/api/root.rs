//! Entry point of the API.
use actix_web::{web, HttpRequest, HttpResponse};
use serde::Serialize;

use crate::server::errors::ApiError;

use super::auth::Caller;
use super::format::{self, Links};
use super::request::{Collection, Params};

/// Links to the top-level collections.
#[derive(Serialize, Debug, PartialEq, Eq)]
pub struct Root {
    /// Absolute URL of the user collection.
    pub users: String,
    /// Absolute URL of the snippet collection.
    pub snippets: String,
}

/// Handler for `/`. Open to any caller.
///
/// # Errors
/// Errors with `NotFound` for an unsupported format.
#[tracing::instrument(skip(req))]
pub async fn api_root(
    req: HttpRequest,
    path: web::Path<Collection>,
    params: web::Query<Params>,
    _caller: Caller,
) -> Result<HttpResponse, ApiError> {
    let requested = format::negotiate(
        path.format.as_deref(),
        params.format.as_deref(),
        format::JSON,
    )?;
    let links = Links::new(&req, requested);
    Ok(HttpResponse::Ok().json(Root {
        users: links.user_list()?,
        snippets: links.snippet_list()?,
    }))
}
