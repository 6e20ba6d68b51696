//! Read-only handlers for user accounts.
use std::collections::HashMap;

use actix_web::{web, HttpRequest, HttpResponse};

use crate::db::models::{snippet, user};
use crate::server::errors::ApiError;

use super::auth::Caller;
use super::format::{self, Links};
use super::pagination::{Page, Paginated};
use super::permissions::{self, AllowAny, Permission};
use super::request::{Collection, Detail, Params};
use super::state::{App as AppState, Global as _};

/// Module that maps the HTTP web response to structs.
pub mod response;

/// Policies guarding every user route.
pub const POLICIES: &[&dyn Permission] = &[&AllowAny];

/// Render `users`, each with the ids of the snippets they own.
async fn render(
    data: &AppState,
    users: &[user::User],
    links: &Links<'_>,
) -> Result<Vec<response::User>, ApiError> {
    let ids: Vec<i64> = users.iter().map(|account| account.id).collect();
    let mut owned: HashMap<i64, Vec<i64>> = HashMap::new();
    for (owner_id, snippet_id) in snippet::Manager::find_ids_by_owners(data.db(), &ids).await? {
        owned.entry(owner_id).or_default().push(snippet_id);
    }
    users
        .iter()
        .map(|account| {
            let snippet_ids = owned.get(&account.id).map_or(&[][..], Vec::as_slice);
            response::User::build(account, snippet_ids, links)
        })
        .collect()
}

/// List users, one page at a time, by id.
///
/// # Errors
/// Errors with `NotFound` for an unsupported format and `InvalidPage` for a bad page.
#[tracing::instrument(skip(req, data))]
pub async fn list(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<Collection>,
    params: web::Query<Params>,
    caller: Caller,
) -> Result<HttpResponse, ApiError> {
    let requested = format::negotiate(
        path.format.as_deref(),
        params.format.as_deref(),
        format::JSON,
    )?;
    permissions::check(POLICIES, req.method(), &caller)?;

    let db = data.db();
    let count = user::Manager::count(db).await?;
    let page = Page::resolve(count, data.page_size(), params.page.as_deref())?;
    let users = user::Manager::find_page(db, page.limit(), page.offset()).await?;

    let results = render(&data, &users, &Links::new(&req, requested)).await?;
    Ok(HttpResponse::Ok().json(Paginated::new(&req, &page, results)))
}

/// Fetch one user.
///
/// # Errors
/// Errors with `NotFound` if there is no such user.
#[tracing::instrument(skip(req, data))]
pub async fn retrieve(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<Detail>,
    params: web::Query<Params>,
    caller: Caller,
) -> Result<HttpResponse, ApiError> {
    let requested = format::negotiate(
        path.format.as_deref(),
        params.format.as_deref(),
        format::JSON,
    )?;
    permissions::check(POLICIES, req.method(), &caller)?;
    let account = user::Manager::find_by_id(data.db(), path.pk)
        .await?
        .ok_or_else(|| {
            tracing::debug!("User {} not found", path.pk);
            ApiError::NotFound
        })?;

    let mut rendered = render(&data, &[account], &Links::new(&req, requested)).await?;
    let user = rendered
        .pop()
        .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("User {} failed to render", path.pk)))?;
    Ok(HttpResponse::Ok().json(user))
}
