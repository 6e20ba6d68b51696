//! Handlers for the snippet collection.
//!
//! Every handler negotiates the format first, then runs the collection-level
//! permission check, then loads the record (`404`), then runs the object-level
//! check, and only then validates the body.
use actix_web::{http::header, web, HttpRequest, HttpResponse};

use crate::db::{
    models::snippet::{self, SnippetFields},
    Tx as _,
};
use crate::server::errors::ApiError;

use self::request::SnippetInput;

use super::auth::Caller;
use super::format::{self, Links};
use super::pagination::{Page, Paginated};
use super::permissions::{self, IsAuthenticatedOrReadOnly, IsOwnerOrReadOnly, Permission};
use super::request::{Collection, Detail, Params};
use super::state::{App as AppState, Global as _};

/// Module that maps the HTTP web request body to structs.
pub mod request;

/// Module that maps the HTTP web response to structs.
pub mod response;

/// Policies guarding every snippet route.
pub const POLICIES: &[&dyn Permission] = &[&IsAuthenticatedOrReadOnly, &IsOwnerOrReadOnly];

/// Load a snippet or fail with `404`.
async fn find(data: &AppState, id: i64) -> Result<snippet::Snippet, ApiError> {
    snippet::Manager::find_by_id(data.db(), id)
        .await?
        .ok_or_else(|| {
            tracing::debug!("Snippet {id} not found");
            ApiError::NotFound
        })
}

/// List snippets, one page at a time, oldest first.
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
    let count = snippet::Manager::count(db).await?;
    let page = Page::resolve(count, data.page_size(), params.page.as_deref())?;
    let models = snippet::Manager::find_page(db, page.limit(), page.offset()).await?;

    let links = Links::new(&req, requested);
    let results = models
        .iter()
        .map(|model| response::Snippet::build(model, &links))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(HttpResponse::Ok().json(Paginated::new(&req, &page, results)))
}

/// Create a snippet owned by the caller. Any `owner` in the body is ignored.
///
/// # Errors
/// Errors with `NotAuthenticated` for anonymous callers and `Validation` for a bad body.
#[tracing::instrument(skip(req, data, body))]
pub async fn create(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<Collection>,
    params: web::Query<Params>,
    caller: Caller,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let requested = format::negotiate(
        path.format.as_deref(),
        params.format.as_deref(),
        format::JSON,
    )?;
    permissions::check(POLICIES, req.method(), &caller)?;

    let fields = SnippetInput::parse(&body, false)?.apply(SnippetFields::default());
    let mut tx = data.db().begin().await?;
    let id = snippet::TxManager::create(&mut tx, &fields, caller.user_id()).await?;
    let model = snippet::TxManager::find_by_id(&mut tx, id)
        .await?
        .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("Snippet {id} missing after insert")))?;
    tx.commit().await?;
    tracing::info!("Created snippet {id}");

    let snippet = response::Snippet::build(&model, &Links::new(&req, requested))?;
    Ok(HttpResponse::Created()
        .insert_header((header::LOCATION, snippet.url.clone()))
        .json(snippet))
}

/// Fetch one snippet.
///
/// # Errors
/// Errors with `NotFound` if there is no such snippet.
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
    let model = find(&data, path.pk).await?;
    permissions::check_object(POLICIES, req.method(), &caller, &model)?;

    let snippet = response::Snippet::build(&model, &Links::new(&req, requested))?;
    Ok(HttpResponse::Ok().json(snippet))
}

/// Replace a snippet's editable fields. `code` is required.
///
/// # Errors
/// Errors as `save` does.
#[tracing::instrument(skip(req, data, body))]
pub async fn update(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<Detail>,
    params: web::Query<Params>,
    caller: Caller,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    save(&req, &data, &path, &params, &caller, &body, false).await
}

/// Change some of a snippet's editable fields.
///
/// # Errors
/// Errors as `save` does.
#[tracing::instrument(skip(req, data, body))]
pub async fn partial_update(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<Detail>,
    params: web::Query<Params>,
    caller: Caller,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    save(&req, &data, &path, &params, &caller, &body, true).await
}

/// Shared body of `update` and `partial_update`.
///
/// Fields missing from the body keep their stored values; the highlighted
/// rendering is recomputed in the same write.
///
/// # Errors
/// Errors with `NotAuthenticated`/`PermissionDenied` if the caller is not the
/// owner, `NotFound` if there is no such snippet and `Validation` for a bad body.
async fn save(
    req: &HttpRequest,
    data: &AppState,
    path: &Detail,
    params: &Params,
    caller: &Caller,
    body: &[u8],
    partial: bool,
) -> Result<HttpResponse, ApiError> {
    let requested = format::negotiate(
        path.format.as_deref(),
        params.format.as_deref(),
        format::JSON,
    )?;
    permissions::check(POLICIES, req.method(), caller)?;
    let existing = find(data, path.pk).await?;
    permissions::check_object(POLICIES, req.method(), caller, &existing)?;

    let fields = SnippetInput::parse(body, partial)?.apply(existing.fields);
    let mut tx = data.db().begin().await?;
    if !snippet::TxManager::update(&mut tx, path.pk, &fields).await? {
        tx.rollback().await?;
        return Err(ApiError::NotFound);
    }
    let model = snippet::TxManager::find_by_id(&mut tx, path.pk)
        .await?
        .ok_or(ApiError::NotFound)?;
    tx.commit().await?;
    tracing::info!("Updated snippet {}", path.pk);

    let snippet = response::Snippet::build(&model, &Links::new(req, requested))?;
    Ok(HttpResponse::Ok().json(snippet))
}

/// Delete a snippet.
///
/// # Errors
/// Errors with `NotAuthenticated`/`PermissionDenied` if the caller is not the
/// owner and `NotFound` if there is no such snippet.
#[tracing::instrument(skip(req, data))]
pub async fn destroy(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<Detail>,
    params: web::Query<Params>,
    caller: Caller,
) -> Result<HttpResponse, ApiError> {
    format::negotiate(path.format.as_deref(), params.format.as_deref(), format::JSON)?;
    permissions::check(POLICIES, req.method(), &caller)?;
    let existing = find(&data, path.pk).await?;
    permissions::check_object(POLICIES, req.method(), &caller, &existing)?;

    let mut tx = data.db().begin().await?;
    if !snippet::TxManager::delete(&mut tx, path.pk).await? {
        tx.rollback().await?;
        return Err(ApiError::NotFound);
    }
    tx.commit().await?;
    tracing::info!("Deleted snippet {}", path.pk);
    Ok(HttpResponse::NoContent().finish())
}

/// Serve the stored highlighted rendering of a snippet as HTML.
///
/// # Errors
/// Errors with `NotFound` if there is no such snippet or a format other than `html` is asked for.
#[tracing::instrument(skip(req, data))]
pub async fn highlight(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<Detail>,
    params: web::Query<Params>,
    caller: Caller,
) -> Result<HttpResponse, ApiError> {
    format::negotiate(path.format.as_deref(), params.format.as_deref(), format::HTML)?;
    permissions::check(POLICIES, req.method(), &caller)?;
    let model = find(&data, path.pk).await?;
    permissions::check_object(POLICIES, req.method(), &caller, &model)?;

    Ok(HttpResponse::Ok()
        .content_type(mime::TEXT_HTML_UTF_8)
        .body(model.highlighted))
}
