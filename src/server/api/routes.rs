//! A central place to register App routes.
#![allow(
    clippy::literal_string_with_formatting_args,
    reason = "Actix Web resource path uses `{param}` syntax which is not formatting but route pattern matching"
)]
use actix_service::ServiceFactory;
use actix_web::{
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    guard,
    http::header,
    web, App, Error, HttpRequest, HttpResponse, Resource,
};
use serde_json::json;

use crate::server::errors::ApiError;

use super::auth::Caller;
use super::state::App as AppState;
use super::{root, snippets, users};

/// Name of the root resource.
pub const API_ROOT: &str = "api-root";
/// Name of the snippet collection resource.
pub const SNIPPET_LIST: &str = "snippet-list";
/// Name of the single-snippet resource.
pub const SNIPPET_DETAIL: &str = "snippet-detail";
/// Name of the highlighted-snippet resource.
pub const SNIPPET_HIGHLIGHT: &str = "snippet-highlight";
/// Name of the user collection resource.
pub const USER_LIST: &str = "user-list";
/// Name of the single-user resource.
pub const USER_DETAIL: &str = "user-detail";
/// Appended to a resource name to name its format-suffixed twin.
pub const FORMAT_SUFFIX: &str = "-format";

/// Pattern of the format suffix segment.
const FORMAT: &str = "{format:[a-z0-9]+}";

/// Verbs of a read-only resource.
const ALLOW_READ: &str = "GET, HEAD, OPTIONS";
/// Verbs of a collection that can be appended to.
const ALLOW_LIST: &str = "GET, POST, HEAD, OPTIONS";
/// Verbs of a single editable record.
const ALLOW_DETAIL: &str = "GET, PUT, PATCH, DELETE, HEAD, OPTIONS";

/// Media type of JSON request and response bodies.
const APPLICATION_JSON: &str = "application/json";
/// Media type of the highlighted snippet page.
const TEXT_HTML: &str = "text/html";

/// What an `OPTIONS` request learns about a resource.
#[derive(Debug, Clone, Copy)]
struct Metadata {
    /// Route name the resource is registered under.
    name: &'static str,
    /// Value of the `Allow` header.
    allow: &'static str,
    /// Media type of successful responses.
    renders: &'static str,
}

impl Metadata {
    /// Title-cased route name, e.g. `Snippet List`.
    fn title(&self) -> String {
        self.name
            .split('-')
            .map(|word| {
                let mut chars = word.chars();
                chars.next().map_or_else(String::new, |first| {
                    first.to_uppercase().chain(chars).collect()
                })
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Fallback for verbs a resource does not handle.
///
/// Credentials are still checked, so a bad `Authorization` header yields `401`
/// rather than `405`.
///
/// # Errors
/// Always errors with `MethodNotAllowed`.
#[expect(clippy::unused_async, reason = "Actix handlers must be async")]
pub async fn method_not_allowed(
    req: HttpRequest,
    _caller: Caller,
) -> Result<HttpResponse, ApiError> {
    tracing::debug!("Method {} not allowed on {}", req.method(), req.path());
    Err(ApiError::MethodNotAllowed(req.method().to_string()))
}

/// Fallback for paths no resource matches.
///
/// # Errors
/// Always errors with `NotFound`.
#[expect(clippy::unused_async, reason = "Actix handlers must be async")]
pub async fn not_found(req: HttpRequest) -> Result<HttpResponse, ApiError> {
    tracing::debug!("No route for {}", req.path());
    Err(ApiError::NotFound)
}

/// Answer `OPTIONS` with the resource's verbs and media types.
#[expect(clippy::unused_async, reason = "Actix handlers must be async")]
async fn describe(metadata: Metadata, _caller: Caller) -> HttpResponse {
    HttpResponse::Ok()
        .insert_header((header::ALLOW, metadata.allow))
        .json(json!({
            "name": metadata.title(),
            "description": "",
            "renders": [metadata.renders],
            "parses": [APPLICATION_JSON],
        }))
}

/// A route matching `GET` and `HEAD`.
fn read() -> actix_web::Route {
    web::route().guard(guard::Any(guard::Get()).or(guard::Head()))
}

/// Build a resource and its format-suffixed twin.
///
/// `path` is the plain pattern (ending in `/`) and `stem` the pattern the
/// suffix is attached to. `configure` adds the same routes to both.
fn twins(
    metadata: Metadata,
    path: &str,
    stem: &str,
    configure: fn(Resource) -> Resource,
) -> [Resource; 2] {
    let plain = web::resource(path).name(metadata.name);
    let suffixed = web::resource(format!("{stem}.{FORMAT}"))
        .name(&format!("{}{FORMAT_SUFFIX}", metadata.name));
    [plain, suffixed].map(move |resource| {
        configure(resource)
            .route(
                web::route()
                    .guard(guard::Options())
                    .to(move |caller: Caller| describe(metadata, caller)),
            )
            .default_service(web::to(method_not_allowed))
    })
}

/// Central place to register all the App routing.
///
/// Every resource is registered under a stable name so handlers can build
/// hyperlinks with `url_for`, plus a twin accepting a `.{format}` suffix.
#[tracing::instrument(skip(app, state))]
pub fn register_app<
    U: MessageBody,
    V: ServiceFactory<
        ServiceRequest,
        Response = ServiceResponse<U>,
        Config = (),
        InitError = (),
        Error = Error,
    >,
>(
    mut app: App<V>,
    state: &AppState,
) -> App<V> {
    app = app
        .app_data(web::Data::new(state.clone()))
        .app_data(web::PathConfig::default().error_handler(|err, req| {
            tracing::debug!("Unmatched path parameters on {}: {err}", req.path());
            ApiError::NotFound.into()
        }))
        .app_data(web::QueryConfig::default().error_handler(|err, req| {
            tracing::debug!("Unreadable query string on {}: {err}", req.path());
            ApiError::NotFound.into()
        }));

    let resources = [
        twins(
            Metadata {
                name: API_ROOT,
                allow: ALLOW_READ,
                renders: APPLICATION_JSON,
            },
            "/",
            "/",
            |resource| resource.route(read().to(root::api_root)),
        ),
        twins(
            Metadata {
                name: SNIPPET_LIST,
                allow: ALLOW_LIST,
                renders: APPLICATION_JSON,
            },
            "/snippets/",
            "/snippets",
            |resource| {
                resource
                    .route(read().to(snippets::list))
                    .route(web::post().to(snippets::create))
            },
        ),
        twins(
            Metadata {
                name: SNIPPET_DETAIL,
                allow: ALLOW_DETAIL,
                renders: APPLICATION_JSON,
            },
            "/snippets/{pk:\\d+}/",
            "/snippets/{pk:\\d+}",
            |resource| {
                resource
                    .route(read().to(snippets::retrieve))
                    .route(web::put().to(snippets::update))
                    .route(web::patch().to(snippets::partial_update))
                    .route(web::delete().to(snippets::destroy))
            },
        ),
        twins(
            Metadata {
                name: SNIPPET_HIGHLIGHT,
                allow: ALLOW_READ,
                renders: TEXT_HTML,
            },
            "/snippets/{pk:\\d+}/highlight/",
            "/snippets/{pk:\\d+}/highlight",
            |resource| resource.route(read().to(snippets::highlight)),
        ),
        twins(
            Metadata {
                name: USER_LIST,
                allow: ALLOW_READ,
                renders: APPLICATION_JSON,
            },
            "/users/",
            "/users",
            |resource| resource.route(read().to(users::list)),
        ),
        twins(
            Metadata {
                name: USER_DETAIL,
                allow: ALLOW_READ,
                renders: APPLICATION_JSON,
            },
            "/users/{pk:\\d+}/",
            "/users/{pk:\\d+}",
            |resource| resource.route(read().to(users::retrieve)),
        ),
    ];
    for resource in resources.into_iter().flatten() {
        app = app.service(resource);
    }
    app.default_service(web::to(not_found))
}
