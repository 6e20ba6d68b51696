//! Format suffixes and hyperlinks.
//!
//! Every route is registered twice: once plain (`/snippets/`) and once with a
//! format suffix (`/snippets.json`). A `?format=` query parameter selects the
//! representation too and wins over the suffix. Hyperlinks in a response carry
//! the format of the request that produced them, as a suffix.
use actix_web::HttpRequest;

use crate::server::errors::ApiError;

use super::routes;

/// The JSON representation.
pub const JSON: &str = "json";
/// The static HTML representation.
pub const HTML: &str = "html";

/// Check that the requested format, if any, is the one the endpoint renders,
/// and return it so it can be propagated to hyperlinks.
///
/// # Errors
/// Errors with `NotFound` for any other format.
pub fn negotiate<'fmt>(
    suffix: Option<&'fmt str>,
    query: Option<&'fmt str>,
    accepted: &str,
) -> Result<Option<&'fmt str>, ApiError> {
    match query.or(suffix) {
        Some(requested) if requested != accepted => {
            tracing::debug!("Unsupported format '{requested}'");
            Err(ApiError::NotFound)
        }
        requested => Ok(requested),
    }
}

/// Builds absolute URLs to named routes, relative to the incoming request's host.
pub struct Links<'req> {
    /// The request whose host and scheme prefix every link.
    req: &'req HttpRequest,
    /// Format suffix to propagate.
    format: Option<&'req str>,
}

impl<'req> Links<'req> {
    /// Links for `req`, propagating `format`.
    #[must_use]
    pub const fn new(req: &'req HttpRequest, format: Option<&'req str>) -> Self {
        Self { req, format }
    }

    /// Resolve `name` with `elements`, using the format-suffixed twin when a format applies.
    fn reverse(
        &self,
        name: &str,
        elements: &[String],
        format: Option<&str>,
    ) -> Result<String, ApiError> {
        let url = match format {
            Some(format) => {
                let mut elements = elements.to_vec();
                elements.push(format.to_owned());
                self.req
                    .url_for(&format!("{name}{}", routes::FORMAT_SUFFIX), elements)
            }
            None => self.req.url_for(name, elements),
        };
        url.map(|url| url.to_string()).map_err(|err| {
            ApiError::Internal(anyhow::anyhow!("Unable to build URL for '{name}': {err}"))
        })
    }

    /// URL of the snippet collection.
    ///
    /// # Errors
    /// Errors if the route is not registered.
    pub fn snippet_list(&self) -> Result<String, ApiError> {
        self.reverse(routes::SNIPPET_LIST, &[], self.format)
    }

    /// URL of one snippet.
    ///
    /// # Errors
    /// Errors if the route is not registered.
    pub fn snippet_detail(&self, id: i64) -> Result<String, ApiError> {
        self.reverse(routes::SNIPPET_DETAIL, &[id.to_string()], self.format)
    }

    /// URL of a snippet's highlighted page. Always carries the `html` suffix,
    /// since that is the only representation the page has.
    ///
    /// # Errors
    /// Errors if the route is not registered.
    pub fn snippet_highlight(&self, id: i64) -> Result<String, ApiError> {
        self.reverse(routes::SNIPPET_HIGHLIGHT, &[id.to_string()], Some(HTML))
    }

    /// URL of the user collection.
    ///
    /// # Errors
    /// Errors if the route is not registered.
    pub fn user_list(&self) -> Result<String, ApiError> {
        self.reverse(routes::USER_LIST, &[], self.format)
    }

    /// URL of one user.
    ///
    /// # Errors
    /// Errors if the route is not registered.
    pub fn user_detail(&self, id: i64) -> Result<String, ApiError> {
        self.reverse(routes::USER_DETAIL, &[id.to_string()], self.format)
    }
}
