//! Page-number pagination for list endpoints.
use actix_web::HttpRequest;
use serde::Serialize;
use url::Url;

use crate::server::errors::ApiError;

/// Query parameter that selects a page.
pub const PAGE_PARAM: &str = "page";
/// Page parameter value that selects the last page.
const LAST_PAGE: &str = "last";

/// One resolved page of a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// 1-based page number.
    pub number: i64,
    /// Records per page.
    pub size: i64,
    /// Records in the whole collection.
    pub count: i64,
}

impl Page {
    /// Resolve the requested page of a collection of `count` records.
    ///
    /// No page parameter means the first page. The first page always exists, even
    /// for an empty collection.
    ///
    /// # Errors
    /// Errors with `InvalidPage` if the parameter is not a positive integer or
    /// `last`, or lies beyond the last page.
    pub fn resolve(count: i64, size: u32, requested: Option<&str>) -> Result<Self, ApiError> {
        let mut page = Self {
            number: 1,
            size: i64::from(size.max(1)),
            count,
        };
        page.number = match requested.map(str::trim) {
            None => 1,
            Some(LAST_PAGE) => page.num_pages(),
            Some(number) => number.parse().map_err(|_| ApiError::InvalidPage)?,
        };
        if page.number < 1 || page.number > page.num_pages() {
            return Err(ApiError::InvalidPage);
        }
        Ok(page)
    }

    /// Number of pages, never less than one.
    #[must_use]
    pub const fn num_pages(&self) -> i64 {
        if self.count <= 0 {
            return 1;
        }
        (self.count + self.size - 1) / self.size
    }

    /// Rows to skip.
    #[must_use]
    pub const fn offset(&self) -> i64 {
        (self.number - 1) * self.size
    }

    /// Rows to fetch.
    #[must_use]
    pub const fn limit(&self) -> i64 {
        self.size
    }

    /// Whether a later page exists.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.number < self.num_pages()
    }

    /// Whether an earlier page exists.
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.number > 1
    }
}

/// Envelope for a page of results.
#[derive(Serialize, Debug)]
pub struct Paginated<T> {
    /// Records in the whole collection.
    pub count: i64,
    /// Absolute URL of the next page.
    pub next: Option<String>,
    /// Absolute URL of the previous page.
    pub previous: Option<String>,
    /// Records on this page.
    pub results: Vec<T>,
}

impl<T> Paginated<T> {
    /// Wrap `results`, linking neighbours relative to the URL of `req`.
    #[must_use]
    pub fn new(req: &HttpRequest, page: &Page, results: Vec<T>) -> Self {
        let url = req.full_url();
        let next = page
            .has_next()
            .then(|| with_page(&url, Some(page.number + 1)));
        let previous = page.has_previous().then(|| {
            // The first page is addressed without a page parameter.
            let number = page.number - 1;
            with_page(&url, (number > 1).then_some(number))
        });
        Self {
            count: page.count,
            next,
            previous,
            results,
        }
    }
}

/// `url` with its page parameter replaced by `number`, or removed when `None`.
/// Remaining parameters are sorted by name.
fn with_page(url: &Url, number: Option<i64>) -> String {
    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != PAGE_PARAM)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    if let Some(number) = number {
        pairs.push((PAGE_PARAM.to_owned(), number.to_string()));
    }
    pairs.sort_by(|left, right| left.0.cmp(&right.0));

    let mut url = url.clone();
    if pairs.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(pairs);
    }
    url.to_string()
}
