use serde::Serialize;

use crate::db::models::snippet;
use crate::server::api::format::Links;
use crate::server::errors::ApiError;

/// A snippet as rendered by the API.
#[derive(Serialize, Debug, PartialEq, Eq)]
pub struct Snippet {
    /// Absolute URL of this snippet.
    pub url: String,
    /// Primary key.
    pub id: i64,
    /// Absolute URL of the highlighted HTML page.
    pub highlight: String,
    /// Username of the owner, `null` when unset.
    pub owner: Option<String>,
    /// Title, possibly empty.
    pub title: String,
    /// Source code.
    pub code: String,
    /// Whether line numbers are rendered.
    pub linenos: bool,
    /// Syntax token.
    pub language: String,
    /// Highlighting style.
    pub style: String,
    /// RFC 3339 creation timestamp.
    pub created: String,
}

impl Snippet {
    /// Render a stored snippet, resolving its hyperlinks through `links`.
    ///
    /// # Errors
    /// Errors if a hyperlink cannot be built.
    pub fn build(model: &snippet::Snippet, links: &Links<'_>) -> Result<Self, ApiError> {
        Ok(Self {
            url: links.snippet_detail(model.id)?,
            id: model.id,
            highlight: links.snippet_highlight(model.id)?,
            owner: model.owner.clone(),
            title: model.fields.title.clone(),
            code: model.fields.code.clone(),
            linenos: model.fields.linenos,
            language: model.fields.language.clone(),
            style: model.fields.style.clone(),
            created: model.created.clone(),
        })
    }
}
