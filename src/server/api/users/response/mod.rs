use serde::Serialize;

use crate::db::models::user;
use crate::server::api::format::Links;
use crate::server::errors::ApiError;

/// A user as rendered by the API.
#[derive(Serialize, Debug, PartialEq, Eq)]
pub struct User {
    /// Absolute URL of this user.
    pub url: String,
    /// Primary key.
    pub id: i64,
    /// Login name.
    pub username: String,
    /// Absolute URLs of the snippets this user owns, oldest first.
    pub snippets: Vec<String>,
}

impl User {
    /// Render a stored user together with the ids of the snippets they own.
    ///
    /// # Errors
    /// Errors if a hyperlink cannot be built.
    pub fn build(
        model: &user::User,
        snippet_ids: &[i64],
        links: &Links<'_>,
    ) -> Result<Self, ApiError> {
        let snippets = snippet_ids
            .iter()
            .map(|&id| links.snippet_detail(id))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            url: links.user_detail(model.id)?,
            id: model.id,
            username: model.username.clone(),
            snippets,
        })
    }
}
