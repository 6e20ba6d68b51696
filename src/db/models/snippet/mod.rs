use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::{any::AnyRow, FromRow, Row as _};

use crate::highlight;

pub mod manager;

/// Columns selected for a full snippet row, joined with the owner's username.
pub(crate) const SELECT_SNIPPET: &str = "
    SELECT s.id, s.created, s.title, s.code, s.linenos, s.language, s.style,
           s.owner_id, u.username AS owner, s.highlighted
    FROM snippet s
    LEFT JOIN auth_user u ON u.id = s.owner_id
";

/// Trait for reading snippets.
#[async_trait]
pub trait Manager {
    /// Find a snippet by primary key.
    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<Snippet>>;
    /// Find one page of snippets, oldest first.
    async fn find_page(&self, limit: i64, offset: i64) -> anyhow::Result<Vec<Snippet>>;
    /// Count all snippets.
    async fn count(&self) -> anyhow::Result<i64>;
    /// Find the ids of all snippets owned by any of `owner_ids`.
    /// Returns `(owner_id, snippet_id)` pairs, oldest snippet first.
    async fn find_ids_by_owners(&self, owner_ids: &[i64]) -> anyhow::Result<Vec<(i64, i64)>>;
}

/// Trait for managing transactions on snippets.
///
/// Every write renders the highlighted HTML from the fields being written, so the
/// stored rendering never lags behind the stored source.
#[async_trait]
pub trait TxManager {
    /// Insert a new snippet owned by `owner_id`.
    async fn create(&mut self, fields: &SnippetFields, owner_id: Option<i64>)
        -> anyhow::Result<i64>;
    /// Overwrite the editable fields of a snippet. Returns `false` if no row matched.
    async fn update(&mut self, id: i64, fields: &SnippetFields) -> anyhow::Result<bool>;
    /// Delete a snippet. Returns `false` if no row matched.
    async fn delete(&mut self, id: i64) -> anyhow::Result<bool>;
    /// Find a snippet by primary key inside the transaction.
    async fn find_by_id(&mut self, id: i64) -> anyhow::Result<Option<Snippet>>;
}

/// The user-editable fields of a snippet.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SnippetFields {
    /// Optional title, at most 100 characters.
    pub title: String,
    /// Source code.
    pub code: String,
    /// Whether to render line numbers.
    pub linenos: bool,
    /// Syntax token, e.g. `python`.
    pub language: String,
    /// Highlighting style name, e.g. `friendly`.
    pub style: String,
}

impl Default for SnippetFields {
    fn default() -> Self {
        Self {
            title: String::new(),
            code: String::new(),
            linenos: false,
            language: highlight::DEFAULT_LANGUAGE.to_owned(),
            style: highlight::DEFAULT_STYLE.to_owned(),
        }
    }
}

impl SnippetFields {
    /// Render these fields to a standalone HTML page.
    ///
    /// # Errors
    /// Errors if the highlighter fails on the code.
    pub fn highlighted(&self) -> anyhow::Result<String> {
        highlight::render(
            &self.code,
            &self.language,
            &self.style,
            self.linenos,
            &self.title,
        )
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
/// Model for a stored snippet.
pub struct Snippet {
    /// Primary key.
    pub id: i64,
    /// RFC 3339 creation timestamp.
    pub created: String,
    /// Editable fields.
    #[serde(flatten)]
    pub fields: SnippetFields,
    /// Foreign key to the owning user, if any.
    pub owner_id: Option<i64>,
    /// Username of the owning user, if any.
    pub owner: Option<String>,
    /// HTML rendering of the snippet.
    pub highlighted: String,
}

impl FromRow<'_, AnyRow> for Snippet {
    fn from_row(row: &AnyRow) -> anyhow::Result<Self, sqlx::Error> {
        let linenos: i64 = row.try_get("linenos")?;
        Ok(Self {
            id: row.try_get("id")?,
            created: row.try_get("created")?,
            fields: SnippetFields {
                title: row.try_get("title")?,
                code: row.try_get("code")?,
                linenos: linenos != 0,
                language: row.try_get("language")?,
                style: row.try_get("style")?,
            },
            owner_id: row.try_get("owner_id")?,
            owner: row.try_get("owner")?,
            highlighted: row.try_get("highlighted")?,
        })
    }
}
