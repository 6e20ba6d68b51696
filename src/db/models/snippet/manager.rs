//! Manager for the snippet model.
use super::{Snippet, SnippetFields, SELECT_SNIPPET};
use crate::db::{DatabaseConnection, DatabaseKind, DatabaseTransaction};
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use sqlx::QueryBuilder;

#[async_trait]
impl super::Manager for DatabaseConnection {
    /// Find a snippet by primary key.
    ///
    /// # Errors
    /// Errors if can't establish a connection to the database.
    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<Snippet>> {
        let statement = format!("{SELECT_SNIPPET} WHERE s.id = $1");
        let row = match self.kind {
            DatabaseKind::Sqlite => {
                let mut connection = self.pool.acquire().await?;
                sqlx::query_as::<_, Snippet>(&statement)
                    .bind(id)
                    .fetch_optional(&mut *connection)
                    .await?
            }
        };
        Ok(row)
    }

    /// Find one page of snippets ordered by creation time.
    ///
    /// # Errors
    /// Errors if can't establish a connection to the database.
    async fn find_page(&self, limit: i64, offset: i64) -> anyhow::Result<Vec<Snippet>> {
        let statement = format!("{SELECT_SNIPPET} ORDER BY s.created, s.id LIMIT $1 OFFSET $2");
        let rows = match self.kind {
            DatabaseKind::Sqlite => {
                let mut connection = self.pool.acquire().await?;
                sqlx::query_as::<_, Snippet>(&statement)
                    .bind(limit)
                    .bind(offset)
                    .fetch_all(&mut *connection)
                    .await?
            }
        };
        Ok(rows)
    }

    /// Count all snippets.
    ///
    /// # Errors
    /// Errors if can't establish a connection to the database.
    async fn count(&self) -> anyhow::Result<i64> {
        let statement = "
            SELECT COUNT(*)
            FROM snippet
        ";
        let row = match self.kind {
            DatabaseKind::Sqlite => {
                let mut connection = self.pool.acquire().await?;
                sqlx::query_as::<_, (i64,)>(statement)
                    .fetch_one(&mut *connection)
                    .await?
            }
        };
        Ok(row.0)
    }

    /// Find `(owner_id, snippet_id)` pairs for all snippets owned by `owner_ids`.
    ///
    /// # Errors
    /// Errors if can't establish a connection to the database.
    async fn find_ids_by_owners(&self, owner_ids: &[i64]) -> anyhow::Result<Vec<(i64, i64)>> {
        if owner_ids.is_empty() {
            return Ok(vec![]);
        }
        let mut query_builder = QueryBuilder::<sqlx::Any>::new(
            "SELECT owner_id, id FROM snippet WHERE owner_id IN (",
        );
        {
            let mut separated = query_builder.separated(", ");
            for owner_id in owner_ids {
                separated.push_bind(*owner_id);
            }
            separated.push_unseparated(") ORDER BY created, id");
        }
        let rows = match self.kind {
            DatabaseKind::Sqlite => {
                let mut connection = self.pool.acquire().await?;
                query_builder
                    .build_query_as::<(i64, i64)>()
                    .fetch_all(&mut *connection)
                    .await?
            }
        };
        Ok(rows)
    }
}

#[async_trait]
impl super::TxManager for DatabaseTransaction {
    /// Insert a new snippet, rendering its highlighted HTML.
    ///
    /// # Errors
    /// Errors if highlighting fails or the snippet cannot be inserted.
    async fn create(
        &mut self,
        fields: &SnippetFields,
        owner_id: Option<i64>,
    ) -> anyhow::Result<i64> {
        let statement = "
            INSERT INTO snippet ( created, title, code, linenos, language, style, owner_id, highlighted )
            VALUES ( $1, $2, $3, $4, $5, $6, $7, $8 )
            RETURNING id
        ";
        let highlighted = fields.highlighted()?;
        let created = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
        let row = sqlx::query_as::<_, (i64,)>(statement)
            .bind(created)
            .bind(&fields.title)
            .bind(&fields.code)
            .bind(i64::from(fields.linenos))
            .bind(&fields.language)
            .bind(&fields.style)
            .bind(owner_id)
            .bind(highlighted)
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(row.0)
    }

    /// Overwrite the editable fields of a snippet, re-rendering its highlighted HTML.
    ///
    /// # Errors
    /// Errors if highlighting fails or the snippet cannot be updated.
    async fn update(&mut self, id: i64, fields: &SnippetFields) -> anyhow::Result<bool> {
        let statement = "
            UPDATE snippet
            SET title = $1, code = $2, linenos = $3, language = $4, style = $5, highlighted = $6
            WHERE id = $7
        ";
        let highlighted = fields.highlighted()?;
        let result = sqlx::query(statement)
            .bind(&fields.title)
            .bind(&fields.code)
            .bind(i64::from(fields.linenos))
            .bind(&fields.language)
            .bind(&fields.style)
            .bind(highlighted)
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a snippet by primary key.
    ///
    /// # Errors
    /// Errors if the snippet cannot be deleted.
    async fn delete(&mut self, id: i64) -> anyhow::Result<bool> {
        let statement = "
            DELETE FROM snippet
            WHERE id = $1
        ";
        let result = sqlx::query(statement)
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Find a snippet by primary key.
    ///
    /// # Errors
    /// Errors if the query fails.
    async fn find_by_id(&mut self, id: i64) -> anyhow::Result<Option<Snippet>> {
        let statement = format!("{SELECT_SNIPPET} WHERE s.id = $1");
        let row = sqlx::query_as::<_, Snippet>(&statement)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(row)
    }
}
