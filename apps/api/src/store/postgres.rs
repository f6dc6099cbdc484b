//! Postgres backend: one JSONB table per collection.
//!
//! Each table is `(id UUID PRIMARY KEY, doc JSONB NOT NULL)`; queries filter
//! and order on `doc->>'field'` expressions built by [`Query`] from its
//! static allow-list, so no user input is ever interpolated into SQL.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use tracing::info;
use uuid::Uuid;

use crate::store::query::{Query, SqlBind};
use crate::store::{DocumentBackend, StoreError};

/// Every collection the API stores. Tables are created up front so the first
/// request never races table creation.
const COLLECTIONS: &[&str] = &[
    "users",
    "companies",
    "applications",
    "saved_applications",
    "interview_questions",
    "leetcode_questions",
    "tips",
];

pub(crate) struct PostgresBackend {
    pool: PgPool,
}

impl PostgresBackend {
    pub(crate) async fn connect(database_url: &str) -> Result<Self, StoreError> {
        info!("Connecting to PostgreSQL...");

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;

        for collection in COLLECTIONS {
            sqlx::query(&format!(
                "CREATE TABLE IF NOT EXISTS {collection} (id UUID PRIMARY KEY, doc JSONB NOT NULL)"
            ))
            .execute(&pool)
            .await?;
        }

        info!("PostgreSQL connection pool established");
        Ok(Self { pool })
    }
}

fn bind_all<'q>(
    mut sql_query: sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments>,
    binds: &'q [SqlBind],
) -> sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments> {
    for bind in binds {
        sql_query = match bind {
            SqlBind::Text(value) => sql_query.bind(value),
            SqlBind::TextList(values) => sql_query.bind(values),
        };
    }
    sql_query
}

#[async_trait]
impl DocumentBackend for PostgresBackend {
    async fn insert(
        &self,
        collection: &'static str,
        id: Uuid,
        doc: Value,
    ) -> Result<(), StoreError> {
        sqlx::query(&format!("INSERT INTO {collection} (id, doc) VALUES ($1, $2)"))
            .bind(id)
            .bind(doc)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get(&self, collection: &'static str, id: Uuid) -> Result<Option<Value>, StoreError> {
        let row = sqlx::query(&format!("SELECT doc FROM {collection} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| r.get("doc")))
    }

    async fn replace(
        &self,
        collection: &'static str,
        id: Uuid,
        doc: Value,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(&format!("UPDATE {collection} SET doc = $2 WHERE id = $1"))
            .bind(id)
            .bind(doc)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, collection: &'static str, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query(&format!("DELETE FROM {collection} WHERE id = $1"))
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find(
        &self,
        collection: &'static str,
        query: &Query,
    ) -> Result<Vec<Value>, StoreError> {
        let (where_clause, binds) = query.to_sql_where(1);
        let order_clause = query.to_sql_order();

        let mut sql = format!("SELECT doc FROM {collection} {where_clause} {order_clause}");
        if query.page().is_some() {
            let limit = binds.len() + 1;
            let offset = binds.len() + 2;
            sql.push_str(&format!(" LIMIT ${limit} OFFSET ${offset}"));
        }

        let mut sql_query = bind_all(sqlx::query(&sql), &binds);
        if let Some(params) = query.page() {
            sql_query = sql_query
                .bind(params.per_page as i64)
                .bind(params.offset() as i64);
        }

        let rows = sql_query.fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(|r| r.get("doc")).collect())
    }

    async fn count(&self, collection: &'static str, query: &Query) -> Result<u64, StoreError> {
        let (where_clause, binds) = query.to_sql_where(1);
        let sql = format!("SELECT COUNT(*) AS n FROM {collection} {where_clause}");

        let row = bind_all(sqlx::query(&sql), &binds)
            .fetch_one(&self.pool)
            .await?;
        let n: i64 = row.get("n");
        Ok(n as u64)
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
