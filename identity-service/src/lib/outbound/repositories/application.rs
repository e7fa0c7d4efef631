use async_trait::async_trait;
use sqlx::PgPool;

use crate::identity::errors::StoreError;
use crate::identity::models::AppId;
use crate::identity::models::Application;
use crate::identity::ports::ApplicationRepository;

/// Read-only access to the `apps` table; rows are provisioned out of band.
pub struct PostgresApplicationRepository {
    pool: PgPool,
}

impl PostgresApplicationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ApplicationRow {
    id: i64,
    name: String,
    secret: Vec<u8>,
}

#[async_trait]
impl ApplicationRepository for PostgresApplicationRepository {
    async fn find_by_id(&self, id: AppId) -> Result<Option<Application>, StoreError> {
        let row = sqlx::query_as::<_, ApplicationRow>(
            r#"
            SELECT id, name, secret
            FROM apps
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        Ok(row.map(|r| Application {
            id: AppId(r.id),
            name: r.name,
            secret: r.secret,
        }))
    }
}
