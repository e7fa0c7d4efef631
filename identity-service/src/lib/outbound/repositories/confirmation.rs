use async_trait::async_trait;
use sqlx::PgPool;

use super::store_error;
use crate::identity::errors::StoreError;
use crate::identity::models::ConfirmationCode;
use crate::identity::models::ConfirmationRecord;
use crate::identity::models::ExternalConfirmation;
use crate::identity::models::UserId;
use crate::identity::ports::ConfirmationRepository;

pub struct PostgresConfirmationRepository {
    pool: PgPool,
}

impl PostgresConfirmationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ConfirmationRow {
    user_id: i64,
    code: String,
    confirmed: bool,
}

#[async_trait]
impl ConfirmationRepository for PostgresConfirmationRepository {
    async fn save_code(&self, user_id: UserId, code: &ConfirmationCode) -> Result<i64, StoreError> {
        sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO account_confirmations (user_id, code)
            VALUES ($1, $2)
            RETURNING id
            "#,
        )
        .bind(user_id.0)
        .bind(code.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| store_error(e, format!("confirmation for user {}", user_id)))
    }

    async fn find_code(&self, user_id: UserId) -> Result<Option<ConfirmationRecord>, StoreError> {
        let row = sqlx::query_as::<_, ConfirmationRow>(
            r#"
            SELECT user_id, code, confirmed
            FROM account_confirmations
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        Ok(row.map(|r| ConfirmationRecord {
            user_id: UserId(r.user_id),
            code: ConfirmationCode::new(r.code),
            confirmed: r.confirmed,
        }))
    }

    async fn mark_confirmed(&self, user_id: UserId, code: &str) -> Result<bool, StoreError> {
        // A racing update re-checks the predicate after the first commits
        let result = sqlx::query(
            r#"
            UPDATE account_confirmations
            SET confirmed = TRUE
            WHERE user_id = $1 AND confirmed = FALSE AND code = $2
            "#,
        )
        .bind(user_id.0)
        .bind(code)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        Ok(result.rows_affected() == 1)
    }

    async fn confirm_by_external_handle(
        &self,
        handle: &str,
        fallback_code: &ConfirmationCode,
    ) -> Result<ExternalConfirmation, StoreError> {
        let user_id = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT id
            FROM users
            WHERE external_handle = $1
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(handle)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        let Some(user_id) = user_id else {
            return Ok(ExternalConfirmation::NotRegistered);
        };

        // No row returned means the conflicting row was already confirmed
        let confirmed = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO account_confirmations (user_id, code, confirmed)
            VALUES ($1, $2, TRUE)
            ON CONFLICT (user_id) DO UPDATE
            SET confirmed = TRUE
            WHERE account_confirmations.confirmed = FALSE
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(fallback_code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        Ok(match confirmed {
            Some(_) => ExternalConfirmation::NowConfirmed,
            None => ExternalConfirmation::AlreadyConfirmed,
        })
    }
}
