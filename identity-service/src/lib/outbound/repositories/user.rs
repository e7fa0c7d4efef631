use async_trait::async_trait;
use sqlx::PgPool;

use super::store_error;
use crate::identity::errors::StoreError;
use crate::identity::models::NewUser;
use crate::identity::models::Profile;
use crate::identity::models::User;
use crate::identity::models::UserId;
use crate::identity::ports::UserRepository;

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    email: String,
    password_hash: String,
    date_of_birth: String,
    full_name: String,
    phone_number: String,
    external_handle: String,
    is_admin: bool,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: UserId(row.id),
            email: row.email,
            password_hash: row.password_hash,
            profile: Profile {
                date_of_birth: row.date_of_birth,
                full_name: row.full_name,
                phone_number: row.phone_number,
                external_handle: row.external_handle,
            },
            is_admin: row.is_admin,
        }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: NewUser) -> Result<UserId, StoreError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO users (email, password_hash, date_of_birth, full_name, phone_number, external_handle)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.profile.date_of_birth)
        .bind(&user.profile.full_name)
        .bind(&user.profile.phone_number)
        .bind(&user.profile.external_handle)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| store_error(e, user.email.clone()))?;

        Ok(UserId(id))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, password_hash, date_of_birth, full_name, phone_number,
                   external_handle, is_admin
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        Ok(row.map(User::from))
    }

    async fn is_admin(&self, id: UserId) -> Result<bool, StoreError> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT is_admin
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Unavailable(e.to_string()))?
        .ok_or_else(|| StoreError::NotFound(format!("user {}", id)))
    }
}
