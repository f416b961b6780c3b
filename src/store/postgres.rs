//! PostgreSQL-backed profile store

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::profiles::ClientProfile;
use crate::error::{ApiError, ApiResult};
use crate::store::ProfileStore;

#[derive(Clone)]
pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn find_by_email(&self, email: &str) -> ApiResult<Option<ClientProfile>> {
        let profile = sqlx::query_as::<_, ClientProfile>(
            r#"
            SELECT id, user_id, first_name, last_name, middle_name,
                   email, phone, birth_date, created_at, updated_at
            FROM client_profiles
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    async fn upsert(&self, profile: ClientProfile) -> ApiResult<ClientProfile> {
        let persisted = sqlx::query_as::<_, ClientProfile>(
            r#"
            INSERT INTO client_profiles
                (id, user_id, first_name, last_name, middle_name,
                 email, phone, birth_date, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (id) DO UPDATE SET
                first_name = EXCLUDED.first_name,
                last_name = EXCLUDED.last_name,
                middle_name = EXCLUDED.middle_name,
                email = EXCLUDED.email,
                phone = EXCLUDED.phone,
                birth_date = EXCLUDED.birth_date,
                updated_at = EXCLUDED.updated_at
            RETURNING id, user_id, first_name, last_name, middle_name,
                      email, phone, birth_date, created_at, updated_at
            "#,
        )
        .bind(profile.id)
        .bind(profile.user_id)
        .bind(&profile.first_name)
        .bind(&profile.last_name)
        .bind(&profile.middle_name)
        .bind(&profile.email)
        .bind(&profile.phone)
        .bind(profile.birth_date)
        .bind(profile.created_at)
        .bind(profile.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            // The unique index on email is the final arbiter for collisions
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                ApiError::DuplicateEmail(profile.email.clone())
            }
            _ => ApiError::Database(e),
        })?;

        Ok(persisted)
    }
}
