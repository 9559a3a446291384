//! PostgreSQL implementation of ProfileRepository.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::foundation::{CoupleId, DomainError, ErrorCode, UserId};
use crate::ports::{Profile, ProfileRepository};

use super::helpers::{col, db_err};

/// PostgreSQL implementation of ProfileRepository.
#[derive(Clone)]
pub struct PostgresProfileRepository {
    pool: PgPool,
}

impl PostgresProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileRepository for PostgresProfileRepository {
    async fn find_by_user(&self, user_id: &UserId) -> Result<Option<Profile>, DomainError> {
        let row = sqlx::query(
            "SELECT user_id, display_name, couple_id, partner_id FROM profiles WHERE user_id = $1",
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("Failed to fetch profile"))?;

        row.map(|row| {
            Ok(Profile {
                user_id: UserId::from_uuid(col(&row, "user_id")?),
                display_name: col(&row, "display_name")?,
                couple_id: col::<Option<uuid::Uuid>>(&row, "couple_id")?.map(CoupleId::from_uuid),
                partner_id: col::<Option<uuid::Uuid>>(&row, "partner_id")?.map(UserId::from_uuid),
            })
        })
        .transpose()
    }

    async fn link_couple(
        &self,
        user_id: &UserId,
        couple_id: &CoupleId,
        partner_id: &UserId,
    ) -> Result<(), DomainError> {
        let result = sqlx::query(
            "UPDATE profiles SET couple_id = $2, partner_id = $3 WHERE user_id = $1",
        )
        .bind(user_id.as_uuid())
        .bind(couple_id.as_uuid())
        .bind(partner_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(db_err("Failed to link profile to couple"))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::ProfileNotFound,
                format!("Profile not found: {}", user_id),
            ));
        }

        Ok(())
    }

    async fn unlink_couple(&self, user_id: &UserId) -> Result<(), DomainError> {
        let result = sqlx::query(
            "UPDATE profiles SET couple_id = NULL, partner_id = NULL WHERE user_id = $1",
        )
        .bind(user_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(db_err("Failed to unlink profile from couple"))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::ProfileNotFound,
                format!("Profile not found: {}", user_id),
            ));
        }

        Ok(())
    }
}
