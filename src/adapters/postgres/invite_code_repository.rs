//! PostgreSQL implementation of InviteCodeRepository.
//!
//! The code value is the primary key; a mint collision surfaces as a
//! unique violation, which the issuing handler treats as "mint again".

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::couple::InviteCode;
use crate::domain::foundation::{DomainError, Timestamp, UserId};
use crate::ports::InviteCodeRepository;

use super::helpers::{col, db_err, is_unique_violation};

/// PostgreSQL implementation of InviteCodeRepository.
#[derive(Clone)]
pub struct PostgresInviteCodeRepository {
    pool: PgPool,
}

impl PostgresInviteCodeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InviteCodeRepository for PostgresInviteCodeRepository {
    async fn save(&self, invite: &InviteCode) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            INSERT INTO invite_codes (code, owner_id, expires_at, used_by, used_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&invite.code)
        .bind(invite.owner_id.as_uuid())
        .bind(invite.expires_at.as_datetime())
        .bind(invite.used_by.map(|u| *u.as_uuid()))
        .bind(invite.used_at.map(|t| *t.as_datetime()))
        .bind(invite.created_at.as_datetime())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(true),
            Err(e) if is_unique_violation(&e) => Ok(false),
            Err(e) => Err(db_err("Failed to insert invite code")(e)),
        }
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<InviteCode>, DomainError> {
        let row = sqlx::query("SELECT * FROM invite_codes WHERE code = $1")
            .bind(code)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err("Failed to fetch invite code"))?;

        row.map(|row| row_to_invite(&row)).transpose()
    }

    async fn find_active_by_owner(
        &self,
        owner_id: &UserId,
        now: &Timestamp,
    ) -> Result<Option<InviteCode>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT * FROM invite_codes
            WHERE owner_id = $1 AND used_by IS NULL AND expires_at > $2
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(owner_id.as_uuid())
        .bind(now.as_datetime())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("Failed to fetch active invite code"))?;

        row.map(|row| row_to_invite(&row)).transpose()
    }

    async fn mark_used(
        &self,
        code: &str,
        used_by: &UserId,
        now: &Timestamp,
    ) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE invite_codes SET used_by = $2, used_at = $3
            WHERE code = $1 AND used_by IS NULL AND expires_at > $3
            "#,
        )
        .bind(code)
        .bind(used_by.as_uuid())
        .bind(now.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(db_err("Failed to mark invite code used"))?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_invite(row: &sqlx::postgres::PgRow) -> Result<InviteCode, DomainError> {
    Ok(InviteCode {
        code: col(row, "code")?,
        owner_id: UserId::from_uuid(col(row, "owner_id")?),
        expires_at: Timestamp::from_datetime(col(row, "expires_at")?),
        used_by: col::<Option<uuid::Uuid>>(row, "used_by")?.map(UserId::from_uuid),
        used_at: col::<Option<chrono::DateTime<chrono::Utc>>>(row, "used_at")?
            .map(Timestamp::from_datetime),
        created_at: Timestamp::from_datetime(col(row, "created_at")?),
    })
}
