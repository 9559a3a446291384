//! PostgreSQL implementation of CheckInRepository.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::agreement::CheckIn;
use crate::domain::foundation::{
    AgreementId, CheckInId, CheckInStatus, DomainError, ErrorCode, Timestamp, UserId,
};
use crate::ports::CheckInRepository;

use super::helpers::{col, db_err};

/// PostgreSQL implementation of CheckInRepository.
#[derive(Clone)]
pub struct PostgresCheckInRepository {
    pool: PgPool,
}

impl PostgresCheckInRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CheckInRepository for PostgresCheckInRepository {
    async fn save(&self, check_in: &CheckIn) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO check_ins (
                id, agreement_id, reported_by, status, what_worked, what_was_hard, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(check_in.id.as_uuid())
        .bind(check_in.agreement_id.as_uuid())
        .bind(check_in.reported_by.as_uuid())
        .bind(check_in.status.as_str())
        .bind(check_in.what_worked.as_deref())
        .bind(check_in.what_was_hard.as_deref())
        .bind(check_in.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(db_err("Failed to insert check-in"))?;

        Ok(())
    }

    async fn list_recent(
        &self,
        agreement_id: &AgreementId,
        limit: u32,
    ) -> Result<Vec<CheckIn>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM check_ins
            WHERE agreement_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(agreement_id.as_uuid())
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("Failed to list check-ins"))?;

        rows.iter().map(row_to_check_in).collect()
    }

    async fn delete(&self, id: &CheckInId) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM check_ins WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(db_err("Failed to delete check-in"))?;

        Ok(())
    }
}

fn row_to_check_in(row: &sqlx::postgres::PgRow) -> Result<CheckIn, DomainError> {
    let status_str: String = col(row, "status")?;
    let status = CheckInStatus::parse(&status_str).ok_or_else(|| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid check-in status: {}", status_str),
        )
    })?;

    Ok(CheckIn {
        id: CheckInId::from_uuid(col(row, "id")?),
        agreement_id: AgreementId::from_uuid(col(row, "agreement_id")?),
        reported_by: UserId::from_uuid(col(row, "reported_by")?),
        status,
        what_worked: col(row, "what_worked")?,
        what_was_hard: col(row, "what_was_hard")?,
        created_at: Timestamp::from_datetime(col(row, "created_at")?),
    })
}
