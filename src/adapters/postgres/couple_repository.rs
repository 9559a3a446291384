//! PostgreSQL implementation of CoupleRepository.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::couple::{Couple, PendingDissolution};
use crate::domain::foundation::{
    CoupleId, CoupleStatus, DomainError, ErrorCode, Timestamp, UserId,
};
use crate::ports::{CoupleRepository, DissolutionChoice};

use super::helpers::{col, db_err};

/// PostgreSQL implementation of CoupleRepository.
#[derive(Clone)]
pub struct PostgresCoupleRepository {
    pool: PgPool,
}

impl PostgresCoupleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CoupleRepository for PostgresCoupleRepository {
    async fn save(&self, couple: &Couple) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO couples (
                id, user_a, user_b, status,
                pending_initiated_by, pending_initiated_at, pending_agreements_dissolved,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(couple.id().as_uuid())
        .bind(couple.user_a().as_uuid())
        .bind(couple.user_b().as_uuid())
        .bind(couple.status().as_str())
        .bind(couple.pending_dissolution().map(|p| *p.initiated_by.as_uuid()))
        .bind(couple.pending_dissolution().map(|p| *p.initiated_at.as_datetime()))
        .bind(couple.pending_dissolution().map(|p| p.agreements_dissolved as i32))
        .bind(couple.created_at().as_datetime())
        .bind(couple.updated_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(db_err("Failed to insert couple"))?;

        Ok(())
    }

    async fn find_by_id(&self, id: &CoupleId) -> Result<Option<Couple>, DomainError> {
        let row = sqlx::query("SELECT * FROM couples WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err("Failed to fetch couple"))?;

        row.map(|row| row_to_couple(&row)).transpose()
    }

    async fn update_guarded(
        &self,
        couple: &Couple,
        expected: CoupleStatus,
    ) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE couples SET
                status = $3,
                pending_initiated_by = $4,
                pending_initiated_at = $5,
                pending_agreements_dissolved = $6,
                updated_at = $7
            WHERE id = $1 AND status = $2
            "#,
        )
        .bind(couple.id().as_uuid())
        .bind(expected.as_str())
        .bind(couple.status().as_str())
        .bind(couple.pending_dissolution().map(|p| *p.initiated_by.as_uuid()))
        .bind(couple.pending_dissolution().map(|p| *p.initiated_at.as_datetime()))
        .bind(couple.pending_dissolution().map(|p| p.agreements_dissolved as i32))
        .bind(couple.updated_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(db_err("Failed to update couple"))?;

        if result.rows_affected() == 0 {
            return match self.find_by_id(couple.id()).await? {
                Some(_) => Err(DomainError::new(
                    ErrorCode::StaleTransition,
                    format!("Couple {} changed concurrently", couple.id()),
                )),
                None => Err(DomainError::new(
                    ErrorCode::CoupleNotFound,
                    format!("Couple not found: {}", couple.id()),
                )),
            };
        }

        Ok(())
    }

    async fn delete(&self, id: &CoupleId) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM couples WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(db_err("Failed to delete couple"))?;

        Ok(())
    }

    async fn record_dissolution_choice(
        &self,
        choice: &DissolutionChoice,
    ) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO dissolution_choices (couple_id, user_id, keep_learnings, recorded_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (couple_id, user_id)
            DO UPDATE SET keep_learnings = $3, recorded_at = $4
            "#,
        )
        .bind(choice.couple_id.as_uuid())
        .bind(choice.user_id.as_uuid())
        .bind(choice.keep_learnings)
        .bind(choice.recorded_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(db_err("Failed to record dissolution choice"))?;

        Ok(())
    }

    async fn find_dissolution_choice(
        &self,
        couple_id: &CoupleId,
        user_id: &UserId,
    ) -> Result<Option<DissolutionChoice>, DomainError> {
        let row = sqlx::query(
            "SELECT * FROM dissolution_choices WHERE couple_id = $1 AND user_id = $2",
        )
        .bind(couple_id.as_uuid())
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("Failed to fetch dissolution choice"))?;

        row.map(|row| {
            Ok(DissolutionChoice {
                couple_id: CoupleId::from_uuid(col(&row, "couple_id")?),
                user_id: UserId::from_uuid(col(&row, "user_id")?),
                keep_learnings: col(&row, "keep_learnings")?,
                recorded_at: Timestamp::from_datetime(col(&row, "recorded_at")?),
            })
        })
        .transpose()
    }
}

fn row_to_couple(row: &sqlx::postgres::PgRow) -> Result<Couple, DomainError> {
    let status_str: String = col(row, "status")?;
    let status = CoupleStatus::parse(&status_str).ok_or_else(|| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid couple status: {}", status_str),
        )
    })?;

    let pending_initiated_by: Option<uuid::Uuid> = col(row, "pending_initiated_by")?;
    let pending = match pending_initiated_by {
        Some(initiated_by) => {
            let initiated_at: chrono::DateTime<chrono::Utc> = col(row, "pending_initiated_at")?;
            let dissolved: i32 = col::<Option<i32>>(row, "pending_agreements_dissolved")?
                .unwrap_or_default();
            Some(PendingDissolution {
                initiated_by: UserId::from_uuid(initiated_by),
                initiated_at: Timestamp::from_datetime(initiated_at),
                agreements_dissolved: dissolved as u32,
            })
        }
        None => None,
    };

    Ok(Couple::reconstitute(
        CoupleId::from_uuid(col(row, "id")?),
        UserId::from_uuid(col(row, "user_a")?),
        UserId::from_uuid(col(row, "user_b")?),
        status,
        pending,
        Timestamp::from_datetime(col(row, "created_at")?),
        Timestamp::from_datetime(col(row, "updated_at")?),
    ))
}
