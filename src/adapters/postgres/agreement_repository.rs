//! PostgreSQL implementation of AgreementRepository.
//!
//! Approval appends and status flips are single SQL statements whose
//! `WHERE`/`CASE` clauses carry the concurrency condition; the adapter
//! never reads a row back to decide a write.

use std::collections::BTreeSet;

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::agreement::Agreement;
use crate::domain::foundation::{
    AgreementId, AgreementKind, AgreementStatus, CoupleId, DomainError, ErrorCode, SessionId,
    Timestamp, UserId,
};
use crate::ports::AgreementRepository;

use super::helpers::{col, db_err};

/// PostgreSQL implementation of AgreementRepository.
#[derive(Clone)]
pub struct PostgresAgreementRepository {
    pool: PgPool,
}

impl PostgresAgreementRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AgreementRepository for PostgresAgreementRepository {
    async fn save(&self, agreement: &Agreement) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO agreements (
                id, couple_id, title, description, underlying_need, kind, themes,
                responsible_user_id, created_by, created_in_session_id,
                status, approved_by, success_streak,
                check_in_frequency_days, next_check_in_at,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            "#,
        )
        .bind(agreement.id().as_uuid())
        .bind(agreement.couple_id().as_uuid())
        .bind(agreement.title())
        .bind(agreement.description())
        .bind(agreement.underlying_need())
        .bind(agreement.kind().as_str())
        .bind(agreement.themes())
        .bind(agreement.responsible_user_id().map(|u| *u.as_uuid()))
        .bind(agreement.created_by().as_uuid())
        .bind(agreement.created_in_session_id().map(|s| *s.as_uuid()))
        .bind(agreement.status().as_str())
        .bind(approvals_to_uuids(agreement.approved_by()))
        .bind(agreement.success_streak() as i32)
        .bind(agreement.check_in_frequency_days() as i32)
        .bind(agreement.next_check_in_at().as_datetime())
        .bind(agreement.created_at().as_datetime())
        .bind(agreement.updated_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(db_err("Failed to insert agreement"))?;

        Ok(())
    }

    async fn find_by_id(&self, id: &AgreementId) -> Result<Option<Agreement>, DomainError> {
        let row = sqlx::query("SELECT * FROM agreements WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err("Failed to fetch agreement"))?;

        row.map(|row| row_to_agreement(&row)).transpose()
    }

    async fn list_by_couple(
        &self,
        couple_id: &CoupleId,
        status: Option<AgreementStatus>,
    ) -> Result<Vec<Agreement>, DomainError> {
        let rows = match status {
            Some(status) => {
                sqlx::query(
                    r#"
                    SELECT * FROM agreements
                    WHERE couple_id = $1 AND status = $2
                    ORDER BY created_at DESC
                    "#,
                )
                .bind(couple_id.as_uuid())
                .bind(status.as_str())
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(
                    r#"
                    SELECT * FROM agreements
                    WHERE couple_id = $1 AND status <> 'dissolved_with_couple'
                    ORDER BY created_at DESC
                    "#,
                )
                .bind(couple_id.as_uuid())
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(db_err("Failed to list agreements"))?;

        rows.iter().map(row_to_agreement).collect()
    }

    async fn append_approval(
        &self,
        id: &AgreementId,
        user_id: &UserId,
    ) -> Result<Agreement, DomainError> {
        let row = sqlx::query(
            r#"
            UPDATE agreements SET
                approved_by = CASE
                    WHEN $2 = ANY(approved_by) THEN approved_by
                    ELSE array_append(approved_by, $2)
                END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id.as_uuid())
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("Failed to append approval"))?;

        match row {
            Some(row) => row_to_agreement(&row),
            None => Err(DomainError::new(
                ErrorCode::AgreementNotFound,
                format!("Agreement not found: {}", id),
            )),
        }
    }

    async fn transition_status(
        &self,
        id: &AgreementId,
        from: AgreementStatus,
        to: AgreementStatus,
    ) -> Result<bool, DomainError> {
        let result = sqlx::query(
            "UPDATE agreements SET status = $3, updated_at = NOW() WHERE id = $1 AND status = $2",
        )
        .bind(id.as_uuid())
        .bind(from.as_str())
        .bind(to.as_str())
        .execute(&self.pool)
        .await
        .map_err(db_err("Failed to transition agreement status"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn update_guarded(
        &self,
        agreement: &Agreement,
        expected: AgreementStatus,
    ) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE agreements SET
                title = $3,
                description = $4,
                underlying_need = $5,
                themes = $6,
                status = $7,
                approved_by = $8,
                success_streak = $9,
                check_in_frequency_days = $10,
                next_check_in_at = $11,
                updated_at = $12
            WHERE id = $1 AND status = $2
            "#,
        )
        .bind(agreement.id().as_uuid())
        .bind(expected.as_str())
        .bind(agreement.title())
        .bind(agreement.description())
        .bind(agreement.underlying_need())
        .bind(agreement.themes())
        .bind(agreement.status().as_str())
        .bind(approvals_to_uuids(agreement.approved_by()))
        .bind(agreement.success_streak() as i32)
        .bind(agreement.check_in_frequency_days() as i32)
        .bind(agreement.next_check_in_at().as_datetime())
        .bind(agreement.updated_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(db_err("Failed to update agreement"))?;

        if result.rows_affected() == 0 {
            return match self.find_by_id(agreement.id()).await? {
                Some(_) => Err(DomainError::new(
                    ErrorCode::StaleTransition,
                    format!("Agreement {} changed concurrently", agreement.id()),
                )),
                None => Err(DomainError::new(
                    ErrorCode::AgreementNotFound,
                    format!("Agreement not found: {}", agreement.id()),
                )),
            };
        }

        Ok(())
    }

    async fn dissolve_all_for_couple(&self, couple_id: &CoupleId) -> Result<u32, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE agreements SET status = 'dissolved_with_couple', updated_at = NOW()
            WHERE couple_id = $1 AND status IN ('pending_approval', 'active', 'paused')
            "#,
        )
        .bind(couple_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(db_err("Failed to dissolve couple agreements"))?;

        Ok(result.rows_affected() as u32)
    }
}

fn approvals_to_uuids(approved_by: &BTreeSet<UserId>) -> Vec<uuid::Uuid> {
    approved_by.iter().map(|u| *u.as_uuid()).collect()
}

fn row_to_agreement(row: &sqlx::postgres::PgRow) -> Result<Agreement, DomainError> {
    let kind_str: String = col(row, "kind")?;
    let kind = AgreementKind::parse(&kind_str).ok_or_else(|| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid agreement kind: {}", kind_str),
        )
    })?;

    let status_str: String = col(row, "status")?;
    let status = AgreementStatus::parse(&status_str).ok_or_else(|| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid agreement status: {}", status_str),
        )
    })?;

    let approved_by: Vec<uuid::Uuid> = col(row, "approved_by")?;
    let success_streak: i32 = col(row, "success_streak")?;
    let frequency: i32 = col(row, "check_in_frequency_days")?;

    Ok(Agreement::reconstitute(
        AgreementId::from_uuid(col(row, "id")?),
        CoupleId::from_uuid(col(row, "couple_id")?),
        col(row, "title")?,
        col(row, "description")?,
        col(row, "underlying_need")?,
        kind,
        col(row, "themes")?,
        col::<Option<uuid::Uuid>>(row, "responsible_user_id")?.map(UserId::from_uuid),
        UserId::from_uuid(col(row, "created_by")?),
        col::<Option<uuid::Uuid>>(row, "created_in_session_id")?.map(SessionId::from_uuid),
        status,
        approved_by.into_iter().map(UserId::from_uuid).collect(),
        success_streak.max(0) as u32,
        frequency.max(0) as u32,
        Timestamp::from_datetime(col(row, "next_check_in_at")?),
        Timestamp::from_datetime(col(row, "created_at")?),
        Timestamp::from_datetime(col(row, "updated_at")?),
    ))
}
