//! PostgreSQL implementation of SuggestionRepository.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::foundation::{
    AgreementId, CoupleId, DomainError, ErrorCode, ResponsibleParty, SessionId, SuggestionId,
    SuggestionStatus, Timestamp, UserId,
};
use crate::domain::suggestion::Suggestion;
use crate::ports::SuggestionRepository;

use super::helpers::{col, db_err};

/// PostgreSQL implementation of SuggestionRepository.
#[derive(Clone)]
pub struct PostgresSuggestionRepository {
    pool: PgPool,
}

impl PostgresSuggestionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SuggestionRepository for PostgresSuggestionRepository {
    async fn save(&self, suggestion: &Suggestion) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO suggestions (
                id, couple_id, session_id, title, underlying_need, responsible,
                status, created_agreement_id, resolved_by, resolved_at, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(suggestion.id().as_uuid())
        .bind(suggestion.couple_id().as_uuid())
        .bind(suggestion.session_id().map(|s| *s.as_uuid()))
        .bind(suggestion.title())
        .bind(suggestion.underlying_need())
        .bind(suggestion.responsible().as_str())
        .bind(suggestion.status().as_str())
        .bind(suggestion.created_agreement_id().map(|a| *a.as_uuid()))
        .bind(suggestion.resolved_by().map(|u| *u.as_uuid()))
        .bind(suggestion.resolved_at().map(|t| *t.as_datetime()))
        .bind(suggestion.created_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(db_err("Failed to insert suggestion"))?;

        Ok(())
    }

    async fn find_by_id(&self, id: &SuggestionId) -> Result<Option<Suggestion>, DomainError> {
        let row = sqlx::query("SELECT * FROM suggestions WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err("Failed to fetch suggestion"))?;

        row.map(|row| row_to_suggestion(&row)).transpose()
    }

    async fn list_pending(&self, couple_id: &CoupleId) -> Result<Vec<Suggestion>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM suggestions
            WHERE couple_id = $1 AND status = 'pending'
            ORDER BY created_at DESC
            "#,
        )
        .bind(couple_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("Failed to list suggestions"))?;

        rows.iter().map(row_to_suggestion).collect()
    }

    async fn mark_accepted(
        &self,
        id: &SuggestionId,
        resolved_by: &UserId,
        at: &Timestamp,
    ) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE suggestions SET status = 'accepted', resolved_by = $2, resolved_at = $3
            WHERE id = $1 AND status = 'pending'
            "#,
        )
        .bind(id.as_uuid())
        .bind(resolved_by.as_uuid())
        .bind(at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(db_err("Failed to mark suggestion accepted"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn link_agreement(
        &self,
        id: &SuggestionId,
        agreement_id: &AgreementId,
    ) -> Result<(), DomainError> {
        let result = sqlx::query(
            "UPDATE suggestions SET created_agreement_id = $2 WHERE id = $1",
        )
        .bind(id.as_uuid())
        .bind(agreement_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(db_err("Failed to link agreement to suggestion"))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::SuggestionNotFound,
                format!("Suggestion not found: {}", id),
            ));
        }

        Ok(())
    }

    async fn revert_to_pending(&self, id: &SuggestionId) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            UPDATE suggestions
            SET status = 'pending', resolved_by = NULL, resolved_at = NULL,
                created_agreement_id = NULL
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(db_err("Failed to revert suggestion"))?;

        Ok(())
    }

    async fn mark_dismissed(
        &self,
        id: &SuggestionId,
        resolved_by: &UserId,
        at: &Timestamp,
    ) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE suggestions SET status = 'dismissed', resolved_by = $2, resolved_at = $3
            WHERE id = $1 AND status = 'pending'
            "#,
        )
        .bind(id.as_uuid())
        .bind(resolved_by.as_uuid())
        .bind(at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(db_err("Failed to mark suggestion dismissed"))?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_suggestion(row: &sqlx::postgres::PgRow) -> Result<Suggestion, DomainError> {
    let responsible_str: String = col(row, "responsible")?;
    let responsible = ResponsibleParty::parse(&responsible_str).ok_or_else(|| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid responsible party: {}", responsible_str),
        )
    })?;

    let status_str: String = col(row, "status")?;
    let status = SuggestionStatus::parse(&status_str).ok_or_else(|| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid suggestion status: {}", status_str),
        )
    })?;

    Ok(Suggestion::reconstitute(
        SuggestionId::from_uuid(col(row, "id")?),
        CoupleId::from_uuid(col(row, "couple_id")?),
        col::<Option<uuid::Uuid>>(row, "session_id")?.map(SessionId::from_uuid),
        col(row, "title")?,
        col(row, "underlying_need")?,
        responsible,
        status,
        col::<Option<uuid::Uuid>>(row, "created_agreement_id")?.map(AgreementId::from_uuid),
        col::<Option<uuid::Uuid>>(row, "resolved_by")?.map(UserId::from_uuid),
        col::<Option<chrono::DateTime<chrono::Utc>>>(row, "resolved_at")?
            .map(Timestamp::from_datetime),
        Timestamp::from_datetime(col(row, "created_at")?),
    ))
}
