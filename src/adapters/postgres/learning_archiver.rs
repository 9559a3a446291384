//! PostgreSQL implementation of LearningArchiver.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::foundation::{CoupleId, DomainError, UserId};
use crate::ports::LearningArchiver;

use super::helpers::db_err;

/// Extracts anonymized learning rows from a couple's dissolved
/// agreements. The insert copies only kind, themes, and the final
/// streak; no user ids, titles, or free text leave the source rows.
#[derive(Clone)]
pub struct PostgresLearningArchiver {
    pool: PgPool,
}

impl PostgresLearningArchiver {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LearningArchiver for PostgresLearningArchiver {
    async fn archive_for_member(
        &self,
        couple_id: &CoupleId,
        requested_by: &UserId,
    ) -> Result<u32, DomainError> {
        // requested_by gates the run but is deliberately not stored.
        let _ = requested_by;

        let result = sqlx::query(
            r#"
            INSERT INTO agreement_learnings (id, kind, themes, final_streak, dissolved_at, archived_at)
            SELECT gen_random_uuid(), kind, themes, success_streak, updated_at, NOW()
            FROM agreements
            WHERE couple_id = $1 AND status = 'dissolved_with_couple'
            "#,
        )
        .bind(couple_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(db_err("Failed to archive learnings"))?;

        Ok(result.rows_affected() as u32)
    }
}
