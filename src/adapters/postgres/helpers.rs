//! Shared row-decoding helpers for the PostgreSQL adapters.

use sqlx::postgres::PgRow;
use sqlx::Row;

use crate::domain::foundation::{DomainError, ErrorCode};

/// Decodes one column, mapping decode failures to `DatabaseError`.
pub(super) fn col<'r, T>(row: &'r PgRow, name: &str) -> Result<T, DomainError>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get(name).map_err(|e| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Failed to decode column '{}': {}", name, e),
        )
    })
}

/// Maps a sqlx execution error to `DatabaseError` with context.
pub(super) fn db_err(context: &str) -> impl FnOnce(sqlx::Error) -> DomainError + '_ {
    move |e| DomainError::new(ErrorCode::DatabaseError, format!("{}: {}", context, e))
}

/// True when the error is a unique-constraint violation.
pub(super) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505")
    )
}
