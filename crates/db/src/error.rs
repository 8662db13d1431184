//! Mapping of storage failures onto [`DocumentError`].

use gudang_core::document::DocumentError;
use sea_orm::{DbErr, SqlErr};

/// Classifies a database error.
///
/// Validation rejects repeated return codes before any write, so a
/// unique-constraint violation here means a generated code raced another
/// writer. It becomes the retryable `CodeConflict`. Everything else is
/// `Database`.
pub fn document_error(err: DbErr) -> DocumentError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => DocumentError::CodeConflict(detail),
        _ => DocumentError::Database(err.to_string()),
    }
}
