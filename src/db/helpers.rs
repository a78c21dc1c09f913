//! Database query helper functions to reduce boilerplate error handling.
//!
//! These helpers simplify common patterns like:
//! - Fetching a required record (NotFound if missing)
//! - Ensuring a record doesn't exist (Conflict if it does)
//! - Refusing to delete a row other rows still point at
//!
//! # Usage
//!
//! ```ignore
//! let team = require_record(teams::find_team(pool, id).await, "Equipo no encontrado")?;
//! ```

use crate::errors::ApiError;

/// Unwrap an optional database result, returning NotFound if None.
pub fn require_record<T>(
    result: Result<Option<T>, sqlx::Error>,
    not_found_message: &str,
) -> Result<T, ApiError> {
    match result {
        Ok(Some(record)) => Ok(record),
        Ok(None) => Err(ApiError::not_found(not_found_message)),
        Err(e) => Err(ApiError::Database(e)),
    }
}

/// Ensure a record does NOT exist, returning Conflict if it does.
pub fn ensure_not_exists<T>(
    result: Result<Option<T>, sqlx::Error>,
    conflict_message: &str,
) -> Result<(), ApiError> {
    match result {
        Ok(Some(_)) => Err(ApiError::conflict(conflict_message)),
        Ok(None) => Ok(()),
        Err(e) => Err(ApiError::Database(e)),
    }
}

/// Refuse a delete while dependents still reference the row.
pub fn ensure_unused(
    result: Result<i64, sqlx::Error>,
    conflict_message: &str,
) -> Result<(), ApiError> {
    match result {
        Ok(0) => Ok(()),
        Ok(count) => {
            tracing::warn!("Refusing delete, {} dependent rows: {}", count, conflict_message);
            Err(ApiError::conflict(conflict_message))
        }
        Err(e) => Err(ApiError::Database(e)),
    }
}

/// Map a unique or foreign-key violation that slipped past a pre-check to Conflict.
pub fn conflict_on_unique(error: sqlx::Error, conflict_message: &str) -> ApiError {
    let is_conflict = error
        .as_database_error()
        .map(|db| db.is_unique_violation() || db.is_foreign_key_violation())
        .unwrap_or(false);

    if is_conflict {
        ApiError::conflict(conflict_message)
    } else {
        ApiError::Database(error)
    }
}
