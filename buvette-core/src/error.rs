use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Workbook error: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn validation(what: impl Into<String>) -> Self {
        Self::Validation(what.into())
    }

    pub fn conflict(what: impl Into<String>) -> Self {
        Self::Conflict(what.into())
    }

    /// Maps a unique-constraint violation to `Conflict`, anything else to
    /// `Database`.
    pub fn from_write(err: sqlx::Error, conflict_message: &str) -> Self {
        if let Some(db_err) = err.as_database_error()
            && db_err.is_unique_violation()
        {
            return Self::Conflict(conflict_message.to_string());
        }
        Self::Database(err)
    }

    /// Maps a foreign-key violation to `Validation`, describing the missing
    /// row from the violated constraint name.
    pub fn from_reference(err: sqlx::Error, describe: impl FnOnce(&str) -> String) -> Self {
        if let Some(db_err) = err.as_database_error()
            && db_err.is_foreign_key_violation()
        {
            return Self::Validation(describe(db_err.constraint().unwrap_or_default()));
        }
        Self::Database(err)
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_database_errors_are_not_conflicts() {
        let err = CoreError::from_write(sqlx::Error::RowNotFound, "duplicate");
        assert!(matches!(err, CoreError::Database(sqlx::Error::RowNotFound)));
    }

    #[test]
    fn non_database_errors_are_not_missing_references() {
        let err = CoreError::from_reference(sqlx::Error::RowNotFound, |_| "Unknown".into());
        assert!(matches!(err, CoreError::Database(sqlx::Error::RowNotFound)));
    }

    #[test]
    fn display_includes_context() {
        let err = CoreError::not_found("Timesheet 7");
        assert_eq!(err.to_string(), "Not found: Timesheet 7");
    }
}
