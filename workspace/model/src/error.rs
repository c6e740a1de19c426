use sea_orm::{DbErr, SqlErr};
use thiserror::Error;
use tracing::error;
use validator::ValidationErrors;

/// Error types for role and profile operations
#[derive(Error, Debug)]
pub enum ModelError {
    /// A unique column already holds the given value
    #[error("{entity} with {field} '{value}' already exists")]
    UniquenessViolation {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    /// A field failed its type, length or enum constraint
    #[error("Validation error: {0}")]
    Validation(String),

    /// A referenced row does not exist
    #[error("Reference error: {0}")]
    Reference(String),

    /// The addressed row does not exist
    #[error("{entity} with ID {id} not found")]
    NotFound { entity: &'static str, id: i32 },

    /// Any other error from the database
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<ValidationErrors> for ModelError {
    fn from(errors: ValidationErrors) -> Self {
        ModelError::Validation(errors.to_string())
    }
}

impl ModelError {
    /// Classifies an error returned by an insert or update. Unique constraint
    /// failures are reported against `entity.field = value`, foreign key failures
    /// become reference errors.
    pub fn from_write(err: DbErr, entity: &'static str, field: &'static str, value: &str) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => ModelError::UniquenessViolation {
                entity,
                field,
                value: value.to_string(),
            },
            Some(SqlErr::ForeignKeyConstraintViolation(msg)) => ModelError::Reference(msg),
            _ => {
                error!("Unexpected database error while writing {}: {}", entity, err);
                ModelError::Database(err)
            }
        }
    }

    pub fn is_uniqueness_violation(&self) -> bool {
        matches!(self, ModelError::UniquenessViolation { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ModelError::Validation(_))
    }
}

/// Type alias for Result with ModelError
pub type Result<T> = std::result::Result<T, ModelError>;
