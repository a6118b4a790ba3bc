//! # Error Types Module
//!
//! Error taxonomy shared by the domain, the repositories and the services.
//! The conversation controller maps each variant to a user-facing message.

use thiserror::Error;

/// Errors raised by entities, repositories and services
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ShoppingError {
    /// User-correctable input problem (empty name, name too long)
    #[error("Validation error: {0}")]
    Validation(String),
    /// A raw string could not be turned into an identifier
    #[error("Invalid {kind} identifier: {value:?}")]
    InvalidIdentifier { kind: &'static str, value: String },
    /// Referenced entity does not exist (or is not visible to the caller)
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
    /// Storage engine failure
    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl ShoppingError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        ShoppingError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn invalid_id(kind: &'static str, value: impl Into<String>) -> Self {
        ShoppingError::InvalidIdentifier {
            kind,
            value: value.into(),
        }
    }

    /// Validation and malformed identifiers are both correctable by the user
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ShoppingError::Validation(_) | ShoppingError::InvalidIdentifier { .. }
        )
    }
}

impl From<sqlx::Error> for ShoppingError {
    fn from(err: sqlx::Error) -> Self {
        ShoppingError::Persistence(err.to_string())
    }
}

pub type ShoppingResult<T> = Result<T, ShoppingError>;
