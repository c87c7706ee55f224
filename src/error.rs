use thiserror::Error;

use crate::validation::{FieldError, ValidationErrors};

/// Errors surfaced by the certification store and commit path.
///
/// `Validation` is the client-input class and is always recoverable.
/// `StorageUnavailable` means the backing store could not be opened and the
/// process should not keep serving.
#[derive(Debug, Error)]
pub enum CertError {
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("certification not found: {0}")]
    NotFound(String),

    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("database error: {0}")]
    Database(#[from] lmdb::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

impl CertError {
    /// Field errors carried by a validation failure, empty otherwise.
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            CertError::Validation(errors) => errors.errors(),
            _ => &[],
        }
    }
}

impl From<ValidationErrors> for CertError {
    fn from(errors: ValidationErrors) -> Self {
        CertError::Validation(errors)
    }
}

impl From<FieldError> for CertError {
    fn from(error: FieldError) -> Self {
        CertError::Validation(error.into())
    }
}
