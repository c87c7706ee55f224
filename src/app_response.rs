use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::error::CertError;
use crate::validation::ValidationErrors;

/// JSON envelope returned by every C-ABI call.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub enum AppResponse {
    DatabaseError(String),
    StorageUnavailable(String),
    SerializationError(String),
    NotFound(String),
    ValidationFailed(ValidationErrors),
    BadRequest(String),
    Ok(String),
}

impl Display for AppResponse {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AppResponse::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            AppResponse::StorageUnavailable(msg) => write!(f, "Storage unavailable: {}", msg),
            AppResponse::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            AppResponse::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppResponse::ValidationFailed(errors) => write!(f, "Validation failed: {}", errors),
            AppResponse::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppResponse::Ok(msg) => write!(f, "Ok: {}", msg),
        }
    }
}

impl From<CertError> for AppResponse {
    fn from(err: CertError) -> Self {
        match err {
            CertError::Validation(errors) => AppResponse::ValidationFailed(errors),
            CertError::NotFound(id) => AppResponse::NotFound(format!("No certification found with id: {}", id)),
            CertError::StorageUnavailable(msg) => AppResponse::StorageUnavailable(msg),
            CertError::Database(e) => AppResponse::DatabaseError(format!("LMDB error: {}", e)),
            CertError::Serialization(e) => AppResponse::SerializationError(format!("JSON serialization error: {}", e)),
            CertError::Config(msg) => AppResponse::BadRequest(msg),
        }
    }
}

impl From<serde_json::Error> for AppResponse {
    fn from(err: serde_json::Error) -> Self {
        AppResponse::SerializationError(format!("JSON serialization error: {}", err))
    }
}

impl AppResponse {
    pub fn success(msg: impl Into<String>) -> Self {
        AppResponse::Ok(msg.into())
    }

    /// Wraps a serializable payload as an `Ok` response carrying its JSON text.
    pub fn json<T: Serialize>(payload: &T) -> Self {
        match serde_json::to_string(payload) {
            Ok(json) => AppResponse::Ok(json),
            Err(e) => AppResponse::from(e),
        }
    }
}
