//! Declaration error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("duplicate resource: {0}")]
    DuplicateResource(String),

    #[error("unresolved reference: {0}")]
    UnresolvedReference(String),

    #[error("invalid declaration: {0}")]
    InvalidDeclaration(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
