//! Error taxonomy for core operations.
//!
//! Repositories and domain logic return [`OpxResult`]; the REST layer maps
//! each variant to an HTTP status. Database errors are carried whole so the
//! handler log line keeps the underlying cause.

#[derive(Debug, thiserror::Error)]
pub enum OpxError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("authentication required")]
    Unauthorized,
    #[error("operation not permitted for this role")]
    Forbidden,
    #[error("invalid order state: {0}")]
    InvalidState(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("password hashing failed: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),
    #[error("upload error: {0}")]
    Upload(#[from] opx_files::UploadError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type OpxResult<T> = std::result::Result<T, OpxError>;

impl OpxError {
    /// True when the error maps to a unique-constraint violation, used to
    /// report duplicate CPF/CNPJ/email as a conflict rather than a 500.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            OpxError::Database(sqlx::Error::Database(db)) => {
                db.code().as_deref() == Some("23505")
            }
            _ => false,
        }
    }
}
