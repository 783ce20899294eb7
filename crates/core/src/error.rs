use crate::store::StoreError;
use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// The storage backend failed during a read, write, or commit. The
    /// enclosing unit of work has been rolled back.
    #[error("Persistence failure: {0}")]
    Persistence(#[from] StoreError),
}

pub type CoreResult<T> = Result<T, CoreError>;
