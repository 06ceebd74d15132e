pub mod directory;
pub mod discussion;
pub mod files;
pub mod rulebook;
pub mod users;

use thiserror::Error;

use crate::database::manager::DbError;
use crate::database::rows::RowError;
use crate::error::ApiError;

/// Errors shared by the service layer: pool acquisition, statement execution
/// and result decoding.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Db(#[from] DbError),

    #[error(transparent)]
    Query(#[from] sqlx::Error),

    #[error(transparent)]
    Row(#[from] RowError),

    #[error("unexpected status '{0}' from store")]
    UnexpectedStatus(String),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Db(e) => e.into(),
            StoreError::Query(e) => e.into(),
            StoreError::Row(e) => e.into(),
            StoreError::UnexpectedStatus(status) => {
                tracing::error!("unexpected store status: {}", status);
                ApiError::internal("An error occurred while processing your request")
            }
        }
    }
}
