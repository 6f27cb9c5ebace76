use service_core::error::AppError;
use thiserror::Error;

/// Failures raised by [`MongoConnection`](super::MongoConnection).
#[derive(Debug, Error)]
pub enum StoreError {
    /// Connection parameters are unusable, e.g. no database name.
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Failed to fetch mongo connection: {0}")]
    Client(#[source] mongodb::error::Error),

    #[error("Connection to database is poisoned. Try reconnecting.")]
    PoisonedConnection,

    #[error("No collection selected and none given")]
    NoCollection,

    #[error("Database error: {0}")]
    Driver(#[from] mongodb::error::Error),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Client(_) | StoreError::Driver(_) => {
                AppError::DatabaseError(anyhow::Error::new(err))
            }
            StoreError::Connection(_) | StoreError::PoisonedConnection | StoreError::NoCollection => {
                AppError::InternalError(anyhow::Error::new(err))
            }
        }
    }
}
