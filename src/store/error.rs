use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database operation failed")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}
