use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store query failed")]
    QueryFailed(#[source] anyhow::Error),
    #[error("store insert failed")]
    InsertFailed(#[source] anyhow::Error),
    #[error("store update failed")]
    UpdateFailed(#[source] anyhow::Error),
    #[error("store delete failed")]
    DeleteFailed(#[source] anyhow::Error),
}

#[cfg(feature = "postgres")]
impl From<bb8::RunError<tokio_postgres::Error>> for StoreError {
    fn from(error: bb8::RunError<tokio_postgres::Error>) -> Self {
        StoreError::QueryFailed(anyhow::anyhow!("connection pool error: {error}"))
    }
}

#[cfg(feature = "postgres")]
impl From<tokio_postgres::Error> for StoreError {
    fn from(error: tokio_postgres::Error) -> Self {
        StoreError::QueryFailed(anyhow::Error::new(error))
    }
}
