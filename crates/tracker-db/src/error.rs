use thiserror::Error;

/// Failures of the SQLite layer, before they are mapped onto the tracker taxonomy
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("cannot open {url}: {source}")]
    Open {
        url: String,
        #[source]
        source: sqlx::Error,
    },

    #[error(transparent)]
    Query(#[from] sqlx::Error),

    #[error("migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("{0} is opened read-only")]
    ReadOnly(String),
}

pub type Result<T> = std::result::Result<T, DatabaseError>;
