use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Corrupt value in column {column}: {message}")]
    Decode { column: &'static str, message: String },

    #[error("The requested data was not found in the database.")]
    NotFound,
}
