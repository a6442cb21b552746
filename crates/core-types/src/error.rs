use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid input for {0}: {1}")]
    InvalidInput(&'static str, String),

    #[error("Invalid currency code: {0}")]
    InvalidCurrency(String),
}
